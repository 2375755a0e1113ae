//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::{TelnetOption, TelnetSide};

/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Represents possible errors that can occur in the codec handling process.
///
/// Stream-level anomalies from the peer (malformed subnegotiations, unknown
/// commands) are *not* errors: the decoder recovers from those by itself and
/// surfaces them as events. `CodecError` covers I/O failure and caller
/// misuse, the two cases that must reach the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An I/O error occurred while reading from or writing to the underlying stream.
    IOError {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
        /// Description of the operation that failed
        operation: String,
    },

    /// The caller issued a negotiation request that is forbidden in the
    /// current state. Nothing was placed on the wire.
    NegotiationInFlight {
        /// The option the caller tried to negotiate
        option: TelnetOption,
        /// The side (local or remote) the request addressed
        side: TelnetSide,
    },

    /// The caller asked to enable an option that is already enabled.
    /// Nothing was placed on the wire.
    AlreadyEnabled {
        /// The option the caller tried to enable
        option: TelnetOption,
        /// The side (local or remote) the request addressed
        side: TelnetSide,
    },

    /// The caller asked to negotiate an option this engine does not carry
    /// for its role, such as a client requesting DO NAWS of a server.
    UnsupportedOption {
        /// The option the caller tried to negotiate
        option: TelnetOption,
        /// The side (local or remote) the request addressed
        side: TelnetSide,
    },

    /// Error while encoding or decoding subnegotiation data.
    SubnegotiationError {
        /// The telnet option being subnegotiated
        option: Option<u8>,
        /// Specific reason for the failure
        reason: SubnegotiationErrorKind,
    },
}

/// Specific kinds of subnegotiation errors with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubnegotiationErrorKind {
    /// Insufficient data available to decode the subnegotiation.
    InsufficientData {
        /// Number of bytes required
        required: usize,
        /// Number of bytes available
        available: usize,
    },

    /// A payload whose length is fixed by its RFC arrived with another length.
    InvalidLength {
        /// Number of bytes required
        required: usize,
        /// Number of bytes received
        received: usize,
    },

    /// Invalid command byte in the subnegotiation data.
    InvalidCommand {
        /// The invalid command byte
        command: u8,
        /// Expected command bytes, if known
        expected: Option<Vec<u8>>,
    },

    /// Invalid verb (DO/DONT/WILL/WONT) in a status subnegotiation.
    InvalidVerb {
        /// The invalid verb byte
        verb: u8,
    },

    /// A record was cut short, e.g. a VALUE token with no preceding VAR.
    TruncatedRecord {
        /// Description of what record is incomplete
        description: String,
    },

    /// Payload is not the ASCII text its RFC requires.
    NotAscii,

    /// Generic subnegotiation error with a description.
    Other {
        /// Description of the error
        description: String,
    },
}

impl std::error::Error for CodecError {}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::IOError { kind, operation } => {
                write!(f, "I/O error during {}: {:?}", operation, kind)
            }
            CodecError::NegotiationInFlight { option, side } => {
                write!(f, "{} negotiation already pending for {}", side, option)
            }
            CodecError::AlreadyEnabled { option, side } => {
                write!(f, "{} is already enabled on the {} side", option, side)
            }
            CodecError::UnsupportedOption { option, side } => {
                write!(f, "{} is not supported on the {} side", option, side)
            }
            CodecError::SubnegotiationError { option, reason } => {
                if let Some(opt) = option {
                    write!(f, "Subnegotiation error for option {}: {}", opt, reason)
                } else {
                    write!(f, "Subnegotiation error: {}", reason)
                }
            }
        }
    }
}

impl std::fmt::Display for SubnegotiationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubnegotiationErrorKind::InsufficientData {
                required,
                available,
            } => {
                write!(
                    f,
                    "insufficient data (required: {}, available: {})",
                    required, available
                )
            }
            SubnegotiationErrorKind::InvalidLength { required, received } => {
                write!(
                    f,
                    "invalid length (required: {}, received: {})",
                    required, received
                )
            }
            SubnegotiationErrorKind::InvalidCommand { command, expected } => {
                if let Some(exp) = expected {
                    write!(
                        f,
                        "invalid command 0x{:02X} (expected one of: {:?})",
                        command, exp
                    )
                } else {
                    write!(f, "invalid command: 0x{:02X}", command)
                }
            }
            SubnegotiationErrorKind::InvalidVerb { verb } => {
                write!(f, "invalid verb: 0x{:02X}", verb)
            }
            SubnegotiationErrorKind::TruncatedRecord { description } => {
                write!(f, "truncated record: {}", description)
            }
            SubnegotiationErrorKind::NotAscii => {
                write!(f, "payload is not printable ASCII")
            }
            SubnegotiationErrorKind::Other { description } => {
                write!(f, "{}", description)
            }
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::IOError {
            kind: err.kind(),
            operation: err.to_string(),
        }
    }
}
