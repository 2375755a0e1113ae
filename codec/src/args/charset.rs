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

//! Charset option (RFC 2066).
//!
//! The requesting side offers a delimiter-separated list of character set
//! names; the peer answers ACCEPTED with one of them or REJECTED. The
//! TTABLE-* commands are recognised and acknowledged but translate tables
//! themselves are not interpreted.

use crate::consts;
use crate::consts::option::charset;
use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use bytes::{BufMut, BytesMut};
use std::fmt::Formatter;

/// A parsed CHARSET subnegotiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CharsetCommand {
    /// `REQUEST <sep> <name> [<sep> <name> ...]`: offered character sets
    Request {
        /// The delimiter byte chosen by the sender
        separator: u8,
        /// Offered names, in offer order
        charsets: Vec<String>,
    },
    /// `ACCEPTED <name>`: the peer selected one of the offers
    Accepted(String),
    /// `REJECTED`: none of the offers was usable
    Rejected,
    /// `TTABLE-IS`: a translate table follows; carried but not interpreted
    TtableIs(BytesMut),
    /// `TTABLE-REJECTED`
    TtableRejected,
    /// `TTABLE-ACK`
    TtableAck,
    /// `TTABLE-NAK`
    TtableNak,
}

impl CharsetCommand {
    /// An offer of the given names with the conventional space separator.
    pub fn request<S: Into<String>>(charsets: Vec<S>) -> Self {
        CharsetCommand::Request {
            separator: b' ',
            charsets: charsets.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a CHARSET payload.
    pub fn parse(payload: &[u8]) -> CodecResult<Self> {
        let Some((&verb, rest)) = payload.split_first() else {
            return Err(charset_error(SubnegotiationErrorKind::InsufficientData {
                required: 1,
                available: 0,
            }));
        };
        match verb {
            charset::REQUEST => {
                // "[TTABLE] <version>" prefix is allowed before the separator;
                // this engine never offers TTABLE, and on parse we skip it.
                let rest = rest.strip_prefix(b"[TTABLE]\x01".as_slice()).unwrap_or(rest);
                let Some((&separator, names)) = rest.split_first() else {
                    return Err(charset_error(SubnegotiationErrorKind::TruncatedRecord {
                        description: "REQUEST without separator".into(),
                    }));
                };
                let charsets: Vec<String> = names
                    .split(|&byte| byte == separator)
                    .filter(|name| !name.is_empty())
                    .map(|name| String::from_utf8_lossy(name).into_owned())
                    .collect();
                if charsets.is_empty() {
                    return Err(charset_error(SubnegotiationErrorKind::TruncatedRecord {
                        description: "REQUEST offers no names".into(),
                    }));
                }
                Ok(CharsetCommand::Request {
                    separator,
                    charsets,
                })
            }
            charset::ACCEPTED => {
                if rest.is_empty() {
                    return Err(charset_error(SubnegotiationErrorKind::TruncatedRecord {
                        description: "ACCEPTED without a name".into(),
                    }));
                }
                Ok(CharsetCommand::Accepted(
                    String::from_utf8_lossy(rest).into_owned(),
                ))
            }
            charset::REJECTED => Ok(CharsetCommand::Rejected),
            charset::TTABLE_IS => Ok(CharsetCommand::TtableIs(BytesMut::from(rest))),
            charset::TTABLE_REJECTED => Ok(CharsetCommand::TtableRejected),
            charset::TTABLE_ACK => Ok(CharsetCommand::TtableAck),
            charset::TTABLE_NAK => Ok(CharsetCommand::TtableNak),
            verb => Err(charset_error(SubnegotiationErrorKind::InvalidCommand {
                command: verb,
                expected: Some(vec![
                    charset::REQUEST,
                    charset::ACCEPTED,
                    charset::REJECTED,
                    charset::TTABLE_IS,
                ]),
            })),
        }
    }

    /// Encode as payload bytes.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<()> {
        match self {
            CharsetCommand::Request {
                separator,
                charsets,
            } => {
                dst.put_u8(charset::REQUEST);
                for name in charsets {
                    dst.put_u8(*separator);
                    dst.put_slice(name.as_bytes());
                }
            }
            CharsetCommand::Accepted(name) => {
                dst.put_u8(charset::ACCEPTED);
                dst.put_slice(name.as_bytes());
            }
            CharsetCommand::Rejected => dst.put_u8(charset::REJECTED),
            CharsetCommand::TtableIs(table) => {
                dst.put_u8(charset::TTABLE_IS);
                dst.put_slice(table);
            }
            CharsetCommand::TtableRejected => dst.put_u8(charset::TTABLE_REJECTED),
            CharsetCommand::TtableAck => dst.put_u8(charset::TTABLE_ACK),
            CharsetCommand::TtableNak => dst.put_u8(charset::TTABLE_NAK),
        }
        Ok(())
    }
}

impl std::fmt::Display for CharsetCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CharsetCommand::Request { charsets, .. } => {
                write!(f, "CharsetRequest({})", charsets.join(", "))
            }
            CharsetCommand::Accepted(name) => write!(f, "CharsetAccepted({name})"),
            CharsetCommand::Rejected => write!(f, "CharsetRejected"),
            CharsetCommand::TtableIs(table) => write!(f, "TtableIs({} bytes)", table.len()),
            CharsetCommand::TtableRejected => write!(f, "TtableRejected"),
            CharsetCommand::TtableAck => write!(f, "TtableAck"),
            CharsetCommand::TtableNak => write!(f, "TtableNak"),
        }
    }
}

fn charset_error(reason: SubnegotiationErrorKind) -> CodecError {
    CodecError::SubnegotiationError {
        option: Some(consts::option::CHARSET),
        reason,
    }
}

/// Normalise a character set name for comparison: lower-cased, `_` squashed
/// to `-`, and zero-padded ISO-8859 part numbers stripped
/// (`ISO-8859-02` and `iso_8859-2` both become `iso-8859-2`).
pub fn normalize_charset(name: &str) -> String {
    let mut normalized = name.trim().to_ascii_lowercase().replace('_', "-");
    if let Some(part) = normalized.strip_prefix("iso-8859-") {
        let stripped = part.trim_start_matches('0');
        if !stripped.is_empty() && part != stripped {
            normalized = format!("iso-8859-{stripped}");
        }
    }
    normalized
}

/// Select the first offered name we support, comparing normalised forms.
/// Returns the name exactly as offered, for echoing back in ACCEPTED.
pub fn select_charset<'a>(offered: &'a [String], supported: &[String]) -> Option<&'a str> {
    offered
        .iter()
        .find(|offer| {
            let normalized = normalize_charset(offer);
            supported
                .iter()
                .any(|name| normalize_charset(name) == normalized)
        })
        .map(String::as_str)
}
