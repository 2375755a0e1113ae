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

//! Status option (RFC 859).
//!
//! On SEND, the engine mirrors its negotiation table back as an IS payload
//! of `(WILL|DO) <option>` pairs covering the enabled sides. A received IS
//! is compared with the local view; disagreements are logged, never
//! renegotiated.

use crate::consts;
use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use crate::TelnetOption;
use bytes::BufMut;
use std::fmt::Formatter;

/// The verb half of one status pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusVerb {
    /// The reporting side performs the option
    Will,
    /// The reporting side does not perform the option
    Wont,
    /// The reporting side's peer performs the option
    Do,
    /// The reporting side's peer does not perform the option
    Dont,
}

impl StatusVerb {
    fn from_u8(byte: u8) -> CodecResult<Self> {
        match byte {
            consts::WILL => Ok(StatusVerb::Will),
            consts::WONT => Ok(StatusVerb::Wont),
            consts::DO => Ok(StatusVerb::Do),
            consts::DONT => Ok(StatusVerb::Dont),
            verb => Err(CodecError::SubnegotiationError {
                option: Some(consts::option::STATUS),
                reason: SubnegotiationErrorKind::InvalidVerb { verb },
            }),
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            StatusVerb::Will => consts::WILL,
            StatusVerb::Wont => consts::WONT,
            StatusVerb::Do => consts::DO,
            StatusVerb::Dont => consts::DONT,
        }
    }
}

impl std::fmt::Display for StatusVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusVerb::Will => write!(f, "WILL"),
            StatusVerb::Wont => write!(f, "WONT"),
            StatusVerb::Do => write!(f, "DO"),
            StatusVerb::Dont => write!(f, "DONT"),
        }
    }
}

/// A parsed STATUS subnegotiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusPayload {
    /// `SEND`: mirror your view of the negotiation back to me
    Send,
    /// `IS ...`: the sender's view, as verb/option pairs in sent order
    Is(Vec<(StatusVerb, TelnetOption)>),
}

impl StatusPayload {
    /// Parse a STATUS payload.
    pub fn parse(payload: &[u8]) -> CodecResult<Self> {
        let Some((&verb, rest)) = payload.split_first() else {
            return Err(CodecError::SubnegotiationError {
                option: Some(consts::option::STATUS),
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: 1,
                    available: 0,
                },
            });
        };
        match verb {
            consts::option::status::SEND => {
                if !rest.is_empty() {
                    return Err(CodecError::SubnegotiationError {
                        option: Some(consts::option::STATUS),
                        reason: SubnegotiationErrorKind::Other {
                            description: "SEND carries no data".into(),
                        },
                    });
                }
                Ok(StatusPayload::Send)
            }
            consts::option::status::IS => {
                if rest.len() % 2 != 0 {
                    return Err(CodecError::SubnegotiationError {
                        option: Some(consts::option::STATUS),
                        reason: SubnegotiationErrorKind::TruncatedRecord {
                            description: "odd number of bytes in IS pairs".into(),
                        },
                    });
                }
                let mut pairs = Vec::with_capacity(rest.len() / 2);
                for pair in rest.chunks_exact(2) {
                    pairs.push((StatusVerb::from_u8(pair[0])?, TelnetOption::from_u8(pair[1])));
                }
                Ok(StatusPayload::Is(pairs))
            }
            verb => Err(CodecError::SubnegotiationError {
                option: Some(consts::option::STATUS),
                reason: SubnegotiationErrorKind::InvalidCommand {
                    command: verb,
                    expected: Some(vec![
                        consts::option::status::IS,
                        consts::option::status::SEND,
                    ]),
                },
            }),
        }
    }

    /// Encode as payload bytes.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<()> {
        match self {
            StatusPayload::Send => dst.put_u8(consts::option::status::SEND),
            StatusPayload::Is(pairs) => {
                dst.put_u8(consts::option::status::IS);
                for (verb, option) in pairs {
                    dst.put_u8(verb.to_u8());
                    dst.put_u8(option.to_u8());
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for StatusPayload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusPayload::Send => write!(f, "StatusSend"),
            StatusPayload::Is(pairs) => write!(f, "StatusIs({} pairs)", pairs.len()),
        }
    }
}
