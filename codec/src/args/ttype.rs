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

//! Terminal Type (RFC 1091).

use crate::consts;
use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use bytes::BufMut;

/// A TTYPE subnegotiation: the requesting side sends `SEND`, the terminal
/// side answers `IS <name>`. Repeated SENDs cycle through the terminal's
/// type list; a repeated name terminates the cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TtypeCommand {
    /// `IS <terminal-name>`: here is (one of) my terminal type(s)
    Is(String),
    /// `SEND`: send me your (next) terminal type
    Send,
}

impl TtypeCommand {
    /// Parse a TTYPE payload.
    pub fn parse(payload: &[u8]) -> CodecResult<Self> {
        let Some((&verb, rest)) = payload.split_first() else {
            return Err(CodecError::SubnegotiationError {
                option: Some(consts::option::TTYPE),
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: 1,
                    available: 0,
                },
            });
        };
        match verb {
            consts::option::ttype::SEND => {
                if !rest.is_empty() {
                    return Err(CodecError::SubnegotiationError {
                        option: Some(consts::option::TTYPE),
                        reason: SubnegotiationErrorKind::Other {
                            description: "SEND carries no data".into(),
                        },
                    });
                }
                Ok(TtypeCommand::Send)
            }
            consts::option::ttype::IS => {
                if !rest.is_ascii() {
                    return Err(CodecError::SubnegotiationError {
                        option: Some(consts::option::TTYPE),
                        reason: SubnegotiationErrorKind::NotAscii,
                    });
                }
                Ok(TtypeCommand::Is(
                    String::from_utf8_lossy(rest).into_owned(),
                ))
            }
            verb => Err(CodecError::SubnegotiationError {
                option: Some(consts::option::TTYPE),
                reason: SubnegotiationErrorKind::InvalidCommand {
                    command: verb,
                    expected: Some(vec![consts::option::ttype::IS, consts::option::ttype::SEND]),
                },
            }),
        }
    }

    /// Encode as payload bytes.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<()> {
        match self {
            TtypeCommand::Send => dst.put_u8(consts::option::ttype::SEND),
            TtypeCommand::Is(name) => {
                dst.put_u8(consts::option::ttype::IS);
                dst.put_slice(name.as_bytes());
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for TtypeCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TtypeCommand::Is(name) => write!(f, "TtypeIs({name})"),
            TtypeCommand::Send => write!(f, "TtypeSend"),
        }
    }
}
