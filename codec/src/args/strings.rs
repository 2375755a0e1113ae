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

//! String-valued option exchanges: TSPEED (RFC 1079), XDISPLOC (RFC 1096)
//! and SNDLOC (RFC 779).
//!
//! TSPEED and XDISPLOC share the IS/SEND verb shape with an ASCII string
//! payload; SNDLOC is a bare location string with no verb.

use crate::consts;
use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use bytes::BufMut;

/// An IS/SEND exchange carrying an ASCII string, as used by TSPEED and
/// XDISPLOC. For TSPEED the string is `rx,tx` in decimal;
/// [`StringCommand::parse_speeds`] extracts the pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StringCommand {
    /// `IS <text>`: here is my value
    Is(String),
    /// `SEND`: send me your value
    Send,
}

impl StringCommand {
    /// Parse an IS/SEND payload for `option` (used in diagnostics).
    pub fn parse(option: u8, payload: &[u8]) -> CodecResult<Self> {
        let Some((&verb, rest)) = payload.split_first() else {
            return Err(CodecError::SubnegotiationError {
                option: Some(option),
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: 1,
                    available: 0,
                },
            });
        };
        // IS and SEND share their byte values across these options.
        match verb {
            consts::option::tspeed::SEND => {
                if !rest.is_empty() {
                    return Err(CodecError::SubnegotiationError {
                        option: Some(option),
                        reason: SubnegotiationErrorKind::Other {
                            description: "SEND carries no data".into(),
                        },
                    });
                }
                Ok(StringCommand::Send)
            }
            consts::option::tspeed::IS => {
                if !rest.is_ascii() {
                    return Err(CodecError::SubnegotiationError {
                        option: Some(option),
                        reason: SubnegotiationErrorKind::NotAscii,
                    });
                }
                Ok(StringCommand::Is(String::from_utf8_lossy(rest).into_owned()))
            }
            verb => Err(CodecError::SubnegotiationError {
                option: Some(option),
                reason: SubnegotiationErrorKind::InvalidCommand {
                    command: verb,
                    expected: Some(vec![consts::option::tspeed::IS, consts::option::tspeed::SEND]),
                },
            }),
        }
    }

    /// Encode as payload bytes.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<()> {
        match self {
            StringCommand::Send => dst.put_u8(consts::option::tspeed::SEND),
            StringCommand::Is(text) => {
                dst.put_u8(consts::option::tspeed::IS);
                dst.put_slice(text.as_bytes());
            }
        }
        Ok(())
    }

    /// For a TSPEED `IS rx,tx` value, the `(rx, tx)` pair.
    pub fn parse_speeds(&self) -> Option<(u32, u32)> {
        let StringCommand::Is(text) = self else {
            return None;
        };
        let (rx, tx) = text.split_once(',')?;
        Some((rx.trim().parse().ok()?, tx.trim().parse().ok()?))
    }
}

impl std::fmt::Display for StringCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StringCommand::Is(text) => write!(f, "Is({text})"),
            StringCommand::Send => write!(f, "Send"),
        }
    }
}

/// A SNDLOC payload: the sender's location as a bare ASCII string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendLocation(pub String);

impl SendLocation {
    /// Parse a SNDLOC payload.
    pub fn parse(payload: &[u8]) -> CodecResult<Self> {
        if !payload.is_ascii() {
            return Err(CodecError::SubnegotiationError {
                option: Some(consts::option::SNDLOC),
                reason: SubnegotiationErrorKind::NotAscii,
            });
        }
        Ok(SendLocation(String::from_utf8_lossy(payload).into_owned()))
    }

    /// Encode as payload bytes.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<()> {
        dst.put_slice(self.0.as_bytes());
        Ok(())
    }
}

impl std::fmt::Display for SendLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SendLocation({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn tspeed_is_round_trip() {
        let cmd = StringCommand::parse(consts::option::TSPEED, b"\x0038400,38400").unwrap();
        assert_eq!(cmd, StringCommand::Is("38400,38400".into()));
        assert_eq!(cmd.parse_speeds(), Some((38400, 38400)));
        let mut dst = BytesMut::new();
        cmd.encode(&mut dst).unwrap();
        assert_eq!(&dst[..], b"\x0038400,38400");
    }

    #[test]
    fn tspeed_malformed_pair_is_none() {
        let cmd = StringCommand::Is("fast".into());
        assert_eq!(cmd.parse_speeds(), None);
    }

    #[test]
    fn xdisploc_is() {
        let cmd = StringCommand::parse(consts::option::XDISPLOC, b"\x00unix:0.0").unwrap();
        assert_eq!(cmd, StringCommand::Is("unix:0.0".into()));
    }

    #[test]
    fn send_verb() {
        let cmd = StringCommand::parse(consts::option::TSPEED, &[1]).unwrap();
        assert_eq!(cmd, StringCommand::Send);
    }

    #[test]
    fn sndloc_is_verbless() {
        let loc = SendLocation::parse(b"Machine Room").unwrap();
        assert_eq!(loc, SendLocation("Machine Room".into()));
    }

    #[test]
    fn non_ascii_is_rejected() {
        assert!(StringCommand::parse(consts::option::TSPEED, &[0, 0xC3, 0xA9]).is_err());
        assert!(SendLocation::parse(&[0xFE]).is_err());
    }
}
