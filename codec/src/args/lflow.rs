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

//! Remote Flow Control (RFC 1372).

use crate::consts;
use crate::consts::option::lflow;
use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use bytes::BufMut;

/// One LFLOW subnegotiation: switches flow control on or off, or selects
/// which bytes may restart paused output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlowLevel {
    /// Flow control disabled
    Off,
    /// Flow control enabled
    On,
    /// Any received byte restarts paused output
    RestartAny,
    /// Only XON restarts paused output
    RestartXon,
}

impl FlowLevel {
    /// Parse an LFLOW payload: exactly one level byte.
    pub fn parse(payload: &[u8]) -> CodecResult<Self> {
        let level = match payload {
            [byte] => *byte,
            _ => {
                return Err(CodecError::SubnegotiationError {
                    option: Some(consts::option::LFLOW),
                    reason: SubnegotiationErrorKind::InvalidLength {
                        required: 1,
                        received: payload.len(),
                    },
                });
            }
        };
        match level {
            lflow::OFF => Ok(FlowLevel::Off),
            lflow::ON => Ok(FlowLevel::On),
            lflow::RESTART_ANY => Ok(FlowLevel::RestartAny),
            lflow::RESTART_XON => Ok(FlowLevel::RestartXon),
            byte => Err(CodecError::SubnegotiationError {
                option: Some(consts::option::LFLOW),
                reason: SubnegotiationErrorKind::InvalidCommand {
                    command: byte,
                    expected: Some(vec![
                        lflow::OFF,
                        lflow::ON,
                        lflow::RESTART_ANY,
                        lflow::RESTART_XON,
                    ]),
                },
            }),
        }
    }

    /// Encode as the single level byte.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<()> {
        dst.put_u8(match self {
            FlowLevel::Off => lflow::OFF,
            FlowLevel::On => lflow::ON,
            FlowLevel::RestartAny => lflow::RESTART_ANY,
            FlowLevel::RestartXon => lflow::RESTART_XON,
        });
        Ok(())
    }
}

impl std::fmt::Display for FlowLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowLevel::Off => write!(f, "Off"),
            FlowLevel::On => write!(f, "On"),
            FlowLevel::RestartAny => write!(f, "RestartAny"),
            FlowLevel::RestartXon => write!(f, "RestartXon"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn parse_all_levels() {
        assert_eq!(FlowLevel::parse(&[0]).unwrap(), FlowLevel::Off);
        assert_eq!(FlowLevel::parse(&[1]).unwrap(), FlowLevel::On);
        assert_eq!(FlowLevel::parse(&[2]).unwrap(), FlowLevel::RestartAny);
        assert_eq!(FlowLevel::parse(&[3]).unwrap(), FlowLevel::RestartXon);
    }

    #[test]
    fn parse_rejects_bad_level_and_length() {
        assert!(FlowLevel::parse(&[9]).is_err());
        assert!(FlowLevel::parse(&[]).is_err());
        assert!(FlowLevel::parse(&[1, 2]).is_err());
    }

    #[test]
    fn encode_round_trips() {
        for level in [
            FlowLevel::Off,
            FlowLevel::On,
            FlowLevel::RestartAny,
            FlowLevel::RestartXon,
        ] {
            let mut dst = BytesMut::new();
            level.encode(&mut dst).unwrap();
            assert_eq!(FlowLevel::parse(&dst).unwrap(), level);
        }
    }
}
