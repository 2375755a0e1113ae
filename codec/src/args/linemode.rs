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

//! Linemode option subnegotiations (RFC 1184): MODE, FORWARDMASK and SLC.

use crate::consts;
use crate::consts::option::linemode;
use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use crate::slc::{SlcFlags, SlcFunction, SlcTriple};
use bytes::BufMut;
use std::fmt::Formatter;

/// The MODE flag byte, unpacked.
///
/// A proposal travels without the ACK bit; the receiver echoes it back with
/// ACK set, and only then is the mode in effect.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LinemodeMode {
    /// Client performs line editing locally
    pub edit: bool,
    /// Client traps signals (IP, SUSP, ...) locally
    pub trapsig: bool,
    /// Client expands horizontal tabs itself
    pub soft_tab: bool,
    /// Non-printable characters are echoed literally
    pub lit_echo: bool,
    /// This mode byte acknowledges the peer's proposal
    pub ack: bool,
}

impl LinemodeMode {
    /// Decode a wire MODE byte.
    pub fn from_u8(byte: u8) -> Self {
        LinemodeMode {
            edit: byte & linemode::MODE_EDIT != 0,
            trapsig: byte & linemode::MODE_TRAPSIG != 0,
            soft_tab: byte & linemode::MODE_SOFT_TAB != 0,
            lit_echo: byte & linemode::MODE_LIT_ECHO != 0,
            ack: byte & linemode::MODE_ACK != 0,
        }
    }

    /// Encode to a wire MODE byte.
    pub fn to_u8(self) -> u8 {
        let mut byte = 0u8;
        if self.edit {
            byte |= linemode::MODE_EDIT;
        }
        if self.trapsig {
            byte |= linemode::MODE_TRAPSIG;
        }
        if self.soft_tab {
            byte |= linemode::MODE_SOFT_TAB;
        }
        if self.lit_echo {
            byte |= linemode::MODE_LIT_ECHO;
        }
        if self.ack {
            byte |= linemode::MODE_ACK;
        }
        byte
    }

    /// The same mode with the ACK bit set, for answering a proposal.
    pub fn acked(mut self) -> Self {
        self.ack = true;
        self
    }

    /// Mode equality with the ACK bit masked out, the comparison the
    /// acknowledgement protocol is defined over.
    pub fn same_flags(self, other: LinemodeMode) -> bool {
        self.to_u8() | linemode::MODE_ACK == other.to_u8() | linemode::MODE_ACK
    }
}

impl std::fmt::Display for LinemodeMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut flags = Vec::new();
        if self.edit {
            flags.push("EDIT");
        }
        if self.trapsig {
            flags.push("TRAPSIG");
        }
        if self.soft_tab {
            flags.push("SOFT_TAB");
        }
        if self.lit_echo {
            flags.push("LIT_ECHO");
        }
        if self.ack {
            flags.push("ACK");
        }
        write!(f, "Mode({})", flags.join("|"))
    }
}

/// A FORWARDMASK bitmask: one bit per 8-bit input byte, set when that byte
/// should cause the client to forward its buffered input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ForwardMask {
    /// The raw 32-byte mask as received
    pub mask: [u8; 32],
}

impl ForwardMask {
    /// True if the mask covers `byte`.
    pub fn contains(&self, byte: u8) -> bool {
        self.mask[byte as usize / 8] & (0x80 >> (byte % 8)) != 0
    }
}

impl Default for ForwardMask {
    fn default() -> Self {
        ForwardMask { mask: [0; 32] }
    }
}

/// The forwardmask half of the LINEMODE protocol travels prefixed with a
/// negotiation verb: `DO FORWARDMASK <mask>` sets it, `DONT FORWARDMASK`
/// clears it, and `WILL`/`WONT FORWARDMASK` answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForwardMaskCommand {
    /// `DO FORWARDMASK <32 bytes>`: adopt this mask
    Set(ForwardMask),
    /// `DONT FORWARDMASK`: stop forwarding on mask characters
    Clear,
    /// `WILL FORWARDMASK` / `WONT FORWARDMASK`: the peer's answer
    Ack(bool),
}

/// A parsed LINEMODE subnegotiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinemodeCommand {
    /// `MODE <flags>`
    Mode(LinemodeMode),
    /// The FORWARDMASK sub-protocol
    ForwardMask(ForwardMaskCommand),
    /// `SLC <triples>`
    Slc(Vec<SlcTriple>),
}

impl LinemodeCommand {
    /// Parse a LINEMODE payload.
    pub fn parse(payload: &[u8]) -> CodecResult<Self> {
        let Some((&subcommand, rest)) = payload.split_first() else {
            return Err(linemode_error(SubnegotiationErrorKind::InsufficientData {
                required: 1,
                available: 0,
            }));
        };
        match subcommand {
            linemode::MODE => {
                let [mask] = rest else {
                    return Err(linemode_error(SubnegotiationErrorKind::InvalidLength {
                        required: 1,
                        received: rest.len(),
                    }));
                };
                Ok(LinemodeCommand::Mode(LinemodeMode::from_u8(*mask)))
            }
            linemode::SLC => {
                if rest.is_empty() || rest.len() % 3 != 0 {
                    return Err(linemode_error(SubnegotiationErrorKind::TruncatedRecord {
                        description: format!("SLC data of {} bytes is not triples", rest.len()),
                    }));
                }
                let triples = rest
                    .chunks_exact(3)
                    .map(|chunk| SlcTriple {
                        function: SlcFunction::from_u8(chunk[0]),
                        flags: SlcFlags::from_u8(chunk[1]),
                        value: chunk[2],
                    })
                    .collect();
                Ok(LinemodeCommand::Slc(triples))
            }
            // FORWARDMASK normally arrives behind a DO/DONT/WILL/WONT
            // verb, but a bare mask is tolerated too.
            linemode::FORWARDMASK => {
                if rest.len() != 32 {
                    return Err(linemode_error(SubnegotiationErrorKind::InvalidLength {
                        required: 32,
                        received: rest.len(),
                    }));
                }
                let mut mask = [0u8; 32];
                mask.copy_from_slice(rest);
                Ok(LinemodeCommand::ForwardMask(ForwardMaskCommand::Set(
                    ForwardMask { mask },
                )))
            }
            consts::DO => parse_forwardmask_body(rest).map(|mask| {
                LinemodeCommand::ForwardMask(ForwardMaskCommand::Set(mask))
            }),
            consts::DONT => match rest {
                [linemode::FORWARDMASK] => {
                    Ok(LinemodeCommand::ForwardMask(ForwardMaskCommand::Clear))
                }
                _ => Err(linemode_error(SubnegotiationErrorKind::TruncatedRecord {
                    description: "DONT must carry only FORWARDMASK".into(),
                })),
            },
            consts::WILL | consts::WONT => match rest {
                [linemode::FORWARDMASK] => Ok(LinemodeCommand::ForwardMask(
                    ForwardMaskCommand::Ack(subcommand == consts::WILL),
                )),
                _ => Err(linemode_error(SubnegotiationErrorKind::TruncatedRecord {
                    description: "WILL/WONT must carry only FORWARDMASK".into(),
                })),
            },
            subcommand => Err(linemode_error(SubnegotiationErrorKind::InvalidCommand {
                command: subcommand,
                expected: Some(vec![linemode::MODE, linemode::FORWARDMASK, linemode::SLC]),
            })),
        }
    }

    /// Encode as payload bytes.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<()> {
        match self {
            LinemodeCommand::Mode(mode) => {
                dst.put_u8(linemode::MODE);
                dst.put_u8(mode.to_u8());
            }
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Set(forward)) => {
                dst.put_u8(consts::DO);
                dst.put_u8(linemode::FORWARDMASK);
                dst.put_slice(&forward.mask);
            }
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Clear) => {
                dst.put_u8(consts::DONT);
                dst.put_u8(linemode::FORWARDMASK);
            }
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Ack(willing)) => {
                dst.put_u8(if *willing { consts::WILL } else { consts::WONT });
                dst.put_u8(linemode::FORWARDMASK);
            }
            LinemodeCommand::Slc(triples) => {
                dst.put_u8(linemode::SLC);
                for triple in triples {
                    dst.put_u8(triple.function.to_u8());
                    dst.put_u8(triple.flags.to_u8());
                    dst.put_u8(triple.value);
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for LinemodeCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LinemodeCommand::Mode(mode) => write!(f, "Linemode{mode}"),
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Set(_)) => {
                write!(f, "LinemodeForwardMask(set)")
            }
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Clear) => {
                write!(f, "LinemodeForwardMask(clear)")
            }
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Ack(willing)) => {
                write!(f, "LinemodeForwardMask(ack={willing})")
            }
            LinemodeCommand::Slc(triples) => write!(f, "LinemodeSlc({} triples)", triples.len()),
        }
    }
}

fn linemode_error(reason: SubnegotiationErrorKind) -> CodecError {
    CodecError::SubnegotiationError {
        option: Some(consts::option::LINEMODE),
        reason,
    }
}

fn parse_forwardmask_body(rest: &[u8]) -> CodecResult<ForwardMask> {
    let Some((&linemode::FORWARDMASK, body)) = rest.split_first() else {
        return Err(linemode_error(SubnegotiationErrorKind::TruncatedRecord {
            description: "verb without FORWARDMASK subcommand".into(),
        }));
    };
    if body.len() != 32 {
        return Err(linemode_error(SubnegotiationErrorKind::InvalidLength {
            required: 32,
            received: body.len(),
        }));
    }
    let mut mask = [0u8; 32];
    mask.copy_from_slice(body);
    Ok(ForwardMask { mask })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slc::SlcLevel;
    use bytes::BytesMut;

    #[test]
    fn mode_byte_round_trip() {
        let mode = LinemodeMode::from_u8(0x03);
        assert!(mode.edit && mode.trapsig);
        assert!(!mode.ack);
        assert_eq!(mode.to_u8(), 0x03);
        assert_eq!(mode.acked().to_u8(), 0x83);
    }

    #[test]
    fn mode_comparison_ignores_ack() {
        let proposed = LinemodeMode::from_u8(0x03);
        let answered = LinemodeMode::from_u8(0x83);
        assert!(proposed.same_flags(answered));
        assert!(!proposed.same_flags(LinemodeMode::from_u8(0x01)));
    }

    #[test]
    fn parse_mode() {
        assert_eq!(
            LinemodeCommand::parse(&[1, 0x03]).unwrap(),
            LinemodeCommand::Mode(LinemodeMode {
                edit: true,
                trapsig: true,
                ..Default::default()
            })
        );
    }

    #[test]
    fn parse_mode_rejects_missing_flag_byte() {
        assert!(LinemodeCommand::parse(&[1]).is_err());
        assert!(LinemodeCommand::parse(&[1, 2, 3]).is_err());
    }

    #[test]
    fn parse_slc_triples() {
        let payload = [3u8, 3, 0x62, 0x03, 8, 0x02, 0x04];
        let LinemodeCommand::Slc(triples) = LinemodeCommand::parse(&payload).unwrap() else {
            panic!("expected SLC");
        };
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].function, SlcFunction::InterruptProcess);
        assert_eq!(triples[0].flags.level, SlcLevel::Variable);
        assert!(triples[0].flags.flush_in && triples[0].flags.flush_out);
        assert_eq!(triples[0].value, 0x03);
        assert_eq!(triples[1].function, SlcFunction::EndOfFile);
        assert_eq!(triples[1].value, 0x04);
    }

    #[test]
    fn parse_slc_rejects_partial_triples() {
        assert!(LinemodeCommand::parse(&[3, 3, 0x62]).is_err());
        assert!(LinemodeCommand::parse(&[3]).is_err());
    }

    #[test]
    fn parse_do_forwardmask() {
        let mut payload = vec![consts::DO, 2];
        payload.extend_from_slice(&[0xFF; 32]);
        let LinemodeCommand::ForwardMask(ForwardMaskCommand::Set(mask)) =
            LinemodeCommand::parse(&payload).unwrap()
        else {
            panic!("expected forwardmask set");
        };
        assert!(mask.contains(b'a'));
        assert!(mask.contains(0));
    }

    #[test]
    fn parse_forwardmask_rejects_short_mask() {
        let mut payload = vec![consts::DO, 2];
        payload.extend_from_slice(&[0xFF; 16]);
        assert!(LinemodeCommand::parse(&payload).is_err());
    }

    #[test]
    fn parse_dont_forwardmask() {
        assert_eq!(
            LinemodeCommand::parse(&[consts::DONT, 2]).unwrap(),
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Clear)
        );
    }

    #[test]
    fn forwardmask_bit_addressing() {
        let mut mask = [0u8; 32];
        mask[b'\r' as usize / 8] = 0x80 >> (b'\r' % 8);
        let forward = ForwardMask { mask };
        assert!(forward.contains(b'\r'));
        assert!(!forward.contains(b'\n'));
    }

    #[test]
    fn encode_round_trips() {
        let commands = [
            LinemodeCommand::Mode(LinemodeMode::from_u8(0x83)),
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Clear),
            LinemodeCommand::Slc(vec![SlcTriple {
                function: SlcFunction::Xoff,
                flags: SlcFlags::level(SlcLevel::Variable),
                value: 0x13,
            }]),
        ];
        for command in commands {
            let mut dst = BytesMut::new();
            command.encode(&mut dst).unwrap();
            assert_eq!(LinemodeCommand::parse(&dst).unwrap(), command);
        }
    }
}
