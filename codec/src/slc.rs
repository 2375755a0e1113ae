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

//! Special Line Characters for the Linemode option (RFC 1184).
//!
//! An SLC table binds editing functions (interrupt, erase-character,
//! erase-line, ...) to keyboard byte values. Each binding carries a support
//! level and flush/ack flags, and is negotiated triple-by-triple inside
//! `IAC SB LINEMODE SLC ... IAC SE`.

use std::fmt::Formatter;

/// The keyboard value meaning "this function is disabled" (POSIX _VDISABLE).
pub const VDISABLE: u8 = 0xFF;

/// Number of SLC functions this engine tracks (SYNCH through FORW2).
pub const SLC_COUNT: usize = 18;

/// An editing function bound through the SLC table.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum SlcFunction {
    /// Synchronize (out-of-band attention)
    Synch,
    /// Break key
    Break,
    /// Interrupt process (typically ^C)
    InterruptProcess,
    /// Abort output (typically ^O)
    AbortOutput,
    /// Are you there (typically ^T)
    AreYouThere,
    /// End of record
    EndOfRecord,
    /// Abort process (typically ^\)
    Abort,
    /// End of file (typically ^D)
    EndOfFile,
    /// Suspend process (typically ^Z)
    Suspend,
    /// Erase character (typically DEL)
    EraseCharacter,
    /// Erase line (typically ^U)
    EraseLine,
    /// Erase word (typically ^W)
    EraseWord,
    /// Repaint line (typically ^R)
    Repaint,
    /// Literal next (typically ^V)
    LiteralNext,
    /// Resume output (typically ^Q)
    Xon,
    /// Pause output (typically ^S)
    Xoff,
    /// First forwarding character
    Forward1,
    /// Second forwarding character
    Forward2,
    /// A function byte outside the tracked set
    Unknown(u8),
}

impl SlcFunction {
    /// Wire byte of this function.
    pub fn to_u8(&self) -> u8 {
        match self {
            SlcFunction::Synch => 1,
            SlcFunction::Break => 2,
            SlcFunction::InterruptProcess => 3,
            SlcFunction::AbortOutput => 4,
            SlcFunction::AreYouThere => 5,
            SlcFunction::EndOfRecord => 6,
            SlcFunction::Abort => 7,
            SlcFunction::EndOfFile => 8,
            SlcFunction::Suspend => 9,
            SlcFunction::EraseCharacter => 10,
            SlcFunction::EraseLine => 11,
            SlcFunction::EraseWord => 12,
            SlcFunction::Repaint => 13,
            SlcFunction::LiteralNext => 14,
            SlcFunction::Xon => 15,
            SlcFunction::Xoff => 16,
            SlcFunction::Forward1 => 17,
            SlcFunction::Forward2 => 18,
            SlcFunction::Unknown(byte) => *byte,
        }
    }

    /// Function for a wire byte.
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            1 => SlcFunction::Synch,
            2 => SlcFunction::Break,
            3 => SlcFunction::InterruptProcess,
            4 => SlcFunction::AbortOutput,
            5 => SlcFunction::AreYouThere,
            6 => SlcFunction::EndOfRecord,
            7 => SlcFunction::Abort,
            8 => SlcFunction::EndOfFile,
            9 => SlcFunction::Suspend,
            10 => SlcFunction::EraseCharacter,
            11 => SlcFunction::EraseLine,
            12 => SlcFunction::EraseWord,
            13 => SlcFunction::Repaint,
            14 => SlcFunction::LiteralNext,
            15 => SlcFunction::Xon,
            16 => SlcFunction::Xoff,
            17 => SlcFunction::Forward1,
            18 => SlcFunction::Forward2,
            byte => SlcFunction::Unknown(byte),
        }
    }

    fn index(self) -> Option<usize> {
        let byte = self.to_u8();
        (1..=SLC_COUNT as u8)
            .contains(&byte)
            .then(|| byte as usize - 1)
    }
}

impl std::fmt::Display for SlcFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SlcFunction::Unknown(byte) => write!(f, "SlcUnknown({byte})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Support level carried in the low two bits of an SLC flag byte.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum SlcLevel {
    /// The function is not supported at all.
    #[default]
    NoSupport,
    /// The binding exists and cannot be changed.
    CantChange,
    /// The binding exists and the peer may change it.
    Variable,
    /// The binding follows the system default.
    Default,
}

impl SlcLevel {
    /// Level from the low two bits of a flag byte.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => SlcLevel::NoSupport,
            1 => SlcLevel::CantChange,
            2 => SlcLevel::Variable,
            _ => SlcLevel::Default,
        }
    }

    /// The low two bits of the flag byte.
    pub fn to_bits(self) -> u8 {
        match self {
            SlcLevel::NoSupport => 0,
            SlcLevel::CantChange => 1,
            SlcLevel::Variable => 2,
            SlcLevel::Default => 3,
        }
    }
}

/// The full flag byte of one SLC triple: level plus FLUSHIN/FLUSHOUT/ACK.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SlcFlags {
    /// Support level (low two bits)
    pub level: SlcLevel,
    /// Discard pending input when the function fires (bit 6)
    pub flush_in: bool,
    /// Discard pending output when the function fires (bit 5)
    pub flush_out: bool,
    /// This triple acknowledges the peer's proposal (bit 7)
    pub ack: bool,
}

impl SlcFlags {
    const FLUSHOUT: u8 = 0x20;
    const FLUSHIN: u8 = 0x40;
    const ACK: u8 = 0x80;

    /// Flags with the given level and no modifier bits.
    pub fn level(level: SlcLevel) -> Self {
        SlcFlags {
            level,
            ..Default::default()
        }
    }

    /// Decode a wire flag byte.
    pub fn from_u8(byte: u8) -> Self {
        SlcFlags {
            level: SlcLevel::from_bits(byte),
            flush_in: byte & Self::FLUSHIN != 0,
            flush_out: byte & Self::FLUSHOUT != 0,
            ack: byte & Self::ACK != 0,
        }
    }

    /// Encode to a wire flag byte.
    pub fn to_u8(self) -> u8 {
        let mut byte = self.level.to_bits();
        if self.flush_in {
            byte |= Self::FLUSHIN;
        }
        if self.flush_out {
            byte |= Self::FLUSHOUT;
        }
        if self.ack {
            byte |= Self::ACK;
        }
        byte
    }

    /// The same flags with the ACK bit set.
    pub fn acked(mut self) -> Self {
        self.ack = true;
        self
    }
}

/// One `(function, flags, value)` triple as carried in an SLC subnegotiation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SlcTriple {
    /// The editing function being bound
    pub function: SlcFunction,
    /// Level and modifier flags
    pub flags: SlcFlags,
    /// The keyboard byte bound to the function
    pub value: u8,
}

/// One slot of the SLC table.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SlcEntry {
    /// Level and modifier flags currently in effect
    pub flags: SlcFlags,
    /// The keyboard byte currently bound
    pub value: u8,
}

impl SlcEntry {
    fn new(level: SlcLevel, flush_in: bool, flush_out: bool, value: u8) -> Self {
        SlcEntry {
            flags: SlcFlags {
                level,
                flush_in,
                flush_out,
                ack: false,
            },
            value,
        }
    }

    fn nosupport() -> Self {
        SlcEntry {
            flags: SlcFlags::level(SlcLevel::NoSupport),
            value: VDISABLE,
        }
    }
}

/// The per-connection SLC table: one entry per tracked function, seeded from
/// the BSD `ttydefaults.h` values and mutated only by negotiation or by
/// explicit application override.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlcTable {
    entries: [SlcEntry; SLC_COUNT],
    defaults: [SlcEntry; SLC_COUNT],
}

impl Default for SlcTable {
    fn default() -> Self {
        let defaults = Self::bsd_defaults();
        SlcTable {
            entries: defaults,
            defaults,
        }
    }
}

impl SlcTable {
    /// The BSD default bindings. Functions with no default value are carried
    /// at DEFAULT level with value 0; FORW1/FORW2 are unsupported.
    fn bsd_defaults() -> [SlcEntry; SLC_COUNT] {
        let mut table = [SlcEntry::nosupport(); SLC_COUNT];
        let mut set = |function: SlcFunction, entry: SlcEntry| {
            table[function.index().expect("tracked function")] = entry;
        };
        set(
            SlcFunction::EndOfFile,
            SlcEntry::new(SlcLevel::Variable, false, false, 0x04), // ^D VEOF
        );
        set(
            SlcFunction::EraseCharacter,
            SlcEntry::new(SlcLevel::Variable, false, false, 0x7F), // DEL VERASE
        );
        set(
            SlcFunction::EraseLine,
            SlcEntry::new(SlcLevel::Variable, false, false, 0x15), // ^U VKILL
        );
        set(
            SlcFunction::InterruptProcess,
            SlcEntry::new(SlcLevel::Variable, true, true, 0x03), // ^C VINTR
        );
        set(
            SlcFunction::Abort,
            SlcEntry::new(SlcLevel::Variable, true, true, 0x1C), // ^\ VQUIT
        );
        set(
            SlcFunction::Xon,
            SlcEntry::new(SlcLevel::Variable, false, false, 0x11), // ^Q VSTART
        );
        set(
            SlcFunction::Xoff,
            SlcEntry::new(SlcLevel::Variable, false, false, 0x13), // ^S VSTOP
        );
        set(
            SlcFunction::EraseWord,
            SlcEntry::new(SlcLevel::Variable, false, false, 0x17), // ^W VWERASE
        );
        set(
            SlcFunction::Repaint,
            SlcEntry::new(SlcLevel::Variable, false, false, 0x12), // ^R VREPRINT
        );
        set(
            SlcFunction::LiteralNext,
            SlcEntry::new(SlcLevel::Variable, false, false, 0x16), // ^V VLNEXT
        );
        set(
            SlcFunction::AbortOutput,
            SlcEntry::new(SlcLevel::Variable, false, true, 0x0F), // ^O VDISCARD
        );
        set(
            SlcFunction::Suspend,
            SlcEntry::new(SlcLevel::Variable, true, false, 0x1A), // ^Z VSUSP
        );
        set(
            SlcFunction::AreYouThere,
            SlcEntry::new(SlcLevel::Variable, false, false, 0x14), // ^T VSTATUS
        );
        set(
            SlcFunction::Break,
            SlcEntry::new(SlcLevel::Default, false, false, 0),
        );
        set(
            SlcFunction::Synch,
            SlcEntry::new(SlcLevel::Default, false, false, 0),
        );
        set(
            SlcFunction::EndOfRecord,
            SlcEntry::new(SlcLevel::Default, false, false, 0),
        );
        table
    }

    /// A table with every slot at the given entries, for application
    /// overrides of the seed table.
    pub fn with_overrides(overrides: &[(SlcFunction, SlcLevel, u8)]) -> Self {
        let mut table = Self::default();
        for (function, level, value) in overrides {
            if let Some(idx) = function.index() {
                table.entries[idx] = SlcEntry {
                    flags: SlcFlags::level(*level),
                    value: *value,
                };
                table.defaults[idx] = table.entries[idx];
            }
        }
        table
    }

    /// Current entry for a function; `None` for untracked functions.
    pub fn get(&self, function: SlcFunction) -> Option<SlcEntry> {
        function.index().map(|idx| self.entries[idx])
    }

    /// The function bound to `byte`, if any. NUL and VDISABLE never match.
    pub fn function_for(&self, byte: u8) -> Option<SlcFunction> {
        if byte == 0 {
            return None;
        }
        self.entries.iter().enumerate().find_map(|(idx, entry)| {
            (entry.value == byte
                && entry.value != VDISABLE
                && entry.flags.level != SlcLevel::NoSupport)
                .then(|| SlcFunction::from_u8(idx as u8 + 1))
        })
    }

    /// Rebind a function locally. Raising a NOSUPPORT entry is forbidden.
    pub fn set_local(&mut self, function: SlcFunction, value: u8) -> bool {
        let Some(idx) = function.index() else {
            return false;
        };
        if self.entries[idx].flags.level == SlcLevel::NoSupport {
            return false;
        }
        self.entries[idx].value = value;
        true
    }

    /// All tracked entries as triples, for exporting our table to the peer.
    pub fn export(&self) -> Vec<SlcTriple> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| SlcTriple {
                function: SlcFunction::from_u8(idx as u8 + 1),
                flags: entry.flags,
                value: entry.value,
            })
            .collect()
    }

    /// Negotiate one incoming triple, returning the triple to send back, if
    /// any.
    ///
    /// Rules, per triple:
    /// - peer ACK: accept the peer's value verbatim, send nothing back
    /// - peer NOSUPPORT: clear our entry, send nothing back
    /// - our level higher: answer with our own definition, marked ACK
    /// - our level lower: adopt the peer's definition, echo it back ACKed
    /// - levels equal: same value is adopted and echoed ACKed; differing
    ///   values fall back to our default binding, answered ACKed
    pub fn negotiate(&mut self, triple: SlcTriple) -> Option<SlcTriple> {
        let idx = triple.function.index()?;
        if triple.flags.ack {
            self.entries[idx] = SlcEntry {
                flags: SlcFlags {
                    ack: false,
                    ..triple.flags
                },
                value: triple.value,
            };
            return None;
        }
        if triple.flags.level == SlcLevel::NoSupport {
            self.entries[idx] = SlcEntry::nosupport();
            return None;
        }
        let ours = self.entries[idx];
        match ours.flags.level.cmp(&triple.flags.level) {
            std::cmp::Ordering::Greater => Some(SlcTriple {
                function: triple.function,
                flags: ours.flags.acked(),
                value: ours.value,
            }),
            std::cmp::Ordering::Less => {
                self.entries[idx] = SlcEntry {
                    flags: SlcFlags {
                        ack: false,
                        ..triple.flags
                    },
                    value: triple.value,
                };
                Some(SlcTriple {
                    function: triple.function,
                    flags: triple.flags.acked(),
                    value: triple.value,
                })
            }
            std::cmp::Ordering::Equal => {
                if ours.value == triple.value {
                    Some(SlcTriple {
                        function: triple.function,
                        flags: triple.flags.acked(),
                        value: triple.value,
                    })
                } else {
                    let fallback = self.defaults[idx];
                    self.entries[idx] = fallback;
                    Some(SlcTriple {
                        function: triple.function,
                        flags: fallback.flags.acked(),
                        value: fallback.value,
                    })
                }
            }
        }
    }
}
