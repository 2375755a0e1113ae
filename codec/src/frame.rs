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

use crate::TelnetOption;
use bytes::BytesMut;
use std::fmt::Formatter;

///
/// `TelnetFrame` is a single wire-level element of the telnet stream: one
/// data byte, one command, one negotiation verb, or one complete raw
/// subnegotiation. Frames carry exactly what travels on the wire; the
/// higher-level [`crate::TelnetEvent`] carries what it means.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetFrame {
    /// A single application data byte
    Data(u8),
    /// No Operation
    NoOperation,
    /// End of urgent data stream
    DataMark,
    /// Operator pressed the Break or Attention key
    Break,
    /// Interrupt current process
    InterruptProcess,
    /// Cancel output from the current process
    AbortOutput,
    /// Request acknowledgement
    AreYouThere,
    /// Erase the previous character
    EraseCharacter,
    /// Erase the previous line
    EraseLine,
    /// End of input for half-duplex connections
    GoAhead,
    /// End of Record marker (requires the EOR option)
    EndOfRecord,
    /// End of file in linemode (RFC 1184 extended command)
    EndOfFile,
    /// Suspend process in linemode (RFC 1184 extended command)
    Suspend,
    /// Abort process in linemode (RFC 1184 extended command)
    AbortProcess,
    /// Peer offers or confirms performing an option
    Will(TelnetOption),
    /// Peer refuses or stops performing an option
    Wont(TelnetOption),
    /// Peer asks us to perform an option
    Do(TelnetOption),
    /// Peer asks us to stop performing an option
    Dont(TelnetOption),
    /// Complete subnegotiation payload, IAC-unescaped
    Subnegotiate(TelnetOption, BytesMut),
    /// An IAC command byte outside the known set
    Unknown(u8),
}

impl TelnetFrame {
    /// Wire length of the encoded frame, for buffer reservation.
    pub fn encoded_len(&self) -> usize {
        match self {
            TelnetFrame::Data(_) => 2,
            TelnetFrame::Will(_)
            | TelnetFrame::Wont(_)
            | TelnetFrame::Do(_)
            | TelnetFrame::Dont(_) => 3,
            // Worst case: every payload byte is a doubled IAC.
            TelnetFrame::Subnegotiate(_, payload) => 5 + payload.len() * 2,
            _ => 2,
        }
    }
}

impl std::fmt::Display for TelnetFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetFrame::Data(byte) => write!(f, "Data(0x{byte:02X})"),
            TelnetFrame::NoOperation => write!(f, "NoOperation"),
            TelnetFrame::DataMark => write!(f, "DataMark"),
            TelnetFrame::Break => write!(f, "Break"),
            TelnetFrame::InterruptProcess => write!(f, "InterruptProcess"),
            TelnetFrame::AbortOutput => write!(f, "AbortOutput"),
            TelnetFrame::AreYouThere => write!(f, "AreYouThere"),
            TelnetFrame::EraseCharacter => write!(f, "EraseCharacter"),
            TelnetFrame::EraseLine => write!(f, "EraseLine"),
            TelnetFrame::GoAhead => write!(f, "GoAhead"),
            TelnetFrame::EndOfRecord => write!(f, "EndOfRecord"),
            TelnetFrame::EndOfFile => write!(f, "EndOfFile"),
            TelnetFrame::Suspend => write!(f, "Suspend"),
            TelnetFrame::AbortProcess => write!(f, "AbortProcess"),
            TelnetFrame::Will(option) => write!(f, "Will({option})"),
            TelnetFrame::Wont(option) => write!(f, "Wont({option})"),
            TelnetFrame::Do(option) => write!(f, "Do({option})"),
            TelnetFrame::Dont(option) => write!(f, "Dont({option})"),
            TelnetFrame::Subnegotiate(option, payload) => {
                write!(f, "Subnegotiate({option}, {} bytes)", payload.len())
            }
            TelnetFrame::Unknown(byte) => write!(f, "Unknown(0x{byte:02X})"),
        }
    }
}
