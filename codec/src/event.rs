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

use crate::args::TelnetSubnegotiation;
use crate::options::{TelnetOption, TelnetSide};
use bytes::BytesMut;

///
/// `TelnetEvent` represents user-facing events from the telnet engine.
/// Negotiation verbs never appear here: the engine answers those itself and
/// reports only the completed result as [`TelnetEvent::OptionStatus`].
/// Stream anomalies surface as events too, never as errors, so a misbehaving
/// peer cannot take the session down.
///
#[derive(Clone, Debug, PartialEq)]
pub enum TelnetEvent {
    /// Application data byte
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
    /// End of Record marker
    EndOfRecord,
    /// End of file (RFC 1184 extended command)
    EndOfFile,
    /// Suspend process (RFC 1184 extended command)
    Suspend,
    /// Abort process (RFC 1184 extended command)
    AbortProcess,
    /// An IAC command byte outside the known set; ignored upstream
    UnknownCommand(u8),
    /// A negotiation settled: `(option, side, enabled)`
    OptionStatus(TelnetOption, TelnetSide, bool),
    /// A parsed, validated subnegotiation from the peer
    Subnegotiation(TelnetSubnegotiation),
    /// A subnegotiation that was aborted or failed validation; the partial
    /// payload is carried for diagnostics and otherwise discarded
    MalformedSubnegotiation(TelnetOption, BytesMut),
    /// The peer completed a Timing Mark round trip
    TimingMarkReply,
    /// The peer requested or confirmed an orderly logout
    Logout,
    /// Remote flow control asked us to pause output
    PauseOutput,
    /// Remote flow control asked us to resume output
    ResumeOutput,
}
