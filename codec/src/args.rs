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

use crate::result::CodecResult;
use crate::{TelnetOption, consts};
use bytes::{BufMut, BytesMut};
use std::fmt::Formatter;

pub mod charset;
pub mod environ;
pub mod lflow;
pub mod linemode;
pub mod naws;
pub mod status;
pub mod strings;
pub mod ttype;

use self::charset::CharsetCommand;
use self::environ::EnvironCommand;
use self::lflow::FlowLevel;
use self::linemode::LinemodeCommand;
use self::naws::WindowSize;
use self::status::StatusPayload;
use self::strings::{SendLocation, StringCommand};
use self::ttype::TtypeCommand;

///
/// A parsed, validated telnet subnegotiation payload.
///
/// The decoder strips the `IAC SB <option>` / `IAC SE` framing and
/// un-doubles interior IAC bytes before the payload reaches these parsers;
/// the encoder applies the inverse. Payloads for options without a
/// structured protocol travel as [`TelnetSubnegotiation::Unknown`].
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetSubnegotiation {
    /// NAWS window dimensions (RFC 1073)
    WindowSize(WindowSize),
    /// TTYPE terminal-type exchange (RFC 1091)
    TerminalType(TtypeCommand),
    /// TSPEED terminal-speed exchange (RFC 1079)
    TerminalSpeed(StringCommand),
    /// XDISPLOC X display location exchange (RFC 1096)
    DisplayLocation(StringCommand),
    /// SNDLOC location string (RFC 779)
    SendLocation(SendLocation),
    /// NEW-ENVIRON variable exchange (RFC 1572)
    Environ(EnvironCommand),
    /// CHARSET selection protocol (RFC 2066)
    Charset(CharsetCommand),
    /// LINEMODE mode, forwardmask and SLC tables (RFC 1184)
    Linemode(LinemodeCommand),
    /// LFLOW remote flow control level (RFC 1372)
    FlowControl(FlowLevel),
    /// STATUS option-state mirror (RFC 859)
    Status(StatusPayload),
    /// A subnegotiation for an option without a structured protocol
    Unknown(TelnetOption, BytesMut),
}

impl TelnetSubnegotiation {
    /// Parse an unescaped subnegotiation payload for `option`.
    ///
    /// Options with a structured protocol are validated strictly; the rest
    /// pass through as [`TelnetSubnegotiation::Unknown`].
    pub fn parse(option: TelnetOption, payload: &BytesMut) -> CodecResult<Self> {
        match option {
            TelnetOption::NAWS => Ok(Self::WindowSize(WindowSize::parse(payload)?)),
            TelnetOption::TTYPE => Ok(Self::TerminalType(TtypeCommand::parse(payload)?)),
            TelnetOption::TSPEED => Ok(Self::TerminalSpeed(StringCommand::parse(
                consts::option::TSPEED,
                payload,
            )?)),
            TelnetOption::XDISPLOC => Ok(Self::DisplayLocation(StringCommand::parse(
                consts::option::XDISPLOC,
                payload,
            )?)),
            TelnetOption::SNDLOC => Ok(Self::SendLocation(SendLocation::parse(payload)?)),
            TelnetOption::NewEnvironment => Ok(Self::Environ(EnvironCommand::parse(payload)?)),
            TelnetOption::Charset => Ok(Self::Charset(CharsetCommand::parse(payload)?)),
            TelnetOption::Linemode => Ok(Self::Linemode(LinemodeCommand::parse(payload)?)),
            TelnetOption::LFLOW => Ok(Self::FlowControl(FlowLevel::parse(payload)?)),
            TelnetOption::Status => Ok(Self::Status(StatusPayload::parse(payload)?)),
            option => Ok(Self::Unknown(option, payload.clone())),
        }
    }

    /// The option this payload belongs to.
    pub fn option(&self) -> TelnetOption {
        match self {
            TelnetSubnegotiation::WindowSize(_) => TelnetOption::NAWS,
            TelnetSubnegotiation::TerminalType(_) => TelnetOption::TTYPE,
            TelnetSubnegotiation::TerminalSpeed(_) => TelnetOption::TSPEED,
            TelnetSubnegotiation::DisplayLocation(_) => TelnetOption::XDISPLOC,
            TelnetSubnegotiation::SendLocation(_) => TelnetOption::SNDLOC,
            TelnetSubnegotiation::Environ(_) => TelnetOption::NewEnvironment,
            TelnetSubnegotiation::Charset(_) => TelnetOption::Charset,
            TelnetSubnegotiation::Linemode(_) => TelnetOption::Linemode,
            TelnetSubnegotiation::FlowControl(_) => TelnetOption::LFLOW,
            TelnetSubnegotiation::Status(_) => TelnetOption::Status,
            TelnetSubnegotiation::Unknown(option, _) => *option,
        }
    }

    /// Encode the raw payload bytes (no framing, no IAC doubling).
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<()> {
        match self {
            TelnetSubnegotiation::WindowSize(inner) => inner.encode(dst),
            TelnetSubnegotiation::TerminalType(inner) => inner.encode(dst),
            TelnetSubnegotiation::TerminalSpeed(inner) => inner.encode(dst),
            TelnetSubnegotiation::DisplayLocation(inner) => inner.encode(dst),
            TelnetSubnegotiation::SendLocation(inner) => inner.encode(dst),
            TelnetSubnegotiation::Environ(inner) => inner.encode(dst),
            TelnetSubnegotiation::Charset(inner) => inner.encode(dst),
            TelnetSubnegotiation::Linemode(inner) => inner.encode(dst),
            TelnetSubnegotiation::FlowControl(inner) => inner.encode(dst),
            TelnetSubnegotiation::Status(inner) => inner.encode(dst),
            TelnetSubnegotiation::Unknown(_, payload) => {
                dst.put_slice(payload);
                Ok(())
            }
        }
    }

    /// The encoded payload as a fresh buffer.
    pub fn to_payload(&self) -> CodecResult<BytesMut> {
        let mut payload = BytesMut::new();
        self.encode(&mut payload)?;
        Ok(payload)
    }
}

impl std::fmt::Display for TelnetSubnegotiation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetSubnegotiation::WindowSize(v) => write!(f, "{v}"),
            TelnetSubnegotiation::TerminalType(v) => write!(f, "{v}"),
            TelnetSubnegotiation::TerminalSpeed(v) => write!(f, "Tspeed({v})"),
            TelnetSubnegotiation::DisplayLocation(v) => write!(f, "Xdisploc({v})"),
            TelnetSubnegotiation::SendLocation(v) => write!(f, "{v}"),
            TelnetSubnegotiation::Environ(v) => write!(f, "{v}"),
            TelnetSubnegotiation::Charset(v) => write!(f, "{v}"),
            TelnetSubnegotiation::Linemode(v) => write!(f, "{v}"),
            TelnetSubnegotiation::FlowControl(v) => write!(f, "Lflow({v})"),
            TelnetSubnegotiation::Status(v) => write!(f, "{v}"),
            TelnetSubnegotiation::Unknown(o, v) => write!(f, "{o}-{v:?}"),
        }
    }
}
