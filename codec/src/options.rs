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

use crate::{CodecError, CodecResult, TelnetFrame, consts};
use std::fmt::Formatter;
use tracing::{debug, info, warn};

///
/// [Telnet Terminal Options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
///
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetOption {
    /// [`consts::option::BINARY`] Binary Transmission [RFC856](https://tools.ietf.org/html/rfc856)
    TransmitBinary,
    /// [`consts::option::ECHO`] Echo [RFC857](https://tools.ietf.org/html/rfc857)
    Echo,
    /// [`consts::option::RCP`] Reconnection (DDN Protocol Handbook, NIC 50005)
    Reconnection,
    /// [`consts::option::SGA`] Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    SuppressGoAhead,
    /// [`consts::option::NAMS`] Negotiate Approximate Message Size
    NegotiateApproxMessageSize,
    /// [`consts::option::STATUS`] Status [RFC859](http://www.iana.org/go/rfc859)
    Status,
    /// [`consts::option::TM`] Timing Mark [RFC860](http://www.iana.org/go/rfc860)
    TimingMark,
    /// [`consts::option::RCTE`] Remote-Controlled Transmission and Echo [RFC726](http://www.iana.org/go/rfc726)
    RCTE,
    /// [`consts::option::NAOL`] Output Line Width (NIC 50005)
    OutLineWidth,
    /// [`consts::option::NAOP`] Output Page Size (NIC 50005)
    OutPageSize,
    /// [`consts::option::NAOCRD`] Output Carriage-Return Disposition [RFC652](http://www.iana.org/go/rfc652)
    NAOCRD,
    /// [`consts::option::NAOHTS`] Output Horizontal Tab Stops [RFC653](http://www.iana.org/go/rfc653)
    NAOHTS,
    /// [`consts::option::NAOHTD`] Output Horizontal Tab Disposition [RFC654](http://www.iana.org/go/rfc654)
    NAOHTD,
    /// [`consts::option::NAOFFD`] Output Form Feed Disposition [RFC655](http://www.iana.org/go/rfc655)
    NAOFFD,
    /// [`consts::option::NAOVTS`] Output Vertical Tab Stops [RFC656](http://www.iana.org/go/rfc656)
    NAOVTS,
    /// [`consts::option::NAOVTD`] Output Vertical Tab Disposition [RFC657](http://www.iana.org/go/rfc657)
    NAOVTD,
    /// [`consts::option::NAOLFD`] Output Linefeed Disposition [RFC658](http://www.iana.org/go/rfc658)
    NAOLFD,
    /// [`consts::option::XASCII`] Extended ASCII [RFC698](http://www.iana.org/go/rfc698)
    XASCII,
    /// [`consts::option::LOGOUT`] Logout [RFC727](http://www.iana.org/go/rfc727)
    Logout,
    /// [`consts::option::BM`] Byte Macro [RFC735](http://www.iana.org/go/rfc735)
    ByteMacro,
    /// [`consts::option::DET`] Data Entry Terminal [RFC1043](http://www.iana.org/go/rfc1043)
    DET,
    /// [`consts::option::SUPDUP`] SUPDUP [RFC736](http://www.iana.org/go/rfc736)
    SUPDUP,
    /// [`consts::option::SUPDUP_OUTPUT`] SUPDUP Output [RFC749](http://www.iana.org/go/rfc749)
    SUPDUPOutput,
    /// [`consts::option::SNDLOC`] Send Location [RFC779](http://www.iana.org/go/rfc779)
    SNDLOC,
    /// [`consts::option::TTYPE`] Terminal Type [RFC1091](http://www.iana.org/go/rfc1091)
    TTYPE,
    /// [`consts::option::EOR`] End of Record [RFC885](http://www.iana.org/go/rfc885)
    EOR,
    /// [`consts::option::TUID`] TACACS User Identification [RFC927](http://www.iana.org/go/rfc927)
    TUID,
    /// [`consts::option::OUTMRK`] Output Marking [RFC933](http://www.iana.org/go/rfc933)
    OUTMRK,
    /// [`consts::option::TTYLOC`] Terminal Location Number [RFC946](http://www.iana.org/go/rfc946)
    TTYLOC,
    /// [`consts::option::OPT3270REGIME`] Telnet 3270 Regime [RFC1041](http://www.iana.org/go/rfc1041)
    OPT3270Regime,
    /// [`consts::option::X3PAD`] X.3 PAD [RFC1053](http://www.iana.org/go/rfc1053)
    X3PAD,
    /// [`consts::option::NAWS`] Negotiate About Window Size [RFC1073](http://www.iana.org/go/rfc1073)
    NAWS,
    /// [`consts::option::TSPEED`] Terminal Speed [RFC1079](http://www.iana.org/go/rfc1079)
    TSPEED,
    /// [`consts::option::LFLOW`] Remote Flow Control [RFC1372](http://www.iana.org/go/rfc1372)
    LFLOW,
    /// [`consts::option::LINEMODE`] Linemode [RFC1184](http://www.iana.org/go/rfc1184)
    Linemode,
    /// [`consts::option::XDISPLOC`] X Display Location [RFC1096](http://www.iana.org/go/rfc1096)
    XDISPLOC,
    /// [`consts::option::OLD_ENVIRON`] Environment Option [RFC1408](http://www.iana.org/go/rfc1408)
    Environment,
    /// [`consts::option::AUTHENTICATION`] Authentication [RFC2941](http://www.iana.org/go/rfc2941)
    Authentication,
    /// [`consts::option::ENCRYPTION`] Encryption [RFC2946](http://www.iana.org/go/rfc2946)
    Encryption,
    /// [`consts::option::NEW_ENVIRON`] New Environment [RFC1572](http://www.iana.org/go/rfc1572)
    NewEnvironment,
    /// [`consts::option::TN3270E`] TN3270E [RFC2355](http://www.iana.org/go/rfc2355)
    TN3270E,
    /// [`consts::option::XAUTH`] XAUTH
    XAUTH,
    /// [`consts::option::CHARSET`] Charset [RFC2066](http://www.iana.org/go/rfc2066)
    Charset,
    /// [`consts::option::TRSP`] Telnet Remote Serial Port
    TRSP,
    /// [`consts::option::CPCO`] Com Port Control Option [RFC2217](http://www.iana.org/go/rfc2217)
    CPCO,
    /// [`consts::option::TSLE`] Telnet Suppress Local Echo
    TSLE,
    /// [`consts::option::START_TLS`] Telnet Start TLS
    StartTLS,
    /// [`consts::option::KERMIT`] Kermit [RFC2840](http://www.iana.org/go/rfc2840)
    Kermit,
    /// [`consts::option::SENDURL`] SEND-URL
    SendUrl,
    /// [`consts::option::FORWARDX`] FORWARD_X
    ForwardX,
    /// [`consts::option::EXOPL`] Extended-Options-List [RFC861](http://www.iana.org/go/rfc861)
    EXOPL,
    /// Unknown Option
    Unknown(u8),
}

impl TelnetOption {
    /// Converts a `TelnetOption` into its wire byte.
    pub fn to_u8(&self) -> u8 {
        match self {
            TelnetOption::TransmitBinary => consts::option::BINARY,
            TelnetOption::Echo => consts::option::ECHO,
            TelnetOption::Reconnection => consts::option::RCP,
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::NegotiateApproxMessageSize => consts::option::NAMS,
            TelnetOption::Status => consts::option::STATUS,
            TelnetOption::TimingMark => consts::option::TM,
            TelnetOption::RCTE => consts::option::RCTE,
            TelnetOption::OutLineWidth => consts::option::NAOL,
            TelnetOption::OutPageSize => consts::option::NAOP,
            TelnetOption::NAOCRD => consts::option::NAOCRD,
            TelnetOption::NAOHTS => consts::option::NAOHTS,
            TelnetOption::NAOHTD => consts::option::NAOHTD,
            TelnetOption::NAOFFD => consts::option::NAOFFD,
            TelnetOption::NAOVTS => consts::option::NAOVTS,
            TelnetOption::NAOVTD => consts::option::NAOVTD,
            TelnetOption::NAOLFD => consts::option::NAOLFD,
            TelnetOption::XASCII => consts::option::XASCII,
            TelnetOption::Logout => consts::option::LOGOUT,
            TelnetOption::ByteMacro => consts::option::BM,
            TelnetOption::DET => consts::option::DET,
            TelnetOption::SUPDUP => consts::option::SUPDUP,
            TelnetOption::SUPDUPOutput => consts::option::SUPDUP_OUTPUT,
            TelnetOption::SNDLOC => consts::option::SNDLOC,
            TelnetOption::TTYPE => consts::option::TTYPE,
            TelnetOption::EOR => consts::option::EOR,
            TelnetOption::TUID => consts::option::TUID,
            TelnetOption::OUTMRK => consts::option::OUTMRK,
            TelnetOption::TTYLOC => consts::option::TTYLOC,
            TelnetOption::OPT3270Regime => consts::option::OPT3270REGIME,
            TelnetOption::X3PAD => consts::option::X3PAD,
            TelnetOption::NAWS => consts::option::NAWS,
            TelnetOption::TSPEED => consts::option::TSPEED,
            TelnetOption::LFLOW => consts::option::LFLOW,
            TelnetOption::Linemode => consts::option::LINEMODE,
            TelnetOption::XDISPLOC => consts::option::XDISPLOC,
            TelnetOption::Environment => consts::option::OLD_ENVIRON,
            TelnetOption::Authentication => consts::option::AUTHENTICATION,
            TelnetOption::Encryption => consts::option::ENCRYPTION,
            TelnetOption::NewEnvironment => consts::option::NEW_ENVIRON,
            TelnetOption::TN3270E => consts::option::TN3270E,
            TelnetOption::XAUTH => consts::option::XAUTH,
            TelnetOption::Charset => consts::option::CHARSET,
            TelnetOption::TRSP => consts::option::TRSP,
            TelnetOption::CPCO => consts::option::CPCO,
            TelnetOption::TSLE => consts::option::TSLE,
            TelnetOption::StartTLS => consts::option::START_TLS,
            TelnetOption::Kermit => consts::option::KERMIT,
            TelnetOption::SendUrl => consts::option::SENDURL,
            TelnetOption::ForwardX => consts::option::FORWARDX,
            TelnetOption::EXOPL => consts::option::EXOPL,
            TelnetOption::Unknown(byte) => *byte,
        }
    }

    /// Converts a wire byte into the corresponding `TelnetOption` variant.
    /// Unrecognised codes become [`TelnetOption::Unknown`].
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            consts::option::BINARY => TelnetOption::TransmitBinary,
            consts::option::ECHO => TelnetOption::Echo,
            consts::option::RCP => TelnetOption::Reconnection,
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::NAMS => TelnetOption::NegotiateApproxMessageSize,
            consts::option::STATUS => TelnetOption::Status,
            consts::option::TM => TelnetOption::TimingMark,
            consts::option::RCTE => TelnetOption::RCTE,
            consts::option::NAOL => TelnetOption::OutLineWidth,
            consts::option::NAOP => TelnetOption::OutPageSize,
            consts::option::NAOCRD => TelnetOption::NAOCRD,
            consts::option::NAOHTS => TelnetOption::NAOHTS,
            consts::option::NAOHTD => TelnetOption::NAOHTD,
            consts::option::NAOFFD => TelnetOption::NAOFFD,
            consts::option::NAOVTS => TelnetOption::NAOVTS,
            consts::option::NAOVTD => TelnetOption::NAOVTD,
            consts::option::NAOLFD => TelnetOption::NAOLFD,
            consts::option::XASCII => TelnetOption::XASCII,
            consts::option::LOGOUT => TelnetOption::Logout,
            consts::option::BM => TelnetOption::ByteMacro,
            consts::option::DET => TelnetOption::DET,
            consts::option::SUPDUP => TelnetOption::SUPDUP,
            consts::option::SUPDUP_OUTPUT => TelnetOption::SUPDUPOutput,
            consts::option::SNDLOC => TelnetOption::SNDLOC,
            consts::option::TTYPE => TelnetOption::TTYPE,
            consts::option::EOR => TelnetOption::EOR,
            consts::option::TUID => TelnetOption::TUID,
            consts::option::OUTMRK => TelnetOption::OUTMRK,
            consts::option::TTYLOC => TelnetOption::TTYLOC,
            consts::option::OPT3270REGIME => TelnetOption::OPT3270Regime,
            consts::option::X3PAD => TelnetOption::X3PAD,
            consts::option::NAWS => TelnetOption::NAWS,
            consts::option::TSPEED => TelnetOption::TSPEED,
            consts::option::LFLOW => TelnetOption::LFLOW,
            consts::option::LINEMODE => TelnetOption::Linemode,
            consts::option::XDISPLOC => TelnetOption::XDISPLOC,
            consts::option::OLD_ENVIRON => TelnetOption::Environment,
            consts::option::AUTHENTICATION => TelnetOption::Authentication,
            consts::option::ENCRYPTION => TelnetOption::Encryption,
            consts::option::NEW_ENVIRON => TelnetOption::NewEnvironment,
            consts::option::TN3270E => TelnetOption::TN3270E,
            consts::option::XAUTH => TelnetOption::XAUTH,
            consts::option::CHARSET => TelnetOption::Charset,
            consts::option::TRSP => TelnetOption::TRSP,
            consts::option::CPCO => TelnetOption::CPCO,
            consts::option::TSLE => TelnetOption::TSLE,
            consts::option::START_TLS => TelnetOption::StartTLS,
            consts::option::KERMIT => TelnetOption::Kermit,
            consts::option::SENDURL => TelnetOption::SendUrl,
            consts::option::FORWARDX => TelnetOption::ForwardX,
            consts::option::EXOPL => TelnetOption::EXOPL,
            byte => TelnetOption::Unknown(byte),
        }
    }

    /// Whether an engine in `role` may perform this option on its own side
    /// (offer WILL, answer DO affirmatively).
    ///
    /// Direction matters for most of the terminal-descriptive options: NAWS,
    /// TTYPE, TSPEED, XDISPLOC, SNDLOC, NEW-ENVIRON and LFLOW describe the
    /// client's terminal and are only ever performed by the client. ECHO is
    /// performed by the server. Timing Mark and Logout are one-shot signals
    /// handled outside the state table and are never "enabled".
    pub fn local_supported(&self, role: TelnetRole) -> bool {
        match role {
            TelnetRole::Server => matches!(
                self,
                TelnetOption::TransmitBinary
                    | TelnetOption::Echo
                    | TelnetOption::SuppressGoAhead
                    | TelnetOption::Status
                    | TelnetOption::EOR
                    | TelnetOption::Charset
            ),
            TelnetRole::Client => matches!(
                self,
                TelnetOption::TransmitBinary
                    | TelnetOption::SuppressGoAhead
                    | TelnetOption::Status
                    | TelnetOption::EOR
                    | TelnetOption::Charset
                    | TelnetOption::TTYPE
                    | TelnetOption::NAWS
                    | TelnetOption::TSPEED
                    | TelnetOption::XDISPLOC
                    | TelnetOption::NewEnvironment
                    | TelnetOption::LFLOW
                    | TelnetOption::Linemode
                    | TelnetOption::SNDLOC
            ),
        }
    }

    /// Whether an engine in `role` may ask the peer to perform this option
    /// (send DO, answer WILL affirmatively).
    pub fn remote_supported(&self, role: TelnetRole) -> bool {
        match role {
            TelnetRole::Server => matches!(
                self,
                TelnetOption::TransmitBinary
                    | TelnetOption::SuppressGoAhead
                    | TelnetOption::Status
                    | TelnetOption::EOR
                    | TelnetOption::Charset
                    | TelnetOption::TTYPE
                    | TelnetOption::NAWS
                    | TelnetOption::TSPEED
                    | TelnetOption::XDISPLOC
                    | TelnetOption::NewEnvironment
                    | TelnetOption::LFLOW
                    | TelnetOption::Linemode
                    | TelnetOption::SNDLOC
            ),
            TelnetRole::Client => matches!(
                self,
                TelnetOption::TransmitBinary
                    | TelnetOption::Echo
                    | TelnetOption::SuppressGoAhead
                    | TelnetOption::Status
                    | TelnetOption::EOR
                    | TelnetOption::Charset
            ),
        }
    }

    /// Whether an unsolicited peer DO for this option is acceptable.
    ///
    /// Linemode is the asymmetric case: the client initiates with WILL
    /// LINEMODE and an unsolicited DO LINEMODE is always refused with WONT
    /// (RFC 1184 gives the server no say in starting the mode).
    pub fn accepts_unsolicited_do(&self, role: TelnetRole) -> bool {
        match self {
            TelnetOption::Linemode => false,
            option => option.local_supported(role),
        }
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::TransmitBinary => write!(f, "TransmitBinary"),
            TelnetOption::Echo => write!(f, "Echo"),
            TelnetOption::Reconnection => write!(f, "Reconnection"),
            TelnetOption::SuppressGoAhead => write!(f, "SuppressGoAhead"),
            TelnetOption::NegotiateApproxMessageSize => write!(f, "NegotiateApproxMessageSize"),
            TelnetOption::Status => write!(f, "Status"),
            TelnetOption::TimingMark => write!(f, "TimingMark"),
            TelnetOption::RCTE => write!(f, "RCTE"),
            TelnetOption::OutLineWidth => write!(f, "OutLineWidth"),
            TelnetOption::OutPageSize => write!(f, "OutPageSize"),
            TelnetOption::NAOCRD => write!(f, "NAOCRD"),
            TelnetOption::NAOHTS => write!(f, "NAOHTS"),
            TelnetOption::NAOHTD => write!(f, "NAOHTD"),
            TelnetOption::NAOFFD => write!(f, "NAOFFD"),
            TelnetOption::NAOVTS => write!(f, "NAOVTS"),
            TelnetOption::NAOVTD => write!(f, "NAOVTD"),
            TelnetOption::NAOLFD => write!(f, "NAOLFD"),
            TelnetOption::XASCII => write!(f, "XASCII"),
            TelnetOption::Logout => write!(f, "Logout"),
            TelnetOption::ByteMacro => write!(f, "ByteMacro"),
            TelnetOption::DET => write!(f, "DET"),
            TelnetOption::SUPDUP => write!(f, "SUPDUP"),
            TelnetOption::SUPDUPOutput => write!(f, "SUPDUPOutput"),
            TelnetOption::SNDLOC => write!(f, "SNDLOC"),
            TelnetOption::TTYPE => write!(f, "TTYPE"),
            TelnetOption::EOR => write!(f, "EOR"),
            TelnetOption::TUID => write!(f, "TUID"),
            TelnetOption::OUTMRK => write!(f, "OUTMRK"),
            TelnetOption::TTYLOC => write!(f, "TTYLOC"),
            TelnetOption::OPT3270Regime => write!(f, "OPT3270Regime"),
            TelnetOption::X3PAD => write!(f, "X3PAD"),
            TelnetOption::NAWS => write!(f, "NAWS"),
            TelnetOption::TSPEED => write!(f, "TSPEED"),
            TelnetOption::LFLOW => write!(f, "LFLOW"),
            TelnetOption::Linemode => write!(f, "Linemode"),
            TelnetOption::XDISPLOC => write!(f, "XDISPLOC"),
            TelnetOption::Environment => write!(f, "Environment"),
            TelnetOption::Authentication => write!(f, "Authentication"),
            TelnetOption::Encryption => write!(f, "Encryption"),
            TelnetOption::NewEnvironment => write!(f, "NewEnvironment"),
            TelnetOption::TN3270E => write!(f, "TN3270E"),
            TelnetOption::XAUTH => write!(f, "XAUTH"),
            TelnetOption::Charset => write!(f, "Charset"),
            TelnetOption::TRSP => write!(f, "TRSP"),
            TelnetOption::CPCO => write!(f, "CPCO"),
            TelnetOption::TSLE => write!(f, "TSLE"),
            TelnetOption::StartTLS => write!(f, "StartTLS"),
            TelnetOption::Kermit => write!(f, "Kermit"),
            TelnetOption::SendUrl => write!(f, "SendUrl"),
            TelnetOption::ForwardX => write!(f, "ForwardX"),
            TelnetOption::EXOPL => write!(f, "EXOPL"),
            TelnetOption::Unknown(option) => write!(f, "Unknown({option})"),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        Self::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

/// Which end of the connection this engine is.
///
/// Role determines the directionality rules of the option registry: which
/// options this engine may perform itself and which it may ask of the peer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetRole {
    /// The connecting end: owns the terminal, performs NAWS/TTYPE/LINEMODE.
    Client,
    /// The listening end: performs ECHO, drives TTYPE/CHARSET requests.
    Server,
}

impl std::fmt::Display for TelnetRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetRole::Client => write!(f, "Client"),
            TelnetRole::Server => write!(f, "Server"),
        }
    }
}

/// The perspective of a negotiated option: our side or the peer's side.
///
/// Every option carries two independent state machines. The `Local` machine
/// tracks whether *we* perform the option (we say WILL/WONT, the peer says
/// DO/DONT); the `Remote` machine tracks whether the *peer* performs it (we
/// say DO/DONT, the peer says WILL/WONT).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetSide {
    /// The local side of the connection (what we perform)
    Local,
    /// The remote side of the connection (what the peer performs)
    Remote,
}

impl std::fmt::Display for TelnetSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetSide::Local => write!(f, "Local"),
            TelnetSide::Remote => write!(f, "Remote"),
        }
    }
}

/// Negotiation state of one option on one side.
///
/// At most one of Enabled / PendingEnable / PendingDisable holds at a time;
/// Disabled is the complement. PendingEnable resolves to Enabled on a
/// positive reply or Disabled on a refusal; PendingDisable only ever
/// resolves to Disabled.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum NegotiationState {
    /// Option is not in effect.
    #[default]
    Disabled,
    /// Option is in effect.
    Enabled,
    /// We initiated enablement and await the peer's reply.
    PendingEnable,
    /// We initiated disablement and await the peer's reply.
    PendingDisable,
}

impl NegotiationState {
    /// True while a request we initiated is unanswered.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            NegotiationState::PendingEnable | NegotiationState::PendingDisable
        )
    }
}

impl std::fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationState::Disabled => write!(f, "Disabled"),
            NegotiationState::Enabled => write!(f, "Enabled"),
            NegotiationState::PendingEnable => write!(f, "PendingEnable"),
            NegotiationState::PendingDisable => write!(f, "PendingDisable"),
        }
    }
}

/// What a negotiation step produced: an optional frame to put on the wire
/// and an optional settled transition to report upward.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct NegotiationOutcome {
    /// Reply frame to transmit, if any.
    pub reply: Option<TelnetFrame>,
    /// `(side, enabled)` when the negotiation settled into a definitive
    /// state as a result of this step. Redundant peer acks produce none.
    pub settled: Option<(TelnetSide, bool)>,
}

impl NegotiationOutcome {
    fn quiet() -> Self {
        NegotiationOutcome::default()
    }
}

/// Per-connection option negotiation table.
///
/// Tracks the tri-state of all 256 options for both sides and implements the
/// WILL/WONT/DO/DONT rules: one request in flight per option and side,
/// redundant acknowledgements dropped (the sole loop breaker), unsupported
/// or reversed-direction requests refused with the appropriate verb.
#[derive(Clone, Debug)]
pub struct TelnetOptions {
    role: TelnetRole,
    local: [NegotiationState; 256],
    remote: [NegotiationState; 256],
}

impl TelnetOptions {
    /// Creates a table for an engine acting as `role`, all options disabled.
    pub fn new(role: TelnetRole) -> Self {
        TelnetOptions {
            role,
            local: [NegotiationState::default(); 256],
            remote: [NegotiationState::default(); 256],
        }
    }

    /// The role this table was created for.
    pub fn role(&self) -> TelnetRole {
        self.role
    }

    /// Negotiation state of `option` on `side`.
    pub fn state(&self, side: TelnetSide, option: TelnetOption) -> NegotiationState {
        match side {
            TelnetSide::Local => self.local[option.to_u8() as usize],
            TelnetSide::Remote => self.remote[option.to_u8() as usize],
        }
    }

    /// True if `option` is in effect on our side.
    pub fn local_enabled(&self, option: TelnetOption) -> bool {
        self.local[option.to_u8() as usize] == NegotiationState::Enabled
    }

    /// True if the peer performs `option`.
    pub fn remote_enabled(&self, option: TelnetOption) -> bool {
        self.remote[option.to_u8() as usize] == NegotiationState::Enabled
    }

    /// Enabled options on one side, for STATUS mirroring and snapshots.
    pub fn enabled_options(&self, side: TelnetSide) -> Vec<TelnetOption> {
        let table = match side {
            TelnetSide::Local => &self.local,
            TelnetSide::Remote => &self.remote,
        };
        table
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == NegotiationState::Enabled)
            .map(|(idx, _)| TelnetOption::from_u8(idx as u8))
            .collect()
    }

    fn slot(&mut self, side: TelnetSide, option: TelnetOption) -> &mut NegotiationState {
        match side {
            TelnetSide::Local => &mut self.local[option.to_u8() as usize],
            TelnetSide::Remote => &mut self.remote[option.to_u8() as usize],
        }
    }

    // #### Outgoing requests (what we initiate) ################################

    /// Ask to perform `option` ourselves: transmits WILL, sets PendingEnable.
    ///
    /// Fails fast, wire-silent, on a request that is already pending, an
    /// option that is already enabled, or an option our role never performs.
    pub fn request_local_enable(&mut self, option: TelnetOption) -> CodecResult<TelnetFrame> {
        if !option.local_supported(self.role) {
            return Err(CodecError::UnsupportedOption {
                option,
                side: TelnetSide::Local,
            });
        }
        self.request_enable(TelnetSide::Local, option)?;
        Ok(TelnetFrame::Will(option))
    }

    /// Ask the peer to perform `option`: transmits DO, sets PendingEnable.
    pub fn request_remote_enable(&mut self, option: TelnetOption) -> CodecResult<TelnetFrame> {
        if !option.remote_supported(self.role) {
            return Err(CodecError::UnsupportedOption {
                option,
                side: TelnetSide::Remote,
            });
        }
        self.request_enable(TelnetSide::Remote, option)?;
        Ok(TelnetFrame::Do(option))
    }

    /// Stop performing `option` ourselves: transmits WONT, sets PendingDisable.
    /// Returns `None` when already disabled (idempotent).
    pub fn request_local_disable(
        &mut self,
        option: TelnetOption,
    ) -> CodecResult<Option<TelnetFrame>> {
        Ok(self
            .request_disable(TelnetSide::Local, option)?
            .then_some(TelnetFrame::Wont(option)))
    }

    /// Ask the peer to stop performing `option`: transmits DONT, sets
    /// PendingDisable. Returns `None` when already disabled.
    pub fn request_remote_disable(
        &mut self,
        option: TelnetOption,
    ) -> CodecResult<Option<TelnetFrame>> {
        Ok(self
            .request_disable(TelnetSide::Remote, option)?
            .then_some(TelnetFrame::Dont(option)))
    }

    fn request_enable(&mut self, side: TelnetSide, option: TelnetOption) -> CodecResult<()> {
        let slot = self.slot(side, option);
        match *slot {
            NegotiationState::PendingEnable | NegotiationState::PendingDisable => {
                Err(CodecError::NegotiationInFlight { option, side })
            }
            NegotiationState::Enabled => Err(CodecError::AlreadyEnabled { option, side }),
            NegotiationState::Disabled => {
                *slot = NegotiationState::PendingEnable;
                Ok(())
            }
        }
    }

    fn request_disable(&mut self, side: TelnetSide, option: TelnetOption) -> CodecResult<bool> {
        let slot = self.slot(side, option);
        match *slot {
            NegotiationState::PendingEnable | NegotiationState::PendingDisable => {
                Err(CodecError::NegotiationInFlight { option, side })
            }
            NegotiationState::Disabled => Ok(false),
            NegotiationState::Enabled => {
                *slot = NegotiationState::PendingDisable;
                Ok(true)
            }
        }
    }

    // #### Incoming processing (peer sent us DO/DONT/WILL/WONT) ################

    /// Peer announced WILL: it offers to perform, or confirms our DO.
    pub(crate) fn receive_will(&mut self, option: TelnetOption) -> NegotiationOutcome {
        let role = self.role;
        let slot = self.slot(TelnetSide::Remote, option);
        match *slot {
            NegotiationState::Enabled => {
                // Re-acknowledging would loop; this drop is the loop breaker.
                debug!("dropping redundant WILL {option}");
                NegotiationOutcome::quiet()
            }
            NegotiationState::PendingEnable => {
                *slot = NegotiationState::Enabled;
                NegotiationOutcome {
                    reply: None,
                    settled: Some((TelnetSide::Remote, true)),
                }
            }
            NegotiationState::PendingDisable => {
                // Peer answered our DONT with WILL. Our DONT stands.
                warn!("peer replied WILL {option} to our DONT");
                *slot = NegotiationState::Disabled;
                NegotiationOutcome {
                    reply: None,
                    settled: Some((TelnetSide::Remote, false)),
                }
            }
            NegotiationState::Disabled => {
                if option.remote_supported(role) {
                    *slot = NegotiationState::Enabled;
                    NegotiationOutcome {
                        reply: Some(TelnetFrame::Do(option)),
                        settled: Some((TelnetSide::Remote, true)),
                    }
                } else {
                    info!("refusing WILL {option}");
                    NegotiationOutcome {
                        reply: Some(TelnetFrame::Dont(option)),
                        settled: None,
                    }
                }
            }
        }
    }

    /// Peer announced WONT: it refuses or stops performing.
    pub(crate) fn receive_wont(&mut self, option: TelnetOption) -> NegotiationOutcome {
        let slot = self.slot(TelnetSide::Remote, option);
        match *slot {
            NegotiationState::Disabled => {
                debug!("dropping redundant WONT {option}");
                NegotiationOutcome::quiet()
            }
            NegotiationState::PendingEnable | NegotiationState::PendingDisable => {
                *slot = NegotiationState::Disabled;
                NegotiationOutcome {
                    reply: None,
                    settled: Some((TelnetSide::Remote, false)),
                }
            }
            NegotiationState::Enabled => {
                // Peer turned the option off; acknowledge exactly once.
                *slot = NegotiationState::Disabled;
                NegotiationOutcome {
                    reply: Some(TelnetFrame::Dont(option)),
                    settled: Some((TelnetSide::Remote, false)),
                }
            }
        }
    }

    /// Peer requested DO: asks us to perform, or confirms our WILL.
    pub(crate) fn receive_do(&mut self, option: TelnetOption) -> NegotiationOutcome {
        let role = self.role;
        let slot = self.slot(TelnetSide::Local, option);
        match *slot {
            NegotiationState::Enabled => {
                debug!("dropping redundant DO {option}");
                NegotiationOutcome::quiet()
            }
            NegotiationState::PendingEnable => {
                *slot = NegotiationState::Enabled;
                NegotiationOutcome {
                    reply: None,
                    settled: Some((TelnetSide::Local, true)),
                }
            }
            NegotiationState::PendingDisable => {
                warn!("peer replied DO {option} to our WONT");
                *slot = NegotiationState::Disabled;
                NegotiationOutcome {
                    reply: None,
                    settled: Some((TelnetSide::Local, false)),
                }
            }
            NegotiationState::Disabled => {
                if option.accepts_unsolicited_do(role) {
                    *slot = NegotiationState::Enabled;
                    NegotiationOutcome {
                        reply: Some(TelnetFrame::Will(option)),
                        settled: Some((TelnetSide::Local, true)),
                    }
                } else {
                    info!("refusing DO {option}");
                    NegotiationOutcome {
                        reply: Some(TelnetFrame::Wont(option)),
                        settled: None,
                    }
                }
            }
        }
    }

    /// Peer requested DONT: asks us to stop, or confirms our WONT.
    pub(crate) fn receive_dont(&mut self, option: TelnetOption) -> NegotiationOutcome {
        let slot = self.slot(TelnetSide::Local, option);
        match *slot {
            NegotiationState::Disabled => {
                debug!("dropping redundant DONT {option}");
                NegotiationOutcome::quiet()
            }
            NegotiationState::PendingEnable | NegotiationState::PendingDisable => {
                *slot = NegotiationState::Disabled;
                NegotiationOutcome {
                    reply: None,
                    settled: Some((TelnetSide::Local, false)),
                }
            }
            NegotiationState::Enabled => {
                *slot = NegotiationState::Disabled;
                NegotiationOutcome {
                    reply: Some(TelnetFrame::Wont(option)),
                    settled: Some((TelnetSide::Local, false)),
                }
            }
        }
    }

    /// True while any request we initiated is unanswered on either side.
    pub fn has_pending(&self) -> bool {
        self.local.iter().any(NegotiationState::is_pending)
            || self.remote.iter().any(NegotiationState::is_pending)
    }

    /// Resolve all pending requests to Disabled, e.g. at connection close,
    /// returning the options whose waiters should be woken.
    pub(crate) fn cancel_pending(&mut self) -> Vec<(TelnetSide, TelnetOption)> {
        let mut cancelled = Vec::new();
        for idx in 0..=255usize {
            if self.local[idx].is_pending() {
                self.local[idx] = NegotiationState::Disabled;
                cancelled.push((TelnetSide::Local, TelnetOption::from_u8(idx as u8)));
            }
            if self.remote[idx].is_pending() {
                self.remote[idx] = NegotiationState::Disabled;
                cancelled.push((TelnetSide::Remote, TelnetOption::from_u8(idx as u8)));
            }
        }
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> TelnetOptions {
        TelnetOptions::new(TelnetRole::Server)
    }

    fn client() -> TelnetOptions {
        TelnetOptions::new(TelnetRole::Client)
    }

    // ============================================================================
    // Outgoing request rules
    // ============================================================================

    #[test]
    fn request_local_enable_transitions_to_pending() {
        let mut opts = server();
        let frame = opts.request_local_enable(TelnetOption::Echo).unwrap();
        assert_eq!(frame, TelnetFrame::Will(TelnetOption::Echo));
        assert_eq!(
            opts.state(TelnetSide::Local, TelnetOption::Echo),
            NegotiationState::PendingEnable
        );
        assert!(!opts.local_enabled(TelnetOption::Echo));
    }

    #[test]
    fn second_request_while_pending_is_an_error() {
        let mut opts = server();
        opts.request_local_enable(TelnetOption::Echo).unwrap();
        let err = opts.request_local_enable(TelnetOption::Echo).unwrap_err();
        assert_eq!(
            err,
            CodecError::NegotiationInFlight {
                option: TelnetOption::Echo,
                side: TelnetSide::Local,
            }
        );
    }

    #[test]
    fn request_enable_when_enabled_is_an_error() {
        let mut opts = server();
        opts.request_local_enable(TelnetOption::Echo).unwrap();
        opts.receive_do(TelnetOption::Echo);
        let err = opts.request_local_enable(TelnetOption::Echo).unwrap_err();
        assert_eq!(
            err,
            CodecError::AlreadyEnabled {
                option: TelnetOption::Echo,
                side: TelnetSide::Local,
            }
        );
    }

    #[test]
    fn request_unsupported_option_is_an_error() {
        // A server never performs NAWS; that belongs to the client terminal.
        let mut opts = server();
        let err = opts.request_local_enable(TelnetOption::NAWS).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnsupportedOption {
                option: TelnetOption::NAWS,
                side: TelnetSide::Local,
            }
        );
    }

    #[test]
    fn request_disable_is_idempotent_when_disabled() {
        let mut opts = server();
        assert_eq!(opts.request_local_disable(TelnetOption::Echo).unwrap(), None);
    }

    // ============================================================================
    // Reply resolution
    // ============================================================================

    #[test]
    fn pending_enable_resolves_on_do() {
        let mut opts = server();
        opts.request_local_enable(TelnetOption::Echo).unwrap();
        let outcome = opts.receive_do(TelnetOption::Echo);
        assert_eq!(outcome.reply, None);
        assert_eq!(outcome.settled, Some((TelnetSide::Local, true)));
        assert!(opts.local_enabled(TelnetOption::Echo));
    }

    #[test]
    fn pending_enable_resolves_on_refusal() {
        let mut opts = server();
        opts.request_remote_enable(TelnetOption::NAWS).unwrap();
        let outcome = opts.receive_wont(TelnetOption::NAWS);
        assert_eq!(outcome.reply, None);
        assert_eq!(outcome.settled, Some((TelnetSide::Remote, false)));
        assert!(!opts.remote_enabled(TelnetOption::NAWS));
    }

    #[test]
    fn pending_disable_only_resolves_to_disabled() {
        let mut opts = server();
        opts.request_remote_enable(TelnetOption::NAWS).unwrap();
        opts.receive_will(TelnetOption::NAWS);
        opts.request_remote_disable(TelnetOption::NAWS).unwrap();
        // Even a contrary WILL reply leaves the option disabled.
        let outcome = opts.receive_will(TelnetOption::NAWS);
        assert_eq!(outcome.reply, None);
        assert_eq!(outcome.settled, Some((TelnetSide::Remote, false)));
        assert!(!opts.remote_enabled(TelnetOption::NAWS));
    }

    // ============================================================================
    // Loop prevention
    // ============================================================================

    #[test]
    fn redundant_will_is_dropped() {
        let mut opts = server();
        opts.receive_will(TelnetOption::NAWS);
        assert!(opts.remote_enabled(TelnetOption::NAWS));
        let outcome = opts.receive_will(TelnetOption::NAWS);
        assert_eq!(outcome, NegotiationOutcome::quiet());
    }

    #[test]
    fn redundant_wont_is_dropped() {
        let mut opts = server();
        let outcome = opts.receive_wont(TelnetOption::Echo);
        assert_eq!(outcome, NegotiationOutcome::quiet());
    }

    #[test]
    fn disable_of_enabled_option_is_acknowledged_once() {
        let mut opts = server();
        opts.receive_will(TelnetOption::NAWS);
        let outcome = opts.receive_wont(TelnetOption::NAWS);
        assert_eq!(outcome.reply, Some(TelnetFrame::Dont(TelnetOption::NAWS)));
        // A duplicate WONT afterwards is silent.
        let outcome = opts.receive_wont(TelnetOption::NAWS);
        assert_eq!(outcome, NegotiationOutcome::quiet());
    }

    // ============================================================================
    // Directionality
    // ============================================================================

    #[test]
    fn reversed_direction_will_is_refused_with_dont() {
        // A peer server claiming WILL NAWS at a client is nonsense.
        let mut opts = client();
        let outcome = opts.receive_will(TelnetOption::NAWS);
        assert_eq!(outcome.reply, Some(TelnetFrame::Dont(TelnetOption::NAWS)));
        assert!(!opts.remote_enabled(TelnetOption::NAWS));
    }

    #[test]
    fn reversed_direction_do_is_refused_with_wont() {
        let mut opts = server();
        let outcome = opts.receive_do(TelnetOption::NAWS);
        assert_eq!(outcome.reply, Some(TelnetFrame::Wont(TelnetOption::NAWS)));
        assert!(!opts.local_enabled(TelnetOption::NAWS));
    }

    #[test]
    fn client_always_refuses_unsolicited_do_linemode() {
        let mut opts = client();
        let outcome = opts.receive_do(TelnetOption::Linemode);
        assert_eq!(
            outcome.reply,
            Some(TelnetFrame::Wont(TelnetOption::Linemode))
        );
    }

    #[test]
    fn client_initiated_linemode_still_negotiates() {
        let mut opts = client();
        opts.request_local_enable(TelnetOption::Linemode).unwrap();
        let outcome = opts.receive_do(TelnetOption::Linemode);
        assert_eq!(outcome.reply, None);
        assert!(opts.local_enabled(TelnetOption::Linemode));
    }

    #[test]
    fn unknown_option_is_refused() {
        let mut opts = server();
        let outcome = opts.receive_will(TelnetOption::Unknown(200));
        assert_eq!(
            outcome.reply,
            Some(TelnetFrame::Dont(TelnetOption::Unknown(200)))
        );
    }

    // ============================================================================
    // State exclusivity
    // ============================================================================

    #[test]
    fn exactly_one_state_per_slot() {
        let mut opts = server();
        opts.request_remote_enable(TelnetOption::TTYPE).unwrap();
        assert_eq!(
            opts.state(TelnetSide::Remote, TelnetOption::TTYPE),
            NegotiationState::PendingEnable
        );
        opts.receive_will(TelnetOption::TTYPE);
        assert_eq!(
            opts.state(TelnetSide::Remote, TelnetOption::TTYPE),
            NegotiationState::Enabled
        );
    }

    #[test]
    fn cancel_pending_resolves_everything() {
        let mut opts = server();
        opts.request_remote_enable(TelnetOption::TTYPE).unwrap();
        opts.request_local_enable(TelnetOption::Echo).unwrap();
        let cancelled = opts.cancel_pending();
        assert_eq!(cancelled.len(), 2);
        assert_eq!(
            opts.state(TelnetSide::Remote, TelnetOption::TTYPE),
            NegotiationState::Disabled
        );
        assert_eq!(
            opts.state(TelnetSide::Local, TelnetOption::Echo),
            NegotiationState::Disabled
        );
    }
}
