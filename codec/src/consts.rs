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

//! Telnet protocol constants (RFC 854 and friends).

/// Carriage Return
pub const CR: u8 = 0x0D;
/// Line Feed
pub const LF: u8 = 0x0A;
/// NUL, the CR-padding byte of the NVT
pub const NUL: u8 = 0x00;
/// Horizontal Tab
pub const HT: u8 = 0x09;

/// End of File (RFC 1184 extended command)
pub const EOF: u8 = 236;
/// Suspend Process (RFC 1184 extended command)
pub const SUSP: u8 = 237;
/// Abort Process (RFC 1184 extended command)
pub const ABORT: u8 = 238;
/// End of Record command (RFC 885); distinct from [`option::EOR`]
pub const EOR: u8 = 239;
/// Subnegotiation End
pub const SE: u8 = 240;
/// No Operation
pub const NOP: u8 = 241;
/// Data Mark
pub const DM: u8 = 242;
/// Break
pub const BRK: u8 = 243;
/// Interrupt Process
pub const IP: u8 = 244;
/// Abort Output
pub const AO: u8 = 245;
/// Are You There
pub const AYT: u8 = 246;
/// Erase Character
pub const EC: u8 = 247;
/// Erase Line
pub const EL: u8 = 248;
/// Go Ahead
pub const GA: u8 = 249;
/// Subnegotiation Begin
pub const SB: u8 = 250;
/// Will perform option
pub const WILL: u8 = 251;
/// Won't perform option
pub const WONT: u8 = 252;
/// Request peer perform option
pub const DO: u8 = 253;
/// Request peer not perform option
pub const DONT: u8 = 254;
/// Interpret As Command
pub const IAC: u8 = 255;

/// Telnet option codes from the
/// [IANA registry](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml).
pub mod option {
    /// Binary Transmission (RFC 856)
    pub const BINARY: u8 = 0;
    /// Echo (RFC 857)
    pub const ECHO: u8 = 1;
    /// Reconnection (NIC 50005)
    pub const RCP: u8 = 2;
    /// Suppress Go Ahead (RFC 858)
    pub const SGA: u8 = 3;
    /// Negotiate Approximate Message Size
    pub const NAMS: u8 = 4;
    /// Status (RFC 859)
    pub const STATUS: u8 = 5;
    /// Timing Mark (RFC 860)
    pub const TM: u8 = 6;
    /// Remote Controlled Transmission and Echo (RFC 726)
    pub const RCTE: u8 = 7;
    /// Output Line Width
    pub const NAOL: u8 = 8;
    /// Output Page Size
    pub const NAOP: u8 = 9;
    /// Output Carriage-Return Disposition (RFC 652)
    pub const NAOCRD: u8 = 10;
    /// Output Horizontal Tab Stops (RFC 653)
    pub const NAOHTS: u8 = 11;
    /// Output Horizontal Tab Disposition (RFC 654)
    pub const NAOHTD: u8 = 12;
    /// Output Formfeed Disposition (RFC 655)
    pub const NAOFFD: u8 = 13;
    /// Output Vertical Tabstops (RFC 656)
    pub const NAOVTS: u8 = 14;
    /// Output Vertical Tab Disposition (RFC 657)
    pub const NAOVTD: u8 = 15;
    /// Output Linefeed Disposition (RFC 658)
    pub const NAOLFD: u8 = 16;
    /// Extended ASCII (RFC 698)
    pub const XASCII: u8 = 17;
    /// Logout (RFC 727)
    pub const LOGOUT: u8 = 18;
    /// Byte Macro (RFC 735)
    pub const BM: u8 = 19;
    /// Data Entry Terminal (RFC 1043)
    pub const DET: u8 = 20;
    /// SUPDUP (RFC 736)
    pub const SUPDUP: u8 = 21;
    /// SUPDUP Output (RFC 749)
    pub const SUPDUP_OUTPUT: u8 = 22;
    /// Send Location (RFC 779)
    pub const SNDLOC: u8 = 23;
    /// Terminal Type (RFC 1091)
    pub const TTYPE: u8 = 24;
    /// End of Record (RFC 885)
    pub const EOR: u8 = 25;
    /// TACACS User Identification (RFC 927)
    pub const TUID: u8 = 26;
    /// Output Marking (RFC 933)
    pub const OUTMRK: u8 = 27;
    /// Terminal Location Number (RFC 946)
    pub const TTYLOC: u8 = 28;
    /// Telnet 3270 Regime (RFC 1041)
    pub const OPT3270REGIME: u8 = 29;
    /// X.3 PAD (RFC 1053)
    pub const X3PAD: u8 = 30;
    /// Negotiate About Window Size (RFC 1073)
    pub const NAWS: u8 = 31;
    /// Terminal Speed (RFC 1079)
    pub const TSPEED: u8 = 32;
    /// Remote Flow Control (RFC 1372)
    pub const LFLOW: u8 = 33;
    /// Linemode (RFC 1184)
    pub const LINEMODE: u8 = 34;
    /// X Display Location (RFC 1096)
    pub const XDISPLOC: u8 = 35;
    /// Environment Option (RFC 1408, deprecated by NEW_ENVIRON)
    pub const OLD_ENVIRON: u8 = 36;
    /// Authentication (RFC 2941)
    pub const AUTHENTICATION: u8 = 37;
    /// Encryption (RFC 2946)
    pub const ENCRYPTION: u8 = 38;
    /// New Environment (RFC 1572)
    pub const NEW_ENVIRON: u8 = 39;
    /// TN3270E (RFC 2355)
    pub const TN3270E: u8 = 40;
    /// XAUTH
    pub const XAUTH: u8 = 41;
    /// Charset (RFC 2066)
    pub const CHARSET: u8 = 42;
    /// Remote Serial Port
    pub const TRSP: u8 = 43;
    /// Com Port Control (RFC 2217)
    pub const CPCO: u8 = 44;
    /// Suppress Local Echo
    pub const TSLE: u8 = 45;
    /// Start TLS
    pub const START_TLS: u8 = 46;
    /// Kermit (RFC 2840)
    pub const KERMIT: u8 = 47;
    /// SEND-URL
    pub const SENDURL: u8 = 48;
    /// FORWARD_X
    pub const FORWARDX: u8 = 49;
    /// Extended Options List (RFC 861)
    pub const EXOPL: u8 = 255;

    /// TTYPE subnegotiation tokens (RFC 1091)
    pub mod ttype {
        /// Here is my terminal type
        pub const IS: u8 = 0;
        /// Send me your terminal type
        pub const SEND: u8 = 1;
    }

    /// TSPEED subnegotiation tokens (RFC 1079)
    pub mod tspeed {
        /// Here are my terminal speeds
        pub const IS: u8 = 0;
        /// Send me your terminal speeds
        pub const SEND: u8 = 1;
    }

    /// XDISPLOC subnegotiation tokens (RFC 1096)
    pub mod xdisploc {
        /// Here is my X display location
        pub const IS: u8 = 0;
        /// Send me your X display location
        pub const SEND: u8 = 1;
    }

    /// STATUS subnegotiation tokens (RFC 859)
    pub mod status {
        /// Here is my perception of option state
        pub const IS: u8 = 0;
        /// Send me your perception of option state
        pub const SEND: u8 = 1;
    }

    /// NEW-ENVIRON subnegotiation tokens (RFC 1572)
    pub mod environ {
        /// Here are the requested values
        pub const IS: u8 = 0;
        /// Send me your values
        pub const SEND: u8 = 1;
        /// Unsolicited value update
        pub const INFO: u8 = 2;
        /// Well-known variable name follows
        pub const VAR: u8 = 0;
        /// Value follows
        pub const VALUE: u8 = 1;
        /// Escape, next byte is literal
        pub const ESC: u8 = 2;
        /// User-defined variable name follows
        pub const USERVAR: u8 = 3;
    }

    /// CHARSET subnegotiation tokens (RFC 2066)
    pub mod charset {
        /// Offer a delimiter-separated list of charsets
        pub const REQUEST: u8 = 1;
        /// Accept one of the offered charsets
        pub const ACCEPTED: u8 = 2;
        /// Reject all offered charsets
        pub const REJECTED: u8 = 3;
        /// Translate table follows
        pub const TTABLE_IS: u8 = 4;
        /// Translate table rejected
        pub const TTABLE_REJECTED: u8 = 5;
        /// Translate table acknowledged
        pub const TTABLE_ACK: u8 = 6;
        /// Translate table not acknowledged
        pub const TTABLE_NAK: u8 = 7;
    }

    /// LFLOW subnegotiation tokens (RFC 1372)
    pub mod lflow {
        /// Disable remote flow control
        pub const OFF: u8 = 0;
        /// Enable remote flow control
        pub const ON: u8 = 1;
        /// Any byte restarts paused output
        pub const RESTART_ANY: u8 = 2;
        /// Only XON restarts paused output
        pub const RESTART_XON: u8 = 3;
    }

    /// LINEMODE subnegotiation tokens (RFC 1184)
    pub mod linemode {
        /// MODE subcommand
        pub const MODE: u8 = 1;
        /// FORWARDMASK subcommand
        pub const FORWARDMASK: u8 = 2;
        /// SLC subcommand
        pub const SLC: u8 = 3;

        /// MODE flag: client performs line editing
        pub const MODE_EDIT: u8 = 0x01;
        /// MODE flag: client traps signals locally
        pub const MODE_TRAPSIG: u8 = 0x02;
        /// MODE flag: client expands horizontal tabs
        pub const MODE_SOFT_TAB: u8 = 0x08;
        /// MODE flag: non-printables are echoed literally
        pub const MODE_LIT_ECHO: u8 = 0x10;
        /// MODE flag: acknowledgement of a proposed mode
        pub const MODE_ACK: u8 = 0x80;
        /// Mask of flags a peer may legitimately set in a MODE proposal
        pub const MODE_MASK: u8 =
            MODE_EDIT | MODE_TRAPSIG | MODE_SOFT_TAB | MODE_LIT_ECHO | MODE_ACK;
    }
}

/// Hard cap on a single subnegotiation payload; anything longer is malformed.
pub const SB_MAX_LEN: usize = 65_535;

/// Hard cap on TTYPE cycling rounds before the engine gives up.
pub const TTYPE_LOOPMAX: usize = 20;
