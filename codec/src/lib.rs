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

//! # Telnetry Protocol Codec
//!
//! A complete telnet protocol engine (RFC 854 and the standard option
//! suite): a bidirectional, byte-oriented state machine that turns raw
//! incoming bytes into typed events, negotiates options without loops or
//! redundant traffic, runs the per-option subnegotiation protocols, and
//! frames outbound data with correct IAC escaping and line-ending policy.
//!
//! ## Architecture
//!
//! The engine owns no transport. The driver pushes received bytes in
//! through the [`tokio_util::codec::Decoder`] implementation on
//! [`TelnetCodec`] and pulls queued protocol replies from
//! [`TelnetCodec::take_output`]; every step is a pure function over session
//! state, which makes whole sessions replayable byte-for-byte in tests.
//!
//! ```text
//! bytes in ──▶ decoder ──▶ negotiation ──▶ subnegotiation ──▶ events out
//!                │              │                │
//!                └──────────────┴────────────────┴──▶ outbound queue ──▶ bytes out
//! ```
//!
//! Three layers cooperate:
//!
//! - [`TelnetCodec`] — the IAC decoder, option negotiation table and
//!   per-option protocols (TTYPE cycling, CHARSET selection, NEW-ENVIRON
//!   exchange, LINEMODE with SLC, NAWS, STATUS, LFLOW, ...).
//! - [`LineEditor`] — input editing and line terminator normalisation,
//!   driven by the mode the negotiation derived (local, remote, kludge or
//!   character-at-a-time).
//! - [`SessionSnapshot`] — the immutable view callers read; mutation only
//!   ever happens inside the engine.
//!
//! ## Usage Example
//!
//! ```rust
//! use telnetry_codec::{TelnetCodec, TelnetEvent, TelnetOption, TelnetRole};
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut engine = TelnetCodec::new(TelnetRole::Server);
//! engine.request_remote_enable(TelnetOption::NAWS).unwrap();
//! // ... write engine.take_output() to the transport ...
//!
//! let mut input = BytesMut::from(&b"\xFF\xFB\x1F"[..]); // WILL NAWS
//! while let Some(event) = engine.decode(&mut input).unwrap() {
//!     if let TelnetEvent::OptionStatus(option, side, enabled) = event {
//!         println!("{option} on {side} side: {enabled}");
//!     }
//! }
//! ```
//!
//! ## Error Handling
//!
//! Peer misbehaviour — malformed subnegotiations, unknown commands,
//! reversed-direction requests — is answered or logged and recovered from;
//! it never reaches the application as an error. [`CodecError`] is reserved
//! for I/O failure and caller misuse (such as issuing a second negotiation
//! request while one is pending), which fail fast without wire traffic.
//!
//! ## Related RFCs
//!
//! RFC 854 (protocol), 855 (options), 856 (BINARY), 857 (ECHO), 858 (SGA),
//! 859 (STATUS), 860 (TM), 885 (EOR), 1073 (NAWS), 1079 (TSPEED),
//! 1091 (TTYPE), 1096 (XDISPLOC), 1184 (LINEMODE), 1372 (LFLOW),
//! 1572 (NEW-ENVIRON), 2066 (CHARSET), 727 (LOGOUT), 779 (SNDLOC).

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

pub mod args;
mod codec;
pub mod consts;
mod editor;
mod engine;
mod event;
mod frame;
mod options;
mod result;
pub mod slc;

pub use self::args::TelnetSubnegotiation;
pub use self::codec::TelnetCodec;
pub use self::editor::{InputEvent, LineEditor, normalize_newlines};
pub use self::engine::{
    EnvValue, FlowState, LinemodeState, SessionConfig, SessionMode, SessionSnapshot,
};
pub use self::event::TelnetEvent;
pub use self::frame::TelnetFrame;
pub use self::options::{NegotiationState, TelnetOption, TelnetOptions, TelnetRole, TelnetSide};
pub use self::result::{CodecError, CodecResult, SubnegotiationErrorKind};

#[cfg(test)]
mod tests {
    use super::{TelnetCodec, TelnetEvent, TelnetOption, TelnetRole, TelnetSide, consts};
    use bytes::BytesMut;
    use tokio_util::codec::{Decoder, Encoder};

    #[test]
    fn telnet_decode_plain_stream() {
        let mut codec = TelnetCodec::new(TelnetRole::Server);
        let mut input = BytesMut::from("Terminated line\r\n");
        let mut actual = Vec::new();
        while let Some(event) = codec.decode(&mut input).unwrap() {
            actual.push(event);
        }
        let expected: Vec<TelnetEvent> = b"Terminated line\r\n"
            .iter()
            .map(|&byte| TelnetEvent::Data(byte))
            .collect();
        assert_eq!(expected, actual, "telnet_decode didn't match");
    }

    #[test]
    fn telnet_encode_plain_stream() {
        let mut codec = TelnetCodec::new(TelnetRole::Server);
        let mut actual = BytesMut::with_capacity(20);
        for &byte in b"Raw Ascii Data\r\n" {
            codec.encode(byte, &mut actual).unwrap();
        }
        assert_eq!(
            BytesMut::from(&b"Raw Ascii Data\r\n"[..]),
            actual,
            "telnet_encode didn't match"
        );
    }

    #[test]
    fn decode_interleaved_negotiation() {
        let mut codec = TelnetCodec::new(TelnetRole::Server);
        let mut input = BytesMut::new();
        input.extend_from_slice(b"Login:\r\n");
        input.extend_from_slice(&[consts::IAC, consts::DO, consts::option::BINARY]);
        input.extend_from_slice(b"ok");
        let mut actual = Vec::new();
        while let Some(event) = codec.decode(&mut input).unwrap() {
            actual.push(event);
        }
        let mut expected: Vec<TelnetEvent> = b"Login:\r\n"
            .iter()
            .map(|&byte| TelnetEvent::Data(byte))
            .collect();
        expected.push(TelnetEvent::OptionStatus(
            TelnetOption::TransmitBinary,
            TelnetSide::Local,
            true,
        ));
        expected.extend(b"ok".iter().map(|&byte| TelnetEvent::Data(byte)));
        assert_eq!(expected, actual);
        assert_eq!(
            &codec.take_output()[..],
            &[consts::IAC, consts::WILL, consts::option::BINARY]
        );
    }
}
