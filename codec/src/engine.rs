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

//! Session-level protocol state: everything the per-option sub-protocols
//! accumulate over the life of a connection, plus the hooks that fire when
//! a negotiation settles.

use crate::args::charset::{CharsetCommand, select_charset};
use crate::args::environ::{EnvEntry, EnvKind, EnvironCommand};
use crate::args::lflow::FlowLevel;
use crate::args::linemode::{ForwardMask, ForwardMaskCommand, LinemodeCommand, LinemodeMode};
use crate::args::naws::WindowSize;
use crate::args::status::{StatusPayload, StatusVerb};
use crate::args::strings::{SendLocation, StringCommand};
use crate::args::ttype::TtypeCommand;
use crate::args::TelnetSubnegotiation;
use crate::consts;
use crate::event::TelnetEvent;
use crate::options::{TelnetOption, TelnetOptions, TelnetRole, TelnetSide};
use crate::slc::SlcTable;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Knobs the application sets before driving the engine. These are the
/// values the engine advertises when the peer asks; everything else about
/// the session is negotiated.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Terminal type answered to TTYPE SEND (client role)
    pub term: String,
    /// `(rx, tx)` speeds answered to TSPEED SEND (client role)
    pub speed: (u32, u32),
    /// X display answered to XDISPLOC SEND (client role)
    pub xdisploc: String,
    /// Location answered via SNDLOC
    pub sndloc: String,
    /// Environment values offered through NEW-ENVIRON, in announcement
    /// order. Only names listed here are ever revealed.
    pub send_environ: Vec<(String, String)>,
    /// Character sets this engine can actually encode/decode, preference
    /// first. Offered in CHARSET REQUEST and matched against peer offers.
    pub charsets: Vec<String>,
    /// Never emit IAC GA even when the peer has not suppressed it
    pub never_send_ga: bool,
    /// Treat both directions as BINARY regardless of negotiation
    pub force_binary: bool,
    /// Seed SLC table; defaults to the BSD bindings
    pub slc_table: SlcTable,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            term: "unknown".to_string(),
            speed: (38400, 38400),
            xdisploc: String::new(),
            sndloc: String::new(),
            send_environ: Vec::new(),
            charsets: vec!["UTF-8".to_string(), "US-ASCII".to_string()],
            never_send_ga: false,
            force_binary: false,
            slc_table: SlcTable::default(),
        }
    }
}

/// The engine's effective input discipline, derived from negotiated state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionMode {
    /// Half-duplex NVT default: neither SGA nor ECHO in effect
    Local,
    /// Peer performs LINEMODE: lines and SLC functions arrive whole
    Remote,
    /// Server-side SGA+ECHO: character-at-a-time with local SLC simulation
    Kludge,
    /// Anything else: raw character-at-a-time
    Character,
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionMode::Local => write!(f, "Local"),
            SessionMode::Remote => write!(f, "Remote"),
            SessionMode::Kludge => write!(f, "Kludge"),
            SessionMode::Character => write!(f, "Character"),
        }
    }
}

/// Remote flow control state (RFC 1372).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FlowState {
    /// Flow control is in effect
    pub enabled: bool,
    /// Any byte (not just XON) restarts paused output
    pub restart_any: bool,
    /// Output is currently paused by XOFF
    pub paused: bool,
}

impl Default for FlowState {
    fn default() -> Self {
        FlowState {
            enabled: true,
            restart_any: false,
            paused: false,
        }
    }
}

/// Negotiated LINEMODE state.
#[derive(Clone, Debug, Default)]
pub struct LinemodeState {
    /// The mode currently in effect (ACK bit stripped)
    pub mode: LinemodeMode,
    /// The mode has completed its acknowledgement round trip
    pub edit_ack: bool,
    /// Our unacknowledged proposal, when one is outstanding
    pub proposed: Option<LinemodeMode>,
    /// The peer's forwardmask, stored but not enforced
    pub forward_mask: Option<ForwardMask>,
}

/// An environment variable received from the peer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvValue {
    /// The value as announced
    pub value: String,
    /// Which namespace the variable came from
    pub kind: EnvKind,
}

/// An immutable view of the negotiated session, handed to callers. The
/// engine exclusively owns the live state; mutation happens only through
/// engine methods.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    /// The engine's role
    pub role: TelnetRole,
    /// Effective input discipline
    pub mode: SessionMode,
    /// Peer window dimensions from NAWS
    pub naws: Option<crate::args::naws::WindowSize>,
    /// Terminal types received through TTYPE cycling, in order
    pub ttype_chain: Vec<String>,
    /// Environment received through NEW-ENVIRON
    pub environ: HashMap<String, EnvValue>,
    /// Agreed character set, normalised, if any
    pub charset: Option<String>,
    /// Peer terminal speeds from TSPEED
    pub tspeed: Option<(u32, u32)>,
    /// Peer X display from XDISPLOC
    pub xdisploc: Option<String>,
    /// Peer location from SNDLOC
    pub sndloc: Option<String>,
    /// LINEMODE state
    pub linemode: LinemodeState,
    /// Remote flow control state
    pub lflow: FlowState,
    /// The live SLC table
    pub slc: SlcTable,
    /// Options in effect on our side
    pub local_enabled: Vec<TelnetOption>,
    /// Options the peer performs
    pub remote_enabled: Vec<TelnetOption>,
}

/// What one engine step produced: frames already encoded by the caller and
/// events to surface. Replies here are subnegotiations and option verbs the
/// protocol itself demands.
#[derive(Debug, Default)]
pub(crate) struct SessionOutcome {
    /// Subnegotiation replies to frame and transmit
    pub replies: Vec<TelnetSubnegotiation>,
    /// Events to surface to the application
    pub events: Vec<TelnetEvent>,
}

/// Accumulated per-connection protocol state. Owned by the engine; callers
/// see it only through [`crate::TelnetCodec::snapshot`].
#[derive(Clone, Debug)]
pub struct SessionState {
    role: TelnetRole,
    config: SessionConfig,
    /// Window dimensions from NAWS, most recent
    pub(crate) naws: Option<WindowSize>,
    /// Terminal types received through TTYPE cycling, in order
    pub(crate) ttype_chain: Vec<String>,
    ttype_cycle_done: bool,
    ttype_sends: usize,
    /// Environment received through NEW-ENVIRON
    pub(crate) environ: HashMap<String, EnvValue>,
    /// Character set agreed through CHARSET, normalised
    pub(crate) charset: Option<String>,
    /// Peer terminal speeds from TSPEED
    pub(crate) tspeed: Option<(u32, u32)>,
    /// Peer X display from XDISPLOC
    pub(crate) xdisploc: Option<String>,
    /// Peer location from SNDLOC
    pub(crate) sndloc: Option<String>,
    /// LINEMODE mode/ack/forwardmask state
    pub(crate) linemode: LinemodeState,
    /// The live SLC table
    pub(crate) slc: SlcTable,
    /// Remote flow control state
    pub(crate) lflow: FlowState,
}

impl SessionState {
    pub(crate) fn new(role: TelnetRole, config: SessionConfig) -> Self {
        let slc = config.slc_table.clone();
        SessionState {
            role,
            config,
            naws: None,
            ttype_chain: Vec::new(),
            ttype_cycle_done: false,
            ttype_sends: 0,
            environ: HashMap::new(),
            charset: None,
            tspeed: None,
            xdisploc: None,
            sndloc: None,
            linemode: LinemodeState::default(),
            slc,
            lflow: FlowState::default(),
        }
    }

    pub(crate) fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Fires exactly once per settled negotiation; the option table
    /// guarantees a single settle per transition. Dependent protocol
    /// traffic (TTYPE SEND, CHARSET REQUEST, NAWS report, ...) starts here.
    pub(crate) fn on_settled(
        &mut self,
        option: TelnetOption,
        side: TelnetSide,
        enabled: bool,
    ) -> SessionOutcome {
        let mut outcome = SessionOutcome::default();
        if !enabled {
            if option == TelnetOption::Linemode && side == TelnetSide::Remote {
                self.linemode = LinemodeState::default();
            }
            return outcome;
        }
        match (self.role, side, option) {
            (TelnetRole::Server, TelnetSide::Remote, TelnetOption::TTYPE) => {
                self.ttype_sends = 1;
                outcome
                    .replies
                    .push(TelnetSubnegotiation::TerminalType(TtypeCommand::Send));
            }
            (TelnetRole::Server, TelnetSide::Remote, TelnetOption::TSPEED) => {
                outcome
                    .replies
                    .push(TelnetSubnegotiation::TerminalSpeed(StringCommand::Send));
            }
            (TelnetRole::Server, TelnetSide::Remote, TelnetOption::XDISPLOC) => {
                outcome
                    .replies
                    .push(TelnetSubnegotiation::DisplayLocation(StringCommand::Send));
            }
            (TelnetRole::Server, TelnetSide::Remote, TelnetOption::NewEnvironment) => {
                // An empty SEND asks for everything.
                outcome
                    .replies
                    .push(TelnetSubnegotiation::Environ(EnvironCommand::Send(vec![])));
            }
            (TelnetRole::Server, TelnetSide::Local, TelnetOption::Charset) => {
                if self.charset.is_none() && !self.config.charsets.is_empty() {
                    outcome.replies.push(TelnetSubnegotiation::Charset(
                        CharsetCommand::request(self.config.charsets.clone()),
                    ));
                }
            }
            (TelnetRole::Server, TelnetSide::Remote, TelnetOption::Linemode) => {
                // Propose the conventional editing mode; in effect only
                // after the client acknowledges.
                let proposal = LinemodeMode {
                    edit: true,
                    trapsig: true,
                    ..Default::default()
                };
                self.linemode.proposed = Some(proposal);
                outcome
                    .replies
                    .push(TelnetSubnegotiation::Linemode(LinemodeCommand::Mode(
                        proposal,
                    )));
            }
            (TelnetRole::Client, TelnetSide::Local, TelnetOption::NAWS) => {
                // The client reports dimensions as soon as NAWS is agreed.
                let size = self.naws.unwrap_or(WindowSize::new(80, 24));
                outcome
                    .replies
                    .push(TelnetSubnegotiation::WindowSize(size));
            }
            (TelnetRole::Client, TelnetSide::Local, TelnetOption::Linemode) => {
                // Announce our SLC bindings for negotiation.
                outcome
                    .replies
                    .push(TelnetSubnegotiation::Linemode(LinemodeCommand::Slc(
                        self.slc.export(),
                    )));
            }
            _ => {}
        }
        outcome
    }

    /// Route one complete, parsed subnegotiation to its protocol handler.
    pub(crate) fn handle_subnegotiation(
        &mut self,
        payload: TelnetSubnegotiation,
        options: &TelnetOptions,
    ) -> SessionOutcome {
        let mut outcome = SessionOutcome::default();
        match &payload {
            TelnetSubnegotiation::WindowSize(size) => {
                self.naws = Some(*size);
            }
            TelnetSubnegotiation::TerminalType(command) => {
                self.handle_ttype(command, &mut outcome);
            }
            TelnetSubnegotiation::TerminalSpeed(command) => match command {
                StringCommand::Send => {
                    let (rx, tx) = self.config.speed;
                    outcome.replies.push(TelnetSubnegotiation::TerminalSpeed(
                        StringCommand::Is(format!("{rx},{tx}")),
                    ));
                }
                StringCommand::Is(_) => {
                    self.tspeed = command.parse_speeds();
                    if self.tspeed.is_none() {
                        warn!("TSPEED IS with unparsable speed pair");
                    }
                }
            },
            TelnetSubnegotiation::DisplayLocation(command) => match command {
                StringCommand::Send => {
                    outcome.replies.push(TelnetSubnegotiation::DisplayLocation(
                        StringCommand::Is(self.config.xdisploc.clone()),
                    ));
                }
                StringCommand::Is(display) => {
                    self.xdisploc = Some(display.clone());
                }
            },
            TelnetSubnegotiation::SendLocation(SendLocation(location)) => {
                self.sndloc = Some(location.clone());
            }
            TelnetSubnegotiation::Environ(command) => {
                self.handle_environ(command, &mut outcome);
            }
            TelnetSubnegotiation::Charset(command) => {
                self.handle_charset(command, &mut outcome);
            }
            TelnetSubnegotiation::Linemode(command) => {
                self.handle_linemode(command, &mut outcome);
            }
            TelnetSubnegotiation::FlowControl(level) => {
                match level {
                    FlowLevel::Off => self.lflow.enabled = false,
                    FlowLevel::On => self.lflow.enabled = true,
                    FlowLevel::RestartAny => self.lflow.restart_any = true,
                    FlowLevel::RestartXon => self.lflow.restart_any = false,
                }
                debug!("flow control now {:?}", self.lflow);
            }
            TelnetSubnegotiation::Status(status) => {
                self.handle_status(status, options, &mut outcome);
            }
            TelnetSubnegotiation::Unknown(option, bytes) => {
                debug!("unhandled subnegotiation for {option}: {} bytes", bytes.len());
            }
        }
        outcome.events.push(TelnetEvent::Subnegotiation(payload));
        outcome
    }

    fn handle_ttype(&mut self, command: &TtypeCommand, outcome: &mut SessionOutcome) {
        match command {
            TtypeCommand::Send => {
                outcome.replies.push(TelnetSubnegotiation::TerminalType(
                    TtypeCommand::Is(self.config.term.clone()),
                ));
            }
            TtypeCommand::Is(name) => {
                if self.ttype_cycle_done {
                    debug!("TTYPE IS after cycle completed; ignoring {name}");
                    return;
                }
                let repeated = self
                    .ttype_chain
                    .last()
                    .is_some_and(|last| last.eq_ignore_ascii_case(name));
                if repeated {
                    self.ttype_cycle_done = true;
                    debug!("TTYPE cycle terminated after {} entries", self.ttype_chain.len());
                } else {
                    self.ttype_chain.push(name.clone());
                    if self.ttype_sends < consts::TTYPE_LOOPMAX {
                        self.ttype_sends += 1;
                        outcome
                            .replies
                            .push(TelnetSubnegotiation::TerminalType(TtypeCommand::Send));
                    } else {
                        self.ttype_cycle_done = true;
                        warn!("TTYPE cycle hit the hard cap; stopping");
                    }
                }
            }
        }
    }

    fn handle_environ(&mut self, command: &EnvironCommand, outcome: &mut SessionOutcome) {
        match command {
            EnvironCommand::Send(requests) => {
                let entries: Vec<EnvEntry> = if requests.is_empty() {
                    self.config
                        .send_environ
                        .iter()
                        .map(|(name, value)| EnvEntry {
                            kind: EnvKind::Var,
                            name: name.clone(),
                            value: value.clone(),
                        })
                        .collect()
                } else {
                    requests
                        .iter()
                        .filter(|request| !request.name.is_empty())
                        .map(|request| EnvEntry {
                            kind: request.kind,
                            name: request.name.clone(),
                            value: self
                                .config
                                .send_environ
                                .iter()
                                .find(|(name, _)| *name == request.name)
                                .map(|(_, value)| value.clone())
                                .unwrap_or_default(),
                        })
                        .collect()
                };
                outcome
                    .replies
                    .push(TelnetSubnegotiation::Environ(EnvironCommand::Is(entries)));
            }
            EnvironCommand::Is(entries) | EnvironCommand::Info(entries) => {
                for entry in entries {
                    self.environ.insert(
                        entry.name.clone(),
                        EnvValue {
                            value: entry.value.clone(),
                            kind: entry.kind,
                        },
                    );
                }
            }
        }
    }

    fn handle_charset(&mut self, command: &CharsetCommand, outcome: &mut SessionOutcome) {
        use crate::args::charset::normalize_charset;
        match command {
            CharsetCommand::Request { charsets, .. } => {
                match select_charset(charsets, &self.config.charsets) {
                    Some(selected) => {
                        self.charset = Some(normalize_charset(selected));
                        outcome.replies.push(TelnetSubnegotiation::Charset(
                            CharsetCommand::Accepted(selected.to_string()),
                        ));
                    }
                    None => {
                        info!("no offered charset is usable: {charsets:?}");
                        outcome
                            .replies
                            .push(TelnetSubnegotiation::Charset(CharsetCommand::Rejected));
                    }
                }
            }
            CharsetCommand::Accepted(name) => {
                self.charset = Some(normalize_charset(name));
            }
            CharsetCommand::Rejected => {
                info!("peer rejected our charset offer");
            }
            CharsetCommand::TtableIs(_) => {
                // Translate tables are acknowledged, never interpreted.
                outcome
                    .replies
                    .push(TelnetSubnegotiation::Charset(CharsetCommand::TtableRejected));
            }
            CharsetCommand::TtableRejected
            | CharsetCommand::TtableAck
            | CharsetCommand::TtableNak => {
                debug!("charset ttable ack traffic ignored");
            }
        }
    }

    fn handle_linemode(&mut self, command: &LinemodeCommand, outcome: &mut SessionOutcome) {
        match command {
            LinemodeCommand::Mode(mode) => {
                if mode.ack {
                    match self.linemode.proposed {
                        Some(proposed) if proposed.same_flags(*mode) => {
                            self.linemode.mode = LinemodeMode {
                                ack: false,
                                ..*mode
                            };
                            self.linemode.edit_ack = true;
                            self.linemode.proposed = None;
                        }
                        _ => {
                            warn!("MODE ack {mode} does not match any outstanding proposal");
                        }
                    }
                } else if self.linemode.edit_ack && self.linemode.mode.same_flags(*mode) {
                    // Re-proposal of the mode in effect is a no-op, never
                    // re-acknowledged.
                    debug!("MODE re-proposal of current mode; ignoring");
                } else {
                    // Peer proposal: adopt and acknowledge.
                    self.linemode.mode = LinemodeMode {
                        ack: false,
                        ..*mode
                    };
                    self.linemode.edit_ack = true;
                    outcome
                        .replies
                        .push(TelnetSubnegotiation::Linemode(LinemodeCommand::Mode(
                            mode.acked(),
                        )));
                }
            }
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Set(mask)) => {
                // Stored and reported, never enforced.
                self.linemode.forward_mask = Some(*mask);
                debug!("forwardmask stored");
                if self.role == TelnetRole::Client {
                    outcome.replies.push(TelnetSubnegotiation::Linemode(
                        LinemodeCommand::ForwardMask(ForwardMaskCommand::Ack(true)),
                    ));
                }
            }
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Clear) => {
                self.linemode.forward_mask = None;
            }
            LinemodeCommand::ForwardMask(ForwardMaskCommand::Ack(willing)) => {
                debug!("peer {} forwardmask", if *willing { "accepted" } else { "refused" });
            }
            LinemodeCommand::Slc(triples) => {
                let mut replies = Vec::new();
                for triple in triples {
                    if let Some(reply) = self.slc.negotiate(*triple) {
                        replies.push(reply);
                    }
                }
                if !replies.is_empty() {
                    outcome
                        .replies
                        .push(TelnetSubnegotiation::Linemode(LinemodeCommand::Slc(replies)));
                }
            }
        }
    }

    fn handle_status(
        &mut self,
        status: &StatusPayload,
        options: &TelnetOptions,
        outcome: &mut SessionOutcome,
    ) {
        match status {
            StatusPayload::Send => {
                let mut pairs = Vec::new();
                for option in options.enabled_options(TelnetSide::Local) {
                    pairs.push((StatusVerb::Will, option));
                }
                for option in options.enabled_options(TelnetSide::Remote) {
                    pairs.push((StatusVerb::Do, option));
                }
                outcome
                    .replies
                    .push(TelnetSubnegotiation::Status(StatusPayload::Is(pairs)));
            }
            StatusPayload::Is(pairs) => {
                // Disagreements are logged, never renegotiated.
                for (verb, option) in pairs {
                    let (side, claims_enabled) = match verb {
                        // The peer reports its own side with WILL/WONT.
                        StatusVerb::Will => (TelnetSide::Remote, true),
                        StatusVerb::Wont => (TelnetSide::Remote, false),
                        StatusVerb::Do => (TelnetSide::Local, true),
                        StatusVerb::Dont => (TelnetSide::Local, false),
                    };
                    let actual = match side {
                        TelnetSide::Local => options.local_enabled(*option),
                        TelnetSide::Remote => options.remote_enabled(*option),
                    };
                    if actual != claims_enabled {
                        warn!(
                            "STATUS disagreement: peer sees {side} {option} as {}, we see {}",
                            claims_enabled, actual
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TelnetOptions;

    fn server_session() -> (SessionState, TelnetOptions) {
        (
            SessionState::new(TelnetRole::Server, SessionConfig::default()),
            TelnetOptions::new(TelnetRole::Server),
        )
    }

    #[test]
    fn ttype_enable_starts_the_cycle() {
        let (mut session, _) = server_session();
        let outcome = session.on_settled(TelnetOption::TTYPE, TelnetSide::Remote, true);
        assert_eq!(
            outcome.replies,
            vec![TelnetSubnegotiation::TerminalType(TtypeCommand::Send)]
        );
    }

    #[test]
    fn ttype_cycle_terminates_on_repeat() {
        let (mut session, opts) = server_session();
        session.on_settled(TelnetOption::TTYPE, TelnetSide::Remote, true);
        let outcome = session.handle_subnegotiation(
            TelnetSubnegotiation::TerminalType(TtypeCommand::Is("xterm".into())),
            &opts,
        );
        assert_eq!(
            outcome.replies,
            vec![TelnetSubnegotiation::TerminalType(TtypeCommand::Send)]
        );
        session.handle_subnegotiation(
            TelnetSubnegotiation::TerminalType(TtypeCommand::Is("xterm-256color".into())),
            &opts,
        );
        // Case-insensitive repeat of the previous value terminates.
        let outcome = session.handle_subnegotiation(
            TelnetSubnegotiation::TerminalType(TtypeCommand::Is("XTERM-256COLOR".into())),
            &opts,
        );
        assert!(outcome.replies.is_empty());
        assert_eq!(session.ttype_chain, vec!["xterm", "xterm-256color"]);
        assert!(session.ttype_cycle_done);
    }

    #[test]
    fn ttype_cycle_respects_hard_cap() {
        let (mut session, opts) = server_session();
        session.on_settled(TelnetOption::TTYPE, TelnetSide::Remote, true);
        for round in 0..consts::TTYPE_LOOPMAX + 5 {
            session.handle_subnegotiation(
                TelnetSubnegotiation::TerminalType(TtypeCommand::Is(format!("term-{round}"))),
                &opts,
            );
        }
        assert!(session.ttype_cycle_done);
        assert_eq!(session.ttype_chain.len(), consts::TTYPE_LOOPMAX);
    }

    #[test]
    fn environ_send_all_uses_allowlist() {
        let mut config = SessionConfig::default();
        config.send_environ = vec![
            ("USER".into(), "alice".into()),
            ("LANG".into(), "en_US.UTF-8".into()),
        ];
        let mut session = SessionState::new(TelnetRole::Client, config);
        let opts = TelnetOptions::new(TelnetRole::Client);
        let outcome = session.handle_subnegotiation(
            TelnetSubnegotiation::Environ(EnvironCommand::Send(vec![])),
            &opts,
        );
        let TelnetSubnegotiation::Environ(EnvironCommand::Is(entries)) = &outcome.replies[0]
        else {
            panic!("expected IS reply");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "USER");
        assert_eq!(entries[0].value, "alice");
    }

    #[test]
    fn environ_is_merges_by_namespace() {
        let (mut session, opts) = server_session();
        session.handle_subnegotiation(
            TelnetSubnegotiation::Environ(EnvironCommand::Is(vec![EnvEntry {
                kind: EnvKind::Var,
                name: "TERM".into(),
                value: "xterm".into(),
            }])),
            &opts,
        );
        assert_eq!(session.environ["TERM"].value, "xterm");
    }

    #[test]
    fn charset_request_selects_first_supported() {
        let (mut session, opts) = server_session();
        let outcome = session.handle_subnegotiation(
            TelnetSubnegotiation::Charset(CharsetCommand::request(vec![
                "EBCDIC-US",
                "ISO-8859-02",
                "UTF-8",
            ])),
            &opts,
        );
        // Engine supports UTF-8 and US-ASCII by default; 8859-2 is not in
        // the list, so UTF-8 wins despite coming last.
        assert_eq!(
            outcome.replies,
            vec![TelnetSubnegotiation::Charset(CharsetCommand::Accepted(
                "UTF-8".into()
            ))]
        );
        assert_eq!(session.charset.as_deref(), Some("utf-8"));
    }

    #[test]
    fn charset_request_rejects_unusable_offers() {
        let (mut session, opts) = server_session();
        let outcome = session.handle_subnegotiation(
            TelnetSubnegotiation::Charset(CharsetCommand::request(vec!["KOI8-R"])),
            &opts,
        );
        assert_eq!(
            outcome.replies,
            vec![TelnetSubnegotiation::Charset(CharsetCommand::Rejected)]
        );
        assert_eq!(session.charset, None);
    }

    #[test]
    fn linemode_proposal_requires_ack_round_trip() {
        let (mut session, opts) = server_session();
        session.on_settled(TelnetOption::Linemode, TelnetSide::Remote, true);
        assert!(session.linemode.proposed.is_some());
        assert!(!session.linemode.edit_ack);
        session.handle_subnegotiation(
            TelnetSubnegotiation::Linemode(LinemodeCommand::Mode(LinemodeMode {
                edit: true,
                trapsig: true,
                ack: true,
                ..Default::default()
            })),
            &opts,
        );
        assert!(session.linemode.edit_ack);
        assert!(session.linemode.mode.edit && session.linemode.mode.trapsig);
        assert!(!session.linemode.mode.ack);
    }

    #[test]
    fn linemode_reproposal_is_not_reacknowledged() {
        let (mut session, opts) = server_session();
        let proposal = LinemodeMode {
            edit: true,
            trapsig: true,
            ..Default::default()
        };
        // Adopt a peer proposal once; it is acknowledged.
        let outcome = session.handle_subnegotiation(
            TelnetSubnegotiation::Linemode(LinemodeCommand::Mode(proposal)),
            &opts,
        );
        assert_eq!(outcome.replies.len(), 1);
        // The identical proposal again produces nothing.
        let outcome = session.handle_subnegotiation(
            TelnetSubnegotiation::Linemode(LinemodeCommand::Mode(proposal)),
            &opts,
        );
        assert!(outcome.replies.is_empty());
    }

    #[test]
    fn forwardmask_is_stored_not_enforced() {
        let (mut session, opts) = server_session();
        session.handle_subnegotiation(
            TelnetSubnegotiation::Linemode(LinemodeCommand::ForwardMask(
                ForwardMaskCommand::Set(ForwardMask { mask: [0xFF; 32] }),
            )),
            &opts,
        );
        assert!(session.linemode.forward_mask.is_some());
        session.handle_subnegotiation(
            TelnetSubnegotiation::Linemode(LinemodeCommand::ForwardMask(
                ForwardMaskCommand::Clear,
            )),
            &opts,
        );
        assert!(session.linemode.forward_mask.is_none());
    }

    #[test]
    fn status_send_mirrors_enabled_sides() {
        let (mut session, mut opts) = server_session();
        opts.receive_will(TelnetOption::NAWS);
        opts.request_local_enable(TelnetOption::Echo).unwrap();
        opts.receive_do(TelnetOption::Echo);
        let outcome =
            session.handle_subnegotiation(TelnetSubnegotiation::Status(StatusPayload::Send), &opts);
        let TelnetSubnegotiation::Status(StatusPayload::Is(pairs)) = &outcome.replies[0] else {
            panic!("expected IS reply");
        };
        assert!(pairs.contains(&(StatusVerb::Will, TelnetOption::Echo)));
        assert!(pairs.contains(&(StatusVerb::Do, TelnetOption::NAWS)));
    }

    #[test]
    fn status_is_disagreement_is_logged_only() {
        let (mut session, opts) = server_session();
        // Peer claims WILL NAWS, we have nothing enabled: no replies, no
        // renegotiation, just the surfaced subnegotiation event.
        let outcome = session.handle_subnegotiation(
            TelnetSubnegotiation::Status(StatusPayload::Is(vec![(
                StatusVerb::Will,
                TelnetOption::NAWS,
            )])),
            &opts,
        );
        assert!(outcome.replies.is_empty());
    }

    #[test]
    fn lflow_levels_update_state() {
        let (mut session, opts) = server_session();
        session.handle_subnegotiation(
            TelnetSubnegotiation::FlowControl(FlowLevel::RestartAny),
            &opts,
        );
        assert!(session.lflow.restart_any);
        session.handle_subnegotiation(TelnetSubnegotiation::FlowControl(FlowLevel::Off), &opts);
        assert!(!session.lflow.enabled);
    }
}
