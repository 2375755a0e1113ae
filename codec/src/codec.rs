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
use crate::engine::{SessionConfig, SessionMode, SessionState};
use crate::options::{NegotiationOutcome, TelnetOptions};
use crate::{
    CodecError, CodecResult, SessionSnapshot, TelnetEvent, TelnetFrame, TelnetOption, TelnetRole,
    TelnetSide, consts,
};
use bytes::{Buf, BufMut, BytesMut};
use std::collections::VecDeque;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

/// The telnet protocol engine.
///
/// `TelnetCodec` owns the complete per-connection protocol state: the IAC
/// decoder, the option negotiation table, and the per-option session state
/// (TTYPE chain, NAWS dimensions, SLC table, ...). It holds no reference to
/// any transport: the driver pushes received bytes in through the
/// [`Decoder`] implementation and pulls queued outbound bytes from
/// [`TelnetCodec::take_output`]. This one-way ownership keeps every step
/// deterministic and replayable.
///
/// The decoder answers negotiation itself — refusals, acknowledgements,
/// subnegotiation replies — and surfaces only meaningful results as
/// [`TelnetEvent`]s. Peer misbehaviour is logged and recovered from, never
/// raised.
pub struct TelnetCodec {
    decoder_state: DecoderState,
    sb_buffer: BytesMut,
    pending_events: VecDeque<TelnetEvent>,
    outbound: BytesMut,
    /// End of the last protocol frame in `outbound`; data queued after this
    /// point is what a FLUSHOUT discards.
    protocol_watermark: usize,
    options: TelnetOptions,
    session: SessionState,
}

impl TelnetCodec {
    /// An engine for the given role with default configuration.
    pub fn new(role: TelnetRole) -> TelnetCodec {
        Self::with_config(role, SessionConfig::default())
    }

    /// An engine for the given role and advertised configuration.
    pub fn with_config(role: TelnetRole, config: SessionConfig) -> TelnetCodec {
        TelnetCodec {
            decoder_state: DecoderState::NormalData,
            sb_buffer: BytesMut::new(),
            pending_events: VecDeque::new(),
            outbound: BytesMut::new(),
            protocol_watermark: 0,
            options: TelnetOptions::new(role),
            session: SessionState::new(role, config),
        }
    }

    /// The role this engine was created for.
    pub fn role(&self) -> TelnetRole {
        self.options.role()
    }

    // #### Negotiation API #####################################################

    /// True if `option` is in effect on our side.
    pub fn is_enabled_local(&self, option: TelnetOption) -> bool {
        self.options.local_enabled(option)
    }

    /// True if the peer performs `option`.
    pub fn is_enabled_remote(&self, option: TelnetOption) -> bool {
        self.options.remote_enabled(option)
    }

    /// True while any request we initiated awaits a peer reply.
    pub fn has_pending(&self) -> bool {
        self.options.has_pending()
    }

    /// Negotiation state of `option` on `side`, pending states included.
    pub fn negotiation_state(
        &self,
        side: TelnetSide,
        option: TelnetOption,
    ) -> crate::NegotiationState {
        self.options.state(side, option)
    }

    /// Ask to perform `option` ourselves (transmits `IAC WILL opt`).
    ///
    /// Fails fast without wire traffic when a request is already pending,
    /// the option is already enabled, or our role never performs it.
    pub fn request_local_enable(&mut self, option: TelnetOption) -> CodecResult<()> {
        let frame = self.options.request_local_enable(option)?;
        self.queue_frame(&frame);
        Ok(())
    }

    /// Ask the peer to perform `option` (transmits `IAC DO opt`).
    pub fn request_remote_enable(&mut self, option: TelnetOption) -> CodecResult<()> {
        let frame = self.options.request_remote_enable(option)?;
        self.queue_frame(&frame);
        Ok(())
    }

    /// Stop performing `option` ourselves (transmits `IAC WONT opt`).
    pub fn request_local_disable(&mut self, option: TelnetOption) -> CodecResult<()> {
        if let Some(frame) = self.options.request_local_disable(option)? {
            self.queue_frame(&frame);
        }
        Ok(())
    }

    /// Ask the peer to stop performing `option` (transmits `IAC DONT opt`).
    pub fn request_remote_disable(&mut self, option: TelnetOption) -> CodecResult<()> {
        if let Some(frame) = self.options.request_remote_disable(option)? {
            self.queue_frame(&frame);
        }
        Ok(())
    }

    /// Send `IAC DO TM`. Timing Mark is stateless: the peer's WILL/WONT
    /// reply surfaces as [`TelnetEvent::TimingMarkReply`], which makes the
    /// pair a round-trip lag probe.
    pub fn request_timing_mark(&mut self) {
        self.queue_frame(&TelnetFrame::Do(TelnetOption::TimingMark));
    }

    /// Send `IAC DO LOGOUT`, asking the peer to close the session.
    pub fn request_logout(&mut self) {
        self.queue_frame(&TelnetFrame::Do(TelnetOption::Logout));
    }

    /// Ask the peer to mirror its view of the negotiation state
    /// (`IAC SB STATUS SEND IAC SE`).
    pub fn request_status(&mut self) {
        self.queue_subnegotiation(&TelnetSubnegotiation::Status(
            crate::args::status::StatusPayload::Send,
        ));
    }

    /// Resolve every pending request to Disabled, as at connection close,
    /// surfacing an [`TelnetEvent::OptionStatus`] for each so waiters see a
    /// definitive outcome.
    pub fn cancel_pending(&mut self) {
        for (side, option) in self.options.cancel_pending() {
            self.pending_events
                .push_back(TelnetEvent::OptionStatus(option, side, false));
        }
    }

    /// Immutable view of the full negotiated session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            role: self.role(),
            mode: self.mode(),
            naws: self.session.naws,
            ttype_chain: self.session.ttype_chain.clone(),
            environ: self.session.environ.clone(),
            charset: self.session.charset.clone(),
            tspeed: self.session.tspeed,
            xdisploc: self.session.xdisploc.clone(),
            sndloc: self.session.sndloc.clone(),
            linemode: self.session.linemode.clone(),
            lflow: self.session.lflow,
            slc: self.session.slc.clone(),
            local_enabled: self.options.enabled_options(TelnetSide::Local),
            remote_enabled: self.options.enabled_options(TelnetSide::Remote),
        }
    }

    /// The effective input discipline, derived from negotiated state.
    pub fn mode(&self) -> SessionMode {
        let sga = self.options.local_enabled(TelnetOption::SuppressGoAhead);
        let echo = self.options.local_enabled(TelnetOption::Echo);
        if self.options.remote_enabled(TelnetOption::Linemode) {
            SessionMode::Remote
        } else if sga && echo {
            SessionMode::Kludge
        } else if !sga && !echo {
            SessionMode::Local
        } else {
            SessionMode::Character
        }
    }

    /// True when either direction is binary: negotiated or forced.
    pub fn is_binary(&self) -> bool {
        self.session.config().force_binary
            || self.options.local_enabled(TelnetOption::TransmitBinary)
    }

    // #### Writer API ##########################################################

    /// Queue application bytes, doubling any IAC. No line-ending policy is
    /// applied; use [`TelnetCodec::send_text`] for text.
    pub fn send_data(&mut self, data: &[u8]) {
        self.outbound.reserve(data.len() + 2);
        for &byte in data {
            if byte == consts::IAC {
                self.outbound.put_u8(consts::IAC);
            }
            self.outbound.put_u8(byte);
        }
    }

    /// Queue text, translating line endings per negotiated state: `\n`
    /// becomes CR LF on an NVT, CR NUL when SGA is in effect without
    /// BINARY, and passes through untouched in BINARY. A bare CR is padded
    /// to CR NUL outside BINARY.
    pub fn send_text(&mut self, text: &str) {
        let binary = self.is_binary();
        let sga = self.options.local_enabled(TelnetOption::SuppressGoAhead);
        let mut queued = std::mem::take(&mut self.outbound);
        translate_text(text, binary, sga, &mut queued);
        self.outbound = queued;
    }

    /// Queue an echo of peer input. Emits only when ECHO is enabled on our
    /// side (we echo for the peer); returns whether bytes were queued.
    pub fn echo(&mut self, data: &[u8]) -> bool {
        if !self.options.local_enabled(TelnetOption::Echo) {
            return false;
        }
        self.send_data(data);
        true
    }

    /// Queue `IAC GA`, unless the peer suppressed it or the configuration
    /// opted out. Returns whether it was sent.
    pub fn send_ga(&mut self) -> bool {
        if self.session.config().never_send_ga
            || self.options.local_enabled(TelnetOption::SuppressGoAhead)
        {
            return false;
        }
        self.queue_frame(&TelnetFrame::GoAhead);
        true
    }

    /// Queue `IAC EOR`, the record terminator, when the EOR option is in
    /// effect on our side. Returns whether it was sent.
    pub fn send_eor(&mut self) -> bool {
        if !self.options.local_enabled(TelnetOption::EOR) {
            return false;
        }
        self.queue_frame(&TelnetFrame::EndOfRecord);
        true
    }

    /// Queue a protocol command frame verbatim.
    pub fn send_frame(&mut self, frame: &TelnetFrame) {
        self.queue_frame(frame);
    }

    /// Frame and queue a subnegotiation.
    pub fn send_subnegotiation(&mut self, payload: &TelnetSubnegotiation) {
        self.queue_subnegotiation(payload);
    }

    /// Record the local window dimensions; a client with NAWS in effect
    /// reports them to the peer immediately.
    pub fn set_window_size(&mut self, cols: u16, rows: u16) {
        let size = crate::args::naws::WindowSize::new(cols, rows);
        self.session.naws = Some(size);
        if self.role() == TelnetRole::Client && self.options.local_enabled(TelnetOption::NAWS) {
            self.queue_subnegotiation(&TelnetSubnegotiation::WindowSize(size));
        }
    }

    /// Discard queued outbound bytes back to the last protocol frame
    /// boundary (the FLUSHOUT semantic). Protocol frames are never
    /// discarded.
    pub fn flush_output(&mut self) {
        if self.outbound.len() > self.protocol_watermark {
            self.outbound.truncate(self.protocol_watermark);
        }
    }

    /// True when outbound bytes are waiting for the driver.
    pub fn has_output(&self) -> bool {
        !self.outbound.is_empty()
    }

    /// Take everything queued for the wire. The driver writes this to its
    /// transport; the engine never touches a socket.
    pub fn take_output(&mut self) -> BytesMut {
        self.protocol_watermark = 0;
        self.outbound.split()
    }

    // #### Internals ###########################################################

    fn queue_frame(&mut self, frame: &TelnetFrame) {
        encode_frame(frame, &mut self.outbound);
        self.protocol_watermark = self.outbound.len();
    }

    fn queue_subnegotiation(&mut self, payload: &TelnetSubnegotiation) {
        let body = match payload.to_payload() {
            Ok(body) => body,
            Err(err) => {
                // Purely internal: our own payloads always encode.
                warn!("failed to encode subnegotiation: {err}");
                return;
            }
        };
        encode_frame(
            &TelnetFrame::Subnegotiate(payload.option(), body),
            &mut self.outbound,
        );
        self.protocol_watermark = self.outbound.len();
    }

    fn apply_negotiation(&mut self, option: TelnetOption, outcome: NegotiationOutcome) {
        if let Some(reply) = outcome.reply {
            self.queue_frame(&reply);
        }
        if let Some((side, enabled)) = outcome.settled {
            self.pending_events
                .push_back(TelnetEvent::OptionStatus(option, side, enabled));
            let hook = self.session.on_settled(option, side, enabled);
            for reply in hook.replies {
                self.queue_subnegotiation(&reply);
            }
            self.pending_events.extend(hook.events);
        }
    }

    fn receive_verb(&mut self, verb: u8, option: TelnetOption) {
        // Timing Mark and Logout are one-shot signals, not stateful options.
        match (verb, option) {
            (consts::DO, TelnetOption::TimingMark) => {
                self.queue_frame(&TelnetFrame::Will(TelnetOption::TimingMark));
                return;
            }
            (consts::DONT, TelnetOption::TimingMark) => return,
            (consts::WILL | consts::WONT, TelnetOption::TimingMark) => {
                self.pending_events.push_back(TelnetEvent::TimingMarkReply);
                return;
            }
            (consts::DO, TelnetOption::Logout) => {
                if self.role() == TelnetRole::Server {
                    self.queue_frame(&TelnetFrame::Will(TelnetOption::Logout));
                    self.pending_events.push_back(TelnetEvent::Logout);
                } else {
                    self.queue_frame(&TelnetFrame::Wont(TelnetOption::Logout));
                }
                return;
            }
            (consts::WILL, TelnetOption::Logout) => {
                self.pending_events.push_back(TelnetEvent::Logout);
                return;
            }
            (consts::DONT | consts::WONT, TelnetOption::Logout) => return,
            _ => {}
        }
        let outcome = match verb {
            consts::WILL => self.options.receive_will(option),
            consts::WONT => self.options.receive_wont(option),
            consts::DO => self.options.receive_do(option),
            _ => self.options.receive_dont(option),
        };
        self.apply_negotiation(option, outcome);
    }

    fn receive_subnegotiation(&mut self, option_byte: u8) {
        let option = TelnetOption::from_u8(option_byte);
        let payload = self.sb_buffer.split();
        // A subnegotiation is only meaningful once its option is in effect
        // on one of the sides.
        if !(self.options.local_enabled(option) || self.options.remote_enabled(option)) {
            warn!("subnegotiation for {option} while not enabled; dropping");
            return;
        }
        match TelnetSubnegotiation::parse(option, &payload) {
            Ok(parsed) => {
                let outcome = self.session.handle_subnegotiation(parsed, &self.options);
                for reply in outcome.replies {
                    self.queue_subnegotiation(&reply);
                }
                self.pending_events.extend(outcome.events);
            }
            Err(err) => {
                warn!("malformed subnegotiation for {option}: {err}");
                self.pending_events
                    .push_back(TelnetEvent::MalformedSubnegotiation(option, payload));
            }
        }
    }

    /// Flow-control interception of XON/XOFF data bytes, active once LFLOW
    /// has been negotiated. Returns `true` when the byte was consumed.
    fn intercept_flow(&mut self, byte: u8) -> bool {
        if !self.session.lflow.enabled {
            return false;
        }
        let negotiated = self.options.local_enabled(TelnetOption::LFLOW)
            || self.options.remote_enabled(TelnetOption::LFLOW);
        if !negotiated {
            return false;
        }
        let xoff = self
            .session
            .slc
            .get(crate::slc::SlcFunction::Xoff)
            .map(|entry| entry.value);
        let xon = self
            .session
            .slc
            .get(crate::slc::SlcFunction::Xon)
            .map(|entry| entry.value);
        if Some(byte) == xoff && !self.session.lflow.paused {
            self.session.lflow.paused = true;
            self.pending_events.push_back(TelnetEvent::PauseOutput);
            return true;
        }
        if self.session.lflow.paused {
            if Some(byte) == xon || self.session.lflow.restart_any {
                self.session.lflow.paused = false;
                self.pending_events.push_back(TelnetEvent::ResumeOutput);
                // A restart-any byte is data as well as a restart signal.
                return Some(byte) == xon;
            }
        }
        false
    }
}

impl Default for TelnetCodec {
    fn default() -> Self {
        TelnetCodec::new(TelnetRole::Server)
    }
}

impl Decoder for TelnetCodec {
    type Item = TelnetEvent;
    type Error = CodecError;

    /// Consume bytes from `src` until one event is ready.
    ///
    /// The decoder advances a small per-byte state machine. Negotiation
    /// verbs and subnegotiations are answered internally — replies land in
    /// the outbound queue for the driver to drain — and only settled
    /// results, data, and commands come back as events.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelnetEvent>, Self::Error> {
        loop {
            if let Some(event) = self.pending_events.pop_front() {
                return Ok(Some(event));
            }
            if src.remaining() == 0 {
                return Ok(None);
            }
            let byte = src.get_u8();
            match (self.decoder_state, byte) {
                (DecoderState::NormalData, consts::IAC) => {
                    self.decoder_state = DecoderState::InterpretAsCommand;
                }
                (DecoderState::NormalData, _) => {
                    // Flow-control events must precede the byte they rode
                    // in on, so everything goes through the event queue.
                    if !self.intercept_flow(byte) {
                        self.pending_events.push_back(TelnetEvent::Data(byte));
                    }
                }
                (DecoderState::InterpretAsCommand, consts::IAC) => {
                    // Doubled IAC is a literal 0xFF data byte.
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::Data(consts::IAC)));
                }
                (DecoderState::InterpretAsCommand, consts::NOP) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::NoOperation));
                }
                (DecoderState::InterpretAsCommand, consts::DM) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::DataMark));
                }
                (DecoderState::InterpretAsCommand, consts::BRK) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::Break));
                }
                (DecoderState::InterpretAsCommand, consts::IP) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::InterruptProcess));
                }
                (DecoderState::InterpretAsCommand, consts::AO) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::AbortOutput));
                }
                (DecoderState::InterpretAsCommand, consts::AYT) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::AreYouThere));
                }
                (DecoderState::InterpretAsCommand, consts::EC) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::EraseCharacter));
                }
                (DecoderState::InterpretAsCommand, consts::EL) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::EraseLine));
                }
                (DecoderState::InterpretAsCommand, consts::GA) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::GoAhead));
                }
                (DecoderState::InterpretAsCommand, consts::EOR) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::EndOfRecord));
                }
                (DecoderState::InterpretAsCommand, consts::EOF) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::EndOfFile));
                }
                (DecoderState::InterpretAsCommand, consts::SUSP) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::Suspend));
                }
                (DecoderState::InterpretAsCommand, consts::ABORT) => {
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::AbortProcess));
                }
                (DecoderState::InterpretAsCommand, consts::WILL) => {
                    self.decoder_state = DecoderState::NegotiateWill;
                }
                (DecoderState::InterpretAsCommand, consts::WONT) => {
                    self.decoder_state = DecoderState::NegotiateWont;
                }
                (DecoderState::InterpretAsCommand, consts::DO) => {
                    self.decoder_state = DecoderState::NegotiateDo;
                }
                (DecoderState::InterpretAsCommand, consts::DONT) => {
                    self.decoder_state = DecoderState::NegotiateDont;
                }
                (DecoderState::InterpretAsCommand, consts::SB) => {
                    self.decoder_state = DecoderState::Subnegotiate;
                }
                (DecoderState::InterpretAsCommand, _) => {
                    // Unknown command: surface and carry on. The upper layer
                    // ignores it.
                    debug!("unknown IAC command 0x{byte:02X}");
                    self.decoder_state = DecoderState::NormalData;
                    return Ok(Some(TelnetEvent::UnknownCommand(byte)));
                }
                (DecoderState::NegotiateWill, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    self.receive_verb(consts::WILL, TelnetOption::from_u8(byte));
                }
                (DecoderState::NegotiateWont, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    self.receive_verb(consts::WONT, TelnetOption::from_u8(byte));
                }
                (DecoderState::NegotiateDo, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    self.receive_verb(consts::DO, TelnetOption::from_u8(byte));
                }
                (DecoderState::NegotiateDont, _) => {
                    self.decoder_state = DecoderState::NormalData;
                    self.receive_verb(consts::DONT, TelnetOption::from_u8(byte));
                }
                (DecoderState::Subnegotiate, _) => {
                    self.sb_buffer.clear();
                    self.decoder_state = DecoderState::SubnegotiateArgument(byte);
                }
                (DecoderState::SubnegotiateArgument(option), consts::IAC) => {
                    self.decoder_state = DecoderState::SubnegotiateArgumentIAC(option);
                }
                (DecoderState::SubnegotiateArgument(option), _) => {
                    if self.sb_buffer.len() >= consts::SB_MAX_LEN {
                        warn!("subnegotiation exceeded {} bytes; discarding", consts::SB_MAX_LEN);
                        let partial = self.sb_buffer.split();
                        self.pending_events
                            .push_back(TelnetEvent::MalformedSubnegotiation(
                                TelnetOption::from_u8(option),
                                partial,
                            ));
                        self.decoder_state = DecoderState::SubnegotiateDiscard(option);
                        continue;
                    }
                    self.sb_buffer.put_u8(byte);
                }
                (DecoderState::SubnegotiateArgumentIAC(option), consts::IAC) => {
                    // Doubled IAC inside a subnegotiation is one literal byte.
                    self.decoder_state = DecoderState::SubnegotiateArgument(option);
                    self.sb_buffer.put_u8(consts::IAC);
                }
                (DecoderState::SubnegotiateArgumentIAC(option), consts::SE) => {
                    self.decoder_state = DecoderState::NormalData;
                    self.receive_subnegotiation(option);
                }
                (DecoderState::SubnegotiateArgumentIAC(option), _) => {
                    // Anything but SE or IAC here is a framing violation:
                    // give up on the subnegotiation and resynchronise.
                    warn!(
                        "malformed subnegotiation: IAC 0x{byte:02X} inside SB for option {option}"
                    );
                    let partial = self.sb_buffer.split();
                    self.pending_events
                        .push_back(TelnetEvent::MalformedSubnegotiation(
                            TelnetOption::from_u8(option),
                            partial,
                        ));
                    self.decoder_state = DecoderState::NormalData;
                }
                (DecoderState::SubnegotiateDiscard(option), consts::IAC) => {
                    self.decoder_state = DecoderState::SubnegotiateDiscardIAC(option);
                }
                (DecoderState::SubnegotiateDiscard(_), _) => {}
                (DecoderState::SubnegotiateDiscardIAC(_), consts::SE) => {
                    self.decoder_state = DecoderState::NormalData;
                }
                (DecoderState::SubnegotiateDiscardIAC(option), _) => {
                    self.decoder_state = DecoderState::SubnegotiateDiscard(option);
                }
            }
        }
    }
}

impl Encoder<TelnetFrame> for TelnetCodec {
    type Error = CodecError;

    /// Encode one wire frame into `dst`, doubling IAC in data and in
    /// subnegotiation payloads.
    fn encode(&mut self, item: TelnetFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(&item, dst);
        Ok(())
    }
}

impl Encoder<u8> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, item: u8, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(2);
        if item == consts::IAC {
            dst.put_u8(consts::IAC);
        }
        dst.put_u8(item);
        Ok(())
    }
}

impl Encoder<&str> for TelnetCodec {
    type Error = CodecError;

    /// Encode text straight into `dst` through the engine's line-ending
    /// policy, bypassing the outbound queue.
    fn encode(&mut self, item: &str, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let binary = self.is_binary();
        let sga = self.options.local_enabled(TelnetOption::SuppressGoAhead);
        translate_text(item, binary, sga, dst);
        Ok(())
    }
}

fn translate_text(text: &str, binary: bool, sga: bool, dst: &mut BytesMut) {
    dst.reserve(text.len() * 2);
    for &byte in text.as_bytes() {
        match byte {
            consts::LF if !binary => {
                if sga {
                    dst.put_u8(consts::CR);
                    dst.put_u8(consts::NUL);
                } else {
                    dst.put_u8(consts::CR);
                    dst.put_u8(consts::LF);
                }
            }
            consts::CR if !binary => {
                dst.put_u8(consts::CR);
                dst.put_u8(consts::NUL);
            }
            byte => dst.put_u8(byte),
        }
    }
}

fn encode_frame(frame: &TelnetFrame, dst: &mut BytesMut) {
    dst.reserve(frame.encoded_len());
    match frame {
        TelnetFrame::Data(byte) => {
            if *byte == consts::IAC {
                dst.put_u8(consts::IAC);
            }
            dst.put_u8(*byte);
        }
        TelnetFrame::NoOperation => put_command(dst, consts::NOP),
        TelnetFrame::DataMark => put_command(dst, consts::DM),
        TelnetFrame::Break => put_command(dst, consts::BRK),
        TelnetFrame::InterruptProcess => put_command(dst, consts::IP),
        TelnetFrame::AbortOutput => put_command(dst, consts::AO),
        TelnetFrame::AreYouThere => put_command(dst, consts::AYT),
        TelnetFrame::EraseCharacter => put_command(dst, consts::EC),
        TelnetFrame::EraseLine => put_command(dst, consts::EL),
        TelnetFrame::GoAhead => put_command(dst, consts::GA),
        TelnetFrame::EndOfRecord => put_command(dst, consts::EOR),
        TelnetFrame::EndOfFile => put_command(dst, consts::EOF),
        TelnetFrame::Suspend => put_command(dst, consts::SUSP),
        TelnetFrame::AbortProcess => put_command(dst, consts::ABORT),
        TelnetFrame::Will(option) => put_verb(dst, consts::WILL, option),
        TelnetFrame::Wont(option) => put_verb(dst, consts::WONT, option),
        TelnetFrame::Do(option) => put_verb(dst, consts::DO, option),
        TelnetFrame::Dont(option) => put_verb(dst, consts::DONT, option),
        TelnetFrame::Subnegotiate(option, payload) => {
            dst.put_u8(consts::IAC);
            dst.put_u8(consts::SB);
            dst.put_u8(option.to_u8());
            for &byte in payload.iter() {
                if byte == consts::IAC {
                    dst.put_u8(consts::IAC);
                }
                dst.put_u8(byte);
            }
            dst.put_u8(consts::IAC);
            dst.put_u8(consts::SE);
        }
        TelnetFrame::Unknown(byte) => put_command(dst, *byte),
    }
}

fn put_command(dst: &mut BytesMut, command: u8) {
    dst.put_u8(consts::IAC);
    dst.put_u8(command);
}

fn put_verb(dst: &mut BytesMut, verb: u8, option: &TelnetOption) {
    dst.put_u8(consts::IAC);
    dst.put_u8(verb);
    dst.put_u8(option.to_u8());
}

///
/// Internal state of the telnet decoder, advanced one byte at a time.
///
#[derive(Clone, Copy, Debug)]
enum DecoderState {
    /// Normal data
    NormalData,
    /// Received IAC, next byte is a command
    InterpretAsCommand,
    /// Received WILL, next byte is the option
    NegotiateWill,
    /// Received WONT, next byte is the option
    NegotiateWont,
    /// Received DO, next byte is the option
    NegotiateDo,
    /// Received DONT, next byte is the option
    NegotiateDont,
    /// Received SB, next byte is the option
    Subnegotiate,
    /// Accumulating subnegotiation payload for the option
    SubnegotiateArgument(u8),
    /// Received IAC inside a subnegotiation payload
    SubnegotiateArgumentIAC(u8),
    /// Oversized subnegotiation: swallowing until IAC SE
    SubnegotiateDiscard(u8),
    /// Received IAC while discarding
    SubnegotiateDiscardIAC(u8),
}
