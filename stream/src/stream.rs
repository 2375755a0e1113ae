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

//! The async telnet stream: drives the pure engine over any
//! `AsyncRead + AsyncWrite` transport.

use crate::{Result, StreamError, TelnetConfig};
use bytes::{BufMut, BytesMut};
use std::collections::VecDeque;
use std::time::Duration;
use telnetry_codec::slc::SlcFunction;
use telnetry_codec::{
    CodecResult, InputEvent, LineEditor, SessionMode, SessionSnapshot, TelnetCodec, TelnetEvent,
    TelnetOption, TelnetRole,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, timeout};
use tokio_util::codec::Decoder;
use tracing::{debug, trace, warn};

/// Events the stream surfaces to the shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// A completed input line, terminator stripped
    Line(BytesMut),
    /// Raw input bytes, in character-at-a-time modes
    Data(BytesMut),
    /// An editing or signal function fired by the peer
    Function(SlcFunction),
    /// Buffered input terminated by `IAC EOR`
    Record(BytesMut),
    /// The peer passed the half-duplex turn marker
    GoAhead,
    /// The peer requested or confirmed an orderly logout
    Logout,
    /// The transport reached end of file
    Closed,
}

/// Outcome of a [`TelnetStream::wait_for`] subscription. Waiters always
/// resolve: satisfied, timed out, or closed, never hung.
#[derive(Clone, Debug)]
pub enum WaitOutcome {
    /// The predicate matched; the snapshot it matched on
    Satisfied(SessionSnapshot),
    /// The deadline passed first; the state reached by then
    TimedOut(SessionSnapshot),
    /// The connection closed first; the final state
    Closed(SessionSnapshot),
}

impl WaitOutcome {
    /// The snapshot regardless of outcome.
    pub fn snapshot(&self) -> &SessionSnapshot {
        match self {
            WaitOutcome::Satisfied(snapshot)
            | WaitOutcome::TimedOut(snapshot)
            | WaitOutcome::Closed(snapshot) => snapshot,
        }
    }

    /// True when the predicate matched.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, WaitOutcome::Satisfied(_))
    }
}

/// A telnet session over an arbitrary transport.
///
/// The stream owns the engine and the editor, feeds received bytes through
/// them, and writes whatever the engine queues back to the transport. One
/// instance per connection; it is not shareable across tasks, matching the
/// engine's single-owner design.
pub struct TelnetStream<T> {
    transport: T,
    engine: TelnetCodec,
    editor: LineEditor,
    config: TelnetConfig,
    events: VecDeque<StreamEvent>,
    /// Character-mode bytes coalesced between other events
    chunk: BytesMut,
    flow_paused: bool,
    /// Data held back while the peer has us paused with XOFF
    held: BytesMut,
    eof: bool,
}

impl<T: AsyncRead + AsyncWrite + Unpin> TelnetStream<T> {
    /// A server-side session over `transport`.
    pub fn server(transport: T, config: TelnetConfig) -> Self {
        Self::new(transport, TelnetRole::Server, config)
    }

    /// A client-side session over `transport`.
    pub fn client(transport: T, config: TelnetConfig) -> Self {
        Self::new(transport, TelnetRole::Client, config)
    }

    fn new(transport: T, role: TelnetRole, config: TelnetConfig) -> Self {
        let engine = TelnetCodec::with_config(role, config.session_config());
        let mut editor = LineEditor::default();
        editor.sync(&engine.snapshot());
        if config.force_binary {
            editor.set_binary(true);
        }
        TelnetStream {
            transport,
            engine,
            editor,
            config,
            events: VecDeque::new(),
            chunk: BytesMut::new(),
            flow_paused: false,
            held: BytesMut::new(),
            eof: false,
        }
    }

    /// The engine's role.
    pub fn role(&self) -> TelnetRole {
        self.engine.role()
    }

    /// Immutable view of the negotiated session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.engine.snapshot()
    }

    /// The effective input discipline.
    pub fn mode(&self) -> SessionMode {
        self.engine.mode()
    }

    /// True if `option` is in effect on our side.
    pub fn local_option(&self, option: TelnetOption) -> bool {
        self.engine.is_enabled_local(option)
    }

    /// True if the peer performs `option`.
    pub fn remote_option(&self, option: TelnetOption) -> bool {
        self.engine.is_enabled_remote(option)
    }

    /// True while the peer holds us paused with XOFF.
    pub fn is_flow_paused(&self) -> bool {
        self.flow_paused
    }

    // #### Negotiation #########################################################

    /// Issue the role-appropriate opening requests.
    ///
    /// A server offers SGA and ECHO and asks after the peer terminal
    /// (TTYPE, NAWS, NEW-ENVIRON) plus CHARSET; with an encoding bound it
    /// also proposes BINARY both ways. A client initiates nothing and
    /// answers what the server asks.
    pub fn start_negotiation(&mut self) {
        if self.engine.role() == TelnetRole::Server {
            let local = [
                Some(TelnetOption::SuppressGoAhead),
                Some(TelnetOption::Echo),
                Some(TelnetOption::Charset),
                self.config.encoding.as_ref().map(|_| TelnetOption::TransmitBinary),
            ];
            for option in local.into_iter().flatten() {
                log_refused(self.engine.request_local_enable(option));
            }
            let remote = [
                Some(TelnetOption::TTYPE),
                Some(TelnetOption::NAWS),
                Some(TelnetOption::NewEnvironment),
                self.config.encoding.as_ref().map(|_| TelnetOption::TransmitBinary),
            ];
            for option in remote.into_iter().flatten() {
                log_refused(self.engine.request_remote_enable(option));
            }
        }
    }

    /// Run the initial negotiation window: start the requests, pump the
    /// wire until nothing is pending (but at least `connect_minwait`), and
    /// stop at `connect_maxwait` regardless. Expiry is not a failure; the
    /// snapshot reflects whatever was agreed by then.
    pub async fn negotiate(&mut self) -> Result<SessionSnapshot> {
        self.start_negotiation();
        self.flush_engine_output().await?;
        let started = Instant::now();
        loop {
            let elapsed = started.elapsed();
            if elapsed >= self.config.connect_maxwait {
                debug!("negotiation window expired; proceeding with current state");
                break;
            }
            if self.eof {
                break;
            }
            if elapsed >= self.config.connect_minwait && !self.engine.has_pending() {
                break;
            }
            let budget = self.config.connect_maxwait - elapsed;
            match timeout(budget, self.pump_once()).await {
                Ok(result) => result?,
                Err(_) => break,
            }
        }
        Ok(self.engine.snapshot())
    }

    /// Ask to perform `option` ourselves.
    pub fn request_local(&mut self, option: TelnetOption) -> Result<()> {
        self.engine.request_local_enable(option)?;
        Ok(())
    }

    /// Ask the peer to perform `option`.
    pub fn request_remote(&mut self, option: TelnetOption) -> Result<()> {
        self.engine.request_remote_enable(option)?;
        Ok(())
    }

    /// Pump the connection until `predicate` matches the snapshot, the
    /// deadline passes, or the peer closes. Always resolves.
    pub async fn wait_for<F>(&mut self, deadline: Duration, predicate: F) -> Result<WaitOutcome>
    where
        F: Fn(&SessionSnapshot) -> bool,
    {
        let started = Instant::now();
        loop {
            let snapshot = self.engine.snapshot();
            if predicate(&snapshot) {
                return Ok(WaitOutcome::Satisfied(snapshot));
            }
            if self.eof {
                return Ok(WaitOutcome::Closed(snapshot));
            }
            let elapsed = started.elapsed();
            if elapsed >= deadline {
                return Ok(WaitOutcome::TimedOut(snapshot));
            }
            match timeout(deadline - elapsed, self.pump_once()).await {
                Ok(result) => result?,
                Err(_) => {
                    return Ok(WaitOutcome::TimedOut(self.engine.snapshot()));
                }
            }
        }
    }

    // #### Reading #############################################################

    /// The next stream event. Returns [`StreamEvent::Closed`] at end of
    /// file, and keeps returning it afterwards.
    pub async fn read_event(&mut self) -> Result<StreamEvent> {
        loop {
            if let Some(event) = self.next_queued_event() {
                return Ok(event);
            }
            if self.eof {
                return Ok(StreamEvent::Closed);
            }
            self.pump_once().await?;
        }
    }

    /// The next completed line decoded as text, or `None` once the peer
    /// closes. Non-line events are skipped; functions and records are
    /// dropped here, so use [`TelnetStream::read_event`] when they matter.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        loop {
            match self.read_event().await? {
                StreamEvent::Line(line) => return Ok(Some(self.decode_text(&line)?)),
                StreamEvent::Closed => return Ok(None),
                other => trace!("read_line skipping {other:?}"),
            }
        }
    }

    fn decode_text(&self, bytes: &[u8]) -> Result<String> {
        let charset = self
            .snapshot()
            .charset
            .or_else(|| self.config.encoding.clone());
        match charset.as_deref() {
            Some("utf-8" | "utf8" | "us-ascii" | "ascii") => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|err| StreamError::Encoding(err.to_string())),
            // Unmapped charsets degrade to lossy UTF-8 rather than failing
            // the session.
            _ => Ok(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    fn next_queued_event(&mut self) -> Option<StreamEvent> {
        if let Some(event) = self.events.pop_front() {
            return Some(event);
        }
        if !self.chunk.is_empty() {
            return Some(StreamEvent::Data(self.chunk.split()));
        }
        None
    }

    // #### Writing #############################################################

    /// Write raw bytes through the engine (IAC doubling applied).
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.engine.send_data(data);
        self.flush_engine_output().await
    }

    /// Write text through the engine's line-ending policy.
    pub async fn write_text(&mut self, text: &str) -> Result<()> {
        self.engine.send_text(text);
        self.flush_engine_output().await
    }

    /// Write a line of text, terminating it for the negotiated mode.
    pub async fn write_line(&mut self, text: &str) -> Result<()> {
        self.engine.send_text(text);
        self.engine.send_text("\n");
        self.flush_engine_output().await
    }

    /// Echo peer input back; a no-op unless we have ECHO. Returns whether
    /// an echo went out.
    pub async fn echo(&mut self, data: &[u8]) -> Result<bool> {
        let echoed = self.engine.echo(data);
        if echoed {
            self.flush_engine_output().await?;
        }
        Ok(echoed)
    }

    /// True when we are the echoing side.
    pub fn will_echo(&self) -> bool {
        self.engine.is_enabled_local(TelnetOption::Echo)
    }

    /// Send the half-duplex turn marker if the session still uses it.
    pub async fn send_ga(&mut self) -> Result<bool> {
        let sent = self.engine.send_ga();
        if sent {
            self.flush_engine_output().await?;
        }
        Ok(sent)
    }

    /// Record the local window dimensions; a client with NAWS in effect
    /// reports them to the peer at once.
    pub async fn set_window_size(&mut self, cols: u16, rows: u16) -> Result<()> {
        self.engine.set_window_size(cols, rows);
        self.flush_engine_output().await
    }

    /// Ask the peer to close the session (`IAC DO LOGOUT`).
    pub async fn logout(&mut self) -> Result<()> {
        self.engine.request_logout();
        self.flush_engine_output().await
    }

    /// Ask the peer to mirror its view of the negotiation state.
    pub async fn request_status(&mut self) -> Result<()> {
        self.engine.request_status();
        self.flush_engine_output().await
    }

    /// Flush everything queued to the transport.
    pub async fn drain(&mut self) -> Result<()> {
        self.flush_engine_output().await?;
        self.transport.flush().await?;
        Ok(())
    }

    /// Discard events until the peer closes the connection.
    pub async fn wait_closed(&mut self) -> Result<()> {
        loop {
            if let StreamEvent::Closed = self.read_event().await? {
                return Ok(());
            }
        }
    }

    /// Close the session: resolve pending negotiations, flush, and shut
    /// the transport down.
    pub async fn close(&mut self) -> Result<()> {
        self.engine.cancel_pending();
        self.drain().await?;
        self.transport.shutdown().await?;
        self.eof = true;
        Ok(())
    }

    // #### Pump ################################################################

    /// One read from the transport, decoded through the engine and editor.
    /// Reads are bounded by the configured buffer limit, and the read paths
    /// only pump while their event queue is drained, which is what holds a
    /// fast producer back behind a slow consumer.
    async fn pump_once(&mut self) -> Result<()> {
        self.flush_engine_output().await?;
        let mut buffer = vec![0u8; self.config.read_buffer_limit.clamp(512, 8_192)];
        let read = self.transport.read(&mut buffer).await?;
        if read == 0 {
            self.eof = true;
            self.engine.cancel_pending();
            self.absorb_events(BytesMut::new())?;
            self.events.push_back(StreamEvent::Closed);
            return Ok(());
        }
        self.absorb_events(BytesMut::from(&buffer[..read]))?;
        self.flush_engine_output().await?;
        Ok(())
    }

    fn absorb_events(&mut self, mut src: BytesMut) -> CodecResult<()> {
        while let Some(event) = self.engine.decode(&mut src)? {
            match &event {
                TelnetEvent::OptionStatus(..) => {
                    // Mode, binary or SLC state may have shifted under the
                    // editor.
                    self.editor.sync(&self.engine.snapshot());
                    if self.config.force_binary {
                        self.editor.set_binary(true);
                    }
                }
                TelnetEvent::GoAhead => {
                    self.flush_chunk();
                    self.events.push_back(StreamEvent::GoAhead);
                }
                TelnetEvent::Logout => {
                    self.flush_chunk();
                    self.events.push_back(StreamEvent::Logout);
                }
                TelnetEvent::PauseOutput => self.flow_paused = true,
                TelnetEvent::ResumeOutput => self.flow_paused = false,
                _ => {}
            }
            for input in self.editor.feed_event(&event) {
                match input {
                    InputEvent::Byte(byte) => self.chunk.put_u8(byte),
                    InputEvent::LineEnd => self.chunk.put_u8(b'\n'),
                    InputEvent::Line(line) => {
                        self.flush_chunk();
                        self.events.push_back(StreamEvent::Line(line));
                    }
                    InputEvent::Record(record) => {
                        self.flush_chunk();
                        self.events.push_back(StreamEvent::Record(record));
                    }
                    InputEvent::Function(function) => {
                        // FLUSHOUT functions discard whatever data is still
                        // queued behind the last protocol frame.
                        let flushes_output = self
                            .engine
                            .snapshot()
                            .slc
                            .get(function)
                            .is_some_and(|entry| entry.flags.flush_out);
                        if flushes_output {
                            self.engine.flush_output();
                        }
                        self.flush_chunk();
                        self.events.push_back(StreamEvent::Function(function));
                    }
                }
            }
        }
        Ok(())
    }

    fn flush_chunk(&mut self) {
        if !self.chunk.is_empty() {
            let chunk = self.chunk.split();
            self.events.push_back(StreamEvent::Data(chunk));
        }
    }

    async fn flush_engine_output(&mut self) -> Result<()> {
        // Held bytes predate anything newly queued; they go first.
        if !self.flow_paused && !self.held.is_empty() {
            let held = self.held.split();
            self.transport.write_all(&held).await?;
        }
        if self.engine.has_output() {
            let output = self.engine.take_output();
            if self.flow_paused {
                self.held.extend_from_slice(&output);
            } else {
                self.transport.write_all(&output).await?;
            }
        }
        Ok(())
    }
}

impl TelnetStream<tokio::net::TcpStream> {
    /// Dial `addr` within the configured connect timeout and wrap the
    /// socket as a client session. Negotiation has not started yet; call
    /// [`TelnetStream::negotiate`] next.
    pub async fn connect(addr: &str, config: TelnetConfig) -> Result<Self> {
        let socket = timeout(
            config.connect_timeout,
            tokio::net::TcpStream::connect(addr),
        )
        .await
        .map_err(|_| StreamError::ConnectTimeout)??;
        Ok(Self::client(socket, config))
    }
}

fn log_refused(result: CodecResult<()>) {
    if let Err(err) = result {
        warn!("negotiation request skipped: {err}");
    }
}
