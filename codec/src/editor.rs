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

//! Input editing and line terminator normalisation.
//!
//! The editor sits above the decoder and below the application: it takes
//! the engine's data events, interprets SLC editing bytes in the modes that
//! call for it, and turns the NVT's assorted line terminators (CR LF,
//! CR NUL, bare CR, bare LF) into uniform line boundaries. In BINARY,
//! everything passes through untouched.

use crate::engine::{SessionMode, SessionSnapshot};
use crate::event::TelnetEvent;
use crate::options::TelnetOption;
use crate::slc::{SlcFunction, SlcTable};
use crate::consts;
use bytes::{BufMut, BytesMut};

/// Events the editor produces for the application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// One data byte, in the modes that stream bytes as they arrive
    Byte(u8),
    /// A completed line, terminator stripped
    Line(BytesMut),
    /// A line terminator in character mode, where no buffer is kept
    LineEnd,
    /// The buffered input terminated by `IAC EOR` (distinct from a line)
    Record(BytesMut),
    /// An editing or signal function fired
    Function(SlcFunction),
}

/// The input editor. Construct one per connection, keep its view of the
/// negotiated state fresh with [`LineEditor::sync`], and feed it the data
/// and command events the engine emits.
#[derive(Clone, Debug)]
pub struct LineEditor {
    mode: SessionMode,
    binary: bool,
    slc: SlcTable,
    buffer: BytesMut,
    pending_cr: bool,
    literal_next: bool,
}

impl Default for LineEditor {
    fn default() -> Self {
        LineEditor {
            mode: SessionMode::Local,
            binary: false,
            slc: SlcTable::default(),
            buffer: BytesMut::new(),
            pending_cr: false,
            literal_next: false,
        }
    }
}

impl LineEditor {
    /// An editor with the given starting mode.
    pub fn new(mode: SessionMode) -> Self {
        LineEditor {
            mode,
            ..Default::default()
        }
    }

    /// Current mode.
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Change the input discipline.
    pub fn set_mode(&mut self, mode: SessionMode) {
        self.mode = mode;
    }

    /// Toggle BINARY passthrough.
    pub fn set_binary(&mut self, binary: bool) {
        self.binary = binary;
    }

    /// Replace the SLC table.
    pub fn set_slc(&mut self, slc: SlcTable) {
        self.slc = slc;
    }

    /// Refresh mode, binary and SLC state from an engine snapshot.
    pub fn sync(&mut self, snapshot: &SessionSnapshot) {
        self.mode = snapshot.mode;
        self.binary = snapshot
            .remote_enabled
            .contains(&TelnetOption::TransmitBinary);
        self.slc = snapshot.slc.clone();
    }

    /// The partial line accumulated so far.
    pub fn partial(&self) -> &[u8] {
        &self.buffer
    }

    /// Discard buffered input (the SLC FLUSHIN semantic).
    pub fn flush_in(&mut self) {
        self.buffer.clear();
        self.pending_cr = false;
        self.literal_next = false;
    }

    /// Feed one engine event through the editor.
    pub fn feed_event(&mut self, event: &TelnetEvent) -> Vec<InputEvent> {
        match event {
            TelnetEvent::Data(byte) => self.feed(*byte),
            TelnetEvent::EndOfRecord => {
                vec![InputEvent::Record(self.buffer.split())]
            }
            TelnetEvent::EraseCharacter => {
                self.erase_character();
                vec![InputEvent::Function(SlcFunction::EraseCharacter)]
            }
            TelnetEvent::EraseLine => {
                self.buffer.clear();
                vec![InputEvent::Function(SlcFunction::EraseLine)]
            }
            TelnetEvent::InterruptProcess => {
                vec![InputEvent::Function(SlcFunction::InterruptProcess)]
            }
            TelnetEvent::AbortOutput => vec![InputEvent::Function(SlcFunction::AbortOutput)],
            TelnetEvent::AreYouThere => vec![InputEvent::Function(SlcFunction::AreYouThere)],
            TelnetEvent::Break => vec![InputEvent::Function(SlcFunction::Break)],
            TelnetEvent::EndOfFile => vec![InputEvent::Function(SlcFunction::EndOfFile)],
            TelnetEvent::Suspend => vec![InputEvent::Function(SlcFunction::Suspend)],
            TelnetEvent::AbortProcess => vec![InputEvent::Function(SlcFunction::Abort)],
            TelnetEvent::DataMark => vec![InputEvent::Function(SlcFunction::Synch)],
            _ => Vec::new(),
        }
    }

    /// Feed one data byte through the editor.
    pub fn feed(&mut self, byte: u8) -> Vec<InputEvent> {
        if self.binary {
            return vec![InputEvent::Byte(byte)];
        }
        let mut events = Vec::new();
        if self.pending_cr {
            self.pending_cr = false;
            match byte {
                consts::LF | consts::NUL => {
                    // CR LF and CR NUL are one line terminator.
                    self.terminate_line(&mut events);
                    return events;
                }
                _ => {
                    // Bare CR terminates the line; the byte is then
                    // processed in its own right.
                    self.terminate_line(&mut events);
                }
            }
        }
        match byte {
            consts::CR => {
                self.pending_cr = true;
            }
            consts::LF => {
                self.terminate_line(&mut events);
            }
            byte => self.feed_printable(byte, &mut events),
        }
        events
    }

    fn feed_printable(&mut self, byte: u8, events: &mut Vec<InputEvent>) {
        match self.mode {
            SessionMode::Character => {
                events.push(InputEvent::Byte(byte));
            }
            SessionMode::Remote => {
                // The peer already edited; just accumulate.
                self.buffer.put_u8(byte);
            }
            SessionMode::Local | SessionMode::Kludge => {
                if self.literal_next {
                    self.literal_next = false;
                    self.push_byte(byte, events);
                    return;
                }
                match self.slc.function_for(byte) {
                    Some(function) => self.fire_function(function, events),
                    None => self.push_byte(byte, events),
                }
            }
        }
    }

    fn push_byte(&mut self, byte: u8, events: &mut Vec<InputEvent>) {
        self.buffer.put_u8(byte);
        if self.mode == SessionMode::Kludge {
            // Character-at-a-time: the caller sees each byte for echoing.
            events.push(InputEvent::Byte(byte));
        }
    }

    fn fire_function(&mut self, function: SlcFunction, events: &mut Vec<InputEvent>) {
        if let Some(entry) = self.slc.get(function) {
            if entry.flags.flush_in {
                self.buffer.clear();
            }
        }
        match function {
            SlcFunction::EraseCharacter => self.erase_character(),
            SlcFunction::EraseLine => self.buffer.clear(),
            SlcFunction::EraseWord => self.erase_word(),
            SlcFunction::LiteralNext => self.literal_next = true,
            _ => {}
        }
        events.push(InputEvent::Function(function));
    }

    fn erase_character(&mut self) {
        let len = self.buffer.len();
        if len > 0 {
            self.buffer.truncate(len - 1);
        }
    }

    fn erase_word(&mut self) {
        while self.buffer.last() == Some(&b' ') {
            self.buffer.truncate(self.buffer.len() - 1);
        }
        while matches!(self.buffer.last(), Some(&byte) if byte != b' ') {
            self.buffer.truncate(self.buffer.len() - 1);
        }
    }

    fn terminate_line(&mut self, events: &mut Vec<InputEvent>) {
        if self.mode == SessionMode::Character {
            events.push(InputEvent::LineEnd);
        } else {
            events.push(InputEvent::Line(self.buffer.split()));
        }
    }
}

/// Normalise NVT line terminators in a byte slice: CR LF, CR NUL and bare
/// CR all become LF. Running the result through again changes nothing.
pub fn normalize_newlines(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut pending_cr = false;
    for &byte in input {
        if pending_cr {
            pending_cr = false;
            match byte {
                consts::LF | consts::NUL => {
                    output.push(consts::LF);
                    continue;
                }
                _ => output.push(consts::LF),
            }
        }
        match byte {
            consts::CR => pending_cr = true,
            byte => output.push(byte),
        }
    }
    if pending_cr {
        output.push(consts::LF);
    }
    output
}
