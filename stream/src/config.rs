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

//! Stream configuration

use std::time::Duration;
use telnetry_codec::SessionConfig;
use telnetry_codec::slc::{SlcFunction, SlcLevel, SlcTable};

/// Telnet stream configuration.
///
/// Everything here is advisory input to negotiation; the peer's answers
/// decide what actually takes effect.
#[derive(Debug, Clone)]
pub struct TelnetConfig {
    /// Preferred text encoding, or `None` to treat the stream as raw bytes
    pub encoding: Option<String>,

    /// Treat both directions as BINARY regardless of negotiation; needed
    /// for BSD telnet and netcat peers that never negotiate
    pub force_binary: bool,

    /// Minimum time to let negotiation run before the settled signal may
    /// fire, even when the peer answers instantly
    pub connect_minwait: Duration,

    /// Upper bound on initial negotiation. Expiry is not a failure: the
    /// settled signal fires with whatever state was reached
    pub connect_maxwait: Duration,

    /// Bound on transport connection establishment
    pub connect_timeout: Duration,

    /// Terminal type advertised through TTYPE
    pub term: String,

    /// `(rx, tx)` advertised through TSPEED
    pub speed: (u32, u32),

    /// X display advertised through XDISPLOC
    pub xdisploc: String,

    /// Environment variable names that may be revealed through
    /// NEW-ENVIRON; values are taken from the process environment
    pub send_environ: Vec<String>,

    /// Character sets offered and accepted through CHARSET, preference
    /// first
    pub charsets: Vec<String>,

    /// Suppress IAC GA emission entirely
    pub never_send_ga: bool,

    /// Overrides applied to the seed SLC table
    pub default_slc_table: Vec<(SlcFunction, SlcLevel, u8)>,

    /// Soft cap on buffered inbound bytes before the reader exerts
    /// backpressure
    pub read_buffer_limit: usize,
}

impl Default for TelnetConfig {
    fn default() -> Self {
        Self {
            encoding: Some("utf-8".to_string()),
            force_binary: false,
            connect_minwait: Duration::from_millis(100),
            connect_maxwait: Duration::from_secs(4),
            connect_timeout: Duration::from_secs(10),
            term: std::env::var("TERM").unwrap_or_else(|_| "unknown".to_string()),
            speed: (38400, 38400),
            xdisploc: std::env::var("DISPLAY").unwrap_or_default(),
            send_environ: vec!["LANG".to_string(), "TERM".to_string(), "COLUMNS".to_string()],
            charsets: vec![
                "UTF-8".to_string(),
                "US-ASCII".to_string(),
                "ISO-8859-1".to_string(),
            ],
            never_send_ga: false,
            default_slc_table: Vec::new(),
            read_buffer_limit: 65_536,
        }
    }
}

impl TelnetConfig {
    /// A configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preferred encoding; `None` means raw bytes.
    pub fn with_encoding(mut self, encoding: Option<impl Into<String>>) -> Self {
        self.encoding = encoding.map(Into::into);
        self
    }

    /// Force BINARY in both directions.
    pub fn with_force_binary(mut self, force: bool) -> Self {
        self.force_binary = force;
        self
    }

    /// Set the negotiation window bounds.
    pub fn with_connect_waits(mut self, minwait: Duration, maxwait: Duration) -> Self {
        self.connect_minwait = minwait;
        self.connect_maxwait = maxwait;
        self
    }

    /// Set the transport connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the advertised terminal type.
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    /// Set the advertised terminal speed.
    pub fn with_speed(mut self, rx: u32, tx: u32) -> Self {
        self.speed = (rx, tx);
        self
    }

    /// Set the environment variable allowlist.
    pub fn with_send_environ(mut self, names: Vec<String>) -> Self {
        self.send_environ = names;
        self
    }

    /// Set the offered character sets.
    pub fn with_charsets(mut self, charsets: Vec<String>) -> Self {
        self.charsets = charsets;
        self
    }

    /// Suppress IAC GA emission.
    pub fn with_never_send_ga(mut self, never: bool) -> Self {
        self.never_send_ga = never;
        self
    }

    /// Override seed SLC bindings.
    pub fn with_slc_overrides(mut self, overrides: Vec<(SlcFunction, SlcLevel, u8)>) -> Self {
        self.default_slc_table = overrides;
        self
    }

    /// The engine-level configuration this resolves to. Environment values
    /// for the allowlist are read from the process environment here.
    pub(crate) fn session_config(&self) -> SessionConfig {
        let send_environ = self
            .send_environ
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.clone(), value)))
            .collect();
        SessionConfig {
            term: self.term.clone(),
            speed: self.speed,
            xdisploc: self.xdisploc.clone(),
            sndloc: String::new(),
            send_environ,
            charsets: self.charsets.clone(),
            never_send_ga: self.never_send_ga,
            force_binary: self.force_binary,
            slc_table: if self.default_slc_table.is_empty() {
                SlcTable::default()
            } else {
                SlcTable::with_overrides(&self.default_slc_table)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chains() {
        let config = TelnetConfig::new()
            .with_term("xterm-256color")
            .with_speed(115200, 115200)
            .with_force_binary(true)
            .with_never_send_ga(true);
        assert_eq!(config.term, "xterm-256color");
        assert_eq!(config.speed, (115200, 115200));
        assert!(config.force_binary);
        assert!(config.never_send_ga);
    }

    #[test]
    fn session_config_carries_overrides() {
        let config = TelnetConfig::new()
            .with_slc_overrides(vec![(SlcFunction::EraseCharacter, SlcLevel::Variable, 0x08)]);
        let session = config.session_config();
        assert_eq!(
            session.slc_table.get(SlcFunction::EraseCharacter).unwrap().value,
            0x08
        );
    }
}
