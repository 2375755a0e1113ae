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

//! Error types for the telnet stream

use thiserror::Error;

/// Result type for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;

/// Telnet stream error types.
///
/// Only transport loss and caller misuse surface here; peer protocol
/// anomalies are absorbed by the engine.
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error from the underlying transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller misuse reported by the engine, such as a duplicate
    /// negotiation request; nothing was sent on the wire
    #[error("Protocol error: {0}")]
    Codec(#[from] telnetry_codec::CodecError),

    /// The peer closed the connection
    #[error("Connection closed")]
    ConnectionClosed,

    /// Connection establishment exceeded `connect_timeout`
    #[error("Connection timed out")]
    ConnectTimeout,

    /// Received text could not be decoded with the configured encoding
    #[error("Encoding error: {0}")]
    Encoding(String),
}
