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

//! # Telnetry Stream
//!
//! The thin async façade over the [`telnetry_codec`] engine: a
//! [`TelnetStream`] wraps any `AsyncRead + AsyncWrite` transport, pushes
//! received bytes through the engine and editor, writes queued protocol
//! replies back out, and exposes the negotiation surface — snapshots,
//! option requests, and `wait_for` subscriptions that always resolve.
//!
//! The engine itself never touches a socket; everything async lives here.
//!
//! ## Quick Start
//!
//! ```no_run
//! use telnetry_stream::{StreamEvent, TelnetConfig, TelnetStream};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = TcpListener::bind("0.0.0.0:8023").await?;
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         tokio::spawn(async move {
//!             let mut stream = TelnetStream::server(socket, TelnetConfig::new());
//!             let settled = stream.negotiate().await?;
//!             tracing::info!(chain = ?settled.ttype_chain, "negotiated");
//!             stream.write_line("login:").await?;
//!             while let Some(line) = stream.read_line().await? {
//!                 stream.write_line(&format!("you said: {line}")).await?;
//!             }
//!             Ok::<_, telnetry_stream::StreamError>(())
//!         });
//!     }
//! }
//! ```

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

mod config;
mod error;
mod stream;

pub use config::TelnetConfig;
pub use error::{Result, StreamError};
pub use stream::{StreamEvent, TelnetStream, WaitOutcome};

// The engine types callers interact with through the stream surface.
pub use telnetry_codec::{
    InputEvent, LineEditor, SessionMode, SessionSnapshot, TelnetCodec, TelnetEvent, TelnetOption,
    TelnetRole, TelnetSide,
};
