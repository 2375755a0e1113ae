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

//! Full-session tests: two streams wired back to back over an in-memory
//! duplex transport.

use std::time::Duration;
use telnetry_stream::{
    StreamEvent, TelnetConfig, TelnetOption, TelnetStream, WaitOutcome,
};
use tokio::io::{DuplexStream, duplex};

fn text_config() -> TelnetConfig {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    // No encoding: keeps BINARY out of the way so the NVT line discipline
    // is what gets exercised.
    TelnetConfig::new()
        .with_encoding(None::<String>)
        .with_connect_waits(Duration::from_millis(20), Duration::from_millis(500))
}

fn pair() -> (DuplexStream, DuplexStream) {
    duplex(4096)
}

#[tokio::test]
async fn negotiation_settles_between_engine_pair() {
    let (server_io, client_io) = pair();
    let mut server = TelnetStream::server(server_io, text_config());
    let mut client = TelnetStream::client(
        client_io,
        text_config().with_term("xterm-256color").with_speed(115200, 115200),
    );

    let (server_snapshot, client_snapshot) =
        tokio::join!(server.negotiate(), client.negotiate());
    let server_snapshot = server_snapshot.unwrap();
    let client_snapshot = client_snapshot.unwrap();

    assert!(server_snapshot.remote_enabled.contains(&TelnetOption::TTYPE));
    assert!(server_snapshot.remote_enabled.contains(&TelnetOption::NAWS));
    assert_eq!(server_snapshot.ttype_chain, vec!["xterm-256color".to_string()]);
    assert!(client_snapshot.remote_enabled.contains(&TelnetOption::Echo));
    assert!(client_snapshot
        .remote_enabled
        .contains(&TelnetOption::SuppressGoAhead));
}

#[tokio::test]
async fn line_exchange_after_negotiation() {
    let (server_io, client_io) = pair();
    let mut server = TelnetStream::server(server_io, text_config());
    let mut client = TelnetStream::client(client_io, text_config());

    let (server_result, client_result) = tokio::join!(
        async {
            server.negotiate().await?;
            server.write_line("login:").await?;
            let line = server.read_line().await?;
            server.write_line("welcome").await?;
            Ok::<_, telnetry_stream::StreamError>(line)
        },
        async {
            client.negotiate().await?;
            let prompt = client.read_line().await?;
            client.write_line("alice").await?;
            let reply = client.read_line().await?;
            Ok::<_, telnetry_stream::StreamError>((prompt, reply))
        }
    );
    assert_eq!(server_result.unwrap().as_deref(), Some("alice"));
    let (prompt, reply) = client_result.unwrap();
    assert_eq!(prompt.as_deref(), Some("login:"));
    assert_eq!(reply.as_deref(), Some("welcome"));
}

#[tokio::test]
async fn wait_for_window_size_resolves_when_client_reports() {
    let (server_io, client_io) = pair();
    let mut server = TelnetStream::server(server_io, text_config());
    let mut client = TelnetStream::client(client_io, text_config());

    let (outcome, _) = tokio::join!(
        async {
            server.negotiate().await.unwrap();
            server
                .wait_for(Duration::from_secs(2), |snapshot| {
                    snapshot.naws.map(|size| (size.cols, size.rows)) == Some((132, 43))
                })
                .await
                .unwrap()
        },
        async {
            client.negotiate().await.unwrap();
            client.set_window_size(132, 43).await.unwrap();
            // Keep the client pumping so late traffic is answered.
            let _ = client.read_event().await;
        }
    );
    assert!(outcome.is_satisfied());
    let naws = outcome.snapshot().naws.unwrap();
    assert_eq!((naws.cols, naws.rows), (132, 43));
}

#[tokio::test]
async fn wait_for_times_out_with_definitive_outcome() {
    let (server_io, _client_io_held) = pair();
    let mut server = TelnetStream::server(server_io, text_config());
    let outcome = server
        .wait_for(Duration::from_millis(50), |snapshot| {
            snapshot.naws.is_some()
        })
        .await
        .unwrap();
    assert!(matches!(outcome, WaitOutcome::TimedOut(_)));
}

#[tokio::test]
async fn negotiation_with_silent_peer_expires_without_error() {
    // A netcat-style peer: never answers anything.
    let (server_io, _client_io_held) = pair();
    let config = text_config()
        .with_connect_waits(Duration::from_millis(10), Duration::from_millis(60));
    let mut server = TelnetStream::server(server_io, config);
    let snapshot = server.negotiate().await.unwrap();
    // Nothing was agreed; the session proceeds as a bare NVT.
    assert!(snapshot.remote_enabled.is_empty());
    assert!(snapshot.local_enabled.is_empty());
}

#[tokio::test]
async fn logout_request_surfaces_on_the_server() {
    let (server_io, client_io) = pair();
    let mut server = TelnetStream::server(server_io, text_config());
    let mut client = TelnetStream::client(client_io, text_config());

    let (event, _) = tokio::join!(
        async {
            server.negotiate().await.unwrap();
            loop {
                match server.read_event().await.unwrap() {
                    StreamEvent::Logout => break StreamEvent::Logout,
                    StreamEvent::Closed => panic!("closed before logout"),
                    _ => {}
                }
            }
        },
        async {
            client.negotiate().await.unwrap();
            client.logout().await.unwrap();
            let _ = client.read_event().await;
        }
    );
    assert_eq!(event, StreamEvent::Logout);
}

#[tokio::test]
async fn peer_close_yields_closed_and_none() {
    let (server_io, client_io) = pair();
    let mut server = TelnetStream::server(server_io, text_config());
    let mut client = TelnetStream::client(client_io, text_config());

    let (line, _) = tokio::join!(
        async {
            server.negotiate().await.unwrap();
            server.read_line().await.unwrap()
        },
        async {
            client.negotiate().await.unwrap();
            client.close().await.unwrap();
        }
    );
    assert_eq!(line, None);
    // Subsequent reads keep reporting closure.
    assert_eq!(server.read_event().await.unwrap(), StreamEvent::Closed);
}

#[tokio::test]
async fn force_binary_passes_high_bytes_untouched() {
    let (server_io, client_io) = pair();
    let server_config = TelnetConfig::new()
        .with_encoding(None::<String>)
        .with_force_binary(true)
        .with_connect_waits(Duration::from_millis(10), Duration::from_millis(100));
    let client_config = server_config.clone();
    let mut server = TelnetStream::server(server_io, server_config);
    let mut client = TelnetStream::client(client_io, client_config);

    let payload = [0x01u8, 0xFF, 0x80, 0x0D, 0x0A, 0xFE];
    let (received, _) = tokio::join!(
        async {
            server.negotiate().await.unwrap();
            let mut received = Vec::new();
            while received.len() < payload.len() {
                match server.read_event().await.unwrap() {
                    StreamEvent::Data(chunk) => received.extend_from_slice(&chunk),
                    StreamEvent::Closed => break,
                    _ => {}
                }
            }
            received
        },
        async {
            client.negotiate().await.unwrap();
            client.write(&payload).await.unwrap();
            client.drain().await.unwrap();
        }
    );
    assert_eq!(received, payload);
}
