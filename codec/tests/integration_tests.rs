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

//! End-to-end protocol scenarios, driven with literal wire bytes on one
//! side and full engine pairs on the other.

use bytes::BytesMut;
use telnetry_codec::{
    SessionConfig, TelnetCodec, TelnetEvent, TelnetOption, TelnetRole, TelnetSide, consts,
};
use tokio_util::codec::Decoder;

fn drain(codec: &mut TelnetCodec, bytes: &[u8]) -> Vec<TelnetEvent> {
    let mut src = BytesMut::from(bytes);
    let mut events = Vec::new();
    while let Some(event) = codec.decode(&mut src).expect("decode never errors") {
        events.push(event);
    }
    events
}

/// Pump every queued byte from `from` into `to`, returning the events `to`
/// produced. One round of half-duplex traffic.
fn pump(from: &mut TelnetCodec, to: &mut TelnetCodec) -> Vec<TelnetEvent> {
    let outbound = from.take_output();
    drain(to, &outbound)
}

// ============================================================================
// Scenario: basic NAWS
// ============================================================================

#[test]
fn basic_naws_negotiation() {
    let mut server = TelnetCodec::new(TelnetRole::Server);
    let mut client = TelnetCodec::new(TelnetRole::Client);
    client.set_window_size(80, 24);

    server.request_remote_enable(TelnetOption::NAWS).unwrap();
    assert_eq!(
        &server.take_output()[..],
        &[0xFF, 0xFD, 0x1F],
        "server transmits DO NAWS"
    );

    // Client answers WILL and reports dimensions at once.
    let events = drain(&mut client, &[0xFF, 0xFD, 0x1F]);
    assert_eq!(
        events,
        vec![TelnetEvent::OptionStatus(
            TelnetOption::NAWS,
            TelnetSide::Local,
            true
        )]
    );
    let wire = client.take_output();
    assert_eq!(
        &wire[..],
        &[
            0xFF, 0xFB, 0x1F, // WILL NAWS
            0xFF, 0xFA, 0x1F, 0x00, 0x50, 0x00, 0x18, 0xFF, 0xF0, // SB 80x24
        ]
    );

    let events = drain(&mut server, &wire);
    assert!(events
        .iter()
        .any(|event| matches!(event, TelnetEvent::OptionStatus(TelnetOption::NAWS, TelnetSide::Remote, true))));
    let snapshot = server.snapshot();
    assert!(snapshot.remote_enabled.contains(&TelnetOption::NAWS));
    assert_eq!(snapshot.naws.map(|size| (size.cols, size.rows)), Some((80, 24)));
}

// ============================================================================
// Scenario: TTYPE cycling
// ============================================================================

#[test]
fn ttype_cycle_with_literal_bytes() {
    let mut server = TelnetCodec::new(TelnetRole::Server);
    server.request_remote_enable(TelnetOption::TTYPE).unwrap();
    assert_eq!(&server.take_output()[..], &[0xFF, 0xFD, 0x18]);

    // WILL TTYPE; the server immediately asks for the first type.
    drain(&mut server, &[0xFF, 0xFB, 0x18]);
    assert_eq!(&server.take_output()[..], &[0xFF, 0xFA, 0x18, 0x01, 0xFF, 0xF0]);

    // IS "xterm": recorded, cycle continues.
    let mut reply = vec![0xFF, 0xFA, 0x18, 0x00];
    reply.extend_from_slice(b"xterm");
    reply.extend_from_slice(&[0xFF, 0xF0]);
    drain(&mut server, &reply);
    assert_eq!(&server.take_output()[..], &[0xFF, 0xFA, 0x18, 0x01, 0xFF, 0xF0]);

    // IS "xterm-256color": recorded, cycle continues.
    let mut reply = vec![0xFF, 0xFA, 0x18, 0x00];
    reply.extend_from_slice(b"xterm-256color");
    reply.extend_from_slice(&[0xFF, 0xF0]);
    drain(&mut server, &reply);
    assert_eq!(&server.take_output()[..], &[0xFF, 0xFA, 0x18, 0x01, 0xFF, 0xF0]);

    // Repeat terminates the cycle: no further SEND, chain unchanged.
    let mut reply = vec![0xFF, 0xFA, 0x18, 0x00];
    reply.extend_from_slice(b"xterm-256color");
    reply.extend_from_slice(&[0xFF, 0xF0]);
    drain(&mut server, &reply);
    assert!(!server.has_output());
    assert_eq!(
        server.snapshot().ttype_chain,
        vec!["xterm".to_string(), "xterm-256color".to_string()]
    );
}

#[test]
fn ttype_engine_pair_cycles_to_termination() {
    let mut server = TelnetCodec::new(TelnetRole::Server);
    let mut config = SessionConfig::default();
    config.term = "vt220".to_string();
    let mut client = TelnetCodec::with_config(TelnetRole::Client, config);

    server.request_remote_enable(TelnetOption::TTYPE).unwrap();
    // Run rounds until the wire goes quiet.
    for _ in 0..8 {
        pump(&mut server, &mut client);
        pump(&mut client, &mut server);
        if !server.has_output() && !client.has_output() {
            break;
        }
    }
    // A single-type client repeats itself on the second ask; the chain
    // holds the one name and the cycle has terminated.
    assert_eq!(server.snapshot().ttype_chain, vec!["vt220".to_string()]);
    assert!(!server.has_output());
}

// ============================================================================
// Scenario: IAC doubling in data
// ============================================================================

#[test]
fn iac_in_data_round_trips() {
    let mut sender = TelnetCodec::new(TelnetRole::Server);
    let mut receiver = TelnetCodec::new(TelnetRole::Client);

    sender.send_data(&[0xAA, 0xFF, 0xBB]);
    let wire = sender.take_output();
    assert_eq!(&wire[..], &[0xAA, 0xFF, 0xFF, 0xBB]);

    let events = drain(&mut receiver, &wire);
    assert_eq!(
        events,
        vec![
            TelnetEvent::Data(0xAA),
            TelnetEvent::Data(0xFF),
            TelnetEvent::Data(0xBB),
        ]
    );
}

// ============================================================================
// Scenario: no-loop acknowledgement
// ============================================================================

#[test]
fn enabled_option_reack_produces_nothing() {
    let mut client = TelnetCodec::new(TelnetRole::Client);
    // First WILL ECHO: accepted with DO.
    drain(&mut client, &[0xFF, 0xFB, 0x01]);
    assert_eq!(&client.take_output()[..], &[0xFF, 0xFD, 0x01]);
    // Second WILL ECHO: state already enabled, nothing pending -> silence.
    let events = drain(&mut client, &[0xFF, 0xFB, 0x01]);
    assert_eq!(events, vec![]);
    assert!(!client.has_output());
}

// ============================================================================
// Scenario: LINEMODE MODE acknowledgement
// ============================================================================

#[test]
fn linemode_mode_ack_round_trip() {
    let mut server = TelnetCodec::new(TelnetRole::Server);
    let mut client = TelnetCodec::new(TelnetRole::Client);

    // Client initiates WILL LINEMODE; server answers DO and proposes
    // MODE EDIT|TRAPSIG.
    client.request_local_enable(TelnetOption::Linemode).unwrap();
    pump(&mut client, &mut server);
    let server_wire = server.take_output();
    assert_eq!(&server_wire[..3], &[0xFF, 0xFD, 0x22], "DO LINEMODE");
    assert!(
        server_wire
            .windows(6)
            .any(|window| window == [0xFF, 0xFA, 0x22, 0x01, 0x03, 0xFF]),
        "MODE proposal EDIT|TRAPSIG without ACK"
    );

    // Client adopts and acknowledges with the ACK bit.
    drain(&mut client, &server_wire);
    let client_wire = client.take_output();
    assert!(
        client_wire
            .windows(7)
            .any(|window| window == [0xFF, 0xFA, 0x22, 0x01, 0x83, 0xFF, 0xF0]),
        "MODE echoed with ACK"
    );

    drain(&mut server, &client_wire);
    // The client also announced its SLC table; discard the server's acks.
    server.take_output();
    let linemode = server.snapshot().linemode;
    assert!(linemode.mode.edit);
    assert!(linemode.mode.trapsig);
    assert!(!linemode.mode.ack);
    assert!(linemode.edit_ack);

    // Re-sending the same MODE without ACK is a no-op for the server.
    drain(&mut server, &[0xFF, 0xFA, 0x22, 0x01, 0x03, 0xFF, 0xF0]);
    assert!(!server.has_output());
}

// ============================================================================
// Scenario: malformed NAWS
// ============================================================================

#[test]
fn malformed_naws_warns_and_continues() {
    let mut server = TelnetCodec::new(TelnetRole::Server);
    drain(&mut server, &[0xFF, 0xFB, 0x1F]);
    server.take_output();

    // Three-byte NAWS payload: dropped without touching state.
    let events = drain(&mut server, &[0xFF, 0xFA, 0x1F, 0x00, 0x50, 0x00, 0xFF, 0xF0]);
    assert!(matches!(
        events[..],
        [TelnetEvent::MalformedSubnegotiation(TelnetOption::NAWS, _)]
    ));
    assert_eq!(server.snapshot().naws, None);

    // The engine accepts the next command correctly.
    let events = drain(&mut server, &[0xFF, 0xFA, 0x1F, 0x00, 0x50, 0x00, 0x18, 0xFF, 0xF0]);
    assert!(matches!(events[..], [TelnetEvent::Subnegotiation(_)]));
    assert_eq!(
        server.snapshot().naws.map(|size| (size.cols, size.rows)),
        Some((80, 24))
    );
}

// ============================================================================
// Scenario: STATUS mirror
// ============================================================================

#[test]
fn status_send_is_answered_with_enabled_pairs() {
    let mut server = TelnetCodec::new(TelnetRole::Server);
    // Enable STATUS locally (peer asks us to perform it) and NAWS remotely.
    drain(&mut server, &[0xFF, 0xFD, 0x05]); // DO STATUS
    drain(&mut server, &[0xFF, 0xFB, 0x1F]); // WILL NAWS
    server.take_output();

    drain(&mut server, &[0xFF, 0xFA, 0x05, 0x01, 0xFF, 0xF0]); // SB STATUS SEND
    let wire = server.take_output();
    // IAC SB STATUS IS ... IAC SE with WILL STATUS and DO NAWS pairs.
    assert_eq!(&wire[..4], &[0xFF, 0xFA, 0x05, 0x00]);
    let body = &wire[4..wire.len() - 2];
    assert!(body.chunks(2).any(|pair| pair == [0xFB, 0x05]), "WILL STATUS");
    assert!(body.chunks(2).any(|pair| pair == [0xFD, 0x1F]), "DO NAWS");
}

// ============================================================================
// Scenario: CHARSET selection
// ============================================================================

#[test]
fn charset_request_accept_flow() {
    let mut server = TelnetCodec::new(TelnetRole::Server);
    let mut client = TelnetCodec::new(TelnetRole::Client);

    server.request_local_enable(TelnetOption::Charset).unwrap();
    pump(&mut server, &mut client);
    // Client agreed with DO CHARSET; the server then offers its list.
    pump(&mut client, &mut server);
    let offer = server.take_output();
    assert_eq!(&offer[..4], &[0xFF, 0xFA, 0x2A, 0x01], "CHARSET REQUEST");

    drain(&mut client, &offer);
    let acceptance = client.take_output();
    assert_eq!(&acceptance[..4], &[0xFF, 0xFA, 0x2A, 0x02], "CHARSET ACCEPTED");
    drain(&mut server, &acceptance);

    assert_eq!(server.snapshot().charset.as_deref(), Some("utf-8"));
    assert_eq!(client.snapshot().charset.as_deref(), Some("utf-8"));
}

// ============================================================================
// Scenario: reversed-direction requests
// ============================================================================

#[test]
fn reversed_direction_requests_are_refused_not_fatal() {
    let mut client = TelnetCodec::new(TelnetRole::Client);
    // A peer server claiming WILL NAWS at a client is refused with DONT.
    let events = drain(&mut client, &[0xFF, 0xFB, 0x1F]);
    assert_eq!(events, vec![]);
    assert_eq!(&client.take_output()[..], &[0xFF, 0xFE, 0x1F]);

    // And the engine keeps decoding normally afterwards.
    let events = drain(&mut client, b"still here");
    assert_eq!(events.len(), 10);
}

// ============================================================================
// Scenario: LFLOW pause/resume
// ============================================================================

#[test]
fn xoff_pauses_and_xon_resumes_output() {
    let mut client = TelnetCodec::new(TelnetRole::Client);
    // Server enables flow control on us: DO LFLOW, then SB LFLOW ON.
    drain(&mut client, &[0xFF, 0xFD, 0x21]);
    drain(&mut client, &[0xFF, 0xFA, 0x21, 0x01, 0xFF, 0xF0]);
    client.take_output();

    let events = drain(&mut client, &[0x13]); // ^S
    assert_eq!(events, vec![TelnetEvent::PauseOutput]);
    let events = drain(&mut client, &[0x11]); // ^Q
    assert_eq!(events, vec![TelnetEvent::ResumeOutput]);
}

#[test]
fn restart_any_resumes_on_any_byte() {
    let mut client = TelnetCodec::new(TelnetRole::Client);
    drain(&mut client, &[0xFF, 0xFD, 0x21]);
    drain(&mut client, &[0xFF, 0xFA, 0x21, 0x02, 0xFF, 0xF0]); // RESTART-ANY
    client.take_output();

    drain(&mut client, &[0x13]);
    let events = drain(&mut client, b"a");
    assert_eq!(
        events,
        vec![TelnetEvent::ResumeOutput, TelnetEvent::Data(b'a')]
    );
}

// ============================================================================
// Scenario: NEW-ENVIRON exchange
// ============================================================================

#[test]
fn environ_send_all_round_trip() {
    let mut server = TelnetCodec::new(TelnetRole::Server);
    let mut config = SessionConfig::default();
    config.send_environ = vec![
        ("USER".to_string(), "alice".to_string()),
        ("LANG".to_string(), "en_US.UTF-8".to_string()),
    ];
    let mut client = TelnetCodec::with_config(TelnetRole::Client, config);

    server
        .request_remote_enable(TelnetOption::NewEnvironment)
        .unwrap();
    pump(&mut server, &mut client);
    pump(&mut client, &mut server);
    // The hook sent SEND; pump the client's IS answer across.
    pump(&mut server, &mut client);
    pump(&mut client, &mut server);

    let snapshot = server.snapshot();
    assert_eq!(snapshot.environ["USER"].value, "alice");
    assert_eq!(snapshot.environ["LANG"].value, "en_US.UTF-8");
}

// ============================================================================
// Scenario: degenerate netcat peer
// ============================================================================

#[test]
fn no_negotiation_peer_is_plain_data() {
    let mut server = TelnetCodec::new(TelnetRole::Server);
    let events = drain(&mut server, b"just text, no IAC at all\r\n");
    assert_eq!(events.len(), 26);
    assert!(events.iter().all(|event| matches!(event, TelnetEvent::Data(_))));
    assert!(!server.has_output());
}
