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

//! Engine invariants checked over generated byte patterns.

use bytes::BytesMut;
use telnetry_codec::{
    NegotiationState, TelnetCodec, TelnetEvent, TelnetOption, TelnetRole, TelnetSide,
    normalize_newlines,
};
use tokio_util::codec::Decoder;

/// A cheap deterministic byte generator; xorshift keeps the patterns varied
/// without pulling in an RNG crate.
fn pseudo_random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state & 0xFF) as u8
        })
        .collect()
}

fn decode_data(codec: &mut TelnetCodec, wire: &[u8]) -> Vec<u8> {
    let mut src = BytesMut::from(wire);
    let mut data = Vec::new();
    while let Some(event) = codec.decode(&mut src).expect("decode never errors") {
        if let TelnetEvent::Data(byte) = event {
            data.push(byte);
        }
    }
    data
}

// ============================================================================
// ENCODE then DECODE is the identity on data
// ============================================================================

#[test]
fn data_round_trips_through_the_wire() {
    for seed in 1..32u64 {
        let payload = pseudo_random_bytes(seed, 2048);
        let mut sender = TelnetCodec::new(TelnetRole::Server);
        sender.send_data(&payload);
        let wire = sender.take_output();

        let mut receiver = TelnetCodec::new(TelnetRole::Client);
        let decoded = decode_data(&mut receiver, &wire);
        assert_eq!(decoded, payload, "seed {seed}");
    }
}

#[test]
fn iac_runs_round_trip() {
    // Worst case payloads: long runs of 0xFF mixed with command-like bytes.
    let payloads: [&[u8]; 4] = [
        &[0xFF; 64],
        &[0xFF, 0xFB, 0xFF, 0xFD, 0xFF, 0xFA, 0xFF, 0xF0],
        &[0x00, 0xFF, 0x00, 0xFF, 0xFF, 0x00],
        b"text\xFFwith\xFF\xFFsentinels",
    ];
    for payload in payloads {
        let mut sender = TelnetCodec::new(TelnetRole::Server);
        sender.send_data(payload);
        let wire = sender.take_output();
        let mut receiver = TelnetCodec::new(TelnetRole::Client);
        assert_eq!(decode_data(&mut receiver, &wire), payload);
    }
}

#[test]
fn round_trip_is_invariant_to_buffer_fragmentation() {
    let payload = pseudo_random_bytes(99, 512);
    let mut sender = TelnetCodec::new(TelnetRole::Server);
    sender.send_data(&payload);
    let wire = sender.take_output();

    // Deliver one byte at a time.
    let mut receiver = TelnetCodec::new(TelnetRole::Client);
    let mut decoded = Vec::new();
    for &byte in wire.iter() {
        let mut src = BytesMut::from(&[byte][..]);
        while let Some(event) = receiver.decode(&mut src).unwrap() {
            if let TelnetEvent::Data(data) = event {
                decoded.push(data);
            }
        }
    }
    assert_eq!(decoded, payload);
}

// ============================================================================
// Negotiation state after peer traffic
// ============================================================================

#[test]
fn inbound_verbs_never_leave_pending_state() {
    // Pending states belong to requests we initiate; whatever verb
    // sequence the peer throws at us, every option must settle to Enabled
    // or Disabled.
    for seed in 1..16u64 {
        let pattern = pseudo_random_bytes(seed, 128);
        let mut wire = Vec::new();
        for chunk in pattern.chunks(2) {
            let verb = 0xFB + (chunk[0] % 4);
            wire.extend_from_slice(&[0xFF, verb, chunk.get(1).copied().unwrap_or(0)]);
        }
        let mut codec = TelnetCodec::new(TelnetRole::Server);
        let mut src = BytesMut::from(&wire[..]);
        while codec.decode(&mut src).unwrap().is_some() {}
        for code in 0..=255u8 {
            let option = TelnetOption::from_u8(code);
            for side in [TelnetSide::Local, TelnetSide::Remote] {
                let state = codec.negotiation_state(side, option);
                assert!(
                    matches!(
                        state,
                        NegotiationState::Enabled | NegotiationState::Disabled
                    ),
                    "seed {seed}: {option} {side:?} left {state}"
                );
            }
        }
    }
}

// ============================================================================
// Loop prevention over arbitrary verb storms
// ============================================================================

#[test]
fn verb_storm_reaches_quiescence() {
    // However the peer hammers us, two engines wired back to back must go
    // quiet: every reply either acknowledges a change once or refuses.
    let mut server = TelnetCodec::new(TelnetRole::Server);
    let mut client = TelnetCodec::new(TelnetRole::Client);

    let storm = pseudo_random_bytes(7, 256);
    let mut wire = BytesMut::new();
    for chunk in storm.chunks(2) {
        // Synthesise verb/option pairs from the pattern.
        let verb = 0xFB + (chunk[0] % 4);
        wire.extend_from_slice(&[0xFF, verb, chunk.get(1).copied().unwrap_or(0)]);
    }
    let mut src = BytesMut::from(&wire[..]);
    while server.decode(&mut src).unwrap().is_some() {}

    // Bounce replies until both sides are silent; a negotiation loop would
    // keep this alive past any reasonable bound.
    for _ in 0..16 {
        let server_out = server.take_output();
        let mut src = BytesMut::from(&server_out[..]);
        while client.decode(&mut src).unwrap().is_some() {}
        let client_out = client.take_output();
        if server_out.is_empty() && client_out.is_empty() {
            break;
        }
        let mut src = BytesMut::from(&client_out[..]);
        while server.decode(&mut src).unwrap().is_some() {}
    }
    assert!(!server.has_output());
    assert!(!client.has_output());
}

// ============================================================================
// Line normalisation
// ============================================================================

#[test]
fn normalisation_is_idempotent_over_generated_input() {
    for seed in 1..16u64 {
        let mut input = pseudo_random_bytes(seed, 1024);
        // Salt with terminator sequences.
        input.extend_from_slice(b"\r\n\r\x00\r\rtail\n");
        let once = normalize_newlines(&input);
        let twice = normalize_newlines(&once);
        assert_eq!(once, twice, "seed {seed}");
    }
}
