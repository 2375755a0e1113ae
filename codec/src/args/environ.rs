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

//! New Environment option (RFC 1572).
//!
//! Variable names and values travel interleaved with the tokens VAR (0),
//! VALUE (1), ESC (2) and USERVAR (3); ESC makes the following byte literal
//! so any token byte may appear inside a name or value. Record order is
//! preserved end to end, and VAR and USERVAR are distinct namespaces.

use crate::consts::option::environ;
use crate::consts;
use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use bytes::BufMut;
use std::fmt::Formatter;

/// Which namespace a variable lives in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EnvKind {
    /// A well-known variable (USER, DISPLAY, TERM, ...)
    Var,
    /// A user-defined variable
    UserVar,
}

impl EnvKind {
    fn token(self) -> u8 {
        match self {
            EnvKind::Var => environ::VAR,
            EnvKind::UserVar => environ::USERVAR,
        }
    }
}

impl std::fmt::Display for EnvKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvKind::Var => write!(f, "VAR"),
            EnvKind::UserVar => write!(f, "USERVAR"),
        }
    }
}

/// One variable definition in an IS or INFO payload. A variable may be
/// announced with no VALUE token; that arrives as an empty value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvEntry {
    /// Namespace of the variable
    pub kind: EnvKind,
    /// Variable name
    pub name: String,
    /// Variable value; empty when the peer sent the name alone
    pub value: String,
}

/// One variable request in a SEND payload. An empty name asks for every
/// variable of that namespace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvRequest {
    /// Namespace requested
    pub kind: EnvKind,
    /// Requested name; empty means all of the namespace
    pub name: String,
}

/// A parsed NEW-ENVIRON subnegotiation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EnvironCommand {
    /// `IS ...`: definitions answering a SEND
    Is(Vec<EnvEntry>),
    /// `SEND ...`: request for definitions; an empty list means "send all"
    Send(Vec<EnvRequest>),
    /// `INFO ...`: unsolicited definition updates
    Info(Vec<EnvEntry>),
}

impl EnvironCommand {
    /// Parse a NEW-ENVIRON payload.
    pub fn parse(payload: &[u8]) -> CodecResult<Self> {
        let Some((&verb, rest)) = payload.split_first() else {
            return Err(env_error(SubnegotiationErrorKind::InsufficientData {
                required: 1,
                available: 0,
            }));
        };
        match verb {
            environ::IS => Ok(EnvironCommand::Is(parse_entries(rest)?)),
            environ::INFO => Ok(EnvironCommand::Info(parse_entries(rest)?)),
            environ::SEND => Ok(EnvironCommand::Send(parse_requests(rest)?)),
            verb => Err(env_error(SubnegotiationErrorKind::InvalidCommand {
                command: verb,
                expected: Some(vec![environ::IS, environ::SEND, environ::INFO]),
            })),
        }
    }

    /// Encode as payload bytes, escaping token bytes inside names/values.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<()> {
        match self {
            EnvironCommand::Is(entries) => {
                dst.put_u8(environ::IS);
                encode_entries(entries, dst);
            }
            EnvironCommand::Info(entries) => {
                dst.put_u8(environ::INFO);
                encode_entries(entries, dst);
            }
            EnvironCommand::Send(requests) => {
                dst.put_u8(environ::SEND);
                for request in requests {
                    dst.put_u8(request.kind.token());
                    put_escaped(request.name.as_bytes(), dst);
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for EnvironCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvironCommand::Is(entries) => write!(f, "EnvironIs({} entries)", entries.len()),
            EnvironCommand::Send(requests) => {
                write!(f, "EnvironSend({} requests)", requests.len())
            }
            EnvironCommand::Info(entries) => write!(f, "EnvironInfo({} entries)", entries.len()),
        }
    }
}

fn env_error(reason: SubnegotiationErrorKind) -> CodecError {
    CodecError::SubnegotiationError {
        option: Some(consts::option::NEW_ENVIRON),
        reason,
    }
}

/// A field terminated by any unescaped token byte, plus the terminator.
fn take_field(input: &[u8]) -> CodecResult<(Vec<u8>, Option<u8>, &[u8])> {
    let mut field = Vec::new();
    let mut rest = input;
    loop {
        match rest.split_first() {
            None => return Ok((field, None, rest)),
            Some((&environ::ESC, tail)) => match tail.split_first() {
                Some((&literal, tail)) => {
                    field.push(literal);
                    rest = tail;
                }
                None => {
                    return Err(env_error(SubnegotiationErrorKind::TruncatedRecord {
                        description: "ESC at end of payload".into(),
                    }));
                }
            },
            Some((&(token @ (environ::VAR | environ::VALUE | environ::USERVAR)), tail)) => {
                return Ok((field, Some(token), tail));
            }
            Some((&byte, tail)) => {
                field.push(byte);
                rest = tail;
            }
        }
    }
}

fn parse_entries(mut input: &[u8]) -> CodecResult<Vec<EnvEntry>> {
    let mut entries = Vec::new();
    // The records must open with VAR or USERVAR.
    let mut kind = match input.split_first() {
        None => return Ok(entries),
        Some((&environ::VAR, tail)) => {
            input = tail;
            EnvKind::Var
        }
        Some((&environ::USERVAR, tail)) => {
            input = tail;
            EnvKind::UserVar
        }
        Some((&token, _)) => {
            return Err(env_error(SubnegotiationErrorKind::TruncatedRecord {
                description: format!("record opens with token {token} instead of VAR/USERVAR"),
            }));
        }
    };
    loop {
        let (name, terminator, rest) = take_field(input)?;
        let name = String::from_utf8_lossy(&name).into_owned();
        match terminator {
            None => {
                entries.push(EnvEntry {
                    kind,
                    name,
                    value: String::new(),
                });
                return Ok(entries);
            }
            Some(environ::VALUE) => {
                let (value, terminator, rest) = take_field(rest)?;
                entries.push(EnvEntry {
                    kind,
                    name,
                    value: String::from_utf8_lossy(&value).into_owned(),
                });
                match terminator {
                    None => return Ok(entries),
                    Some(environ::VAR) => kind = EnvKind::Var,
                    Some(environ::USERVAR) => kind = EnvKind::UserVar,
                    Some(token) => {
                        return Err(env_error(SubnegotiationErrorKind::TruncatedRecord {
                            description: format!("unexpected token {token} after value"),
                        }));
                    }
                }
                input = rest;
            }
            Some(environ::VAR) => {
                entries.push(EnvEntry {
                    kind,
                    name,
                    value: String::new(),
                });
                kind = EnvKind::Var;
                input = rest;
            }
            Some(environ::USERVAR) => {
                entries.push(EnvEntry {
                    kind,
                    name,
                    value: String::new(),
                });
                kind = EnvKind::UserVar;
                input = rest;
            }
            Some(token) => {
                return Err(env_error(SubnegotiationErrorKind::TruncatedRecord {
                    description: format!("unexpected token {token} after name"),
                }));
            }
        }
    }
}

fn parse_requests(mut input: &[u8]) -> CodecResult<Vec<EnvRequest>> {
    let mut requests = Vec::new();
    let mut kind = match input.split_first() {
        None => return Ok(requests), // empty SEND: send everything
        Some((&environ::VAR, tail)) => {
            input = tail;
            EnvKind::Var
        }
        Some((&environ::USERVAR, tail)) => {
            input = tail;
            EnvKind::UserVar
        }
        Some((&token, _)) => {
            return Err(env_error(SubnegotiationErrorKind::TruncatedRecord {
                description: format!("request opens with token {token} instead of VAR/USERVAR"),
            }));
        }
    };
    loop {
        let (name, terminator, rest) = take_field(input)?;
        requests.push(EnvRequest {
            kind,
            name: String::from_utf8_lossy(&name).into_owned(),
        });
        match terminator {
            None => return Ok(requests),
            Some(environ::VAR) => kind = EnvKind::Var,
            Some(environ::USERVAR) => kind = EnvKind::UserVar,
            Some(token) => {
                return Err(env_error(SubnegotiationErrorKind::TruncatedRecord {
                    description: format!("unexpected token {token} in SEND"),
                }));
            }
        }
        input = rest;
    }
}

fn encode_entries<T: BufMut>(entries: &[EnvEntry], dst: &mut T) {
    for entry in entries {
        dst.put_u8(entry.kind.token());
        put_escaped(entry.name.as_bytes(), dst);
        if !entry.value.is_empty() {
            dst.put_u8(environ::VALUE);
            put_escaped(entry.value.as_bytes(), dst);
        }
    }
}

fn put_escaped<T: BufMut>(bytes: &[u8], dst: &mut T) {
    for &byte in bytes {
        if matches!(
            byte,
            environ::VAR | environ::VALUE | environ::ESC | environ::USERVAR
        ) {
            dst.put_u8(environ::ESC);
        }
        dst.put_u8(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn entry(kind: EnvKind, name: &str, value: &str) -> EnvEntry {
        EnvEntry {
            kind,
            name: name.into(),
            value: value.into(),
        }
    }

    #[test]
    fn empty_send_means_send_all() {
        assert_eq!(
            EnvironCommand::parse(&[1]).unwrap(),
            EnvironCommand::Send(vec![])
        );
    }

    #[test]
    fn send_with_named_vars() {
        // SEND VAR "USER" VAR "TERM" USERVAR ""
        let mut payload = vec![1u8, 0];
        payload.extend_from_slice(b"USER");
        payload.push(0);
        payload.extend_from_slice(b"TERM");
        payload.push(3);
        let parsed = EnvironCommand::parse(&payload).unwrap();
        assert_eq!(
            parsed,
            EnvironCommand::Send(vec![
                EnvRequest {
                    kind: EnvKind::Var,
                    name: "USER".into()
                },
                EnvRequest {
                    kind: EnvKind::Var,
                    name: "TERM".into()
                },
                EnvRequest {
                    kind: EnvKind::UserVar,
                    name: String::new()
                },
            ])
        );
    }

    #[test]
    fn is_with_values_preserves_order() {
        // IS VAR "USER" VALUE "alice" USERVAR "SHELL" VALUE "/bin/sh"
        let mut payload = vec![0u8, 0];
        payload.extend_from_slice(b"USER");
        payload.push(1);
        payload.extend_from_slice(b"alice");
        payload.push(3);
        payload.extend_from_slice(b"SHELL");
        payload.push(1);
        payload.extend_from_slice(b"/bin/sh");
        let parsed = EnvironCommand::parse(&payload).unwrap();
        assert_eq!(
            parsed,
            EnvironCommand::Is(vec![
                entry(EnvKind::Var, "USER", "alice"),
                entry(EnvKind::UserVar, "SHELL", "/bin/sh"),
            ])
        );
    }

    #[test]
    fn var_without_value_is_empty() {
        let mut payload = vec![0u8, 0];
        payload.extend_from_slice(b"DISPLAY");
        let parsed = EnvironCommand::parse(&payload).unwrap();
        assert_eq!(parsed, EnvironCommand::Is(vec![entry(EnvKind::Var, "DISPLAY", "")]));
    }

    #[test]
    fn escaped_tokens_are_literal() {
        // IS VAR "A<ESC-escaped 0x01>B" VALUE "x<ESC-escaped 0x02>"
        let payload = vec![0u8, 0, b'A', 2, 1, b'B', 1, b'x', 2, 2];
        let parsed = EnvironCommand::parse(&payload).unwrap();
        assert_eq!(
            parsed,
            EnvironCommand::Is(vec![entry(EnvKind::Var, "A\u{1}B", "x\u{2}")])
        );
    }

    #[test]
    fn trailing_escape_is_truncated_record() {
        let payload = vec![0u8, 0, b'A', 2];
        assert!(EnvironCommand::parse(&payload).is_err());
    }

    #[test]
    fn value_before_var_is_rejected() {
        let payload = vec![0u8, 1, b'v'];
        assert!(EnvironCommand::parse(&payload).is_err());
    }

    #[test]
    fn encode_escapes_token_bytes() {
        let cmd = EnvironCommand::Is(vec![entry(EnvKind::Var, "A\u{1}B", "v")]);
        let mut dst = BytesMut::new();
        cmd.encode(&mut dst).unwrap();
        assert_eq!(&dst[..], &[0, 0, b'A', 2, 1, b'B', 1, b'v']);
        // And the escaped form parses back to the original.
        assert_eq!(EnvironCommand::parse(&dst).unwrap(), cmd);
    }

    #[test]
    fn namespaces_are_distinct() {
        let mut payload = vec![0u8, 0];
        payload.extend_from_slice(b"HOME");
        payload.push(1);
        payload.extend_from_slice(b"/root");
        payload.push(3);
        payload.extend_from_slice(b"HOME");
        payload.push(1);
        payload.extend_from_slice(b"/tmp");
        let EnvironCommand::Is(entries) = EnvironCommand::parse(&payload).unwrap() else {
            panic!("expected IS");
        };
        assert_eq!(entries[0].kind, EnvKind::Var);
        assert_eq!(entries[1].kind, EnvKind::UserVar);
        assert_eq!(entries[0].name, entries[1].name);
    }
}
