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

//! Negotiate About Window Size (RFC 1073).

use crate::result::{CodecError, CodecResult, SubnegotiationErrorKind};
use crate::consts;
use byteorder::{BigEndian, WriteBytesExt};
use bytes::BufMut;

/// Window dimensions carried in a NAWS subnegotiation: exactly four bytes,
/// columns then rows, big-endian. A value of zero means "unspecified" and is
/// stored as received.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    /// Columns (characters per line)
    pub cols: u16,
    /// Rows (lines)
    pub rows: u16,
}

impl WindowSize {
    /// A window size of the given dimensions.
    pub fn new(cols: u16, rows: u16) -> Self {
        WindowSize { cols, rows }
    }

    /// Parse a NAWS payload. Any length other than four bytes is rejected;
    /// the caller drops the subnegotiation without touching cached state.
    pub fn parse(payload: &[u8]) -> CodecResult<Self> {
        if payload.len() != 4 {
            return Err(CodecError::SubnegotiationError {
                option: Some(consts::option::NAWS),
                reason: SubnegotiationErrorKind::InvalidLength {
                    required: 4,
                    received: payload.len(),
                },
            });
        }
        Ok(WindowSize {
            cols: u16::from_be_bytes([payload[0], payload[1]]),
            rows: u16::from_be_bytes([payload[2], payload[3]]),
        })
    }

    /// Encode as the four payload bytes.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<()> {
        let mut writer = dst.writer();
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(())
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WindowSize({}x{})", self.cols, self.rows)
    }
}
