// Inclusion proofs for the ERC-20 to asset allocation bridge.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2026 by
//     The sys-std developers
//
// Copyright (C) 2026 The sys-std developers. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use alloy_rlp::{Encodable, Header};

pub use alloy_rlp::Error as RlpError;

/// Generic RLP tree, used for block headers, trie nodes, transactions and
/// receipts whose exact shape depends on the data.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// Decodes a single item which must span the whole `data`.
    pub fn decode(data: &[u8]) -> Result<Self, RlpError> {
        let mut buf = data;
        let item = Self::decode_next(&mut buf)?;
        if !buf.is_empty() {
            return Err(RlpError::UnexpectedLength);
        }
        Ok(item)
    }

    fn decode_next(buf: &mut &[u8]) -> Result<Self, RlpError> {
        let header = Header::decode(buf)?;
        if header.payload_length > buf.len() {
            return Err(RlpError::InputTooShort);
        }
        let (payload, rest) = buf.split_at(header.payload_length);
        *buf = rest;
        if !header.list {
            return Ok(RlpItem::Bytes(payload.to_vec()));
        }
        let mut payload = payload;
        let mut items = vec![];
        while !payload.is_empty() {
            items.push(Self::decode_next(&mut payload)?);
        }
        Ok(RlpItem::List(items))
    }

    /// Unsigned integer in its minimal big-endian form.
    pub fn uint(value: u64) -> Self {
        let bytes = value.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        RlpItem::Bytes(bytes[skip..].to_vec())
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_to(&mut out);
        out
    }

    fn encode_to(&self, out: &mut Vec<u8>) {
        match self {
            RlpItem::Bytes(bytes) => bytes.as_slice().encode(out),
            RlpItem::List(items) => {
                let mut payload = Vec::new();
                for item in items {
                    item.encode_to(&mut payload);
                }
                Header {
                    list: true,
                    payload_length: payload.len(),
                }
                .encode(out);
                out.extend(payload);
            }
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RlpItem::Bytes(bytes) => Some(bytes),
            RlpItem::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RlpItem]> {
        match self {
            RlpItem::Bytes(_) => None,
            RlpItem::List(items) => Some(items),
        }
    }

    /// Item at `index` of a list item.
    pub fn get(&self, index: usize) -> Option<&RlpItem> { self.as_list()?.get(index) }

    /// Interprets byte string as a big-endian unsigned integer.
    pub fn to_u64(&self) -> Option<u64> {
        let bytes = self.as_bytes()?;
        if bytes.len() > 8 {
            return None;
        }
        Some(bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64))
    }
}
