// Partially signed transactions for asset-aware UTXO chains.
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

use std::cell::OnceCell;
use std::fmt::{self, Debug, Formatter};

use amplify::hex::ToHex;
use bc::{ConsensusDecode, ConsensusDecodeError, ConsensusEncode};

use crate::{Tx, TxOut};

/// Full previous transaction of a non-witness input.
///
/// Either representation may be supplied; the other one is computed on first
/// access and kept for subsequent calls.
#[derive(Clone, Default)]
pub struct PrevTx {
    raw: OnceCell<Vec<u8>>,
    tx: OnceCell<Tx>,
}

impl PrevTx {
    pub fn with_raw(raw: impl Into<Vec<u8>>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(raw.into());
        PrevTx {
            raw: cell,
            tx: OnceCell::new(),
        }
    }

    pub fn with_tx(tx: Tx) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(tx);
        PrevTx {
            raw: OnceCell::new(),
            tx: cell,
        }
    }

    pub fn raw(&self) -> &[u8] {
        self.raw.get_or_init(|| match self.tx.get() {
            Some(tx) => tx.consensus_serialize(),
            None => vec![],
        })
    }

    pub fn tx(&self) -> Result<&Tx, ConsensusDecodeError> {
        if let Some(tx) = self.tx.get() {
            return Ok(tx);
        }
        let tx = Tx::consensus_deserialize(self.raw())?;
        Ok(self.tx.get_or_init(|| tx))
    }

    pub fn output(&self, vout: u32) -> Result<Option<&TxOut>, ConsensusDecodeError> {
        Ok(self.tx()?.outputs.get(vout as usize))
    }
}

impl PartialEq for PrevTx {
    fn eq(&self, other: &Self) -> bool { self.raw() == other.raw() }
}

impl Eq for PrevTx {}

impl Debug for PrevTx {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrevTx").field(&self.raw().to_hex()).finish()
    }
}

#[cfg(test)]
mod test {
    use bc::{LockTime, TxVer, VarIntArray};
    use invoice::ScriptPubkey;

    use super::*;
    use crate::{Outpoint, Sats, TxIn, Txid, SEQ_NO_FINAL};

    fn sample() -> Tx {
        Tx {
            version: TxVer::V2,
            inputs: VarIntArray::from_collection_unsafe(vec![TxIn {
                prev_output: Outpoint::new(Txid::from([7u8; 32]), 1u32),
                sig_script: none!(),
                sequence: SEQ_NO_FINAL,
                witness: none!(),
            }]),
            outputs: VarIntArray::from_collection_unsafe(vec![TxOut::new(
                ScriptPubkey::p2wpkh([3u8; 20]),
                Sats(1000),
            )]),
            lock_time: LockTime::ZERO,
        }
    }

    #[test]
    fn parses_lazily() {
        let tx = sample();
        let prev = PrevTx::with_raw(tx.consensus_serialize());
        assert_eq!(prev.tx().unwrap(), &tx);
        assert_eq!(prev.output(0).unwrap().map(|out| out.value), Some(Sats(1000)));
        assert_eq!(prev.output(1).unwrap(), None);
    }

    #[test]
    fn serializes_lazily() {
        let tx = sample();
        let prev = PrevTx::with_tx(tx.clone());
        assert_eq!(prev.raw(), tx.consensus_serialize().as_slice());
        assert_eq!(prev, PrevTx::with_raw(tx.consensus_serialize()));
    }

    #[test]
    fn garbage() {
        let prev = PrevTx::with_raw(vec![0x01, 0x02]);
        assert!(prev.tx().is_err());
    }
}
