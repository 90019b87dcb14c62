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

use std::collections::BTreeSet;

use derive::KeyOrigin;
use invoice::ScriptPubkey;
use secp256k1::PublicKey;

use crate::{Outpoint, PrevTx, Sats, SeqNo, TxOut, Txid};

/// Final sequence number disabling both replacement and relative lock time.
pub const SEQ_NO_FINAL: SeqNo = SeqNo::from_consensus_u32(0xFFFF_FFFF);

/// Sequence number signalling opt-in replace-by-fee.
pub const SEQ_NO_RBF: SeqNo = SeqNo::from_consensus_u32(0xFFFF_FFFD);

/// Kind of transaction, deciding whether outputs may exceed inputs.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub enum TransactionKind {
    /// Regular transfer; outputs never exceed inputs.
    #[default]
    #[display("standard")]
    Standard,

    /// Burn of native coins into an asset allocation: the minted allocation
    /// is accounted for in outputs while nothing backs it in inputs.
    #[display("burn")]
    Burn,

    /// Mint of an allocation from a bridge proof.
    #[display("mint")]
    Mint,
}

impl TransactionKind {
    pub fn allows_negative_fee(self) -> bool { self == TransactionKind::Burn }
}

/// Asset amount carried by an output.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display("{value}@{guid}")]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct AssetAllocation {
    pub guid: u64,
    pub value: u64,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RequestInput {
    pub txid: Txid,
    pub vout: u32,
    pub sequence: SeqNo,
    pub witness_utxo: Option<TxOut>,
    pub non_witness_utxo: Option<PrevTx>,
    /// Full derivation path of the key controlling the input, if the engine
    /// knows it.
    pub path: Option<String>,
    /// Key and its origin, attached once ownership of the input is confirmed.
    pub bip32_derivation: Option<(PublicKey, KeyOrigin)>,
}

impl RequestInput {
    pub fn new(txid: Txid, vout: u32) -> Self {
        RequestInput {
            txid,
            vout,
            sequence: SEQ_NO_RBF,
            witness_utxo: None,
            non_witness_utxo: None,
            path: None,
            bip32_derivation: None,
        }
    }

    pub fn outpoint(&self) -> Outpoint { Outpoint::new(self.txid, self.vout) }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RequestOutput {
    pub script: Option<ScriptPubkey>,
    pub address: Option<String>,
    pub value: Sats,
    pub asset: Option<AssetAllocation>,
}

impl RequestOutput {
    pub fn to_address(address: impl ToString, value: u64) -> Self {
        RequestOutput {
            script: None,
            address: Some(address.to_string()),
            value: Sats(value),
            asset: None,
        }
    }

    pub fn to_script(script: ScriptPubkey, value: u64) -> Self {
        RequestOutput {
            script: Some(script),
            address: None,
            value: Sats(value),
            asset: None,
        }
    }

    pub fn with_asset(mut self, guid: u64, value: u64) -> Self {
        self.asset = Some(AssetAllocation { guid, value });
        self
    }
}

/// Transaction layout produced by the transaction engine: inputs with their
/// previous outputs and optional key paths, outputs, version and lock time.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TransactionRequest {
    pub version: i32,
    pub lock_time: u32,
    pub kind: TransactionKind,
    pub inputs: Vec<RequestInput>,
    pub outputs: Vec<RequestOutput>,
}

impl TransactionRequest {
    pub fn new(version: i32, kind: TransactionKind) -> Self {
        TransactionRequest {
            version,
            lock_time: 0,
            kind,
            inputs: vec![],
            outputs: vec![],
        }
    }

    /// Guids of all assets allocated in the outputs, in ascending order.
    pub fn asset_guids(&self) -> BTreeSet<u64> {
        self.outputs.iter().filter_map(|out| out.asset).map(|asset| asset.guid).collect()
    }
}
