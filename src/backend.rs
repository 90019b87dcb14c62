// Transaction assembly, notarization and bridge proofs for asset-aware wallets.
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

//! Collaborators the wallet depends upon: the index service and the asset
//! transaction engine.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bridge::BridgeProof;
use derive::{DiscoveryError, TokenSource, UsedToken};
use invoice::Network;
use psbt::{RequestOutput, TransactionKind, TransactionRequest};

use crate::{AssetMap, NormalizedUtxos, RawUtxoSet};

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum BackendError {
    /// index service request failed - {0}
    Transport(String),

    /// index service responded with status {0} - {1}
    Status(u16, String),

    /// index service response can't be parsed - {0}
    InvalidResponse(String),
}

/// Full-node index service (Blockbook-compatible).
#[async_trait]
pub trait IndexService: Send + Sync {
    /// UTXOs of an address or extended public key, together with metadata
    /// of the assets they carry.
    async fn fetch_utxos(&self, owner: &str) -> Result<RawUtxoSet, BackendError>;

    /// Addresses of an extended public key which have seen transactions.
    async fn fetch_history(&self, xpub: &str) -> Result<Vec<UsedToken>, BackendError>;

    /// Broadcasts a signed transaction, returning its id.
    async fn broadcast(&self, raw_hex: &str) -> Result<String, BackendError>;
}

/// Adapts an [`IndexService`] for address index discovery by the signer.
pub struct IndexTokens<'index, I: IndexService + ?Sized>(pub &'index I);

#[async_trait]
impl<'index, I: IndexService + ?Sized> TokenSource for IndexTokens<'index, I> {
    async fn used_tokens(&self, xpub: &str) -> Result<Vec<UsedToken>, DiscoveryError> {
        self.0.fetch_history(xpub).await.map_err(|err| DiscoveryError(err.to_string()))
    }
}

/// Payment output of a plain transfer.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Recipient {
    pub address: String,
    pub value: u64,
}

/// Asset parameters passed to the engine verbatim.
pub type AssetOpts = serde_json::Value;

/// Operation the transaction engine is asked to lay out.
#[derive(Clone, PartialEq, Debug)]
pub enum Operation {
    Transfer {
        outputs: Vec<Recipient>,
    },
    AssetNew {
        opts: AssetOpts,
    },
    AssetUpdate {
        guid: u64,
        opts: AssetOpts,
        asset_map: AssetMap,
    },
    AssetSend {
        asset_map: AssetMap,
    },
    AssetAllocationSend {
        asset_map: AssetMap,
    },
    AssetAllocationBurn {
        opts: AssetOpts,
        asset_map: AssetMap,
    },
    AssetAllocationMint {
        proof: BridgeProof,
        opts: AssetOpts,
        asset_map: AssetMap,
    },
    BurnToAssetAllocation {
        asset_map: AssetMap,
        data_amount: u64,
    },
}

impl Operation {
    /// Balance rule the resulting transaction follows.
    pub fn kind(&self) -> TransactionKind {
        match self {
            Operation::AssetAllocationBurn { .. } => TransactionKind::Burn,
            Operation::AssetAllocationMint { .. } => TransactionKind::Mint,
            _ => TransactionKind::Standard,
        }
    }

    pub fn asset_map(&self) -> Option<&AssetMap> {
        match self {
            Operation::Transfer { .. } | Operation::AssetNew { .. } => None,
            Operation::AssetUpdate { asset_map, .. }
            | Operation::AssetSend { asset_map }
            | Operation::AssetAllocationSend { asset_map }
            | Operation::AssetAllocationBurn { asset_map, .. }
            | Operation::AssetAllocationMint { asset_map, .. }
            | Operation::BurnToAssetAllocation { asset_map, .. } => Some(asset_map),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct EngineRequest {
    pub operation: Operation,
    pub change_address: String,
    pub fee_rate: u64,
    pub network: Network,
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("transaction engine failure: {0}")]
pub struct EngineError(pub String);

/// Notary signatures by asset guid.
pub type NotarizationSignatureSet = BTreeMap<u64, Vec<u8>>;

/// Asset transaction engine doing coin selection, fee computation and output
/// layout.
pub trait TxEngine: Send + Sync {
    fn build_request(
        &self,
        request: &EngineRequest,
        utxos: &NormalizedUtxos,
    ) -> Result<TransactionRequest, EngineError>;

    /// Embeds notary signatures into the asset data of `outputs`. Returns the
    /// number of updated outputs, or `None` if nothing was changed.
    fn inject_notarization_signatures(
        &self,
        version: i32,
        sigs: &NotarizationSignatureSet,
        outputs: &mut [RequestOutput],
    ) -> Option<usize>;
}
