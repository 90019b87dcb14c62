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

use std::time::Duration;

use alloy_primitives::{address, Address, B256, U256};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

use crate::foreign::{decode_freeze_call, receipt_logs, ForeignDataError};
use crate::{PrecisionError, RlpItem, TokenFreeze, TransferIdAndPrecisions};

/// `TokenFreeze(address,uint256,uint256)` event signature.
pub const TOKEN_FREEZE_TOPIC: B256 = TokenFreeze::SIGNATURE_HASH;

/// Default limit for a single proof service call.
pub const DEFAULT_PROOF_TIMEOUT: Duration = Duration::from_secs(30);

/// Error reported by a [`ProofService`] implementation.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("proof service failure: {0}")]
pub struct ProofServiceError(pub String);

/// Merkle-Patricia proof of a single trie entry together with the block
/// header committing to the trie.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TrieProof {
    /// RLP list of the block header fields.
    pub header: RlpItem,
    /// Trie nodes from the root to the leaf.
    pub nodes: Vec<RlpItem>,
    /// Position of the transaction in the block.
    pub index: u64,
}

impl TrieProof {
    fn header_field(&self, index: usize) -> Result<&RlpItem, BridgeError> {
        self.header.get(index).ok_or(BridgeError::MalformedProof("block header"))
    }

    /// Value stored in the leaf node of the proof.
    fn leaf_value(&self) -> Result<&[u8], BridgeError> {
        self.nodes
            .last()
            .and_then(RlpItem::as_list)
            .and_then(<[RlpItem]>::last)
            .and_then(RlpItem::as_bytes)
            .ok_or(BridgeError::MalformedProof("leaf node"))
    }

    fn encoded_nodes(&self) -> Vec<u8> { RlpItem::List(self.nodes.clone()).encode() }
}

/// Source of transaction and receipt inclusion proofs on the foreign chain.
#[async_trait]
pub trait ProofService: Send + Sync {
    async fn transaction_proof(&self, txid: &str) -> Result<TrieProof, ProofServiceError>;
    async fn receipt_proof(&self, txid: &str) -> Result<TrieProof, ProofServiceError>;
}

#[derive(Clone, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum BridgeError {
    #[from]
    #[display(inner)]
    Service(ProofServiceError),

    /// proof service didn't return {0} proof within {1:?}.
    Timeout(&'static str, Duration),

    #[from]
    #[display(inner)]
    ForeignData(ForeignDataError),

    #[from]
    #[display(inner)]
    Precision(PrecisionError),

    /// malformed {0} in the proof.
    MalformedProof(&'static str),
}

/// Addresses identifying the bridge contracts on the foreign chain.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BridgeConfig {
    pub erc20_manager: Address,
    pub token_freeze_topic: B256,
}

impl BridgeConfig {
    pub const fn mainnet() -> Self {
        BridgeConfig {
            erc20_manager: address!("FF957eA28b537b34E0c6E6B50c6c938668DD28a0"),
            token_freeze_topic: TOKEN_FREEZE_TOPIC,
        }
    }

    pub const fn testnet() -> Self {
        BridgeConfig {
            erc20_manager: address!("0765efb302d504751c652c5b1d65e8e9edf2e70f"),
            token_freeze_topic: TOKEN_FREEZE_TOPIC,
        }
    }

    /// Picks the contracts by the proof service endpoint: anything not
    /// pointing to mainnet is treated as testnet.
    pub fn for_endpoint(url: &str) -> Self {
        if url.contains("mainnet") {
            Self::mainnet()
        } else {
            Self::testnet()
        }
    }
}

/// Everything the native chain needs to verify a burn on the foreign chain
/// and mint the corresponding allocation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BridgeProof {
    pub asset_guid: u32,
    pub destination_address: String,
    /// Amount in the native asset precision.
    pub amount: i64,
    pub bridge_transfer_id: u32,
    pub block_number: u64,
    pub tx_value: Vec<u8>,
    pub tx_root: Vec<u8>,
    pub tx_parent_nodes: Vec<u8>,
    pub tx_path: Vec<u8>,
    pub receipt_value: Vec<u8>,
    pub receipt_root: Vec<u8>,
    pub receipt_parent_nodes: Vec<u8>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum BridgeOutcome {
    Found(BridgeProof),
    /// The receipt carries no freeze event from the bridge contract.
    NotFound,
}

impl BridgeOutcome {
    pub fn into_proof(self) -> Option<BridgeProof> {
        match self {
            BridgeOutcome::Found(proof) => Some(proof),
            BridgeOutcome::NotFound => None,
        }
    }
}

/// Freeze event data matched in a receipt.
struct Freeze {
    value: U256,
    params: TransferIdAndPrecisions,
}

pub struct ProofBuilder<S: ProofService> {
    service: S,
    config: BridgeConfig,
    timeout: Duration,
}

impl<S: ProofService> ProofBuilder<S> {
    pub fn new(service: S, config: BridgeConfig) -> Self {
        ProofBuilder {
            service,
            config,
            timeout: DEFAULT_PROOF_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &BridgeConfig { &self.config }

    fn find_freeze(&self, raw_receipt: &[u8]) -> Result<Option<Freeze>, BridgeError> {
        for log in receipt_logs(raw_receipt)? {
            let [topic] = log.topics() else {
                continue;
            };
            if *topic != self.config.token_freeze_topic || log.address != self.config.erc20_manager
            {
                debug!("skipping log from {} with topic {topic}", log.address);
                continue;
            }
            let (freezer, value, packed) = TokenFreeze::abi_decode_data(&log.data.data, false)
                .map_err(ForeignDataError::from)?;
            let params = TransferIdAndPrecisions::from(packed);
            info!(
                "matched freeze of {value} by {freezer}, transfer id {}",
                params.transfer_id
            );
            return Ok(Some(Freeze { value, params }));
        }
        Ok(None)
    }

    /// Builds the mint proof for the foreign transaction `txid`.
    #[instrument(skip(self))]
    pub async fn build(&self, txid: &str) -> Result<BridgeOutcome, BridgeError> {
        let tx_proof = timeout(self.timeout, self.service.transaction_proof(txid))
            .await
            .map_err(|_| BridgeError::Timeout("transaction", self.timeout))??;
        let tx_value = tx_proof.leaf_value()?;
        let call = decode_freeze_call(tx_value)?;
        let block_number = tx_proof
            .header_field(8)?
            .to_u64()
            .ok_or(BridgeError::MalformedProof("block number"))?;

        let receipt_proof = timeout(self.timeout, self.service.receipt_proof(txid))
            .await
            .map_err(|_| BridgeError::Timeout("receipt", self.timeout))??;
        let receipt_value = receipt_proof.leaf_value()?;

        let Some(freeze) = self.find_freeze(receipt_value)? else {
            debug!("no freeze event of {} in receipt", self.config.erc20_manager);
            return Ok(BridgeOutcome::NotFound);
        };
        let amount = freeze.params.reconcile(freeze.value)?;

        Ok(BridgeOutcome::Found(BridgeProof {
            asset_guid: call.assetGUID,
            destination_address: call.syscoinAddress,
            amount,
            bridge_transfer_id: freeze.params.transfer_id,
            block_number,
            tx_value: tx_value.to_vec(),
            tx_root: tx_proof.header_field(4)?.encode(),
            tx_parent_nodes: tx_proof.encoded_nodes(),
            tx_path: RlpItem::uint(tx_proof.index).encode(),
            receipt_value: receipt_value.to_vec(),
            receipt_root: receipt_proof.header_field(5)?.encode(),
            receipt_parent_nodes: receipt_proof.encoded_nodes(),
        }))
    }
}
