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

#[macro_use]
extern crate amplify;

use std::time::Duration;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use bridge::{
    freezeBurnERC20Call, BridgeConfig, BridgeError, BridgeOutcome, ForeignDataError, ProofBuilder,
    ProofService, ProofServiceError, RlpItem, TokenFreeze, TrieProof, TOKEN_FREEZE_TOPIC,
};

const TX_ROOT: [u8; 32] = [0x44; 32];
const RECEIPT_ROOT: [u8; 32] = [0x55; 32];
const BLOCK: u64 = 9_876_543;
const DESTINATION: &str = "tsys1q4v8n7la8yfyffw5zpuauzz2c9wfq6jlvhp6znk";

fn freeze_call_tx(value: U256, guid: u32) -> Vec<u8> {
    let data = freezeBurnERC20Call {
        value,
        assetGUID: guid,
        syscoinAddress: DESTINATION.to_string(),
    }
    .abi_encode();
    RlpItem::List(vec![
        RlpItem::uint(3),
        RlpItem::uint(1_000_000_000),
        RlpItem::uint(200_000),
        RlpItem::Bytes(BridgeConfig::testnet().erc20_manager.to_vec()),
        RlpItem::uint(0),
        RlpItem::Bytes(data),
        RlpItem::uint(0x2c),
        RlpItem::Bytes(vec![0x01; 32]),
        RlpItem::Bytes(vec![0x02; 32]),
    ])
    .encode()
}

fn freeze_log(emitter: Address, topics: usize, value: U256, packed: u64) -> RlpItem {
    let data = TokenFreeze {
        freezer: Address::from([0x99; 20]),
        value,
        transferIdAndPrecisions: U256::from(packed),
    }
    .encode_data();
    RlpItem::List(vec![
        RlpItem::Bytes(emitter.to_vec()),
        RlpItem::List(
            (0..topics).map(|_| RlpItem::Bytes(TOKEN_FREEZE_TOPIC.to_vec())).collect(),
        ),
        RlpItem::Bytes(data),
    ])
}

fn receipt(logs: Vec<RlpItem>) -> Vec<u8> {
    RlpItem::List(vec![
        RlpItem::uint(1),
        RlpItem::uint(54_321),
        RlpItem::Bytes(vec![0; 256]),
        RlpItem::List(logs),
    ])
    .encode()
}

fn header() -> RlpItem {
    let mut fields = vec![RlpItem::Bytes(vec![0xee; 32]); 15];
    fields[4] = RlpItem::Bytes(TX_ROOT.to_vec());
    fields[5] = RlpItem::Bytes(RECEIPT_ROOT.to_vec());
    fields[8] = RlpItem::uint(BLOCK);
    RlpItem::List(fields)
}

fn trie_proof(leaf: Vec<u8>) -> TrieProof {
    TrieProof {
        header: header(),
        nodes: vec![
            RlpItem::List(vec![RlpItem::Bytes(vec![]); 17]),
            RlpItem::List(vec![RlpItem::Bytes(vec![0x20, 0x03]), RlpItem::Bytes(leaf)]),
        ],
        index: 3,
    }
}

struct MockService {
    tx: Vec<u8>,
    receipt: Vec<u8>,
    delay: Option<Duration>,
}

#[async_trait]
impl ProofService for MockService {
    async fn transaction_proof(&self, txid: &str) -> Result<TrieProof, ProofServiceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if txid.is_empty() {
            return Err(ProofServiceError(s!("unknown transaction")));
        }
        Ok(trie_proof(self.tx.clone()))
    }

    async fn receipt_proof(&self, _txid: &str) -> Result<TrieProof, ProofServiceError> {
        Ok(trie_proof(self.receipt.clone()))
    }
}

fn builder(logs: Vec<RlpItem>) -> ProofBuilder<MockService> {
    let service = MockService {
        tx: freeze_call_tx(U256::from(1_230_000_000_000_000_000u64), 1_045_909_988),
        receipt: receipt(logs),
        delay: None,
    };
    ProofBuilder::new(service, BridgeConfig::testnet())
}

const PACKED: u64 = (8 << 40) | (18 << 32) | 61;

#[tokio::test]
async fn freeze_with_precision_reconciliation() {
    let value = U256::from(1_230_000_000_000_000_000u64);
    let manager = BridgeConfig::testnet().erc20_manager;
    let unrelated = freeze_log(Address::from([0x01; 20]), 1, value, PACKED);
    let builder = builder(vec![unrelated, freeze_log(manager, 1, value, PACKED)]);

    let proof = builder.build("0xabc").await.unwrap().into_proof().unwrap();
    assert_eq!(proof.amount, 123_000_000);
    assert_eq!(proof.bridge_transfer_id, 61);
    assert_eq!(proof.asset_guid, 1_045_909_988);
    assert_eq!(proof.destination_address, DESTINATION);
    assert_eq!(proof.block_number, BLOCK);
    assert_eq!(proof.tx_path, vec![0x03]);
    assert_eq!(proof.tx_root[0], 0xa0);
    assert_eq!(&proof.tx_root[1..], &TX_ROOT);
    assert_eq!(&proof.receipt_root[1..], &RECEIPT_ROOT);
    assert_eq!(RlpItem::decode(&proof.tx_parent_nodes).unwrap().as_list().unwrap().len(), 2);
    assert!(RlpItem::decode(&proof.tx_value).unwrap().get(5).is_some());
}

#[tokio::test]
async fn foreign_emitter_is_not_found() {
    let value = U256::from(1_000u64);
    let builder = builder(vec![freeze_log(Address::from([0x01; 20]), 1, value, PACKED)]);
    assert_eq!(builder.build("0xabc").await, Ok(BridgeOutcome::NotFound));
}

#[tokio::test]
async fn extra_topics_are_skipped() {
    let manager = BridgeConfig::testnet().erc20_manager;
    let builder = builder(vec![freeze_log(manager, 2, U256::from(1_000u64), PACKED)]);
    assert_eq!(builder.build("0xabc").await, Ok(BridgeOutcome::NotFound));
}

#[tokio::test]
async fn mainnet_contract_differs() {
    let value = U256::from(1_000u64);
    let manager = BridgeConfig::testnet().erc20_manager;
    let service = MockService {
        tx: freeze_call_tx(value, 1),
        receipt: receipt(vec![freeze_log(manager, 1, value, PACKED)]),
        delay: None,
    };
    let builder = ProofBuilder::new(service, BridgeConfig::for_endpoint("https://mainnet.infura.io"));
    assert_eq!(builder.build("0xabc").await, Ok(BridgeOutcome::NotFound));
}

#[tokio::test]
async fn oversized_amount() {
    let manager = BridgeConfig::testnet().erc20_manager;
    let packed = (18 << 40) | 1;
    let builder = builder(vec![freeze_log(manager, 1, U256::from(u64::MAX), packed)]);
    assert!(matches!(builder.build("0xabc").await, Err(BridgeError::Precision(_))));
}

#[tokio::test]
async fn foreign_call_is_rejected() {
    let manager = BridgeConfig::testnet().erc20_manager;
    let mut tx = RlpItem::decode(&freeze_call_tx(U256::from(1u8), 1)).unwrap();
    if let RlpItem::List(fields) = &mut tx {
        fields[5] = RlpItem::Bytes(vec![0xa9, 0x05, 0x9c, 0xbb]);
    }
    let service = MockService {
        tx: tx.encode(),
        receipt: receipt(vec![freeze_log(manager, 1, U256::from(1u8), PACKED)]),
        delay: None,
    };
    let builder = ProofBuilder::new(service, BridgeConfig::testnet());
    assert!(matches!(
        builder.build("0xabc").await,
        Err(BridgeError::ForeignData(ForeignDataError::Abi(_)))
    ));
}

#[test]
fn freeze_topic_is_event_signature() {
    assert_eq!(TOKEN_FREEZE_TOPIC, TokenFreeze::SIGNATURE_HASH);
    assert_eq!(
        TOKEN_FREEZE_TOPIC.to_string(),
        "0x9c6dea23fe3b510bb5d170df49dc74e387692eaa3258c691918cd3aa94f5fb74"
    );
    assert_eq!(freezeBurnERC20Call::SELECTOR, [0x54, 0xc9, 0x88, 0xff]);
}

#[tokio::test]
async fn service_errors_propagate() {
    let builder = builder(vec![]);
    assert_eq!(
        builder.build("").await,
        Err(BridgeError::Service(ProofServiceError(s!("unknown transaction"))))
    );
}

#[tokio::test]
async fn slow_service_times_out() {
    let service = MockService {
        tx: vec![],
        receipt: vec![],
        delay: Some(Duration::from_secs(5)),
    };
    let builder = ProofBuilder::new(service, BridgeConfig::testnet())
        .with_timeout(Duration::from_millis(20));
    assert!(matches!(builder.build("0xabc").await, Err(BridgeError::Timeout("transaction", _))));
}
