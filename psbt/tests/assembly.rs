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

#[macro_use]
extern crate amplify;

use derive::{AddressScheme, HdSigner};
use invoice::{Address, AddressPayload, Network};
use bc::VarIntArray;
use psbt::{
    AssembleError, Assembler, ConsensusEncode, LockTime, Outpoint, OwnershipIndex, PrevTx, Psbt,
    PsbtError, RequestInput, RequestOutput, Sats, SigScript, TransactionKind, TransactionRequest,
    Tx, TxIn, TxOut, TxVer, Txid, DEFAULT_MAX_FEE_RATE, SEQ_NO_FINAL,
};

const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon \
                        abandon abandon about";

const PAY_TO: &str = "bc1qnjg0jd8228aq7egyzacy8cys3knf9xvrerkf9g";
const CHANGE: &str = "bc1q8c6fshw2dlwun7ekn9qwf37cu2rn755upcp6el";

fn signer(scheme: AddressScheme) -> HdSigner {
    HdSigner::new(MNEMONIC, Network::Bitcoin, scheme).unwrap()
}

fn assembler() -> Assembler { Assembler::new(Network::Bitcoin, DEFAULT_MAX_FEE_RATE) }

fn witness_input(signer: &HdSigner, path: &str, value: u64) -> RequestInput {
    let pk = signer.derive_pubkey(path).unwrap();
    let mut input = RequestInput::new(Txid::from([0x11; 32]), 0);
    input.witness_utxo = Some(TxOut::new(signer.address_for(&pk).script_pubkey(), value));
    input.path = Some(path.to_owned());
    input
}

fn payment(kind: TransactionKind, input: RequestInput, outputs: &[(&str, u64)]) -> TransactionRequest {
    let mut request = TransactionRequest::new(2, kind);
    request.inputs.push(input);
    for (address, value) in outputs {
        request.outputs.push(RequestOutput::to_address(address, *value));
    }
    request
}

fn sign(signer: &HdSigner, mut request: TransactionRequest) -> Psbt {
    let ownership = OwnershipIndex::determine(&mut request, signer);
    assembler().signed(&request, Some(signer), &ownership).unwrap()
}

#[test]
fn standard_payment_finalizes() {
    let signer = signer(AddressScheme::Bip84);
    let input = witness_input(&signer, "m/84'/0'/0'/0/0", 100_000_000);
    let request =
        payment(TransactionKind::Standard, input, &[(PAY_TO, 50_000_000), (CHANGE, 49_998_590)]);
    let psbt = sign(&signer, request);

    assert!(psbt.is_finalized());
    let fee = psbt.fee().unwrap();
    assert_eq!(fee, 1410);
    assert_eq!(psbt.output_sum().unwrap().sats_i64() + fee, psbt.input_sum().unwrap().sats_i64());
    assert_eq!(psbt.fee_rate().unwrap(), 10);

    let tx = psbt.extract(true).unwrap();
    assert_eq!(tx.inputs[0].witness.len(), 2);
    assert!(tx.inputs[0].sig_script.is_empty());
    assert_eq!(tx.outputs[0].script_pubkey, Address::parse(PAY_TO, Network::Bitcoin).unwrap().script_pubkey());
    // serialized form survives a parse round
    assert_eq!(tx.to_string().parse::<Tx>().unwrap(), tx);
}

#[test]
fn unowned_input_stays_partial() {
    let signer = signer(AddressScheme::Bip84);
    let mut input = witness_input(&signer, "m/84'/0'/0'/0/0", 100_000_000);
    input.path = None;
    let psbt = sign(&signer, payment(TransactionKind::Standard, input, &[(PAY_TO, 1000)]));

    assert!(!psbt.is_finalized());
    assert!(psbt.inputs[0].partial_sigs.is_empty());
    assert_eq!(psbt.fee(), Err(PsbtError::NotFinalized));
    assert_eq!(psbt.fee_rate(), Err(PsbtError::NotFinalized));
    assert_eq!(psbt.extract(false), Err(PsbtError::NotFinalized));
}

#[test]
fn foreign_path_is_not_owned() {
    let signer = signer(AddressScheme::Bip84);
    let mut input = witness_input(&signer, "m/84'/0'/0'/0/0", 100_000_000);
    input.path = Some("not a path".to_owned());
    let mut request = payment(TransactionKind::Standard, input, &[(PAY_TO, 1000)]);
    let ownership = OwnershipIndex::determine(&mut request, &signer);
    assert!(ownership.is_empty());
    assert!(request.inputs[0].bip32_derivation.is_none());
}

#[test]
fn signing_requires_signer() {
    let signer = signer(AddressScheme::Bip84);
    let input = witness_input(&signer, "m/84'/0'/0'/0/0", 100_000_000);
    let request = payment(TransactionKind::Standard, input, &[(PAY_TO, 1000)]);
    let err = assembler().signed::<HdSigner>(&request, None, &OwnershipIndex::default());
    assert_eq!(err, Err(AssembleError::SignerUnavailable));
    // unsigned construction needs no keys
    assert!(!assembler().unsigned(&request).unwrap().is_finalized());
}

#[test]
fn burn_allows_negative_fee() {
    let signer = signer(AddressScheme::Bip84);
    let input = witness_input(&signer, "m/84'/0'/0'/0/0", 100_000);
    let psbt = sign(&signer, payment(TransactionKind::Burn, input.clone(), &[(PAY_TO, 150_000)]));
    assert!(psbt.is_finalized());
    assert_eq!(psbt.fee(), Ok(-50_000));
    assert!(psbt.extract(true).is_ok());

    let psbt = sign(&signer, payment(TransactionKind::Standard, input, &[(PAY_TO, 150_000)]));
    assert!(psbt.is_finalized());
    assert_eq!(
        psbt.extract(true),
        Err(PsbtError::OutputsExceedInputs {
            kind: TransactionKind::Standard,
            inputs: Sats(100_000),
            outputs: Sats(150_000)
        })
    );
}

#[test]
fn mint_rejects_negative_fee() {
    let signer = signer(AddressScheme::Bip84);
    let input = witness_input(&signer, "m/84'/0'/0'/0/0", 100_000);
    let psbt = sign(&signer, payment(TransactionKind::Mint, input, &[(PAY_TO, 100_001)]));
    assert!(matches!(psbt.fee(), Err(PsbtError::OutputsExceedInputs { .. })));
}

#[test]
fn fee_ceiling() {
    let signer = signer(AddressScheme::Bip84);
    let input = witness_input(&signer, "m/84'/0'/0'/0/0", 100_000_000);
    let psbt = sign(&signer, payment(TransactionKind::Standard, input, &[(PAY_TO, 1000)]));
    match psbt.extract(true) {
        Err(PsbtError::FeeTooHigh {
            fee_rate, ceiling, ..
        }) => {
            assert_eq!(ceiling, DEFAULT_MAX_FEE_RATE);
            assert!(fee_rate > 5000);
        }
        other => panic!("unexpected extraction result {other:?}"),
    }
    assert!(psbt.extract(false).is_ok());
}

#[test]
fn output_change_requires_new_signature() {
    let signer = signer(AddressScheme::Bip84);
    let input = witness_input(&signer, "m/84'/0'/0'/0/0", 100_000_000);
    let first = sign(&signer, payment(TransactionKind::Standard, input.clone(), &[(PAY_TO, 99_990_000)]));
    let second = sign(&signer, payment(TransactionKind::Standard, input, &[(PAY_TO, 99_980_000)]));
    assert_ne!(
        first.extract(false).unwrap().inputs[0].witness,
        second.extract(false).unwrap().inputs[0].witness
    );
}

#[test]
fn legacy_input_from_previous_tx() {
    let signer = signer(AddressScheme::Bip44);
    let path = "m/44'/0'/0'/0/0";
    let pk = signer.derive_pubkey(path).unwrap();
    let script = Address::new(AddressPayload::p2pkh(&pk.serialize()), Network::Bitcoin).script_pubkey();
    let prev = Tx {
        version: TxVer::V2,
        inputs: VarIntArray::from_collection_unsafe(vec![TxIn {
            prev_output: Outpoint::new(Txid::from([0x22; 32]), 3u32),
            sig_script: SigScript::from_unsafe(vec![0x51]),
            sequence: SEQ_NO_FINAL,
            witness: none!(),
        }]),
        outputs: VarIntArray::from_collection_unsafe(vec![
            TxOut::new(script.clone(), Sats(5000)),
            TxOut::new(script, Sats(70_000)),
        ]),
        lock_time: LockTime::ZERO,
    };

    let mut input = RequestInput::new(prev.txid(), 1);
    input.non_witness_utxo = Some(PrevTx::with_raw(prev.consensus_serialize()));
    input.path = Some(path.to_owned());
    let psbt = sign(&signer, payment(TransactionKind::Standard, input, &[(PAY_TO, 60_000)]));

    assert!(psbt.is_finalized());
    assert_eq!(psbt.fee(), Ok(10_000));
    let tx = psbt.extract(true).unwrap();
    let sig_script = tx.inputs[0].sig_script.as_slice();
    assert!(tx.inputs[0].witness.is_empty());
    // <sig> <compressed pubkey>
    assert_eq!(sig_script[sig_script.len() - 34], 33);
    assert_eq!(&sig_script[sig_script.len() - 33..], &pk.serialize()[..]);
}

#[test]
fn missing_prevout_is_rejected() {
    let mut request = TransactionRequest::new(2, TransactionKind::Standard);
    request.inputs.push(RequestInput::new(Txid::from([1; 32]), 0));
    request.outputs.push(RequestOutput::to_address(PAY_TO, 1));
    assert!(assembler().unsigned(&request).is_err());
}
