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

use bc::{ConsensusDecodeError, LegacySig, SigScript, VarIntArray, Weight};
use derive::KeyOrigin;
use indexmap::IndexMap;
use invoice::ScriptPubkey;
use secp256k1::PublicKey;

use crate::{
    AssetAllocation, LockTime, Outpoint, PrevTx, Sats, SeqNo, TransactionKind, Tx, TxIn, TxOut,
    TxVer, Witness,
};

/// Default ceiling for the fee rate, in satoshi per virtual byte.
pub const DEFAULT_MAX_FEE_RATE: u64 = 5000;

#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum PrevoutError {
    /// input {0} carries neither a witness output nor a previous transaction.
    Missing(usize),

    /// previous transaction of input {0} has no output #{1}.
    NoOutput(usize, u32),

    /// previous transaction of input {0} can't be parsed - {1}
    Decode(usize, ConsensusDecodeError),
}

#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum PsbtError {
    /// not all transaction inputs are finalized.
    NotFinalized,

    /// outputs of {kind} transaction exceed its inputs ({outputs} > {inputs} sats).
    OutputsExceedInputs {
        kind: TransactionKind,
        inputs: Sats,
        outputs: Sats,
    },

    /// fee rate {fee_rate} sat/vbyte exceeds the ceiling of {ceiling} sat/vbyte (transaction
    /// vsize {vsize}).
    FeeTooHigh {
        fee_rate: i64,
        ceiling: u64,
        vsize: u32,
    },

    /// total input or output value overflows.
    ValueOverflow,

    #[from]
    #[display(inner)]
    Prevout(PrevoutError),
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Psbt {
    pub version: TxVer,
    pub lock_time: LockTime,
    pub kind: TransactionKind,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    /// Fee rate ceiling applied on extraction with a fee check.
    pub max_fee_rate: u64,
}

impl Psbt {
    pub fn to_unsigned_tx(&self) -> Tx {
        Tx {
            version: self.version,
            inputs: VarIntArray::from_collection_unsafe(
                self.inputs.iter().map(Input::to_unsigned_txin).collect(),
            ),
            outputs: VarIntArray::from_collection_unsafe(
                self.outputs.iter().map(Output::to_txout).collect(),
            ),
            lock_time: self.lock_time,
        }
    }

    pub fn is_finalized(&self) -> bool {
        !self.inputs.is_empty() && self.inputs.iter().all(Input::is_finalized)
    }

    pub fn input_sum(&self) -> Result<Sats, PsbtError> {
        self.inputs.iter().try_fold(Sats::ZERO, |sum, input| {
            sum.checked_add(input.prev_txout()?.value).ok_or(PsbtError::ValueOverflow)
        })
    }

    pub fn output_sum(&self) -> Result<Sats, PsbtError> {
        self.outputs
            .iter()
            .try_fold(Sats::ZERO, |sum, output| sum.checked_add(output.value))
            .ok_or(PsbtError::ValueOverflow)
    }

    /// Difference between inputs and outputs. Negative only for burn
    /// transactions.
    pub fn fee(&self) -> Result<i64, PsbtError> {
        if !self.is_finalized() {
            return Err(PsbtError::NotFinalized);
        }
        let inputs = self.input_sum()?;
        let outputs = self.output_sum()?;
        if outputs > inputs && !self.kind.allows_negative_fee() {
            return Err(PsbtError::OutputsExceedInputs {
                kind: self.kind,
                inputs,
                outputs,
            });
        }
        i64::try_from(inputs.sats() as i128 - outputs.sats() as i128)
            .map_err(|_| PsbtError::ValueOverflow)
    }

    fn to_signed_tx(&self) -> Result<Tx, PsbtError> {
        if !self.is_finalized() {
            return Err(PsbtError::NotFinalized);
        }
        Ok(Tx {
            version: self.version,
            inputs: VarIntArray::from_collection_unsafe(
                self.inputs.iter().map(Input::to_signed_txin).collect(),
            ),
            outputs: VarIntArray::from_collection_unsafe(
                self.outputs.iter().map(Output::to_txout).collect(),
            ),
            lock_time: self.lock_time,
        })
    }

    /// Virtual size of the finalized transaction.
    pub fn vsize(&self) -> Result<u32, PsbtError> {
        self.to_signed_tx().map(|tx| tx.vbytes().to_u32())
    }

    /// Fee rate in satoshi per virtual byte, rounded towards negative
    /// infinity.
    pub fn fee_rate(&self) -> Result<i64, PsbtError> {
        let fee = self.fee()?;
        let vsize = self.vsize()?;
        Ok(fee.div_euclid(vsize as i64))
    }

    /// Extracts the signed transaction. With `fee_check` the fee rate must
    /// not exceed [`Psbt::max_fee_rate`].
    pub fn extract(&self, fee_check: bool) -> Result<Tx, PsbtError> {
        let tx = self.to_signed_tx()?;
        let fee = self.fee()?;
        if fee_check {
            let vsize = tx.vbytes().to_u32();
            let fee_rate = fee.div_euclid(vsize as i64);
            if fee_rate > 0 && fee_rate as u64 > self.max_fee_rate {
                return Err(PsbtError::FeeTooHigh {
                    fee_rate,
                    ceiling: self.max_fee_rate,
                    vsize,
                });
            }
        }
        Ok(tx)
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Input {
    pub index: usize,
    pub previous_outpoint: Outpoint,
    pub sequence: SeqNo,
    pub witness_utxo: Option<TxOut>,
    pub non_witness_utxo: Option<PrevTx>,
    pub bip32_derivation: IndexMap<PublicKey, KeyOrigin>,
    pub partial_sigs: IndexMap<PublicKey, LegacySig>,
    pub final_script_sig: Option<SigScript>,
    pub final_witness: Option<Witness>,
}

impl Input {
    /// Previous output spent by the input, taken from the witness output or
    /// the full previous transaction.
    pub fn prev_txout(&self) -> Result<TxOut, PrevoutError> {
        if let Some(txout) = &self.witness_utxo {
            return Ok(txout.clone());
        }
        let vout = self.previous_outpoint.vout_u32();
        let prev = self.non_witness_utxo.as_ref().ok_or(PrevoutError::Missing(self.index))?;
        prev.output(vout)
            .map_err(|err| PrevoutError::Decode(self.index, err))?
            .cloned()
            .ok_or(PrevoutError::NoOutput(self.index, vout))
    }

    pub fn is_finalized(&self) -> bool {
        self.final_script_sig.is_some() || self.final_witness.is_some()
    }

    pub fn to_unsigned_txin(&self) -> TxIn {
        TxIn {
            prev_output: self.previous_outpoint,
            sig_script: none!(),
            sequence: self.sequence,
            witness: none!(),
        }
    }

    pub fn to_signed_txin(&self) -> TxIn {
        TxIn {
            prev_output: self.previous_outpoint,
            sig_script: self.final_script_sig.clone().unwrap_or_default(),
            sequence: self.sequence,
            witness: self.final_witness.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Output {
    pub index: usize,
    pub script_pubkey: ScriptPubkey,
    pub value: Sats,
    pub asset: Option<AssetAllocation>,
}

impl Output {
    pub fn to_txout(&self) -> TxOut { TxOut::new(self.script_pubkey.clone(), self.value) }
}
