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
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

mod prevtx;
mod request;
mod maps;
mod assemble;
mod sign;

pub use assemble::{AssembleError, Assembler, ConstructionError, OwnershipIndex};
pub use bc::{
    ConsensusDecode, ConsensusDecodeError, ConsensusEncode, LegacySig, LockTime, Outpoint, Sats,
    ScriptPubkey, SeqNo, SigScript, Tx, TxIn, TxOut, TxVer, Txid, Vout, Witness,
};
pub use maps::{Input, Output, PrevoutError, Psbt, PsbtError, DEFAULT_MAX_FEE_RATE};
pub use prevtx::PrevTx;
pub use request::{
    AssetAllocation, RequestInput, RequestOutput, TransactionKind, TransactionRequest,
    SEQ_NO_FINAL, SEQ_NO_RBF,
};
pub use sign::SignError;
