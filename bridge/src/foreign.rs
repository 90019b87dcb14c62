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


//! Decoding of transactions and receipts of the foreign (EVM) chain.

use alloy_consensus::{ReceiptEnvelope, Transaction, TxEnvelope};
use alloy_eips::eip2718::{Decodable2718, Eip2718Error};
use alloy_primitives::Log;
use alloy_sol_types::{sol, SolCall};

use crate::RlpError;

sol! {
    /// Entry point of the ERC-20 manager locking tokens for a mint on the
    /// native chain.
    #[derive(Debug, PartialEq, Eq)]
    function freezeBurnERC20(uint256 value, uint32 assetGUID, string syscoinAddress);

    /// Emitted by the ERC-20 manager for every frozen amount.
    #[derive(Debug, PartialEq, Eq)]
    event TokenFreeze(address freezer, uint256 value, uint256 transferIdAndPrecisions);
}

#[derive(Clone, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum ForeignDataError {
    /// invalid RLP encoding - {0}
    #[from]
    Rlp(RlpError),

    /// transaction is not a `freezeBurnERC20` call - {0}
    #[from]
    Abi(alloy_sol_types::Error),

    /// unsupported typed envelope {0:#04x}.
    UnsupportedType(u8),

    /// {0} has {1} trailing bytes.
    TrailingData(&'static str, usize),
}

impl From<Eip2718Error> for ForeignDataError {
    fn from(err: Eip2718Error) -> Self {
        match err {
            Eip2718Error::RlpError(err) => ForeignDataError::Rlp(err),
            Eip2718Error::UnexpectedType(ty) => ForeignDataError::UnsupportedType(ty),
            _ => ForeignDataError::Rlp(RlpError::Custom("unknown envelope error")),
        }
    }
}

fn decode_envelope<T: Decodable2718>(
    what: &'static str,
    raw: &[u8],
) -> Result<T, ForeignDataError> {
    let mut buf = raw;
    let item = T::decode_2718(&mut buf)?;
    if !buf.is_empty() {
        return Err(ForeignDataError::TrailingData(what, buf.len()));
    }
    Ok(item)
}

/// Decodes the freeze call from a legacy or typed raw transaction.
pub fn decode_freeze_call(raw_tx: &[u8]) -> Result<freezeBurnERC20Call, ForeignDataError> {
    let tx = decode_envelope::<TxEnvelope>("transaction", raw_tx)?;
    Ok(freezeBurnERC20Call::abi_decode(tx.input(), false)?)
}

/// Logs of a legacy or typed receipt.
pub fn receipt_logs(raw_receipt: &[u8]) -> Result<Vec<Log>, ForeignDataError> {
    let receipt = decode_envelope::<ReceiptEnvelope>("receipt", raw_receipt)?;
    Ok(receipt.logs().to_vec())
}
