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

use alloy_primitives::U256;

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum PrecisionError {
    /// amount {value} rescaled from precision {from} to {to} doesn't fit a signed 64-bit
    /// integer.
    Overflow { value: U256, from: u8, to: u8 },
}

/// Packed word emitted by the freeze event: transfer id in the low 32 bits,
/// source token precision in bits 32..40 and native asset precision in bits
/// 40..48.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TransferIdAndPrecisions {
    pub transfer_id: u32,
    pub source_precision: u8,
    pub native_precision: u8,
}

impl From<U256> for TransferIdAndPrecisions {
    fn from(word: U256) -> Self {
        let low = word.as_limbs()[0];
        TransferIdAndPrecisions {
            transfer_id: low as u32,
            source_precision: (low >> 32) as u8,
            native_precision: (low >> 40) as u8,
        }
    }
}

impl TransferIdAndPrecisions {
    pub fn reconcile(&self, value: U256) -> Result<i64, PrecisionError> {
        reconcile(value, self.source_precision, self.native_precision)
    }
}

/// Rescales `value` expressed with `source` decimals into `native` decimals.
/// Scaling down truncates.
pub fn reconcile(value: U256, source: u8, native: u8) -> Result<i64, PrecisionError> {
    let overflow = || PrecisionError::Overflow {
        value,
        from: source,
        to: native,
    };
    let ten = U256::from(10u8);
    let amount = if native > source {
        ten.checked_pow(U256::from(native - source))
            .and_then(|factor| value.checked_mul(factor))
            .ok_or_else(overflow)?
    } else if native < source {
        match ten.checked_pow(U256::from(source - native)) {
            Some(divisor) => value / divisor,
            None => U256::ZERO,
        }
    } else {
        value
    };
    if amount > U256::from(i64::MAX as u64) {
        return Err(overflow());
    }
    Ok(amount.as_limbs()[0] as i64)
}
