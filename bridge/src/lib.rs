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

mod rlp;
mod precision;
pub mod foreign;
mod proof;

pub use foreign::{freezeBurnERC20Call, ForeignDataError, TokenFreeze};
pub use precision::{reconcile, PrecisionError, TransferIdAndPrecisions};
pub use proof::{
    BridgeConfig, BridgeError, BridgeOutcome, BridgeProof, ProofBuilder, ProofService,
    ProofServiceError, TrieProof, DEFAULT_PROOF_TIMEOUT, TOKEN_FREEZE_TOPIC,
};
pub use rlp::{RlpError, RlpItem};
