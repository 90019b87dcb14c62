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

#[macro_use]
extern crate amplify;

mod records;
mod normalize;
mod backend;
mod error;
mod notary;
mod config;
mod wallet;
#[cfg(feature = "http")]
mod http;

pub use backend::{
    AssetOpts, BackendError, EngineError, EngineRequest, IndexService, IndexTokens,
    NotarizationSignatureSet, Operation, Recipient, TxEngine,
};
pub use config::WalletConfig;
pub use error::Error;
#[cfg(feature = "http")]
pub use http::{BlockbookClient, HttpNotary};
pub use normalize::{
    normalize, AssetMap, AssetMetadata, AssetOutput, AssetRequest, AuxFee, AuxFeeDetails,
    DataIntegrity, NormalizedUtxos, NotaryDetails, TxOptions, Utxo, NOTARY_SIG_LEN,
};
pub use notary::{
    Coordinator, NotarizationReport, NotarizedPsbt, NotaryClient, NotaryError, NotaryOutcome,
    NotaryPolicy, NotaryResponse, DEFAULT_NOTARY_TIMEOUT,
};
pub use records::{
    RawAsset, RawAssetInfo, RawAuxFee, RawAuxFeeDetails, RawNotaryDetails, RawNumber, RawRecord,
    RawUtxo, RawUtxoSet,
};
pub use wallet::{TxParams, Wallet};
pub use {bridge, derive, invoice, psbt};
