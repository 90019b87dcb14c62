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

use bridge::BridgeError;
use derive::SignerError;
use psbt::{AssembleError, PsbtError};

use crate::{BackendError, EngineError};

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum Error {
    /// operation requires signing, but the wallet has no signer.
    SignerUnavailable,

    /// neither UTXOs, nor their owner were given and the wallet has no signer
    /// to use its account key.
    NoUtxoSource,

    /// change address must be given when spending UTXOs of a foreign owner.
    NoChangeAddress,

    /// notary of asset {guid} didn't sign the transaction - {reason}
    NotaryUnreachable { guid: u64, reason: String },

    /// no bridge transfer found in foreign transaction {0}.
    ProofNotFound(String),

    #[from]
    #[display(inner)]
    Psbt(PsbtError),

    #[from]
    #[display(inner)]
    Assemble(AssembleError),

    #[from]
    #[display(inner)]
    Backend(BackendError),

    #[from]
    #[display(inner)]
    Engine(EngineError),

    #[from]
    #[display(inner)]
    Bridge(BridgeError),

    #[from]
    #[display(inner)]
    Signer(SignerError),
}

impl Error {
    /// Detects whether the error is caused by a collaborator that didn't
    /// respond in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Bridge(BridgeError::Timeout(..)))
    }
}
