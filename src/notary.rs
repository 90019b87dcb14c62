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

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use derive::KeyAuthority;
use psbt::{Assembler, OwnershipIndex, Psbt, TransactionRequest};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::{AssetMetadata, Error, NotarizationSignatureSet, TxEngine};

pub const DEFAULT_NOTARY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum NotaryError {
    /// notary request failed - {0}
    Transport(String),

    /// notary responded with status {0} - {1}
    Status(u16, String),

    /// notary didn't respond within {0:?}.
    Timeout(Duration),
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct NotaryResponse {
    /// Base64-encoded signature.
    #[serde(default)]
    pub sig: Option<String>,
}

/// Client of asset notary services.
#[async_trait]
pub trait NotaryClient: Send + Sync {
    async fn notarize(&self, endpoint: &str, tx_hex: &str) -> Result<NotaryResponse, NotaryError>;
}

/// Result of notarization for a single asset.
#[derive(Clone, Eq, PartialEq, Debug, Display)]
pub enum NotaryOutcome {
    #[display("signed")]
    Signed(Vec<u8>),

    #[display("rejected: {0}")]
    Rejected(String),

    #[display("unreachable: {0}")]
    Unreachable(NotaryError),
}

/// Notarization outcome for every asset with a notary endpoint.
#[derive(Wrapper, Clone, Eq, PartialEq, Debug, Default, From)]
#[wrapper(Deref)]
pub struct NotarizationReport(BTreeMap<u64, NotaryOutcome>);

impl NotarizationReport {
    pub fn signatures(&self) -> NotarizationSignatureSet {
        self.0
            .iter()
            .filter_map(|(guid, outcome)| match outcome {
                NotaryOutcome::Signed(sig) => Some((*guid, sig.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.0.values().all(|outcome| matches!(outcome, NotaryOutcome::Signed(_)))
    }

    /// First asset whose notarization didn't succeed.
    pub fn first_failure(&self) -> Option<(u64, &NotaryOutcome)> {
        self.0
            .iter()
            .find(|(_, outcome)| !matches!(outcome, NotaryOutcome::Signed(_)))
            .map(|(guid, outcome)| (*guid, outcome))
    }
}

/// How failed notarization affects the result.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotaryPolicy {
    /// Any failed notarization aborts the operation.
    #[display("strict")]
    Strict,

    /// Failures are reported next to the transaction.
    #[default]
    #[display("best-effort")]
    BestEffort,
}

/// Transaction returned by the wallet flows together with the notarization
/// report.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct NotarizedPsbt {
    pub psbt: Psbt,
    pub report: NotarizationReport,
}

/// Runs signing and notarization rounds over a transaction request.
pub struct Coordinator<'a> {
    pub assembler: Assembler,
    pub notary: &'a dyn NotaryClient,
    pub engine: &'a dyn TxEngine,
    pub policy: NotaryPolicy,
    pub timeout: Duration,
}

impl<'a> Coordinator<'a> {
    fn assemble(
        &self,
        request: &TransactionRequest,
        keys: Option<&dyn KeyAuthority>,
        ownership: Option<&OwnershipIndex>,
    ) -> Result<Psbt, Error> {
        Ok(match ownership {
            Some(ownership) => self.assembler.signed(request, keys, ownership)?,
            None => self.assembler.unsigned(request)?,
        })
    }

    async fn request_signature(&self, endpoint: &str, tx_hex: &str) -> NotaryOutcome {
        let response = match timeout(self.timeout, self.notary.notarize(endpoint, tx_hex)).await {
            Err(_) => return NotaryOutcome::Unreachable(NotaryError::Timeout(self.timeout)),
            Ok(Err(err)) => return NotaryOutcome::Unreachable(err),
            Ok(Ok(response)) => response,
        };
        let Some(sig) = response.sig.filter(|sig| !sig.is_empty()) else {
            return NotaryOutcome::Rejected(s!("no signature in notary response"));
        };
        match base64::engine::general_purpose::STANDARD.decode(&sig) {
            Ok(sig) => NotaryOutcome::Signed(sig),
            Err(_) => NotaryOutcome::Rejected(s!("notary signature is not valid base64")),
        }
    }

    /// Asks notaries of all assets allocated in the request outputs for
    /// their signatures. The unsigned transaction is serialized once and
    /// only if some asset has a notary endpoint.
    pub async fn collect_signatures(
        &self,
        request: &TransactionRequest,
        assets: &BTreeMap<u64, AssetMetadata>,
    ) -> Result<NotarizationReport, Error> {
        let mut report = BTreeMap::new();
        let mut unsigned_hex: Option<String> = None;
        for guid in request.asset_guids() {
            let Some(endpoint) = assets.get(&guid).and_then(AssetMetadata::notary_endpoint) else {
                continue;
            };
            let tx_hex: &str = match &mut unsigned_hex {
                Some(hex) => hex,
                slot @ None => {
                    slot.insert(self.assembler.unsigned(request)?.to_unsigned_tx().to_string())
                }
            };
            let outcome = self.request_signature(endpoint, tx_hex).await;
            match &outcome {
                NotaryOutcome::Signed(_) => debug!("asset {guid} notarized by {endpoint}"),
                failure => warn!("notarization of asset {guid} by {endpoint} failed: {failure}"),
            }
            report.insert(guid, outcome);
        }
        Ok(NotarizationReport::from(report))
    }

    /// Builds the transaction, signing it when `sign` is set, collects notary
    /// signatures and, if any were embedded into the outputs, rebuilds and
    /// re-signs the transaction from scratch.
    #[instrument(skip_all, fields(inputs = request.inputs.len(), outputs = request.outputs.len()))]
    pub async fn notarize_and_sign(
        &self,
        mut request: TransactionRequest,
        assets: &BTreeMap<u64, AssetMetadata>,
        keys: Option<&dyn KeyAuthority>,
        sign: bool,
    ) -> Result<NotarizedPsbt, Error> {
        let ownership = match (sign, keys) {
            (false, _) => None,
            (true, None) => return Err(Error::SignerUnavailable),
            (true, Some(keys)) => Some(OwnershipIndex::determine(&mut request, keys)),
        };

        let mut psbt = self.assemble(&request, keys, ownership.as_ref())?;
        let report = self.collect_signatures(&request, assets).await?;

        if self.policy == NotaryPolicy::Strict {
            if let Some((guid, outcome)) = report.first_failure() {
                return Err(Error::NotaryUnreachable {
                    guid,
                    reason: outcome.to_string(),
                });
            }
        }

        let sigs = report.signatures();
        if !sigs.is_empty() {
            let injected = self.engine.inject_notarization_signatures(
                request.version,
                &sigs,
                &mut request.outputs,
            );
            if let Some(count) = injected {
                info!("embedded {} notary signatures into {count} outputs; re-signing", sigs.len());
                psbt = self.assemble(&request, keys, ownership.as_ref())?;
            }
        }

        Ok(NotarizedPsbt { psbt, report })
    }
}
