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

use std::collections::BTreeSet;
use std::str::FromStr;

use derive::{DeriveKey, DerivationPath, KeyAuthority, KeyOrigin};
use indexmap::IndexMap;
use invoice::{Address, AddressParseError, Network};
use tracing::debug;

use crate::{Input, LockTime, Output, Psbt, SignError, TransactionRequest, TxVer};

#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum ConstructionError {
    /// output #{0} has neither a script nor an address.
    NoDestination(usize),

    /// output #{index} has invalid address '{address}' - {error}
    InvalidAddress {
        index: usize,
        address: String,
        error: AddressParseError,
    },

    /// input #{0} carries neither a witness output nor a previous transaction.
    NoPrevout(usize),
}

#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum AssembleError {
    /// signed transaction was requested while no signer is available.
    SignerUnavailable,

    #[from]
    #[display(inner)]
    Construction(ConstructionError),

    #[from]
    #[display(inner)]
    Sign(SignError),
}

/// Set of input positions controlled by the wallet keys.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct OwnershipIndex(BTreeSet<usize>);

impl OwnershipIndex {
    /// Detects inputs whose derivation path resolves to a key of `keys` and
    /// attaches key origin information to them.
    pub fn determine(request: &mut TransactionRequest, keys: &(impl DeriveKey + ?Sized)) -> Self {
        let master_fp = keys.master_fp();
        let mut owned = BTreeSet::new();
        for (no, input) in request.inputs.iter_mut().enumerate() {
            let Some(path) = &input.path else {
                continue;
            };
            let (Some(pk), Ok(derivation)) = (keys.derive_pubkey(path), DerivationPath::from_str(path))
            else {
                debug!("input #{no} has path {path} which can't be derived; leaving it unsigned");
                continue;
            };
            input.bip32_derivation = Some((pk, KeyOrigin::new(master_fp, derivation)));
            owned.insert(no);
        }
        OwnershipIndex(owned)
    }

    pub fn is_owned(&self, index: usize) -> bool { self.0.contains(&index) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ { self.0.iter().copied() }
}

impl Psbt {
    /// Builds a PSBT from the request; output addresses are parsed under
    /// `network`.
    pub fn construct(
        request: &TransactionRequest,
        network: Network,
        max_fee_rate: u64,
    ) -> Result<Psbt, ConstructionError> {
        let inputs = request
            .inputs
            .iter()
            .enumerate()
            .map(|(index, req)| {
                if req.witness_utxo.is_none() && req.non_witness_utxo.is_none() {
                    return Err(ConstructionError::NoPrevout(index));
                }
                let mut bip32_derivation = IndexMap::new();
                if let Some((pk, origin)) = &req.bip32_derivation {
                    bip32_derivation.insert(*pk, origin.clone());
                }
                Ok(Input {
                    index,
                    previous_outpoint: req.outpoint(),
                    sequence: req.sequence,
                    witness_utxo: req.witness_utxo.clone(),
                    non_witness_utxo: req.non_witness_utxo.clone(),
                    bip32_derivation,
                    partial_sigs: IndexMap::new(),
                    final_script_sig: None,
                    final_witness: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let outputs = request
            .outputs
            .iter()
            .enumerate()
            .map(|(index, req)| {
                let script_pubkey = match (&req.script, &req.address) {
                    (Some(script), _) => script.clone(),
                    (None, Some(address)) => Address::parse(address, network)
                        .map_err(|error| ConstructionError::InvalidAddress {
                            index,
                            address: address.clone(),
                            error,
                        })?
                        .script_pubkey(),
                    (None, None) => return Err(ConstructionError::NoDestination(index)),
                };
                Ok(Output {
                    index,
                    script_pubkey,
                    value: req.value,
                    asset: req.asset,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Psbt {
            version: TxVer::from_consensus_i32(request.version),
            lock_time: LockTime::from_consensus_u32(request.lock_time),
            kind: request.kind,
            inputs,
            outputs,
            max_fee_rate,
        })
    }
}

/// Turns transaction requests into unsigned or signed PSBTs for a given
/// network.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Assembler {
    pub network: Network,
    pub max_fee_rate: u64,
}

impl Assembler {
    pub fn new(network: Network, max_fee_rate: u64) -> Self {
        Assembler {
            network,
            max_fee_rate,
        }
    }

    pub fn unsigned(&self, request: &TransactionRequest) -> Result<Psbt, AssembleError> {
        Ok(Psbt::construct(request, self.network, self.max_fee_rate)?)
    }

    /// Builds the PSBT, signs the owned inputs and finalizes it if every
    /// input ends up with valid signatures. A partially signed result is not
    /// an error.
    pub fn signed<K: KeyAuthority + ?Sized>(
        &self,
        request: &TransactionRequest,
        keys: Option<&K>,
        ownership: &OwnershipIndex,
    ) -> Result<Psbt, AssembleError> {
        let keys = keys.ok_or(AssembleError::SignerUnavailable)?;
        let mut psbt = self.unsigned(request)?;
        let sig_count = psbt.sign(keys, ownership)?;
        let finalized = psbt.finalize()?;
        debug!(
            "signed {sig_count} of {} inputs; transaction is {}",
            psbt.inputs.len(),
            if finalized { "finalized" } else { "partially signed" }
        );
        Ok(psbt)
    }
}
