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

use bc::{
    CompressedPk, LegacySig, PrevoutMismatch, PubkeyHash, ScriptCode, SigScript, Sighash,
    SighashCache, SighashError, SighashType,
};
use derive::Sign;
use invoice::AddressPayload;
use secp256k1::{Message, PublicKey, SECP256K1};
use tracing::{debug, warn};

use crate::{Input, OwnershipIndex, PrevoutError, Psbt, Witness};

#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(inner)]
pub enum SignError {
    #[from]
    Sighash(SighashError),

    #[from]
    Prevout(PrevoutError),

    #[from]
    PrevoutMismatch(PrevoutMismatch),
}

/// Spending condition of a previous output the wallet knows how to satisfy.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Spend {
    Wpkh([u8; 20]),
    Pkh([u8; 20]),
}

impl Psbt {
    fn sig_hasher(&self) -> Result<SighashCache, SignError> {
        let prevouts = self.inputs.iter().map(Input::prev_txout).collect::<Result<Vec<_>, _>>()?;
        Ok(SighashCache::new(self.to_unsigned_tx(), prevouts)?)
    }

    /// Signs every owned input with all of its known keys. Returns the number
    /// of produced signatures.
    pub fn sign(
        &mut self,
        signer: &(impl Sign + ?Sized),
        ownership: &OwnershipIndex,
    ) -> Result<usize, SignError> {
        let mut sig_hasher = self.sig_hasher()?;
        let mut sig_count = 0usize;

        for input in &mut self.inputs {
            if !ownership.is_owned(input.index) {
                continue;
            }
            let count = input.sign_ecdsa(signer, &mut sig_hasher)?;
            if count == 0 {
                warn!("owned input #{} was left unsigned", input.index);
            }
            sig_count += count;
        }

        Ok(sig_count)
    }

    /// Checks that every input has at least one signature and that all of
    /// them are valid for the current transaction.
    pub fn validate_signatures(&self) -> Result<bool, SignError> {
        let mut sig_hasher = self.sig_hasher()?;
        for input in &self.inputs {
            if !input.validate_signatures(&mut sig_hasher)? {
                return Ok(false);
            }
        }
        Ok(!self.inputs.is_empty())
    }

    /// Finalizes all inputs, but only if all of them are signed with valid
    /// signatures; otherwise leaves the PSBT untouched and returns `false`.
    pub fn finalize(&mut self) -> Result<bool, SignError> {
        if self.is_finalized() {
            return Ok(true);
        }
        if !self.validate_signatures()? {
            return Ok(false);
        }
        for input in &mut self.inputs {
            input.finalize()?;
        }
        Ok(true)
    }
}

impl Input {
    fn spend(&self) -> Result<Option<Spend>, PrevoutError> {
        let prevout = self.prev_txout()?;
        Ok(match AddressPayload::from_script(&prevout.script_pubkey) {
            Ok(AddressPayload::Wpkh(hash)) => Some(Spend::Wpkh(hash)),
            Ok(AddressPayload::Pkh(hash)) => Some(Spend::Pkh(hash)),
            _ => None,
        })
    }

    fn sighash(&self, sig_hasher: &mut SighashCache) -> Result<Option<Sighash>, SignError> {
        let prevout = self.prev_txout()?;
        Ok(match self.spend()? {
            Some(Spend::Wpkh(_)) => Some(sig_hasher.segwit_sighash(
                self.index,
                &ScriptCode::with_p2wpkh(&prevout.script_pubkey),
                prevout.value,
                SighashType::all(),
            )?),
            Some(Spend::Pkh(_)) => Some(sig_hasher.legacy_sighash(
                self.index,
                &prevout.script_pubkey,
                SighashType::all().to_consensus_u32(),
            )?),
            None => None,
        })
    }

    fn sign_ecdsa(
        &mut self,
        signer: &(impl Sign + ?Sized),
        sig_hasher: &mut SighashCache,
    ) -> Result<usize, SignError> {
        let Some(sighash) = self.sighash(sig_hasher)? else {
            debug!("input #{} spends an unsupported script type", self.index);
            return Ok(0);
        };
        let mut signature_count = 0usize;
        for (pk, origin) in &self.bip32_derivation {
            let Some(sig) = signer.sign_ecdsa(sighash, *pk, Some(origin)) else {
                continue;
            };
            self.partial_sigs.insert(*pk, LegacySig::sighash_all(sig));
            signature_count += 1;
        }
        Ok(signature_count)
    }

    fn validate_signatures(&self, sig_hasher: &mut SighashCache) -> Result<bool, SignError> {
        if self.is_finalized() {
            return Ok(true);
        }
        if self.partial_sigs.is_empty() {
            return Ok(false);
        }
        let (Some(spend), Some(sighash)) = (self.spend()?, self.sighash(sig_hasher)?) else {
            return Ok(false);
        };
        let expected = match spend {
            Spend::Wpkh(hash) | Spend::Pkh(hash) => hash,
        };
        let msg = Message::from(sighash);
        for (pk, sig) in &self.partial_sigs {
            if pubkey_hash(*pk) != expected || SECP256K1.verify_ecdsa(&msg, &sig.sig, pk).is_err() {
                warn!("input #{} carries an invalid signature for key {pk}", self.index);
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn finalize(&mut self) -> Result<(), SignError> {
        let Some((pk, sig)) = self.partial_sigs.first().map(|(pk, sig)| (*pk, *sig)) else {
            return Ok(());
        };
        let sig = sig.to_vec();
        let pk = pk.serialize();
        match self.spend()? {
            Some(Spend::Wpkh(_)) => {
                self.final_script_sig = Some(SigScript::new());
                self.final_witness = Some(Witness::from_consensus_stack([sig, pk.to_vec()]));
            }
            Some(Spend::Pkh(_)) => {
                let mut script_sig = Vec::with_capacity(sig.len() + pk.len() + 2);
                script_sig.push(sig.len() as u8);
                script_sig.extend(sig);
                script_sig.push(pk.len() as u8);
                script_sig.extend(pk);
                self.final_script_sig = Some(SigScript::from_unsafe(script_sig));
            }
            None => return Ok(()),
        }
        self.partial_sigs.clear();
        self.bip32_derivation.clear();
        Ok(())
    }
}

fn pubkey_hash(pk: PublicKey) -> [u8; 20] { PubkeyHash::from(CompressedPk::from(pk)).into() }
