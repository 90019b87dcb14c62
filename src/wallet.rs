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

use bridge::{BridgeConfig, BridgeProof, ProofBuilder, ProofService};
use derive::{HdSigner, KeyAuthority};
use invoice::Address;
use psbt::{Assembler, Psbt};
use tracing::{debug, info, instrument};

use crate::{
    normalize, AssetMap, AssetOpts, Coordinator, EngineRequest, Error, IndexService, IndexTokens,
    NotarizedPsbt, NotaryClient, Operation, RawUtxoSet, Recipient, TxEngine, WalletConfig,
};

/// Parameters shared by all transaction flows.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TxParams {
    /// Change address; a new one is derived from the signer when absent.
    pub change_address: Option<String>,
    pub fee_rate: u64,
    /// Address or extended key owning the UTXOs to spend. When set, the
    /// transaction is spent on behalf of a foreign owner and is left unsigned.
    pub from: Option<String>,
    /// UTXOs to use instead of fetching them from the index service.
    pub utxos: Option<RawUtxoSet>,
}

impl TxParams {
    pub fn with_fee_rate(fee_rate: u64) -> Self {
        TxParams {
            fee_rate,
            ..Self::default()
        }
    }
}

/// Wallet facade tying together the signer, the index service, the asset
/// transaction engine and notaries.
pub struct Wallet<I: IndexService, E: TxEngine, N: NotaryClient> {
    config: WalletConfig,
    signer: Option<HdSigner>,
    index: I,
    engine: E,
    notary: N,
}

impl<I: IndexService, E: TxEngine, N: NotaryClient> Wallet<I, E, N> {
    pub fn new(
        config: WalletConfig,
        signer: Option<HdSigner>,
        index: I,
        engine: E,
        notary: N,
    ) -> Self {
        Wallet {
            config,
            signer,
            index,
            engine,
            notary,
        }
    }

    pub fn config(&self) -> &WalletConfig { &self.config }

    pub fn signer(&self) -> Option<&HdSigner> { self.signer.as_ref() }

    pub fn signer_mut(&mut self) -> Option<&mut HdSigner> { self.signer.as_mut() }

    pub fn index(&self) -> &I { &self.index }

    pub fn engine(&self) -> &E { &self.engine }

    pub fn notary(&self) -> &N { &self.notary }

    fn assembler(&self) -> Assembler { Assembler::new(self.config.network, self.config.max_fee_rate) }

    fn coordinator(&self) -> Coordinator<'_> {
        Coordinator {
            assembler: self.assembler(),
            notary: &self.notary,
            engine: &self.engine,
            policy: self.config.notary_policy,
            timeout: self.config.notary_timeout(),
        }
    }

    /// UTXOs of `owner`, or of the signer account if no owner is given.
    pub async fn fetch_utxos(&self, owner: Option<&str>) -> Result<RawUtxoSet, Error> {
        let owner = match (owner, &self.signer) {
            (Some(owner), _) => owner.to_owned(),
            (None, Some(signer)) => signer.account_xpub(),
            (None, None) => return Err(Error::NoUtxoSource),
        };
        Ok(self.index.fetch_utxos(&owner).await?)
    }

    pub async fn new_receiving_address(&mut self, dry_run: bool) -> Result<Address, Error> {
        let signer = self.signer.as_mut().ok_or(Error::SignerUnavailable)?;
        let tokens = IndexTokens(&self.index);
        Ok(signer.new_receiving_address(Some(&tokens), dry_run).await?)
    }

    pub async fn new_change_address(&mut self, dry_run: bool) -> Result<Address, Error> {
        let signer = self.signer.as_mut().ok_or(Error::SignerUnavailable)?;
        let tokens = IndexTokens(&self.index);
        Ok(signer.new_change_address(Some(&tokens), dry_run).await?)
    }

    /// Runs an operation through normalization, the transaction engine and
    /// the notarize-and-sign round.
    #[instrument(skip_all, fields(kind = %operation.kind()))]
    pub async fn execute(
        &mut self,
        operation: Operation,
        params: TxParams,
    ) -> Result<NotarizedPsbt, Error> {
        let sign = params.from.is_none();
        let raw = match params.utxos {
            Some(utxos) => utxos,
            None => self.fetch_utxos(params.from.as_deref()).await?,
        };
        let utxos =
            normalize(&raw, self.config.network, &self.config.tx_options, operation.asset_map());
        debug!(
            "using {} UTXOs and {} assets; {} records dropped",
            utxos.utxos.len(),
            utxos.assets.len(),
            utxos.issues.len()
        );

        let change_address = match params.change_address {
            Some(address) => address,
            None if !sign => return Err(Error::NoChangeAddress),
            None => self.new_change_address(false).await?.to_string(),
        };

        let kind = operation.kind();
        let engine_request = EngineRequest {
            operation,
            change_address,
            fee_rate: params.fee_rate,
            network: self.config.network,
        };
        let mut request = self.engine.build_request(&engine_request, &utxos)?;
        request.kind = kind;

        let keys = self.signer.as_ref().map(|signer| signer as &dyn KeyAuthority);
        self.coordinator().notarize_and_sign(request, &utxos.assets, keys, sign).await
    }

    pub async fn create_transaction(
        &mut self,
        outputs: Vec<Recipient>,
        params: TxParams,
    ) -> Result<NotarizedPsbt, Error> {
        self.execute(Operation::Transfer { outputs }, params).await
    }

    pub async fn asset_new(
        &mut self,
        opts: AssetOpts,
        params: TxParams,
    ) -> Result<NotarizedPsbt, Error> {
        self.execute(Operation::AssetNew { opts }, params).await
    }

    pub async fn asset_update(
        &mut self,
        guid: u64,
        opts: AssetOpts,
        asset_map: AssetMap,
        params: TxParams,
    ) -> Result<NotarizedPsbt, Error> {
        self.execute(Operation::AssetUpdate { guid, opts, asset_map }, params).await
    }

    pub async fn asset_send(
        &mut self,
        asset_map: AssetMap,
        params: TxParams,
    ) -> Result<NotarizedPsbt, Error> {
        self.execute(Operation::AssetSend { asset_map }, params).await
    }

    pub async fn asset_allocation_send(
        &mut self,
        asset_map: AssetMap,
        params: TxParams,
    ) -> Result<NotarizedPsbt, Error> {
        self.execute(Operation::AssetAllocationSend { asset_map }, params).await
    }

    /// Burns asset allocations for the foreign chain; the resulting
    /// transaction may spend less than it outputs.
    pub async fn asset_allocation_burn(
        &mut self,
        opts: AssetOpts,
        asset_map: AssetMap,
        params: TxParams,
    ) -> Result<NotarizedPsbt, Error> {
        self.execute(Operation::AssetAllocationBurn { opts, asset_map }, params).await
    }

    /// Mints asset allocations backed by a freeze on the foreign chain.
    pub async fn asset_allocation_mint(
        &mut self,
        proof: BridgeProof,
        opts: AssetOpts,
        asset_map: AssetMap,
        params: TxParams,
    ) -> Result<NotarizedPsbt, Error> {
        self.execute(
            Operation::AssetAllocationMint {
                proof,
                opts,
                asset_map,
            },
            params,
        )
        .await
    }

    pub async fn burn_to_asset_allocation(
        &mut self,
        asset_map: AssetMap,
        data_amount: u64,
        params: TxParams,
    ) -> Result<NotarizedPsbt, Error> {
        self.execute(
            Operation::BurnToAssetAllocation {
                asset_map,
                data_amount,
            },
            params,
        )
        .await
    }

    /// Builds the proof of a foreign freeze transaction for a later mint.
    /// Bridge contracts are chosen by the service endpoint.
    pub async fn build_bridge_proof<S: ProofService>(
        &self,
        service: S,
        endpoint: &str,
        txid: &str,
    ) -> Result<BridgeProof, Error> {
        let builder = ProofBuilder::new(service, BridgeConfig::for_endpoint(endpoint))
            .with_timeout(self.config.proof_timeout());
        builder
            .build(txid)
            .await?
            .into_proof()
            .ok_or_else(|| Error::ProofNotFound(txid.to_owned()))
    }

    /// Broadcasts a transaction and refreshes the signer address indexes
    /// from the index service, returning the transaction id.
    pub async fn send_raw_transaction(&mut self, raw_hex: &str) -> Result<String, Error> {
        let txid = self.index.broadcast(raw_hex).await?;
        info!("broadcasted transaction {txid}");
        if let Some(signer) = self.signer.as_mut() {
            let tokens = self.index.fetch_history(&signer.account_xpub()).await?;
            signer.set_latest_indexes(&tokens);
        }
        Ok(txid)
    }

    /// Extracts a finalized transaction, checking its fee rate, and
    /// broadcasts it.
    pub async fn send_psbt(&mut self, psbt: &Psbt) -> Result<String, Error> {
        let tx = psbt.extract(true)?;
        self.send_raw_transaction(&tx.to_string()).await
    }
}
