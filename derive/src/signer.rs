// Hierarchical key derivation and signing for Syscoin-family wallets.
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

//! Seed-backed key authority: accounts, address indexes and ECDSA signing.

use std::str::FromStr;

use async_trait::async_trait;
use bc::Sighash;
use bip39::Mnemonic;
use invoice::{Address, AddressPayload, Network, NetworkParams, XkeyVersions};
use secp256k1::{ecdsa, Keypair, Message, PublicKey, SECP256K1};
use tracing::debug;

use crate::{
    DeriveKey, DerivationIndex, DerivationPath, KeyOrigin, NormalIndex, SecretStore,
    Sign, StoreError, StoredSecret, XkeyOrigin, Xpriv, XprivAccount, XpubFp,
};

/// Address derivation scheme of the wallet accounts.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub enum AddressScheme {
    /// BIP-84 native segwit accounts, P2WPKH addresses, `zpub` keys.
    #[default]
    #[display("bip84")]
    Bip84,

    /// BIP-44 legacy accounts, P2PKH addresses, `xpub` keys.
    #[display("bip44")]
    Bip44,
}

impl AddressScheme {
    pub const fn purpose(self) -> u32 {
        match self {
            AddressScheme::Bip84 => 84,
            AddressScheme::Bip44 => 44,
        }
    }

    pub fn versions(self, params: &NetworkParams) -> XkeyVersions {
        match self {
            AddressScheme::Bip84 => params.bip84,
            AddressScheme::Bip44 => params.bip32,
        }
    }
}

/// Address entry reported by an index service for an account key.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct UsedToken {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub path: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub transfers: u32,
}

impl UsedToken {
    /// Branch and index levels of the token path, when the path has the
    /// full `m/purpose'/coin'/account'/branch/index` form.
    pub fn branch_index(&self) -> Option<(NormalIndex, NormalIndex)> {
        let path = self.path.as_deref()?;
        DerivationPath::<DerivationIndex>::from_str(path).ok()?.branch_index()
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("used address discovery failed - {0}")]
pub struct DiscoveryError(pub String);

/// Service listing addresses of an account which have seen transactions.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn used_tokens(&self, xpub: &str) -> Result<Vec<UsedToken>, DiscoveryError>;
}

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum SignerError {
    /// invalid mnemonic phrase - {0}
    #[from]
    Mnemonic(bip39::Error),

    /// unable to persist wallet secret - {0}
    #[from]
    Store(StoreError),

    #[display(inner)]
    #[from]
    Discovery(DiscoveryError),

    /// account {0} is not known to the signer.
    UnknownAccount(u32),

    /// address index space of the account is exhausted.
    IndexExhausted,
}

pub const CHANGE_BRANCH: NormalIndex = NormalIndex::ONE;
pub const RECEIVE_BRANCH: NormalIndex = NormalIndex::ZERO;

/// Wallet signer holding the seed, derived accounts and address indexes of the
/// active account.
pub struct HdSigner {
    network: Network,
    scheme: AddressScheme,
    mnemonic: Mnemonic,
    master: Xpriv,
    accounts: Vec<XprivAccount>,
    account_index: u32,
    change_index: Option<NormalIndex>,
    receiving_index: Option<NormalIndex>,
    store: Option<(Box<dyn SecretStore + Send + Sync>, String)>,
}

impl HdSigner {
    /// Creates a signer with a single freshly derived account.
    pub fn new(
        mnemonic: &str,
        network: Network,
        scheme: AddressScheme,
    ) -> Result<Self, SignerError> {
        let mut signer = Self::bare(mnemonic, network, scheme)?;
        signer.create_account()?;
        Ok(signer)
    }

    /// Creates a signer persisting its accounts to `store`. Previously stored
    /// accounts are restored; otherwise the first account is created and
    /// saved.
    pub fn with_store(
        mnemonic: &str,
        network: Network,
        scheme: AddressScheme,
        store: impl SecretStore + Send + Sync + 'static,
        password: impl Into<String>,
    ) -> Result<Self, SignerError> {
        let password = password.into();
        let key = storage_key(network);
        match store.load(&key, &password)? {
            Some(secret) => {
                let mut signer = Self::bare(&secret.mnemonic, network, scheme)?;
                signer.store = Some((Box::new(store), password));
                signer.restore_accounts(secret.account_count);
                Ok(signer)
            }
            None => {
                let mut signer = Self::bare(mnemonic, network, scheme)?;
                signer.store = Some((Box::new(store), password));
                signer.create_account()?;
                Ok(signer)
            }
        }
    }

    /// Restores a signer entirely from `store`; `Ok(None)` when nothing is
    /// stored for the network.
    pub fn restore(
        network: Network,
        scheme: AddressScheme,
        store: impl SecretStore + Send + Sync + 'static,
        password: impl Into<String>,
    ) -> Result<Option<Self>, SignerError> {
        let password = password.into();
        let Some(secret) = store.load(&storage_key(network), &password)? else {
            return Ok(None);
        };
        let mut signer = Self::bare(&secret.mnemonic, network, scheme)?;
        signer.store = Some((Box::new(store), password));
        signer.restore_accounts(secret.account_count);
        Ok(Some(signer))
    }

    fn bare(mnemonic: &str, network: Network, scheme: AddressScheme) -> Result<Self, SignerError> {
        let mnemonic = Mnemonic::parse(mnemonic)?;
        let seed = mnemonic.to_seed("");
        let master = Xpriv::new_master(scheme.versions(network.params()), &seed);
        Ok(HdSigner {
            network,
            scheme,
            mnemonic,
            master,
            accounts: vec![],
            account_index: 0,
            change_index: None,
            receiving_index: None,
            store: None,
        })
    }

    fn restore_accounts(&mut self, count: u32) {
        self.accounts = (0..count.max(1)).map(|index| self.derive_account(index)).collect();
        self.account_index = 0;
        self.change_index = None;
        self.receiving_index = None;
        debug!(accounts = self.accounts.len(), "restored wallet accounts");
    }

    fn backup(&self) -> Result<(), StoreError> {
        let Some((store, password)) = &self.store else {
            return Ok(());
        };
        let secret = StoredSecret {
            mnemonic: self.mnemonic.to_string(),
            account_count: self.accounts.len() as u32,
        };
        store.save(&storage_key(self.network), &secret, password)
    }

    pub fn network(&self) -> Network { self.network }

    pub fn scheme(&self) -> AddressScheme { self.scheme }

    pub fn master_fingerprint(&self) -> XpubFp { self.master.fingerprint() }

    pub fn account_index(&self) -> u32 { self.account_index }

    pub fn account_count(&self) -> u32 { self.accounts.len() as u32 }

    pub fn change_index(&self) -> Option<NormalIndex> { self.change_index }

    pub fn receiving_index(&self) -> Option<NormalIndex> { self.receiving_index }

    /// Derives account `m/purpose'/coin'/index'`.
    pub fn derive_account(&self, index: u32) -> XprivAccount {
        let path = DerivationPath::account(
            self.scheme.purpose(),
            self.network.coin_type(),
            index,
        );
        let xpriv = self.master.derive_priv(path.as_slice());
        XprivAccount::new(xpriv, XkeyOrigin::new(self.master_fingerprint(), path))
    }

    /// Appends the next account, makes it active and persists the account
    /// count. Returns the new account index.
    pub fn create_account(&mut self) -> Result<u32, SignerError> {
        let index = self.accounts.len() as u32;
        let account = self.derive_account(index);
        self.accounts.push(account);
        self.account_index = index;
        self.change_index = None;
        self.receiving_index = None;
        self.backup()?;
        Ok(index)
    }

    pub fn set_account_index(&mut self, index: u32) -> Result<(), SignerError> {
        if index >= self.accounts.len() as u32 {
            return Err(SignerError::UnknownAccount(index));
        }
        self.account_index = index;
        self.change_index = None;
        self.receiving_index = None;
        Ok(())
    }

    pub fn active_account(&self) -> &XprivAccount { &self.accounts[self.account_index as usize] }

    /// Public extended key of the active account serialized with the version
    /// bytes of the address scheme.
    pub fn account_xpub(&self) -> String {
        let versions = self.scheme.versions(self.network.params());
        self.active_account().to_xpub().with_versions(versions).to_string()
    }

    /// Address of a public key under the scheme and network of the signer.
    pub fn address_for(&self, pk: &PublicKey) -> Address {
        let pk = pk.serialize();
        let payload = match self.scheme {
            AddressScheme::Bip84 => AddressPayload::p2wpkh(&pk),
            AddressScheme::Bip44 => AddressPayload::p2pkh(&pk),
        };
        Address::new(payload, self.network)
    }

    pub async fn new_change_address(
        &mut self,
        source: Option<&dyn TokenSource>,
        dry_run: bool,
    ) -> Result<Address, SignerError> {
        self.next_address(CHANGE_BRANCH, source, dry_run).await
    }

    pub async fn new_receiving_address(
        &mut self,
        source: Option<&dyn TokenSource>,
        dry_run: bool,
    ) -> Result<Address, SignerError> {
        self.next_address(RECEIVE_BRANCH, source, dry_run).await
    }

    async fn next_address(
        &mut self,
        branch: NormalIndex,
        source: Option<&dyn TokenSource>,
        dry_run: bool,
    ) -> Result<Address, SignerError> {
        if self.branch_index(branch).is_none() {
            if let Some(source) = source {
                let tokens = source.used_tokens(&self.account_xpub()).await?;
                self.set_latest_indexes(&tokens);
            }
        }
        let next = match self.branch_index(branch) {
            None => NormalIndex::ZERO,
            Some(index) => index.checked_inc().ok_or(SignerError::IndexExhausted)?,
        };
        let (xpriv, origin) = self.active_account().derive_child(branch, next);
        let address = self.address_for(&xpriv.to_public_key());
        if !dry_run {
            *self.branch_index_mut(branch) = Some(next);
        }
        debug!(path = %origin.derivation(), %address, dry_run, "derived new address");
        Ok(address)
    }

    fn branch_index(&self, branch: NormalIndex) -> Option<NormalIndex> {
        if branch == CHANGE_BRANCH {
            self.change_index
        } else {
            self.receiving_index
        }
    }

    fn branch_index_mut(&mut self, branch: NormalIndex) -> &mut Option<NormalIndex> {
        if branch == CHANGE_BRANCH {
            &mut self.change_index
        } else {
            &mut self.receiving_index
        }
    }

    /// Learns address indexes from tokens reported by an index service.
    /// Indexes only grow.
    pub fn set_latest_indexes(&mut self, tokens: &[UsedToken]) {
        for (branch, index) in tokens.iter().filter_map(UsedToken::branch_index) {
            let slot = self.branch_index_mut(branch);
            *slot = (*slot).max(Some(index));
        }
    }

    pub fn derive_xpriv(&self, path: &str) -> Option<Xpriv> {
        let path = DerivationPath::<DerivationIndex>::from_str(path).ok()?;
        Some(self.master.derive_priv(path.as_slice()))
    }

    pub fn derive_pubkey(&self, path: &str) -> Option<PublicKey> {
        self.derive_xpriv(path).map(|xpriv| xpriv.to_public_key())
    }

    pub fn derive_keypair(&self, path: &str) -> Option<Keypair> {
        self.derive_xpriv(path)
            .map(|xpriv| Keypair::from_secret_key(SECP256K1, &xpriv.to_private_ecdsa()))
    }
}

/// Key under which the signer persists its secret for a network.
pub fn storage_key(network: Network) -> String {
    format!("{}_hdsigner", network.params().bech32_hrp)
}

impl DeriveKey for HdSigner {
    fn master_fp(&self) -> XpubFp { self.master_fingerprint() }

    fn derive_pubkey(&self, path: &str) -> Option<PublicKey> { HdSigner::derive_pubkey(self, path) }
}

impl Sign for HdSigner {
    fn sign_ecdsa(
        &self,
        message: Sighash,
        pk: PublicKey,
        origin: Option<&KeyOrigin>,
    ) -> Option<ecdsa::Signature> {
        let origin = origin?;
        if origin.master_fp() != self.master_fingerprint() {
            return None;
        }
        let xpriv = self.master.derive_priv(origin.derivation().as_slice());
        if xpriv.to_public_key() != pk {
            return None;
        }
        let msg = Message::from(message);
        Some(SECP256K1.sign_ecdsa(&msg, &xpriv.to_private_ecdsa()))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;
    use crate::MemoryStore;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon \
                            abandon abandon abandon about";

    fn bip84_signer() -> HdSigner {
        HdSigner::new(MNEMONIC, Network::Bitcoin, AddressScheme::Bip84).unwrap()
    }

    struct Tokens(Vec<UsedToken>);

    #[async_trait]
    impl TokenSource for Tokens {
        async fn used_tokens(&self, _xpub: &str) -> Result<Vec<UsedToken>, DiscoveryError> {
            Ok(self.0.clone())
        }
    }

    fn token(path: &str) -> UsedToken {
        UsedToken {
            name: s!("addr"),
            path: Some(path.to_owned()),
            transfers: 1,
        }
    }

    #[test]
    fn bip84_account_xpub() {
        assert_eq!(
            bip84_signer().account_xpub(),
            "zpub6rFR7y4Q2AijBEqTUquhVz398htDFrtymD9xYYfG1m4wAcvPhXNfE3EfH1r1ADqtfSdVCToUG868RvUUkgDKf31mGDtKsAYz2oz2AGutZYs"
        );
    }

    #[tokio::test]
    async fn bip84_addresses() {
        let mut signer = bip84_signer();
        let first = signer.new_receiving_address(None, false).await.unwrap();
        assert_eq!(first.to_string(), "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
        let peek = signer.new_receiving_address(None, true).await.unwrap();
        assert_eq!(peek.to_string(), "bc1qnjg0jd8228aq7egyzacy8cys3knf9xvrerkf9g");
        let second = signer.new_receiving_address(None, false).await.unwrap();
        assert_eq!(second, peek);
        let change = signer.new_change_address(None, false).await.unwrap();
        assert_eq!(change.to_string(), "bc1q8c6fshw2dlwun7ekn9qwf37cu2rn755upcp6el");
        assert_eq!(signer.receiving_index(), Some(NormalIndex::ONE));
        assert_eq!(signer.change_index(), Some(NormalIndex::ZERO));
    }

    #[tokio::test]
    async fn discovery_precedes_first_address() {
        let mut signer = bip84_signer();
        let source = Tokens(vec![token("m/84'/0'/0'/0/0"), token("m/84'/0'/0'/1/4")]);
        let addr = signer.new_receiving_address(Some(&source), false).await.unwrap();
        assert_eq!(addr.to_string(), "bc1qnjg0jd8228aq7egyzacy8cys3knf9xvrerkf9g");
        assert_eq!(signer.change_index(), Some(NormalIndex::from(4u8)));
    }

    #[test]
    fn indexes_only_grow() {
        let mut signer = bip84_signer();
        signer.set_latest_indexes(&[token("m/84'/0'/0'/0/7")]);
        signer.set_latest_indexes(&[token("m/84'/0'/0'/0/3"), token("m/84'/0'/0'/1/2")]);
        signer.set_latest_indexes(&[
            UsedToken {
                name: s!("short"),
                path: Some(s!("m/84'/0'/0'")),
                transfers: 0,
            },
            UsedToken::default(),
        ]);
        assert_eq!(signer.receiving_index(), Some(NormalIndex::from(7u8)));
        assert_eq!(signer.change_index(), Some(NormalIndex::from(2u8)));
    }

    #[test]
    fn malformed_paths() {
        let signer = bip84_signer();
        assert!(signer.derive_pubkey("m/84'/0'/0'/0/0").is_some());
        assert!(signer.derive_pubkey("m/84'/x").is_none());
        assert!(signer.derive_keypair("").is_none());
    }

    #[test]
    fn signs_own_keys_only() {
        let signer = bip84_signer();
        let origin = KeyOrigin::from_str(&format!(
            "[{}]m/84'/0'/0'/0/0",
            signer.master_fingerprint()
        ))
        .unwrap();
        let pk = signer.derive_pubkey("m/84'/0'/0'/0/0").unwrap();
        let sighash = Sighash::from([7u8; 32]);
        let sig = signer.sign_ecdsa(sighash, pk, Some(&origin)).unwrap();
        let msg = Message::from_digest([7u8; 32]);
        assert!(SECP256K1.verify_ecdsa(&msg, &sig, &pk).is_ok());

        let other = signer.derive_pubkey("m/84'/0'/0'/0/1").unwrap();
        assert!(signer.sign_ecdsa(sighash, other, Some(&origin)).is_none());
        assert!(signer.sign_ecdsa(sighash, pk, None).is_none());
    }

    #[test]
    fn accounts_persist_and_restore() {
        let store = Arc::new(MemoryStore::new());
        let mut signer = HdSigner::with_store(
            MNEMONIC,
            Network::SyscoinTestnet,
            AddressScheme::Bip84,
            store.clone(),
            "secret",
        )
        .unwrap();
        assert_eq!(signer.create_account().unwrap(), 1);
        assert_eq!(signer.create_account().unwrap(), 2);

        let restored = HdSigner::restore(
            Network::SyscoinTestnet,
            AddressScheme::Bip84,
            store.clone(),
            "secret",
        )
        .unwrap()
        .unwrap();
        assert_eq!(restored.account_count(), 3);
        assert_eq!(restored.master_fingerprint(), signer.master_fingerprint());
        assert_eq!(storage_key(Network::SyscoinTestnet), "tsys_hdsigner");

        assert!(matches!(
            HdSigner::restore(Network::SyscoinTestnet, AddressScheme::Bip84, store.clone(), "wrong"),
            Err(SignerError::Store(StoreError::WrongPassword))
        ));
        assert!(HdSigner::restore(Network::Syscoin, AddressScheme::Bip84, store, "secret")
            .unwrap()
            .is_none());
    }

    #[test]
    fn testnet_coin_type() {
        let signer =
            HdSigner::new(MNEMONIC, Network::SyscoinTestnet, AddressScheme::Bip84).unwrap();
        let account = signer.derive_account(0);
        assert_eq!(account.origin().derivation().to_string(), "m/84'/1'/0'");
        assert!(signer.account_xpub().starts_with("vpub"));

        let legacy = HdSigner::new(MNEMONIC, Network::Syscoin, AddressScheme::Bip44).unwrap();
        assert_eq!(legacy.derive_account(2).origin().derivation().to_string(), "m/44'/57'/2'");
        assert!(legacy.account_xpub().starts_with("xpub"));
    }
}
