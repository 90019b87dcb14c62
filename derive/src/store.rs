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

use std::collections::HashMap;
use std::sync::Mutex;

/// Errors reported by secret storage backends.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum StoreError {
    /// password does not decrypt the stored wallet secret.
    WrongPassword,

    /// secret storage backend failure - {0}
    Backend(String),
}

/// Wallet secret persisted between sessions.
#[derive(Clone, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct StoredSecret {
    pub mnemonic: String,
    pub account_count: u32,
}

impl std::fmt::Debug for StoredSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSecret")
            .field("mnemonic", &"<redacted>")
            .field("account_count", &self.account_count)
            .finish()
    }
}

/// Encrypted local persistence for wallet secrets. Encryption is the
/// backend's concern; the signer only hands over the password.
pub trait SecretStore {
    /// Loads the secret stored under `key`, `Ok(None)` if there is nothing
    /// stored yet.
    fn load(&self, key: &str, password: &str) -> Result<Option<StoredSecret>, StoreError>;

    fn save(&self, key: &str, secret: &StoredSecret, password: &str) -> Result<(), StoreError>;
}

/// Process-local store keeping secrets in memory.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, StoredSecret)>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl SecretStore for MemoryStore {
    fn load(&self, key: &str, password: &str) -> Result<Option<StoredSecret>, StoreError> {
        let entries = self.entries.lock().map_err(|err| StoreError::Backend(err.to_string()))?;
        match entries.get(key) {
            None => Ok(None),
            Some((pwd, _)) if pwd != password => Err(StoreError::WrongPassword),
            Some((_, secret)) => Ok(Some(secret.clone())),
        }
    }

    fn save(&self, key: &str, secret: &StoredSecret, password: &str) -> Result<(), StoreError> {
        let mut entries =
            self.entries.lock().map_err(|err| StoreError::Backend(err.to_string()))?;
        entries.insert(key.to_owned(), (password.to_owned(), secret.clone()));
        Ok(())
    }
}

impl<T: SecretStore + ?Sized> SecretStore for std::sync::Arc<T> {
    fn load(&self, key: &str, password: &str) -> Result<Option<StoredSecret>, StoreError> {
        (**self).load(key, password)
    }

    fn save(&self, key: &str, secret: &StoredSecret, password: &str) -> Result<(), StoreError> {
        (**self).save(key, secret, password)
    }
}
