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

#[macro_use]
extern crate amplify;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

mod index;
mod path;
mod xkey;
mod sign;
mod store;
mod signer;

pub use index::{
    DerivationIndex, HardenedIndex, IndexParseError, NormalIndex, HARDENED_INDEX_BOUNDARY,
};
pub use path::{DerivationParseError, DerivationPath};
pub use sign::{DeriveKey, KeyAuthority, Sign};
pub use signer::{
    storage_key, AddressScheme, DiscoveryError, HdSigner, SignerError, TokenSource, UsedToken,
    CHANGE_BRANCH, RECEIVE_BRANCH,
};
pub use store::{MemoryStore, SecretStore, StoreError, StoredSecret};
pub use xkey::{
    KeyOrigin, XkeyDecodeError, XkeyOrigin, XkeyParseError, Xpriv, XprivAccount, Xpub, XpubFp,
};
