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

use bc::Sighash;
use secp256k1::{ecdsa, PublicKey};

use crate::{KeyOrigin, XpubFp};

/// Trait used for signing transactions.
pub trait Sign {
    /// Create signature with a given key for inputs requiring ECDSA signatures (pre-segwit
    /// and segwit v0).
    fn sign_ecdsa(
        &self,
        message: Sighash,
        pk: PublicKey,
        origin: Option<&KeyOrigin>,
    ) -> Option<ecdsa::Signature>;
}

/// Source of public keys for ownership detection.
pub trait DeriveKey {
    fn master_fp(&self) -> XpubFp;

    /// Derives the public key at a full path string such as
    /// `m/84'/57'/0'/0/3`. Returns `None` if the path is malformed.
    fn derive_pubkey(&self, path: &str) -> Option<PublicKey>;
}

/// Combined key authority: able to tell which keys it owns and sign for them.
pub trait KeyAuthority: Sign + DeriveKey {}

impl<T: Sign + DeriveKey> KeyAuthority for T {}
