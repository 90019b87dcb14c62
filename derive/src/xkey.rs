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

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use amplify::{hex, Bytes4};
use bitcoin_hashes::{hash160, sha512, Hash, HashEngine, Hmac, HmacEngine};
use invoice::{Network, XkeyVersions};
use secp256k1::{PublicKey, SecretKey, SECP256K1};

use crate::{DerivationIndex, DerivationParseError, DerivationPath, HardenedIndex, NormalIndex};

/// Length of a serialized BIP-32 extended key.
const XKEY_LEN: usize = 78;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum XkeyDecodeError {
    /// extended key must be 78 bytes long, not {0}.
    WrongLength(usize),

    /// version bytes {0:02x?} do not belong to any known extended public key type.
    UnknownVersion([u8; 4]),

    /// extended key contains invalid public key - {0}
    #[from]
    InvalidPubkey(secp256k1::Error),
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
pub enum XkeyParseError {
    /// wrong Base58 encoding of extended key data - {0}
    #[display(doc_comments)]
    #[from]
    Base58(bs58::decode::Error),

    #[display(inner)]
    #[from]
    Decode(XkeyDecodeError),

    #[display(inner)]
    #[from]
    DerivationPath(DerivationParseError),

    /// invalid master key fingerprint - {0}
    #[display(doc_comments)]
    #[from]
    InvalidMasterFp(hex::Error),
}

/// First four bytes of the HASH160 of a public key.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From)]
#[wrapper(RangeOps, Hex, FromStr)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct XpubFp(
    #[from]
    #[from([u8; 4])]
    Bytes4,
);

impl XpubFp {
    /// Parent fingerprint of a master key.
    pub const fn master() -> Self { Self(Bytes4::zero()) }

    fn of(pk: &PublicKey) -> Self {
        let hash = hash160::Hash::hash(&pk.serialize()).to_byte_array();
        Self::from([hash[0], hash[1], hash[2], hash[3]])
    }
}

/// Position of an extended key in the derivation tree, shared by public and
/// private keys.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
struct Node {
    depth: u8,
    parent_fp: XpubFp,
    child_number: DerivationIndex,
    chain_code: [u8; 32],
}

impl Node {
    fn write(&self, version: [u8; 4], buf: &mut [u8; XKEY_LEN]) {
        buf[0..4].copy_from_slice(&version);
        buf[4] = self.depth;
        buf[5..9].copy_from_slice(&self.parent_fp[..]);
        buf[9..13].copy_from_slice(&self.child_number.index().to_be_bytes());
        buf[13..45].copy_from_slice(&self.chain_code);
    }

    fn read(data: &[u8]) -> Self {
        let mut parent_fp = [0u8; 4];
        parent_fp.copy_from_slice(&data[5..9]);
        let mut child_number = [0u8; 4];
        child_number.copy_from_slice(&data[9..13]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);
        Node {
            depth: data[4],
            parent_fp: parent_fp.into(),
            child_number: DerivationIndex::from_index(u32::from_be_bytes(child_number)),
            chain_code,
        }
    }
}

/// HMAC-SHA512 split into the key material and the chain code halves.
fn hmac_sha512(key: &[u8], data: &[&[u8]]) -> ([u8; 32], [u8; 32]) {
    let mut engine = HmacEngine::<sha512::Hash>::new(key);
    for chunk in data {
        engine.input(chunk);
    }
    let hmac = Hmac::<sha512::Hash>::from_engine(engine).to_byte_array();
    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&hmac[..32]);
    right.copy_from_slice(&hmac[32..]);
    (left, right)
}

/// Extended public key. Only ever produced from a private key; parsing is
/// supported so account keys reported by index services can be checked.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Xpub {
    versions: XkeyVersions,
    node: Node,
    public_key: PublicKey,
}

impl Xpub {
    pub fn decode(data: &[u8]) -> Result<Xpub, XkeyDecodeError> {
        if data.len() != XKEY_LEN {
            return Err(XkeyDecodeError::WrongLength(data.len()));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[0..4]);
        let versions = Network::ALL
            .iter()
            .flat_map(|network| [network.params().bip32, network.params().bip84])
            .find(|versions| versions.public == magic)
            .ok_or(XkeyDecodeError::UnknownVersion(magic))?;
        Ok(Xpub {
            versions,
            node: Node::read(data),
            public_key: PublicKey::from_slice(&data[45..])?,
        })
    }

    pub fn encode(&self) -> [u8; XKEY_LEN] {
        let mut buf = [0u8; XKEY_LEN];
        self.node.write(self.versions.public, &mut buf);
        buf[45..].copy_from_slice(&self.public_key.serialize());
        buf
    }

    /// Same key serialized with other version bytes (for instance as `zpub`).
    #[must_use]
    pub fn with_versions(mut self, versions: XkeyVersions) -> Self {
        self.versions = versions;
        self
    }

    pub fn depth(&self) -> u8 { self.node.depth }

    pub fn parent_fp(&self) -> XpubFp { self.node.parent_fp }

    pub fn child_number(&self) -> DerivationIndex { self.node.child_number }

    pub fn fingerprint(&self) -> XpubFp { XpubFp::of(&self.public_key) }

    pub fn to_public_key(&self) -> PublicKey { self.public_key }
}

impl Display for Xpub {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&bs58::encode(self.encode()).with_check().into_string())
    }
}

impl FromStr for Xpub {
    type Err = XkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = bs58::decode(s).with_check(None).into_vec()?;
        Ok(Xpub::decode(&data)?)
    }
}

/// Extended private key. Never serialized: secrets leave the signer only as
/// the encrypted mnemonic.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Xpriv {
    versions: XkeyVersions,
    node: Node,
    secret: SecretKey,
}

impl fmt::Debug for Xpriv {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xpriv")
            .field("depth", &self.node.depth)
            .field("child_number", &self.node.child_number)
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

impl Xpriv {
    pub fn new_master(versions: XkeyVersions, seed: &[u8]) -> Xpriv {
        let (key, chain_code) = hmac_sha512(b"Bitcoin seed", &[seed]);
        Xpriv {
            versions,
            node: Node {
                depth: 0,
                parent_fp: XpubFp::master(),
                child_number: DerivationIndex::normal(0),
                chain_code,
            },
            secret: SecretKey::from_slice(&key).expect("negligible probability"),
        }
    }

    pub fn depth(&self) -> u8 { self.node.depth }

    pub fn parent_fp(&self) -> XpubFp { self.node.parent_fp }

    pub fn fingerprint(&self) -> XpubFp { XpubFp::of(&self.to_public_key()) }

    pub fn to_xpub(&self) -> Xpub {
        Xpub {
            versions: self.versions,
            node: self.node,
            public_key: self.to_public_key(),
        }
    }

    pub fn to_public_key(&self) -> PublicKey { self.secret.public_key(SECP256K1) }

    pub fn to_private_ecdsa(&self) -> SecretKey { self.secret }

    /// Derives the key at the end of `path`, starting from this one.
    pub fn derive_priv<I: Into<DerivationIndex> + Copy>(&self, path: impl AsRef<[I]>) -> Xpriv {
        path.as_ref().iter().fold(*self, |xpriv, idx| xpriv.ckd_priv(*idx))
    }

    /// Private to private child key derivation.
    pub fn ckd_priv(&self, idx: impl Into<DerivationIndex>) -> Xpriv {
        let idx = idx.into();
        let index = idx.index().to_be_bytes();
        let (tweak, chain_code) = match idx {
            DerivationIndex::Normal(_) => {
                hmac_sha512(&self.node.chain_code, &[&self.to_public_key().serialize(), &index])
            }
            DerivationIndex::Hardened(_) => {
                hmac_sha512(&self.node.chain_code, &[&[0u8], &self.secret.secret_bytes(), &index])
            }
        };
        let secret = SecretKey::from_slice(&tweak)
            .and_then(|sk| sk.add_tweak(&self.secret.into()))
            .expect("negligible probability");
        Xpriv {
            versions: self.versions,
            node: Node {
                depth: self.node.depth + 1,
                parent_fp: self.fingerprint(),
                child_number: idx,
                chain_code,
            },
            secret,
        }
    }
}

/// Origin of an account-level extended key: master fingerprint plus the
/// hardened path leading to it.
#[derive(Getters, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display("[{master_fp}]{derivation}")]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct XkeyOrigin {
    #[getter(as_copy)]
    master_fp: XpubFp,
    derivation: DerivationPath<HardenedIndex>,
}

impl XkeyOrigin {
    pub fn new(master_fp: XpubFp, derivation: DerivationPath<HardenedIndex>) -> Self {
        XkeyOrigin {
            master_fp,
            derivation,
        }
    }

    pub fn to_derivation(&self) -> DerivationPath { self.derivation.to_derivation() }
}

/// Origin of a single key as carried by PSBT BIP-32 derivation records.
#[derive(Getters, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display("[{master_fp}]{derivation}")]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct KeyOrigin {
    #[getter(as_copy)]
    master_fp: XpubFp,
    derivation: DerivationPath,
}

impl FromStr for KeyOrigin {
    type Err = XkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (master_fp, path) = match s.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
            None => (XpubFp::master(), s),
            Some((fp, path)) => (XpubFp::from_str(fp)?, path),
        };
        Ok(KeyOrigin::new(master_fp, DerivationPath::from_str(path)?))
    }
}

impl KeyOrigin {
    pub fn new(master_fp: XpubFp, derivation: DerivationPath) -> Self {
        KeyOrigin {
            master_fp,
            derivation,
        }
    }

    /// Origin of the key at `branch/index` below an account.
    pub fn with(account: &XkeyOrigin, branch: NormalIndex, index: NormalIndex) -> Self {
        let mut derivation = account.to_derivation();
        derivation.push(branch.into());
        derivation.push(index.into());
        KeyOrigin::new(account.master_fp(), derivation)
    }
}

/// Account-level extended private key together with its origin.
#[derive(Getters, Clone, Eq, PartialEq, Debug)]
pub struct XprivAccount {
    origin: XkeyOrigin,
    xpriv: Xpriv,
}

impl XprivAccount {
    pub fn new(xpriv: Xpriv, origin: XkeyOrigin) -> Self { XprivAccount { xpriv, origin } }

    pub fn to_xpub(&self) -> Xpub { self.xpriv.to_xpub() }

    /// Derives the key at `branch/index` below the account.
    pub fn derive_child(&self, branch: NormalIndex, index: NormalIndex) -> (Xpriv, KeyOrigin) {
        let xpriv = self.xpriv.derive_priv([branch, index]);
        (xpriv, KeyOrigin::with(&self.origin, branch, index))
    }
}
