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

use crate::{DerivationIndex, HardenedIndex, IndexParseError, NormalIndex};

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum DerivationParseError {
    /// derivation path '{0}' contains invalid index - {1}
    InvalidIndex(String, IndexParseError),

    /// '{0}' is not a derivation path.
    InvalidFormat(String),
}

/// Derivation path from the master key, displayed as `m/84'/57'/0'/0/1`.
#[derive(Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, From)]
#[wrapper(Deref)]
#[wrapper_mut(DerefMut)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct DerivationPath<I = DerivationIndex>(Vec<I>);

impl<I: Display> Display for DerivationPath<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        self.0.iter().try_for_each(|step| write!(f, "/{step}"))
    }
}

/// Accepts `m/`-prefixed, `/`-prefixed and bare forms; hardened steps may be
/// marked with `'`, `h` or `H`.
impl<I: FromStr<Err = IndexParseError>> FromStr for DerivationPath<I> {
    type Err = DerivationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DerivationParseError::InvalidFormat(s.to_owned());
        let trimmed = s.trim();
        let steps = match trimmed.strip_prefix(['m', 'M']) {
            Some("") => return Ok(Self(vec![])),
            Some(rest) => rest.strip_prefix('/').ok_or_else(invalid)?,
            None => trimmed.strip_prefix('/').unwrap_or(trimmed),
        };
        if steps.is_empty() {
            return Err(invalid());
        }
        steps
            .split('/')
            .map(I::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|err| DerivationParseError::InvalidIndex(s.to_owned(), err))
    }
}

impl<I> FromIterator<I> for DerivationPath<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self { Self(iter.into_iter().collect()) }
}

impl DerivationPath<HardenedIndex> {
    /// Account-level path `m/purpose'/coin'/account'`.
    pub fn account(purpose: u32, coin: u32, account: u32) -> Self {
        Self(vec![HardenedIndex(purpose), HardenedIndex(coin), HardenedIndex(account)])
    }

    pub fn to_derivation(&self) -> DerivationPath {
        self.0.iter().copied().map(DerivationIndex::Hardened).collect()
    }
}

impl DerivationPath {
    /// Branch and index levels of a full `m/purpose'/coin'/account'/branch/index`
    /// path.
    pub fn branch_index(&self) -> Option<(NormalIndex, NormalIndex)> {
        match self.0.as_slice() {
            [_, _, _, branch, index, ..] => Some((branch.as_normal()?, index.as_normal()?)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn alternative_forms() {
        let path1 = DerivationPath::<HardenedIndex>::from_str("m/84h/1h/0h").unwrap();
        let path2 = DerivationPath::<HardenedIndex>::from_str("84'/1'/0'").unwrap();
        let path3 = DerivationPath::<HardenedIndex>::from_str("/84'/1H/0h").unwrap();
        assert_eq!(path1, path2);
        assert_eq!(path1, path3);
        assert_eq!(path1, DerivationPath::account(84, 1, 0));
        assert_eq!(path1.to_string(), "m/84'/1'/0'");
    }

    #[test]
    fn full_path() {
        let path = DerivationPath::<DerivationIndex>::from_str("m/84'/57'/0'/1/17").unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.branch_index(), Some((NormalIndex::ONE, NormalIndex::normal(17))));
        assert_eq!(path.to_string(), "m/84'/57'/0'/1/17");
        assert!(DerivationPath::<DerivationIndex>::from_str("m").unwrap().is_empty());

        let account = DerivationPath::<DerivationIndex>::from_str("m/84'/57'/0'").unwrap();
        assert_eq!(account.branch_index(), None);
        let hardened = DerivationPath::<DerivationIndex>::from_str("m/84'/57'/0'/1'/17").unwrap();
        assert_eq!(hardened.branch_index(), None);
    }

    #[test]
    fn malformed() {
        assert!(DerivationPath::<DerivationIndex>::from_str("").is_err());
        assert!(DerivationPath::<DerivationIndex>::from_str("m/").is_err());
        assert!(DerivationPath::<DerivationIndex>::from_str("m84'").is_err());
        assert!(DerivationPath::<DerivationIndex>::from_str("m/84'/x").is_err());
        assert!(DerivationPath::<DerivationIndex>::from_str("m/84'//0").is_err());
    }
}
