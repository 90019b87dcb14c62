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

use std::str::FromStr;

/// Child numbers at or above this value denote hardened derivation.
pub const HARDENED_INDEX_BOUNDARY: u32 = 1 << 31;

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum IndexParseError {
    /// derivation index '{0}' is not a number.
    NotANumber(String),

    /// child number {0} exceeds the maximum of 2^31-1.
    OutOfRange(u32),

    /// derivation index '{0}' must be hardened.
    HardenedRequired(String),
}

fn parse_child_number(s: &str) -> Result<u32, IndexParseError> {
    let value = u32::from_str(s).map_err(|_| IndexParseError::NotANumber(s.to_owned()))?;
    if value >= HARDENED_INDEX_BOUNDARY {
        return Err(IndexParseError::OutOfRange(value));
    }
    Ok(value)
}

/// Unhardened child number, always below [`HARDENED_INDEX_BOUNDARY`].
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Debug, Hash, Default, Display, From)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
#[display(inner)]
pub struct NormalIndex(
    #[from(u8)]
    #[from(u16)]
    u32,
);

impl NormalIndex {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);
    pub const MAX: Self = Self(HARDENED_INDEX_BOUNDARY - 1);

    pub const fn normal(child_number: u16) -> Self { NormalIndex(child_number as u32) }

    pub fn new(child_number: u32) -> Option<Self> {
        (child_number < HARDENED_INDEX_BOUNDARY).then_some(Self(child_number))
    }

    pub const fn child_number(self) -> u32 { self.0 }

    /// Next index, unless this one is already the last unhardened index.
    #[must_use]
    pub fn checked_inc(self) -> Option<Self> { Self::new(self.0 + 1) }
}

impl FromStr for NormalIndex {
    type Err = IndexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_child_number(s).map(Self) }
}

/// Hardened child number; holds the value without the
/// [`HARDENED_INDEX_BOUNDARY`] offset.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, Display, From)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
#[display("{0}'")]
pub struct HardenedIndex(
    #[from(u8)]
    #[from(u16)]
    pub(crate) u32,
);

impl HardenedIndex {
    pub const fn hardened(child_number: u16) -> Self { HardenedIndex(child_number as u32) }

    pub const fn child_number(self) -> u32 { self.0 }
}

impl FromStr for HardenedIndex {
    type Err = IndexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .strip_suffix(['h', 'H', '\''])
            .ok_or_else(|| IndexParseError::HardenedRequired(s.to_owned()))?;
        parse_child_number(number).map(Self)
    }
}

/// Single step of a derivation path.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, From)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
#[display(inner)]
pub enum DerivationIndex {
    #[from]
    Normal(NormalIndex),
    #[from]
    Hardened(HardenedIndex),
}

impl From<u32> for DerivationIndex {
    fn from(value: u32) -> Self { Self::from_index(value) }
}

impl DerivationIndex {
    pub const fn normal(child_number: u16) -> Self {
        Self::Normal(NormalIndex::normal(child_number))
    }

    pub const fn hardened(child_number: u16) -> Self {
        Self::Hardened(HardenedIndex::hardened(child_number))
    }

    /// Reads an index in the form used inside BIP-32 serialization.
    pub const fn from_index(value: u32) -> Self {
        match value {
            0..=0x7FFF_FFFF => DerivationIndex::Normal(NormalIndex(value)),
            _ => DerivationIndex::Hardened(HardenedIndex(value - HARDENED_INDEX_BOUNDARY)),
        }
    }

    /// Value entering the child key derivation, offset for hardened indexes.
    pub const fn index(self) -> u32 {
        match self {
            DerivationIndex::Normal(idx) => idx.0,
            DerivationIndex::Hardened(idx) => idx.0 + HARDENED_INDEX_BOUNDARY,
        }
    }

    pub const fn is_hardened(self) -> bool { matches!(self, DerivationIndex::Hardened(_)) }

    pub const fn as_normal(self) -> Option<NormalIndex> {
        match self {
            DerivationIndex::Normal(idx) => Some(idx),
            DerivationIndex::Hardened(_) => None,
        }
    }
}

impl FromStr for DerivationIndex {
    type Err = IndexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.ends_with(['h', 'H', '\'']) {
            HardenedIndex::from_str(s).map(Self::Hardened)
        } else {
            NormalIndex::from_str(s).map(Self::Normal)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn index_boundaries() {
        assert_eq!(DerivationIndex::from_index(5), DerivationIndex::normal(5));
        assert_eq!(
            DerivationIndex::from_index(HARDENED_INDEX_BOUNDARY + 84),
            DerivationIndex::hardened(84)
        );
        assert_eq!(DerivationIndex::hardened(84).index(), HARDENED_INDEX_BOUNDARY + 84);
        assert_eq!(NormalIndex::MAX.checked_inc(), None);
        assert_eq!(NormalIndex::ZERO.checked_inc(), Some(NormalIndex::ONE));
        assert_eq!(NormalIndex::new(HARDENED_INDEX_BOUNDARY), None);
        assert_eq!(DerivationIndex::hardened(3).as_normal(), None);
    }

    #[test]
    fn parse_forms() {
        assert_eq!(DerivationIndex::from_str("84'").unwrap(), DerivationIndex::hardened(84));
        assert_eq!(DerivationIndex::from_str("84h").unwrap(), DerivationIndex::hardened(84));
        assert_eq!(DerivationIndex::from_str("7").unwrap(), DerivationIndex::normal(7));
        assert_eq!(
            HardenedIndex::from_str("7"),
            Err(IndexParseError::HardenedRequired("7".to_owned()))
        );
        assert_eq!(
            NormalIndex::from_str("2147483648"),
            Err(IndexParseError::OutOfRange(HARDENED_INDEX_BOUNDARY))
        );
        assert!(DerivationIndex::from_str("x").is_err());
        assert_eq!(DerivationIndex::hardened(1).to_string(), "1'");
    }
}
