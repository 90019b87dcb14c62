// Network parameters, scripts and addresses for Syscoin-family chains.
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

//! Addresses for legacy (base58check) and segwit v0 (bech32) outputs.

use std::fmt::{self, Display, Formatter};

use bech32::{FromBase32, ToBase32, Variant};
use bitcoin_hashes::{hash160, Hash};

use crate::{Network, ScriptPubkey};

/// How an address spends: the signature digest and final witness layout
/// depend on it.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub enum AddressKind {
    #[default]
    #[display("legacy")]
    Legacy,

    #[display("witness")]
    Witness,
}

/// Errors creating address from scriptPubkey.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum AddressError {
    /// scriptPubkey can't be represented with any known address standard.
    UnsupportedScriptPubkey,
}

/// Errors parsing address strings.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum AddressParseError {
    /// wrong Base58 encoding of address data - {0}
    #[from]
    Base58(bs58::decode::Error),

    /// base58 address payload has invalid length {0}.
    InvalidPayloadLength(usize),

    /// wrong Bech32 encoding of address data - {0}
    #[from]
    Bech32(bech32::Error),

    /// address version {0:#04x} is not valid for {1}.
    InvalidAddressVersion(u8, Network),

    /// address prefix '{0}' does not belong to {1}.
    WrongNetwork(String, Network),

    /// segwit address has an unsupported witness version {0}.
    UnsupportedWitnessVersion(u8),

    /// segwit v0 address has an invalid Bech32 variant.
    InvalidBech32Variant,

    /// witness program has invalid length {0}.
    InvalidProgramLength(usize),
}

/// Internal address content: the hash committed to by the output script.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum AddressPayload {
    /// P2PKH payload.
    Pkh([u8; 20]),

    /// P2SH payload.
    Sh([u8; 20]),

    /// P2WPKH payload.
    Wpkh([u8; 20]),

    /// P2WSH payload.
    Wsh([u8; 32]),
}

impl AddressPayload {
    /// Payload paying to a compressed public key through a witness program.
    pub fn p2wpkh(compressed_pk: &[u8; 33]) -> Self {
        AddressPayload::Wpkh(hash160::Hash::hash(compressed_pk).to_byte_array())
    }

    pub fn p2pkh(compressed_pk: &[u8; 33]) -> Self {
        AddressPayload::Pkh(hash160::Hash::hash(compressed_pk).to_byte_array())
    }

    /// Constructs payload from a given `scriptPubkey`.
    pub fn from_script(script: &ScriptPubkey) -> Result<Self, AddressError> {
        Ok(if script.is_p2pkh() {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&script[3..23]);
            AddressPayload::Pkh(bytes)
        } else if script.is_p2sh() {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&script[2..22]);
            AddressPayload::Sh(bytes)
        } else if script.is_p2wpkh() {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&script[2..]);
            AddressPayload::Wpkh(bytes)
        } else if script.is_p2wsh() {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&script[2..]);
            AddressPayload::Wsh(bytes)
        } else {
            return Err(AddressError::UnsupportedScriptPubkey);
        })
    }

    /// Returns script corresponding to the given address.
    pub fn script_pubkey(self) -> ScriptPubkey {
        match self {
            AddressPayload::Pkh(hash) => ScriptPubkey::p2pkh(hash),
            AddressPayload::Sh(hash) => ScriptPubkey::p2sh(hash),
            AddressPayload::Wpkh(hash) => ScriptPubkey::p2wpkh(hash),
            AddressPayload::Wsh(hash) => ScriptPubkey::p2wsh(hash),
        }
    }

    pub fn kind(self) -> AddressKind {
        match self {
            AddressPayload::Pkh(_) | AddressPayload::Sh(_) => AddressKind::Legacy,
            AddressPayload::Wpkh(_) | AddressPayload::Wsh(_) => AddressKind::Witness,
        }
    }
}

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Address {
    /// Address payload (see [`AddressPayload`]).
    pub payload: AddressPayload,

    /// Network the address is encoded for.
    pub network: Network,
}

impl Address {
    pub fn new(payload: AddressPayload, network: Network) -> Self { Address { payload, network } }

    /// Constructs compatible address for a given `scriptPubkey`.
    pub fn with(script: &ScriptPubkey, network: Network) -> Result<Self, AddressError> {
        AddressPayload::from_script(script).map(|payload| Address { payload, network })
    }

    /// P2WPKH address for a compressed public key.
    pub fn p2wpkh(compressed_pk: &[u8; 33], network: Network) -> Self {
        Address::new(AddressPayload::p2wpkh(compressed_pk), network)
    }

    /// P2WPKH address for an already hashed key identifier.
    pub fn from_key_id(key_id: [u8; 20], network: Network) -> Self {
        Address::new(AddressPayload::Wpkh(key_id), network)
    }

    /// Returns script corresponding to the given address.
    pub fn script_pubkey(self) -> ScriptPubkey { self.payload.script_pubkey() }

    pub fn kind(self) -> AddressKind { self.payload.kind() }

    /// Parses an address string which must be encoded for `network`.
    pub fn parse(s: &str, network: Network) -> Result<Self, AddressParseError> {
        let params = network.params();
        if params.address_kind(s) == AddressKind::Witness {
            let (hrp, data, variant) = bech32::decode(s)?;
            if hrp != params.bech32_hrp {
                return Err(AddressParseError::WrongNetwork(hrp, network));
            }
            let (version, program) =
                data.split_first().ok_or(AddressParseError::InvalidProgramLength(0))?;
            if version.to_u8() != 0 {
                return Err(AddressParseError::UnsupportedWitnessVersion(version.to_u8()));
            }
            if variant != Variant::Bech32 {
                return Err(AddressParseError::InvalidBech32Variant);
            }
            let program = Vec::<u8>::from_base32(program)?;
            let payload = match program.len() {
                20 => {
                    let mut hash = [0u8; 20];
                    hash.copy_from_slice(&program);
                    AddressPayload::Wpkh(hash)
                }
                32 => {
                    let mut hash = [0u8; 32];
                    hash.copy_from_slice(&program);
                    AddressPayload::Wsh(hash)
                }
                len => return Err(AddressParseError::InvalidProgramLength(len)),
            };
            return Ok(Address::new(payload, network));
        }

        let data = bs58::decode(s).with_check(None).into_vec()?;
        if data.len() != 21 {
            return Err(AddressParseError::InvalidPayloadLength(data.len()));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&data[1..]);
        let payload = match data[0] {
            v if v == params.pubkey_hash => AddressPayload::Pkh(hash),
            v if v == params.script_hash => AddressPayload::Sh(hash),
            v => return Err(AddressParseError::InvalidAddressVersion(v, network)),
        };
        Ok(Address::new(payload, network))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let params = self.network.params();
        let (prefix, hash) = match self.payload {
            AddressPayload::Pkh(hash) => (params.pubkey_hash, hash),
            AddressPayload::Sh(hash) => (params.script_hash, hash),
            AddressPayload::Wpkh(hash) => return write_bech32(f, params.bech32_hrp, &hash),
            AddressPayload::Wsh(hash) => return write_bech32(f, params.bech32_hrp, &hash),
        };
        let mut prefixed = [0u8; 21];
        prefixed[0] = prefix;
        prefixed[1..].copy_from_slice(&hash);
        f.write_str(&bs58::encode(prefixed).with_check().into_string())
    }
}

fn write_bech32(f: &mut Formatter<'_>, hrp: &str, program: &[u8]) -> fmt::Result {
    let mut data = Vec::with_capacity(program.len() * 8 / 5 + 2);
    data.push(bech32::u5::try_from_u8(0).expect("zero is a valid u5"));
    data.extend(program.to_base32());
    let s = bech32::encode(hrp, data, Variant::Bech32).map_err(|_| fmt::Error)?;
    f.write_str(&s)
}

#[cfg(test)]
mod test {
    use amplify::hex::FromHex;

    use super::*;

    #[test]
    fn bip84_first_receive_address() {
        let pk: [u8; 33] = Vec::<u8>::from_hex(
            "0330d54fd0dd420a6e5f8d3624f5f3482cae350f79d5f0753bf5beef9c2d91af3c",
        )
        .unwrap()
        .try_into()
        .unwrap();
        let addr = Address::p2wpkh(&pk, Network::Bitcoin);
        assert_eq!(addr.to_string(), "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
        assert_eq!(
            Address::parse("bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu", Network::Bitcoin).unwrap(),
            addr
        );
        assert_eq!(addr.kind(), AddressKind::Witness);
    }

    #[test]
    fn syscoin_encodings() {
        let hash = [7u8; 20];
        let wpkh = Address::from_key_id(hash, Network::Syscoin).to_string();
        assert!(wpkh.starts_with("sys1q"));
        let tpkh = Address::from_key_id(hash, Network::SyscoinTestnet).to_string();
        assert!(tpkh.starts_with("tsys1q"));
        assert!(matches!(
            Address::parse(&tpkh, Network::Syscoin),
            Err(AddressParseError::InvalidAddressVersion(..) | AddressParseError::Base58(_))
        ));

        let legacy = Address::new(AddressPayload::Pkh(hash), Network::Syscoin);
        let s = legacy.to_string();
        assert!(s.starts_with('S'));
        assert_eq!(Address::parse(&s, Network::Syscoin).unwrap(), legacy);
        assert!(Address::parse(&s, Network::Bitcoin).is_err());
    }

    #[test]
    fn zero_hash_keeps_leading_ones() {
        let addr = Address::new(AddressPayload::Pkh([0u8; 20]), Network::Bitcoin);
        assert_eq!(addr.to_string(), "1111111111111111111114oLvT2");
        assert_eq!(Address::parse("1111111111111111111114oLvT2", Network::Bitcoin).unwrap(), addr);
        assert!(matches!(
            Address::parse("1111111111111111111114oLvT3", Network::Bitcoin),
            Err(AddressParseError::Base58(_))
        ));
        // base58check of a 6-byte payload
        let short = bs58::encode([0u8, 0, 0x28, 0x7f, 0xb4, 0xcd]).with_check().into_string();
        assert!(short.starts_with("11"));
        assert_eq!(
            Address::parse(&short, Network::Bitcoin),
            Err(AddressParseError::InvalidPayloadLength(6))
        );
    }

    #[test]
    fn script_roundtrip() {
        let addr = Address::from_key_id([1u8; 20], Network::SyscoinTestnet);
        let script = addr.script_pubkey();
        assert_eq!(Address::with(&script, Network::SyscoinTestnet).unwrap(), addr);
        assert_eq!(
            Address::with(&ScriptPubkey::op_return(b"x"), Network::Syscoin),
            Err(AddressError::UnsupportedScriptPubkey)
        );
    }
}
