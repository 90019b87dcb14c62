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

use std::str::FromStr;

use crate::AddressKind;

/// Version bytes prefixing serialized BIP-32 extended keys.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct XkeyVersions {
    pub public: [u8; 4],
    pub private: [u8; 4],
}

/// Immutable table of the constants a chain uses for address and key
/// serialization.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NetworkParams {
    pub network: Network,
    pub message_prefix: &'static str,
    pub bech32_hrp: &'static str,
    pub pubkey_hash: u8,
    pub script_hash: u8,
    pub wif: u8,
    /// Versions for `xpub`/`xprv`-style keys (BIP-44 accounts).
    pub bip32: XkeyVersions,
    /// Versions for `zpub`/`vpub`-style keys (BIP-84 accounts).
    pub bip84: XkeyVersions,
    pub slip44: u32,
}

pub const SYSCOIN_SLIP44: u32 = 57;
pub const BITCOIN_SLIP44: u32 = 0;
/// SLIP-44 coin type shared by all test networks.
pub const TESTNET_SLIP44: u32 = 1;

const ZPUB_MAINNET: XkeyVersions = XkeyVersions {
    public: [0x04, 0xb2, 0x47, 0x46],
    private: [0x04, 0xb2, 0x43, 0x0c],
};

const VPUB_TESTNET: XkeyVersions = XkeyVersions {
    public: [0x04, 0x5f, 0x1c, 0xf6],
    private: [0x04, 0x5f, 0x18, 0xbc],
};

const XPUB_MAINNET: XkeyVersions = XkeyVersions {
    public: [0x04, 0x88, 0xb2, 0x1e],
    private: [0x04, 0x88, 0xad, 0xe4],
};

const TPUB_TESTNET: XkeyVersions = XkeyVersions {
    public: [0x04, 0x35, 0x87, 0xcf],
    private: [0x04, 0x35, 0x83, 0x94],
};

pub const SYSCOIN: NetworkParams = NetworkParams {
    network: Network::Syscoin,
    message_prefix: "\x18Syscoin Signed Message:\n",
    bech32_hrp: "sys",
    pubkey_hash: 0x3f,
    script_hash: 0x05,
    wif: 0x80,
    bip32: XPUB_MAINNET,
    bip84: ZPUB_MAINNET,
    slip44: SYSCOIN_SLIP44,
};

pub const SYSCOIN_TESTNET: NetworkParams = NetworkParams {
    network: Network::SyscoinTestnet,
    message_prefix: "\x18Syscoin Signed Message:\n",
    bech32_hrp: "tsys",
    pubkey_hash: 0x41,
    script_hash: 0xc4,
    wif: 0xef,
    bip32: TPUB_TESTNET,
    bip84: VPUB_TESTNET,
    slip44: TESTNET_SLIP44,
};

pub const BITCOIN: NetworkParams = NetworkParams {
    network: Network::Bitcoin,
    message_prefix: "\x18Bitcoin Signed Message:\n",
    bech32_hrp: "bc",
    pubkey_hash: 0x00,
    script_hash: 0x05,
    wif: 0x80,
    bip32: XPUB_MAINNET,
    bip84: ZPUB_MAINNET,
    slip44: BITCOIN_SLIP44,
};

pub const BITCOIN_TESTNET: NetworkParams = NetworkParams {
    network: Network::BitcoinTestnet,
    message_prefix: "\x18Bitcoin Signed Message:\n",
    bech32_hrp: "tb",
    pubkey_hash: 0x6f,
    script_hash: 0xc4,
    wif: 0xef,
    bip32: TPUB_TESTNET,
    bip84: VPUB_TESTNET,
    slip44: TESTNET_SLIP44,
};

impl NetworkParams {
    /// Classifies an address string by its prefix: anything carrying this
    /// network's bech32 human-readable part is a witness address.
    pub fn address_kind(&self, address: &str) -> AddressKind {
        let lower = address.to_ascii_lowercase();
        match lower.strip_prefix(self.bech32_hrp) {
            Some(rest) if rest.starts_with('1') => AddressKind::Witness,
            _ => AddressKind::Legacy,
        }
    }
}

/// Chain and network the wallet operates on.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum Network {
    /// Syscoin mainnet
    #[default]
    #[display("syscoin")]
    Syscoin,

    /// Syscoin testnet
    #[display("syscoin-testnet")]
    SyscoinTestnet,

    /// Bitcoin mainnet
    #[display("bitcoin")]
    Bitcoin,

    /// Bitcoin testnet
    #[display("bitcoin-testnet")]
    BitcoinTestnet,
}

impl Network {
    pub const ALL: [Network; 4] =
        [Network::Syscoin, Network::SyscoinTestnet, Network::Bitcoin, Network::BitcoinTestnet];

    pub const fn params(self) -> &'static NetworkParams {
        match self {
            Network::Syscoin => &SYSCOIN,
            Network::SyscoinTestnet => &SYSCOIN_TESTNET,
            Network::Bitcoin => &BITCOIN,
            Network::BitcoinTestnet => &BITCOIN_TESTNET,
        }
    }

    /// Detects whether the network is a kind of test network.
    pub fn is_testnet(self) -> bool {
        matches!(self, Network::SyscoinTestnet | Network::BitcoinTestnet)
    }

    /// Coin type used in the second level of BIP-44/84 derivation paths.
    pub fn coin_type(self) -> u32 { self.params().slip44 }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("unknown network '{0}'")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "syscoin" | "sys" | "mainnet" => Network::Syscoin,
            "syscoin-testnet" | "tsys" | "testnet" => Network::SyscoinTestnet,
            "bitcoin" | "btc" => Network::Bitcoin,
            "bitcoin-testnet" | "tbtc" => Network::BitcoinTestnet,
            other => return Err(UnknownNetwork(other.to_owned())),
        })
    }
}
