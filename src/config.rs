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

use std::time::Duration;

use bridge::DEFAULT_PROOF_TIMEOUT;
use derive::AddressScheme;
use invoice::Network;
use psbt::DEFAULT_MAX_FEE_RATE;
use serde::{Deserialize, Serialize};

use crate::{NotaryPolicy, TxOptions, DEFAULT_NOTARY_TIMEOUT};

/// Wallet settings, normally read from a JSON document.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletConfig {
    pub network: Network,
    pub scheme: AddressScheme,
    /// Ceiling of the fee rate checked on extraction, in units per vbyte.
    pub max_fee_rate: u64,
    pub notary_policy: NotaryPolicy,
    pub notary_timeout_secs: u64,
    pub proof_timeout_secs: u64,
    pub tx_options: TxOptions,
}

impl Default for WalletConfig {
    fn default() -> Self {
        WalletConfig {
            network: Network::Syscoin,
            scheme: AddressScheme::Bip84,
            max_fee_rate: DEFAULT_MAX_FEE_RATE,
            notary_policy: NotaryPolicy::BestEffort,
            notary_timeout_secs: DEFAULT_NOTARY_TIMEOUT.as_secs(),
            proof_timeout_secs: DEFAULT_PROOF_TIMEOUT.as_secs(),
            tx_options: TxOptions::default(),
        }
    }
}

impl WalletConfig {
    pub fn with_network(network: Network) -> Self {
        WalletConfig {
            network,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> { serde_json::from_str(json) }

    pub fn notary_timeout(&self) -> Duration { Duration::from_secs(self.notary_timeout_secs) }

    pub fn proof_timeout(&self) -> Duration { Duration::from_secs(self.proof_timeout_secs) }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.network, Network::Syscoin);
        assert_eq!(config.scheme, AddressScheme::Bip84);
        assert_eq!(config.max_fee_rate, 5000);
        assert_eq!(config.notary_policy, NotaryPolicy::BestEffort);
        assert_eq!(config.notary_timeout(), Duration::from_secs(15));
        assert!(!config.tx_options.rbf);
    }

    #[test]
    fn partial_json() {
        let config = WalletConfig::from_json(
            r#"{"network": "syscoinTestnet", "notaryPolicy": "strict", "maxFeeRate": 100,
                "txOptions": {"allowOtherNotarizedAssetInputs": true}}"#,
        )
        .unwrap();
        assert_eq!(config.network, Network::SyscoinTestnet);
        assert_eq!(config.notary_policy, NotaryPolicy::Strict);
        assert_eq!(config.max_fee_rate, 100);
        assert!(config.tx_options.allow_other_notarized_asset_inputs);
        assert_eq!(config.scheme, AddressScheme::Bip84);
        assert_eq!(config.proof_timeout_secs, 30);
    }
}
