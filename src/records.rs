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

//! Raw UTXO and asset records in the JSON form returned by the index
//! service.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};

/// Numeric field which the index service may send either as a JSON number
/// or as a decimal string.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(serde_json::Number),
    Text(String),
}

impl RawNumber {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RawNumber::Number(number) => number.as_u64(),
            RawNumber::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl From<u64> for RawNumber {
    fn from(value: u64) -> Self { RawNumber::Number(value.into()) }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAssetInfo {
    pub asset_guid: RawNumber,
    pub value: RawNumber,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUtxo {
    pub txid: String,
    pub vout: u32,
    pub value: RawNumber,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub locktime: Option<u32>,
    #[serde(default)]
    pub asset_info: Option<RawAssetInfo>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotaryDetails {
    /// Base64-encoded endpoint URL.
    #[serde(default, rename = "endPoint")]
    pub end_point: Option<String>,
    #[serde(default)]
    pub instant_transfers: Option<bool>,
    #[serde(default, rename = "HDRequired")]
    pub hd_required: Option<bool>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAuxFee {
    pub bound: RawNumber,
    pub percent: RawNumber,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAuxFeeDetails {
    #[serde(default, rename = "auxFeeKeyID")]
    pub aux_fee_key_id: Option<String>,
    #[serde(default)]
    pub aux_fees: Vec<RawAuxFee>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAsset {
    pub asset_guid: RawNumber,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub contract: Option<String>,
    #[serde(default)]
    pub pub_data: Option<serde_json::Value>,
    #[serde(default, rename = "notaryKeyID")]
    pub notary_key_id: Option<String>,
    #[serde(default)]
    pub notary_sig: Option<String>,
    #[serde(default)]
    pub notary_details: Option<RawNotaryDetails>,
    #[serde(default)]
    pub aux_fee_details: Option<RawAuxFeeDetails>,
    #[serde(default)]
    pub update_capability_flags: Option<u8>,
    pub max_supply: RawNumber,
    #[serde(default)]
    pub decimals: u8,
}

/// Listing entry. Entries not matching the record layout are kept as raw
/// JSON, so a single bad entry doesn't reject the whole listing.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRecord<T> {
    Parsed(T),
    Malformed(serde_json::Value),
}

impl<T> RawRecord<T> {
    pub fn as_parsed(&self) -> Option<&T> {
        match self {
            RawRecord::Parsed(record) => Some(record),
            RawRecord::Malformed(_) => None,
        }
    }
}

impl<T: DeserializeOwned> RawRecord<T> {
    /// Returns the parsed record or the reason the entry doesn't match the
    /// record layout.
    pub fn parsed(&self) -> Result<&T, serde_json::Error> {
        match self {
            RawRecord::Parsed(record) => Ok(record),
            RawRecord::Malformed(value) => match serde_json::from_value::<T>(value.clone()) {
                Err(err) => Err(err),
                Ok(_) => Err(serde_json::Error::custom("record layout mismatch")),
            },
        }
    }
}

impl<T> From<T> for RawRecord<T> {
    fn from(record: T) -> Self { RawRecord::Parsed(record) }
}

/// UTXO listing of an address or extended key.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUtxoSet {
    #[serde(default)]
    pub utxos: Vec<RawRecord<RawUtxo>>,
    #[serde(default)]
    pub assets: Vec<RawRecord<RawAsset>>,
}
