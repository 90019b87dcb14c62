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

use std::collections::BTreeMap;
use std::str::FromStr;

use amplify::hex::FromHex;
use base64::Engine;
use invoice::{Address, AddressKind, Network};
use psbt::{AssetAllocation, Txid};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::records::{RawAsset, RawUtxo, RawUtxoSet};

/// Size of a recoverable notary signature.
pub const NOTARY_SIG_LEN: usize = 65;

/// Record-level problem found in the index service data. Such records are
/// dropped, logged and reported, but never abort processing.
#[derive(Clone, Eq, PartialEq, Debug, Display)]
#[display(doc_comments)]
pub enum DataIntegrity {
    /// UTXO {0}:{1} has no address.
    MissingAddress(String, u32),

    /// UTXO {0}:{1} has invalid transaction id.
    InvalidTxid(String, u32),

    /// field `{field}` of {record} is not a valid number.
    MalformedNumber { record: String, field: &'static str },

    /// field `{field}` of asset {guid} is not valid hex.
    MalformedHex { guid: u64, field: &'static str },

    /// key id of asset {guid} is {len} bytes long instead of 20.
    InvalidKeyId { guid: u64, len: usize },

    /// notary endpoint of asset {0} is not valid base64.
    MalformedEndpoint(u64),

    /// UTXO {0}:{1} references asset {2} which is not listed.
    UnknownAsset(String, u32, u64),

    /// {record} record doesn't match the expected layout - {reason}
    MalformedRecord { record: &'static str, reason: String },
}

/// Options affecting UTXO filtering and transaction construction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxOptions {
    /// Signal replace-by-fee.
    pub rbf: bool,
    /// Allow spending UTXOs of notarized assets which are not being sent.
    pub allow_other_notarized_asset_inputs: bool,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Utxo {
    pub address: String,
    pub txid: Txid,
    pub vout: u32,
    pub value: u64,
    pub asset: Option<AssetAllocation>,
    pub kind: AddressKind,
    pub lock_time: Option<u32>,
    pub path: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NotaryDetails {
    /// Decoded endpoint; empty if the asset has no notary service.
    pub endpoint: Vec<u8>,
    pub instant_transfers: bool,
    pub hd_required: bool,
}

impl NotaryDetails {
    /// Endpoint URL, if one is set and is a valid UTF-8 string.
    pub fn endpoint_url(&self) -> Option<&str> {
        if self.endpoint.is_empty() {
            return None;
        }
        std::str::from_utf8(&self.endpoint).ok()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AuxFee {
    pub bound: u64,
    pub percent: u64,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct AuxFeeDetails {
    pub key_id: Vec<u8>,
    pub address: Option<Address>,
    pub fees: Vec<AuxFee>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AssetMetadata {
    pub guid: u64,
    pub symbol: Option<String>,
    pub max_supply: u64,
    pub precision: u8,
    pub contract: Option<Vec<u8>>,
    pub pub_data: Option<Vec<u8>>,
    pub notary_key_id: Option<Vec<u8>>,
    pub notary_address: Option<Address>,
    pub notary_sig: Option<Vec<u8>>,
    pub notary_details: Option<NotaryDetails>,
    pub aux_fee_details: Option<AuxFeeDetails>,
    pub update_capability_flags: Option<u8>,
}

impl AssetMetadata {
    /// Whether spending the asset needs a notary signature: the asset
    /// either has a notary key or a notary endpoint.
    pub fn requires_notarization(&self) -> bool {
        self.notary_key_id.as_ref().is_some_and(|id| !id.is_empty())
            || self.notary_endpoint().is_some()
    }

    pub fn notary_endpoint(&self) -> Option<&str> {
        self.notary_details.as_ref().and_then(NotaryDetails::endpoint_url)
    }
}

/// Output requested for an asset.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetOutput {
    pub address: String,
    pub value: u64,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    #[serde(default)]
    pub change_address: Option<String>,
    pub outputs: Vec<AssetOutput>,
}

/// Requested asset allocations by asset guid.
pub type AssetMap = BTreeMap<u64, AssetRequest>;

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct NormalizedUtxos {
    pub utxos: Vec<Utxo>,
    pub assets: BTreeMap<u64, AssetMetadata>,
    /// Problems found in the dropped records.
    pub issues: Vec<DataIntegrity>,
}

fn decode_hex(hex: &str, guid: u64, field: &'static str) -> Result<Vec<u8>, DataIntegrity> {
    let hex = hex.trim_start_matches("0x");
    Vec::<u8>::from_hex(hex).map_err(|_| DataIntegrity::MalformedHex { guid, field })
}

fn key_id_address(key_id: &[u8], guid: u64, network: Network) -> Result<Address, DataIntegrity> {
    let hash = <[u8; 20]>::try_from(key_id).map_err(|_| DataIntegrity::InvalidKeyId {
        guid,
        len: key_id.len(),
    })?;
    Ok(Address::from_key_id(hash, network))
}

fn asset_metadata(raw: &RawAsset, network: Network) -> Result<AssetMetadata, DataIntegrity> {
    let guid = raw.asset_guid.as_u64().ok_or_else(|| DataIntegrity::MalformedNumber {
        record: s!("asset"),
        field: "assetGuid",
    })?;
    let max_supply = raw.max_supply.as_u64().ok_or_else(|| DataIntegrity::MalformedNumber {
        record: format!("asset {guid}"),
        field: "maxSupply",
    })?;

    let contract = raw
        .contract
        .as_deref()
        .map(|contract| decode_hex(contract, guid, "contract"))
        .transpose()?;
    let pub_data = raw.pub_data.as_ref().map(|data| data.to_string().into_bytes());

    let mut notary_key_id = None;
    let mut notary_address = None;
    let mut notary_sig = None;
    if let Some(key_id) = raw.notary_key_id.as_deref() {
        let key_id = decode_hex(key_id, guid, "notaryKeyID")?;
        notary_address = Some(key_id_address(&key_id, guid, network)?);
        notary_key_id = Some(key_id);
        notary_sig = Some(match raw.notary_sig.as_deref() {
            Some(sig) => decode_hex(sig, guid, "notarySig")?,
            None => vec![0u8; NOTARY_SIG_LEN],
        });
    }

    let notary_details = match &raw.notary_details {
        None => None,
        Some(details) => {
            let endpoint = match details.end_point.as_deref() {
                None | Some("") => vec![],
                Some(endpoint) => base64::engine::general_purpose::STANDARD
                    .decode(endpoint)
                    .map_err(|_| DataIntegrity::MalformedEndpoint(guid))?,
            };
            Some(NotaryDetails {
                endpoint,
                instant_transfers: details.instant_transfers.unwrap_or_default(),
                hd_required: details.hd_required.unwrap_or_default(),
            })
        }
    };

    let aux_fee_details = match &raw.aux_fee_details {
        None => None,
        Some(details) => {
            let (key_id, address) = match details.aux_fee_key_id.as_deref() {
                None | Some("") => (vec![], None),
                Some(key_id) => {
                    let key_id = decode_hex(key_id, guid, "auxFeeKeyID")?;
                    let address = key_id_address(&key_id, guid, network)?;
                    (key_id, Some(address))
                }
            };
            let fees = details
                .aux_fees
                .iter()
                .map(|fee| match (fee.bound.as_u64(), fee.percent.as_u64()) {
                    (Some(bound), Some(percent)) => Ok(AuxFee { bound, percent }),
                    _ => Err(DataIntegrity::MalformedNumber {
                        record: format!("asset {guid}"),
                        field: "auxFees",
                    }),
                })
                .collect::<Result<_, _>>()?;
            Some(AuxFeeDetails {
                key_id,
                address,
                fees,
            })
        }
    };

    Ok(AssetMetadata {
        guid,
        symbol: raw.symbol.clone(),
        max_supply,
        precision: raw.decimals,
        contract,
        pub_data,
        notary_key_id,
        notary_address,
        notary_sig,
        notary_details,
        aux_fee_details,
        update_capability_flags: raw.update_capability_flags,
    })
}

/// Outcome of filtering a single UTXO record.
enum Verdict {
    Keep(Utxo),
    Skip,
    Drop(DataIntegrity),
}

fn utxo(
    raw: &RawUtxo,
    network: Network,
    options: &TxOptions,
    asset_map: Option<&AssetMap>,
    assets: &BTreeMap<u64, AssetMetadata>,
) -> Verdict {
    let Some(address) = &raw.address else {
        return Verdict::Drop(DataIntegrity::MissingAddress(raw.txid.clone(), raw.vout));
    };
    let Ok(txid) = Txid::from_str(&raw.txid) else {
        return Verdict::Drop(DataIntegrity::InvalidTxid(raw.txid.clone(), raw.vout));
    };
    let record = format!("UTXO {}:{}", raw.txid, raw.vout);
    let Some(value) = raw.value.as_u64() else {
        return Verdict::Drop(DataIntegrity::MalformedNumber {
            record,
            field: "value",
        });
    };

    let asset = match &raw.asset_info {
        None => None,
        Some(info) => {
            let (Some(guid), Some(asset_value)) = (info.asset_guid.as_u64(), info.value.as_u64())
            else {
                return Verdict::Drop(DataIntegrity::MalformedNumber {
                    record,
                    field: "assetInfo",
                });
            };
            let Some(metadata) = assets.get(&guid) else {
                return Verdict::Drop(DataIntegrity::UnknownAsset(
                    raw.txid.clone(),
                    raw.vout,
                    guid,
                ));
            };
            let requested = asset_map.is_some_and(|map| map.contains_key(&guid));
            if !options.allow_other_notarized_asset_inputs
                && metadata.requires_notarization()
                && !requested
            {
                debug!("skipping {record} of notarized asset {guid} which is not being sent");
                return Verdict::Skip;
            }
            Some(AssetAllocation {
                guid,
                value: asset_value,
            })
        }
    };

    Verdict::Keep(Utxo {
        kind: network.params().address_kind(address),
        address: address.clone(),
        txid,
        vout: raw.vout,
        value,
        asset,
        lock_time: raw.locktime,
        path: raw.path.clone(),
    })
}

/// Converts the index service listing into the internal UTXO model.
///
/// Assets are processed first, so every kept asset-bearing UTXO references
/// an asset from the same listing. UTXOs of assets requiring notarization
/// are kept only if the asset is present in `asset_map`, unless
/// [`TxOptions::allow_other_notarized_asset_inputs`] is set.
pub fn normalize(
    raw: &RawUtxoSet,
    network: Network,
    options: &TxOptions,
    asset_map: Option<&AssetMap>,
) -> NormalizedUtxos {
    let mut normalized = NormalizedUtxos::default();

    for record in &raw.assets {
        let asset = match record.parsed() {
            Ok(asset) => asset,
            Err(err) => {
                let issue = DataIntegrity::MalformedRecord {
                    record: "asset",
                    reason: err.to_string(),
                };
                warn!("dropping asset record: {issue}");
                normalized.issues.push(issue);
                continue;
            }
        };
        match asset_metadata(asset, network) {
            Ok(metadata) => {
                normalized.assets.insert(metadata.guid, metadata);
            }
            Err(issue) => {
                warn!("dropping asset record: {issue}");
                normalized.issues.push(issue);
            }
        }
    }

    for record in &raw.utxos {
        let record = match record.parsed() {
            Ok(record) => record,
            Err(err) => {
                let issue = DataIntegrity::MalformedRecord {
                    record: "UTXO",
                    reason: err.to_string(),
                };
                warn!("dropping UTXO record: {issue}");
                normalized.issues.push(issue);
                continue;
            }
        };
        match utxo(record, network, options, asset_map, &normalized.assets) {
            Verdict::Keep(utxo) => normalized.utxos.push(utxo),
            Verdict::Skip => {}
            Verdict::Drop(issue) => {
                warn!("dropping UTXO record: {issue}");
                normalized.issues.push(issue);
            }
        }
    }

    normalized
}
