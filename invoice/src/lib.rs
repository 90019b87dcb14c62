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

#[macro_use]
extern crate amplify;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

mod network;
mod address;

pub use address::{Address, AddressError, AddressKind, AddressParseError, AddressPayload};
pub use network::{
    Network, NetworkParams, UnknownNetwork, XkeyVersions, BITCOIN, BITCOIN_SLIP44,
    BITCOIN_TESTNET, SYSCOIN, SYSCOIN_SLIP44, SYSCOIN_TESTNET, TESTNET_SLIP44,
};
pub use bc::ScriptPubkey;
