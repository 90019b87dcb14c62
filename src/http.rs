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

//! HTTP implementations of the index service and notary clients.

use async_trait::async_trait;
use derive::{DiscoveryError, TokenSource, UsedToken};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{BackendError, IndexService, NotaryClient, NotaryError, NotaryResponse, RawUtxoSet};

#[derive(Deserialize)]
struct XpubTokens {
    #[serde(default)]
    tokens: Vec<UsedToken>,
}

#[derive(Deserialize)]
struct SendTxResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct NotaryRequest<'a> {
    tx: &'a str,
}

/// Client of a Blockbook index server.
#[derive(Clone, Debug)]
pub struct BlockbookClient {
    client: Client,
    url: String,
}

impl BlockbookClient {
    pub fn new(url: impl Into<String>) -> Self {
        BlockbookClient {
            client: Client::new(),
            url: url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn url(&self) -> &str { &self.url }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status(status.as_u16(), body));
        }
        response.json().await.map_err(|err| BackendError::InvalidResponse(err.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self
            .client
            .get(format!("{}{path}", self.url))
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Self::parse(response).await
    }
}

#[async_trait]
impl IndexService for BlockbookClient {
    async fn fetch_utxos(&self, owner: &str) -> Result<RawUtxoSet, BackendError> {
        self.get(&format!("/api/v2/utxo/{owner}")).await
    }

    async fn fetch_history(&self, xpub: &str) -> Result<Vec<UsedToken>, BackendError> {
        let history: XpubTokens =
            self.get(&format!("/api/v2/xpub/{xpub}?tokens=used&details=tokens")).await?;
        Ok(history.tokens)
    }

    async fn broadcast(&self, raw_hex: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(format!("{}/api/v2/sendtx/", self.url))
            .body(raw_hex.to_owned())
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        let reply: SendTxResponse = Self::parse(response).await?;
        match (reply.result, reply.error) {
            (Some(txid), None) => Ok(txid),
            (_, Some(error)) => Err(BackendError::InvalidResponse(error.to_string())),
            (None, None) => Err(BackendError::InvalidResponse(s!("no transaction id returned"))),
        }
    }
}

#[async_trait]
impl TokenSource for BlockbookClient {
    async fn used_tokens(&self, xpub: &str) -> Result<Vec<UsedToken>, DiscoveryError> {
        self.fetch_history(xpub).await.map_err(|err| DiscoveryError(err.to_string()))
    }
}

/// Notary client posting unsigned transactions as JSON.
#[derive(Clone, Debug, Default)]
pub struct HttpNotary {
    client: Client,
}

impl HttpNotary {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl NotaryClient for HttpNotary {
    async fn notarize(&self, endpoint: &str, tx_hex: &str) -> Result<NotaryResponse, NotaryError> {
        let response = self
            .client
            .post(endpoint)
            .json(&NotaryRequest { tx: tx_hex })
            .send()
            .await
            .map_err(|err| NotaryError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotaryError::Status(status.as_u16(), body));
        }
        response.json().await.map_err(|err| NotaryError::Transport(err.to_string()))
    }
}
