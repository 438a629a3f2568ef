// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt::{self, Debug, Formatter};

use bytes::Bytes;
use chrono::{Datelike, TimeDelta};
use megaplan_core::time::{now, DateTime};
use megaplan_core::utils::Redact;
use megaplan_core::{Context, Result, SigningCredential};
use serde::{Deserialize, Serialize};

use crate::constants::TOKEN_EXPIRY_MARGIN_SECS;

/// Access pair used to sign legacy requests.
///
/// Serialized the way saved-credentials files store it:
/// `{"AccessId": "...", "SecretKey": "...", "Domain": "..."}`.
#[derive(Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credential {
    /// Access id, sent in clear as part of `X-Authorization`.
    pub access_id: String,
    /// Secret key the signature is keyed with.
    pub secret_key: String,
    /// Account domain the pair was issued for.
    #[serde(default)]
    pub domain: String,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_id", &self.access_id)
            .field("secret_key", &Redact::from(&self.secret_key))
            .field("domain", &self.domain)
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.access_id.is_empty() && !self.secret_key.is_empty()
    }
}

impl Credential {
    /// Create a new access pair.
    pub fn new(
        access_id: impl Into<String>,
        secret_key: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            access_id: access_id.into(),
            secret_key: secret_key.into(),
            domain: domain.into(),
        }
    }

    /// Parse a saved-credentials file.
    pub fn from_json(content: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(content)?)
    }

    /// Write this pair to `path`, replacing any previous content.
    pub async fn save(&self, ctx: &Context, path: &str) -> Result<()> {
        let content = serde_json::to_vec_pretty(self)?;
        ctx.file_write(path, Bytes::from(content)).await
    }
}

/// Bearer token for the v3 API.
///
/// The JSON layout is the one oauth2 clients persist:
/// `{"access_token", "token_type", "refresh_token", "expiry"}` with `expiry`
/// in RFC 3339.
#[derive(Default, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Bearer value.
    pub access_token: String,
    /// Token type, `Bearer` when empty.
    #[serde(default)]
    pub token_type: String,
    /// Refresh token, empty when the server did not issue one.
    #[serde(default)]
    pub refresh_token: String,
    /// Expiry time. `None` means the token never expires.
    #[serde(default)]
    pub expiry: Option<DateTime>,
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &Redact::from(&self.access_token))
            .field("token_type", &self.token_type)
            .field("refresh_token", &Redact::from(&self.refresh_token))
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl SigningCredential for Token {
    fn is_valid(&self) -> bool {
        if self.access_token.is_empty() {
            return false;
        }

        match self.expires_at() {
            None => true,
            Some(expiry) => expiry - TimeDelta::seconds(TOKEN_EXPIRY_MARGIN_SECS) > now(),
        }
    }
}

impl Token {
    /// Create a token from an access token and its lifetime in seconds.
    pub fn new(access_token: impl Into<String>, expires_in: Option<i64>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            refresh_token: String::new(),
            expiry: expires_in
                .filter(|secs| *secs > 0)
                .and_then(TimeDelta::try_seconds)
                .map(|lifetime| now() + lifetime),
        }
    }

    /// Set the refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = refresh_token.into();
        self
    }

    /// Effective expiry time.
    ///
    /// Files written by Go's oauth2 carry `0001-01-01T00:00:00Z` for tokens
    /// without expiry.
    pub fn expires_at(&self) -> Option<DateTime> {
        self.expiry.filter(|t| t.year() > 1)
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        let token_type = match self.token_type.as_str() {
            "" => "Bearer",
            t if t.eq_ignore_ascii_case("bearer") => "Bearer",
            t => t,
        };
        format!("{token_type} {}", self.access_token)
    }
}
