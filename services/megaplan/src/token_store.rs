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

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::StatusCode;
use log::{debug, error};
use megaplan_core::{Context, Error, Result, SigningCredential};
use serde::Deserialize;

use crate::constants::*;
use crate::params::Params;
use crate::{Config, Token};

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize, Default)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// TokenStore keeps the v3 bearer token in a file.
///
/// Every token it obtains is written to the file before it is returned, so
/// a restarted process picks up where the last one stopped. Refreshing is
/// not guarded against concurrent callers; serialize calls to
/// [`TokenStore::refresh`] if several tasks share one store.
#[derive(Debug, Clone)]
pub struct TokenStore {
    base_url: String,
    path: String,
}

impl TokenStore {
    /// Create a store for the account at `base_url` persisting to `path`.
    pub fn new(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
        }
    }

    /// Create a store from config. Both domain and token file are required.
    pub fn from_config(config: &Config) -> Result<Self> {
        let path = config
            .token_file
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::config_invalid("token_file is required for the v3 api"))?;
        Ok(Self::new(config.base_url()?, path))
    }

    /// Token file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Load the persisted token.
    pub async fn load(&self, ctx: &Context) -> Result<Token> {
        let path = self.expanded_path(ctx)?;
        let content = ctx.file_read(&path).await.map_err(|err| {
            Error::storage(format!("failed to read token file {path}")).with_source(err)
        })?;

        serde_json::from_slice(&content).map_err(|err| {
            Error::storage(format!("token file {path} is malformed")).with_source(err)
        })
    }

    /// Persist `token`, replacing the previous one.
    pub async fn save(&self, ctx: &Context, token: &Token) -> Result<()> {
        let path = self.expanded_path(ctx)?;
        let content = serde_json::to_vec(token)?;
        ctx.file_write(&path, Bytes::from(content)).await
    }

    /// Whether `token` can be used without refreshing.
    pub fn is_valid(token: &Token) -> bool {
        token.is_valid()
    }

    /// Exchange the refresh token of `token` for a new token and persist it.
    pub async fn refresh(&self, ctx: &Context, token: &Token) -> Result<Token> {
        if token.refresh_token.is_empty() {
            return Err(Error::authentication("token has no refresh token"));
        }

        debug!("refreshing bearer token");
        let params = Params::new()
            .with("grant_type", "refresh_token")
            .with("refresh_token", &token.refresh_token);

        let mut fresh = self.request_token(ctx, &params).await?;
        if fresh.refresh_token.is_empty() {
            fresh.refresh_token = token.refresh_token.clone();
        }

        self.save(ctx, &fresh).await?;
        Ok(fresh)
    }

    /// Obtain a first token with a username and password and persist it.
    pub async fn bootstrap_with_password(
        &self,
        ctx: &Context,
        username: &str,
        password: &str,
    ) -> Result<Token> {
        debug!("requesting bearer token for {username}");
        let params = Params::new()
            .with("grant_type", "password")
            .with("username", username)
            .with("password", password);

        let token = self.request_token(ctx, &params).await?;
        self.save(ctx, &token).await?;
        Ok(token)
    }

    async fn request_token(&self, ctx: &Context, params: &Params) -> Result<Token> {
        let req = http::Request::post(format!("{}{ACCESS_TOKEN_PATH}", self.base_url))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .body(Bytes::from(params.encode()))?;

        let resp = ctx.http_send(req).await?;
        let status = resp.status();
        if !status.is_success() {
            let body = String::from_utf8_lossy(resp.body());
            error!("token endpoint returned {status}: {body}");

            let detail: TokenErrorResponse = serde_json::from_slice(resp.body()).unwrap_or_default();
            let message = detail
                .error_description
                .or(detail.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| body.to_string());

            return if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED)
                || !detail.error.is_empty()
            {
                Err(Error::authentication(format!(
                    "token request rejected: {message}"
                )))
            } else {
                Err(Error::transport(format!(
                    "token endpoint returned {status}: {message}"
                )))
            };
        }

        let token: TokenResponse = serde_json::from_slice(resp.body())?;
        Ok(Token {
            token_type: token.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: token.refresh_token.unwrap_or_default(),
            ..Token::new(token.access_token, token.expires_in)
        })
    }

    fn expanded_path(&self, ctx: &Context) -> Result<String> {
        ctx.expand_home_dir(&self.path).ok_or_else(|| {
            Error::storage(format!("cannot expand home dir in {}", self.path))
        })
    }
}
