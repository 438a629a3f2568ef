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

use async_trait::async_trait;
use log::{debug, warn};
use megaplan_core::utils::Redact;
use megaplan_core::{Context, Error, ErrorKind, ProvideCredential, Result, SigningCredential};

use crate::token_store::TokenStore;
use crate::{Config, Token};

/// TokenCredentialProvider hands out a usable bearer token.
///
/// - A valid persisted token is returned as is.
/// - An expired one is refreshed once.
/// - Without a usable token, a new one is requested with the configured
///   login and password.
#[derive(Clone)]
pub struct TokenCredentialProvider {
    store: TokenStore,
    login: Option<(String, String)>,
}

impl Debug for TokenCredentialProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentialProvider")
            .field("store", &self.store)
            .field("login", &self.login.as_ref().map(|(login, _)| login))
            .field(
                "password",
                &Redact::from(self.login.as_ref().map_or("", |(_, p)| p.as_str())),
            )
            .finish()
    }
}

impl TokenCredentialProvider {
    /// Create a provider around `store`.
    pub fn new(store: TokenStore) -> Self {
        Self { store, login: None }
    }

    /// Create a provider from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut provider = Self::new(TokenStore::from_config(config)?);
        if let (Some(login), Some(password)) = (&config.login, &config.password) {
            provider = provider.with_login(login, password);
        }
        Ok(provider)
    }

    /// Use this login when no token can be loaded or refreshed.
    pub fn with_login(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some((login.into(), password.into()));
        self
    }

    async fn bootstrap(&self, ctx: &Context) -> Result<Token> {
        let Some((login, password)) = &self.login else {
            return Err(Error::authentication(
                "no usable bearer token and no login configured",
            ));
        };
        self.store.bootstrap_with_password(ctx, login, password).await
    }
}

#[async_trait]
impl ProvideCredential for TokenCredentialProvider {
    type Credential = Token;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let token = match self.store.load(ctx).await {
            Ok(token) => token,
            Err(err) if err.kind() == ErrorKind::Storage => {
                debug!("no persisted token: {err}");
                return self.bootstrap(ctx).await.map(Some);
            }
            Err(err) => return Err(err),
        };

        if token.is_valid() {
            return Ok(Some(token));
        }
        if token.refresh_token.is_empty() {
            return self.bootstrap(ctx).await.map(Some);
        }

        match self.store.refresh(ctx, &token).await {
            Ok(token) => Ok(Some(token)),
            Err(err) if err.is_authentication_error() && self.login.is_some() => {
                warn!("refresh rejected, requesting a new token: {err}");
                self.bootstrap(ctx).await.map(Some)
            }
            Err(err) => Err(err),
        }
    }
}
