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
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use log::{debug, warn};
use megaplan_core::hash::hex_md5;
use megaplan_core::utils::Redact;
use megaplan_core::{Context, Error, ErrorKind, ProvideCredential, Result};
use serde::Deserialize;

use crate::constants::*;
use crate::envelope::Envelope;
use crate::params::Params;
use crate::response::Response;
use crate::{ApiVersion, Config, Credential};

/// Single use code issued by the first bootstrap step.
///
/// It cannot be cloned: [`Bootstrapper::exchange_code_for_token`] consumes it.
/// The server expires it quickly, so exchange it right away.
pub struct OneTimeCode(String);

impl OneTimeCode {
    /// Wrap a code obtained elsewhere.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for OneTimeCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OneTimeCode")
            .field(&Redact::from(&self.0))
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OneTimeKeyData {
    one_time_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthorizeData {
    access_id: String,
    secret_key: String,
}

/// Bootstrapper turns a login and password into a legacy access pair.
///
/// The flow takes two unsigned calls:
///
/// 1. [`request_one_time_code`](Bootstrapper::request_one_time_code) sends the
///    login and the MD5 of the password and gets a one time code back.
/// 2. [`exchange_code_for_token`](Bootstrapper::exchange_code_for_token)
///    sends them again along with the code and gets the access pair.
///
/// Rejections from the server surface as authentication errors.
#[derive(Clone)]
pub struct Bootstrapper {
    base_url: String,
    login: String,
    password_md5: String,
}

impl Debug for Bootstrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("base_url", &self.base_url)
            .field("login", &self.login)
            .field("password_md5", &Redact::from(&self.password_md5))
            .finish()
    }
}

impl Bootstrapper {
    /// Create a bootstrapper for the account at `base_url`.
    pub fn new(base_url: impl Into<String>, login: impl Into<String>, password: &str) -> Self {
        Self {
            base_url: base_url.into(),
            login: login.into(),
            password_md5: hex_md5(password.as_bytes()),
        }
    }

    /// Create a bootstrapper from config, `None` without login and password.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        match (&config.login, &config.password) {
            (Some(login), Some(password)) if !login.is_empty() => {
                Ok(Some(Self::new(config.base_url()?, login, password)))
            }
            _ => Ok(None),
        }
    }

    /// Account base url.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Step one: ask for a one time code.
    pub async fn request_one_time_code(&self, ctx: &Context) -> Result<OneTimeCode> {
        let params = Params::new()
            .with("Login", &self.login)
            .with("Password", &self.password_md5);

        let envelope = self.post(ctx, ONE_TIME_KEY_PATH, &params).await?;
        let data: OneTimeKeyData = envelope.data().map_err(|e| {
            Error::authentication("one time key missing from response").with_source(e)
        })?;

        debug!("received one time code for {}", self.login);
        Ok(OneTimeCode(data.one_time_key))
    }

    /// Step two: trade the one time code for an access pair.
    pub async fn exchange_code_for_token(
        &self,
        ctx: &Context,
        code: OneTimeCode,
    ) -> Result<Credential> {
        let params = Params::new()
            .with("Login", &self.login)
            .with("Password", &self.password_md5)
            .with("OneTimeKey", code.0);

        let envelope = self.post(ctx, AUTHORIZE_PATH, &params).await?;
        let data: AuthorizeData = envelope.data().map_err(|e| {
            Error::authentication("access pair missing from response").with_source(e)
        })?;

        debug!("received access pair for {}", self.login);
        Ok(Credential {
            access_id: data.access_id,
            secret_key: data.secret_key,
            domain: self.base_url.clone(),
        })
    }

    /// Run both steps.
    pub async fn authenticate(&self, ctx: &Context) -> Result<Credential> {
        let code = self.request_one_time_code(ctx).await?;
        self.exchange_code_for_token(ctx, code).await
    }

    async fn post(&self, ctx: &Context, path: &str, params: &Params) -> Result<Envelope> {
        let req = http::Request::post(format!("{}{path}", self.base_url))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .body(Bytes::from(params.encode()))?;

        let resp = Response::from_http(ctx.http_send(req).await?)?;
        resp.envelope(ApiVersion::V1).map_err(|err| match err.kind() {
            ErrorKind::RemoteApi => Error::authentication(err.message().to_string()),
            _ => err,
        })
    }
}

/// BootstrapCredentialProvider obtains an access pair with the configured
/// login and password.
///
/// When a credential file is configured, the new pair is saved there so the
/// next process can load it through
/// [`FileCredentialProvider`](crate::FileCredentialProvider).
#[derive(Debug, Clone)]
pub struct BootstrapCredentialProvider {
    config: Config,
}

impl BootstrapCredentialProvider {
    /// Create a new BootstrapCredentialProvider.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for BootstrapCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(bootstrapper) = Bootstrapper::from_config(&self.config)? else {
            return Ok(None);
        };

        let cred = bootstrapper.authenticate(ctx).await?;
        if let Some(path) = &self.config.credential_file {
            if let Err(err) = cred.save(ctx, path).await {
                warn!("failed to save credentials to {path}: {err}");
            }
        }
        Ok(Some(cred))
    }
}
