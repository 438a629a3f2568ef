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
use std::str::FromStr;

use log::warn;
use megaplan_core::utils::Redact;
use megaplan_core::{Context, Error, Result};
use serde::Deserialize;

use crate::constants::*;

/// Which generation of the Megaplan API a client talks to.
///
/// The version decides both the authentication scheme and the envelope
/// layout of responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum ApiVersion {
    /// `Bums*Api` endpoints, signed with an access pair.
    #[default]
    #[serde(rename = "v1", alias = "V1", alias = "1")]
    V1,
    /// `/api/v3` endpoints, authenticated with a bearer token.
    #[serde(rename = "v3", alias = "V3", alias = "3")]
    V3,
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(ApiVersion::V1),
            "v3" | "3" => Ok(ApiVersion::V3),
            v => Err(Error::config_invalid(format!("unknown api version: {v}"))),
        }
    }
}

/// Config for the Megaplan client.
///
/// Every field is optional so that a config can be assembled from several
/// sources. The YAML layout matches the keys used by existing Megaplan
/// tooling (`access_id`, `secret_key`, `appUUID`, ...).
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Account domain, such as `example.megaplan.ru` or `https://example.megaplan.ru`.
    pub domain: Option<String>,
    /// API generation to talk to.
    pub api_version: ApiVersion,
    /// Access id of a legacy access pair.
    pub access_id: Option<String>,
    /// Secret key of a legacy access pair.
    pub secret_key: Option<String>,
    /// Login used to bootstrap credentials.
    pub login: Option<String>,
    /// Plaintext password used to bootstrap credentials.
    pub password: Option<String>,
    /// File the bearer token is persisted to.
    pub token_file: Option<String>,
    /// File a bootstrapped access pair is saved to and loaded from.
    pub credential_file: Option<String>,
    /// Embedded application uuid.
    #[serde(rename = "appUUID")]
    pub app_uuid: Option<String>,
    /// Embedded application secret.
    #[serde(rename = "appSecret")]
    pub app_secret: Option<String>,
    /// Ask the server for gzip compressed responses.
    pub enable_gzip: bool,
    /// Act on behalf of this user. Values `<= 0` are ignored.
    pub user_id: Option<i64>,
    /// Overrides the default `User-Agent`.
    pub user_agent: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("domain", &self.domain)
            .field("api_version", &self.api_version)
            .field("access_id", &self.access_id)
            .field("secret_key", &Redact::from(&self.secret_key))
            .field("login", &self.login)
            .field("password", &Redact::from(&self.password))
            .field("token_file", &self.token_file)
            .field("credential_file", &self.credential_file)
            .field("app_uuid", &self.app_uuid)
            .field("app_secret", &Redact::from(&self.app_secret))
            .field("enable_gzip", &self.enable_gzip)
            .field("user_id", &self.user_id)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Config {
    /// Create a new config for the given domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            ..Default::default()
        }
    }

    /// Set the api version.
    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    /// Set a legacy access pair.
    pub fn with_access_pair(
        mut self,
        access_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_id = Some(access_id.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set the login and password used for bootstrapping.
    pub fn with_login(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self.password = Some(password.into());
        self
    }

    /// Set the token file.
    pub fn with_token_file(mut self, path: impl Into<String>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Set the saved credentials file.
    pub fn with_credential_file(mut self, path: impl Into<String>) -> Self {
        self.credential_file = Some(path.into());
        self
    }

    /// Enable gzip compressed responses.
    pub fn with_gzip(mut self, enable: bool) -> Self {
        self.enable_gzip = enable;
        self
    }

    /// Act on behalf of another user.
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Embedded application uuid sent with user sign checks.
    pub fn with_app_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.app_uuid = Some(uuid.into());
        self
    }

    /// Embedded application secret, signs user sign checks along with the uuid.
    pub fn with_app_secret(mut self, secret: impl Into<String>) -> Self {
        self.app_secret = Some(secret.into());
        self
    }

    /// Load config from environment variables.
    pub fn from_env(ctx: &Context) -> Self {
        let api_version = match ctx.env_var(MEGAPLAN_API_VERSION) {
            Some(v) => v.parse().unwrap_or_else(|err| {
                warn!("ignoring {MEGAPLAN_API_VERSION}: {err}");
                ApiVersion::default()
            }),
            None => ApiVersion::default(),
        };
        let user_id = ctx.env_var(MEGAPLAN_USER_ID).and_then(|v| match v.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("ignoring {MEGAPLAN_USER_ID}: {v} is not a number");
                None
            }
        });
        let enable_gzip = ctx
            .env_var(MEGAPLAN_ENABLE_GZIP)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "on"))
            .unwrap_or_default();

        Self {
            domain: ctx.env_var(MEGAPLAN_DOMAIN),
            api_version,
            access_id: ctx.env_var(MEGAPLAN_ACCESS_ID),
            secret_key: ctx.env_var(MEGAPLAN_SECRET_KEY),
            login: ctx.env_var(MEGAPLAN_LOGIN),
            password: ctx.env_var(MEGAPLAN_PASSWORD),
            token_file: ctx.env_var(MEGAPLAN_TOKEN_FILE),
            credential_file: ctx.env_var(MEGAPLAN_CREDENTIAL_FILE),
            app_uuid: ctx.env_var(MEGAPLAN_APP_UUID),
            app_secret: ctx.env_var(MEGAPLAN_APP_SECRET),
            enable_gzip,
            user_id,
            user_agent: ctx.env_var(MEGAPLAN_USER_AGENT),
        }
    }

    /// Parse config from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            Error::config_invalid(format!("failed to parse config: {e}")).with_source(e)
        })
    }

    /// Load config from a YAML file.
    pub async fn from_config_file(ctx: &Context, path: &str) -> Result<Self> {
        let path = ctx
            .expand_home_dir(path)
            .ok_or_else(|| Error::config_invalid(format!("cannot expand home dir in {path}")))?;
        let content = ctx.file_read_as_string(&path).await?;
        Self::from_yaml(&content)
    }

    /// Fill every unset field from `other`.
    pub fn or(self, other: Config) -> Self {
        Self {
            domain: self.domain.or(other.domain),
            api_version: if self.api_version == ApiVersion::default() {
                other.api_version
            } else {
                self.api_version
            },
            access_id: self.access_id.or(other.access_id),
            secret_key: self.secret_key.or(other.secret_key),
            login: self.login.or(other.login),
            password: self.password.or(other.password),
            token_file: self.token_file.or(other.token_file),
            credential_file: self.credential_file.or(other.credential_file),
            app_uuid: self.app_uuid.or(other.app_uuid),
            app_secret: self.app_secret.or(other.app_secret),
            enable_gzip: self.enable_gzip || other.enable_gzip,
            user_id: self.user_id.or(other.user_id),
            user_agent: self.user_agent.or(other.user_agent),
        }
    }

    /// The account base url, with scheme and without a trailing slash.
    pub fn base_url(&self) -> Result<String> {
        let domain = self
            .domain
            .as_deref()
            .map(|d| d.trim().trim_end_matches('/'))
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::config_invalid("domain is required"))?;

        if domain.starts_with("https://") || domain.starts_with("http://") {
            Ok(domain.to_string())
        } else {
            Ok(format!("https://{domain}"))
        }
    }
}
