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
use http::header::{HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, Method};
use log::debug;
use megaplan_core::{Context, Error, ProvideCredential, Result, SignRequest, Signer};
use serde::Serialize;

use crate::constants::*;
use crate::envelope::Envelope;
use crate::models::{Attachment, UserAppVerification};
use crate::params::Params;
use crate::provide_credential::{DefaultCredentialProvider, TokenCredentialProvider};
use crate::response::Response;
use crate::sign_request::{BearerSigner, RequestSigner};
use crate::upload::{Multipart, UploadFile};
use crate::{ApiVersion, Config, Credential, Token};

#[derive(Clone, Debug)]
enum Auth {
    Legacy(Signer<Credential>),
    Bearer(Signer<Token>),
}

/// Client for one Megaplan account.
///
/// Every call is a single round trip through the [`Context`]'s `HttpSend`:
/// the request is built, authenticated, sent, and its body decompressed.
/// Legacy clients sign every request with an access pair; v3 clients attach
/// a bearer token. The credential is loaded on first use and cached.
///
/// ```no_run
/// use megaplan::{Client, Config, Params, TaskCard};
/// use megaplan_core::{Context, OsEnv};
/// use megaplan_file_tokio::{TokioFileRead, TokioFileWrite};
/// use megaplan_http_send_reqwest::ReqwestHttpSend;
///
/// # async fn example() -> megaplan_core::Result<()> {
/// let ctx = Context::new()
///     .with_file_read(TokioFileRead)
///     .with_file_write(TokioFileWrite)
///     .with_http_send(ReqwestHttpSend::default())
///     .with_env(OsEnv);
///
/// let config = Config::from_env(&ctx);
/// let client = Client::from_config(ctx, &config)?;
///
/// let tasks: Vec<TaskCard> = client
///     .get("/BumsTaskApiV01/Task/list.api", &Params::new().with("Status", "actual"))
///     .await?
///     .data_by_key("tasks")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    ctx: Context,
    base_url: String,
    version: ApiVersion,
    app_uuid: Option<String>,
    app_credential: Option<Credential>,
    default_headers: HeaderMap,
    auth: Auth,
}

impl Client {
    /// Create a client picking the auth scheme from `config.api_version`.
    ///
    /// v1 clients resolve their access pair through [`DefaultCredentialProvider`],
    /// v3 clients their token through [`TokenCredentialProvider`].
    pub fn from_config(ctx: Context, config: &Config) -> Result<Self> {
        match config.api_version {
            ApiVersion::V1 => {
                Self::legacy(ctx, config, DefaultCredentialProvider::new(config.clone()))
            }
            ApiVersion::V3 => {
                let provider = TokenCredentialProvider::from_config(config)?;
                Self::bearer(ctx, config, provider)
            }
        }
    }

    /// Create a client signing requests with access pairs from `provider`.
    pub fn legacy(
        ctx: Context,
        config: &Config,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Result<Self> {
        let signer = Signer::new(ctx.clone(), provider, RequestSigner::new());
        Self::build(ctx, config, ApiVersion::V1, Auth::Legacy(signer))
    }

    /// Create a client authenticating with bearer tokens from `provider`.
    pub fn bearer(
        ctx: Context,
        config: &Config,
        provider: impl ProvideCredential<Credential = Token>,
    ) -> Result<Self> {
        let signer = Signer::new(ctx.clone(), provider, BearerSigner::new());
        Self::build(ctx, config, ApiVersion::V3, Auth::Bearer(signer))
    }

    fn build(ctx: Context, config: &Config, version: ApiVersion, auth: Auth) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        if config.enable_gzip {
            default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        }
        if let Some(user_id) = config.user_id.filter(|id| *id > 0) {
            default_headers.insert(HeaderName::from_static(X_USER_ID), HeaderValue::from(user_id));
        }
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        default_headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);

        let base_url = config.base_url()?;
        let app_uuid = config.app_uuid.clone().filter(|u| !u.is_empty());
        let app_credential = match (&app_uuid, &config.app_secret) {
            (Some(uuid), Some(secret)) if !secret.is_empty() => {
                Some(Credential::new(uuid, secret, &base_url))
            }
            _ => None,
        };

        Ok(Self {
            ctx,
            base_url,
            version,
            app_uuid,
            app_credential,
            default_headers,
            auth,
        })
    }

    /// API generation this client talks to.
    pub fn api_version(&self) -> ApiVersion {
        self.version
    }

    /// Account base url.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Context the client sends requests through.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Drop the cached credential so the next call loads it again.
    pub fn reset_credential(&self) -> Result<()> {
        match &self.auth {
            Auth::Legacy(signer) => signer.reset(),
            Auth::Bearer(signer) => signer.reset(),
        }
    }

    /// Send a call and return the raw response.
    ///
    /// GET parameters go to the query string and POST parameters to a form
    /// body. Other methods are rejected.
    pub async fn send(&self, method: Method, path: &str, params: &Params) -> Result<Response> {
        let url = self.url(path);
        let req = match method {
            Method::GET => {
                let url = if params.is_empty() {
                    url
                } else {
                    format!("{url}?{}", params.encode())
                };
                http::Request::get(url).body(Bytes::new())?
            }
            Method::POST => http::Request::post(url)
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(Bytes::from(params.encode()))?,
            m => {
                return Err(Error::request_invalid(format!(
                    "unsupported http method {m}, only GET and POST are allowed"
                )))
            }
        };

        self.dispatch(req).await
    }

    /// Send a call and decode its envelope.
    pub async fn request(&self, method: Method, path: &str, params: &Params) -> Result<Envelope> {
        self.send(method, path, params)
            .await?
            .envelope(self.version)
    }

    /// GET `path` with `params` in the query string.
    pub async fn get(&self, path: &str, params: &Params) -> Result<Envelope> {
        self.request(Method::GET, path, params).await
    }

    /// POST `params` as a form to `path`.
    pub async fn post(&self, path: &str, params: &Params) -> Result<Envelope> {
        self.request(Method::POST, path, params).await
    }

    /// GET `path` with a JSON filter as the query, the way v3 list endpoints
    /// take it: `/api/v3/task?{"limit":10}` with the JSON percent-encoded.
    pub async fn search(&self, path: &str, query: &serde_json::Value) -> Result<Envelope> {
        let query = serde_json::to_string(query)?;
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();

        let req = http::Request::get(format!("{}?{encoded}", self.url(path))).body(Bytes::new())?;
        self.dispatch(req).await?.envelope(self.version)
    }

    /// POST a JSON body to a v3 endpoint.
    pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Envelope> {
        self.require_bearer("JSON bodies")?;

        let body = serde_json::to_vec(body)?;
        let req = http::Request::post(self.url(path))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(Bytes::from(body))?;
        self.dispatch(req).await?.envelope(self.version)
    }

    /// Upload files, one `files[]` part each.
    ///
    /// The returned attachments can be referenced as `File` entities.
    pub async fn upload_files(&self, files: &[UploadFile]) -> Result<Vec<Attachment>> {
        self.require_bearer("file uploads")?;
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let multipart = Multipart::encode(files);
        let req = http::Request::post(self.url(UPLOAD_PATH))
            .header(CONTENT_TYPE, multipart.content_type())
            .body(multipart.body)?;

        self.dispatch(req).await?.envelope(self.version)?.data()
    }

    /// Verify the user sign an embedded application received.
    ///
    /// The application uuid defaults to the access id when none is configured.
    /// With both an application uuid and secret configured, the call is signed
    /// with that pair instead of the account's access pair.
    pub async fn check_user(&self, user_sign: &str) -> Result<UserAppVerification> {
        let Auth::Legacy(signer) = &self.auth else {
            return Err(Error::request_invalid(
                "user sign checks need the v1 api",
            ));
        };

        let uuid = match &self.app_uuid {
            Some(uuid) => uuid.clone(),
            None => signer
                .credential()
                .await?
                .map(|c| c.access_id)
                .ok_or_else(|| Error::authentication("no access pair available"))?,
        };

        let params = Params::new()
            .with("uuid", uuid)
            .with("userSign", user_sign);
        let Some(app) = &self.app_credential else {
            return self.post(CHECK_USER_SIGN_PATH, &params).await?.data();
        };

        let req = http::Request::post(self.url(CHECK_USER_SIGN_PATH))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Bytes::from(params.encode()))?;
        let (mut parts, body) = req.into_parts();
        self.apply_default_headers(&mut parts);
        RequestSigner::new()
            .sign_request(&self.ctx, &mut parts, Some(app))
            .await?;

        self.transmit(parts, body)
            .await?
            .envelope(self.version)?
            .data()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn require_bearer(&self, what: &str) -> Result<()> {
        match self.auth {
            Auth::Bearer(_) => Ok(()),
            Auth::Legacy(_) => Err(Error::request_invalid(format!(
                "{what} need the v3 api"
            ))),
        }
    }

    fn apply_default_headers(&self, parts: &mut http::request::Parts) {
        for (name, value) in &self.default_headers {
            parts.headers.insert(name, value.clone());
        }
        if !parts.headers.contains_key(ACCEPT) {
            parts
                .headers
                .insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
    }

    async fn dispatch(&self, req: http::Request<Bytes>) -> Result<Response> {
        let (mut parts, body) = req.into_parts();
        self.apply_default_headers(&mut parts);

        match &self.auth {
            Auth::Legacy(signer) => signer.sign(&mut parts).await?,
            Auth::Bearer(signer) => {
                if !parts.headers.contains_key(CONTENT_TYPE) {
                    parts
                        .headers
                        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                }
                signer.sign(&mut parts).await?
            }
        }

        self.transmit(parts, body).await
    }

    async fn transmit(&self, parts: http::request::Parts, body: Bytes) -> Result<Response> {
        debug!("sending {} {}", parts.method, parts.uri);
        let resp = self
            .ctx
            .http_send(http::Request::from_parts(parts, body))
            .await?;
        Response::from_http(resp)
    }
}
