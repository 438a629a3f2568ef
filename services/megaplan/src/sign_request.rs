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

use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, DATE};
use log::debug;
use megaplan_core::hash::base64_hex_hmac_sha1;
use megaplan_core::time::{format_rfc2822, now, DateTime};
use megaplan_core::{Context, Error, Result, SignRequest, SigningRequest};

use crate::constants::*;
use crate::credential::{Credential, Token};

/// RequestSigner signs legacy (v1) requests with an access pair.
///
/// The signature covers the method, the form content type, the `Date`
/// header and the host with path and raw query. The server recomputes it
/// from the same `Date`, so requests fail when the local clock drifts too
/// far from the server's.
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign with a fixed time instead of the current one.
    ///
    /// Only useful for tests.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::authentication("no access pair available for signing"));
        };

        let mut signing = SigningRequest::build(req)?;
        let date = format_rfc2822(self.time.unwrap_or_else(now));

        let string_to_sign = string_to_sign(&signing, &date);
        debug!("calculated string to sign: {string_to_sign}");
        let signature =
            base64_hex_hmac_sha1(cred.secret_key.as_bytes(), string_to_sign.as_bytes());

        signing.header_insert(DATE, &date)?;
        signing.header_insert_sensitive(
            HeaderName::from_static(X_AUTHORIZATION),
            &format!("{}:{signature}", cred.access_id),
        )?;
        signing.header_insert(ACCEPT, JSON_CONTENT_TYPE)?;
        signing.header_insert(CONTENT_TYPE, FORM_CONTENT_TYPE)?;

        signing.apply(req)
    }
}

/// Canonical string signed for a legacy request.
///
/// ```text
/// GET
///
/// application/x-www-form-urlencoded
/// Mon, 15 Aug 2022 16:50:12 +0000
/// example.megaplan.ru/BumsTaskApiV01/Task/list.api?Status=actual
/// ```
pub fn string_to_sign(req: &SigningRequest, date: &str) -> String {
    format!(
        "{}\n\n{FORM_CONTENT_TYPE}\n{date}\n{}",
        req.method,
        req.host_path_and_query()
    )
}

/// BearerSigner authenticates v3 requests with a bearer token.
#[derive(Debug, Default)]
pub struct BearerSigner;

impl BearerSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignRequest for BearerSigner {
    type Credential = Token;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(token) = credential else {
            return Err(Error::authentication("no bearer token available"));
        };

        let mut value = HeaderValue::from_str(&token.authorization())?;
        value.set_sensitive(true);
        req.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}
