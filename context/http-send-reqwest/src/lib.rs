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

//! reqwest based [`HttpSend`] for the Megaplan client.
//!
//! The client never builds an HTTP connection by itself. Hand it a
//! `ReqwestHttpSend` through the [`Context`](megaplan_core::Context):
//!
//! ```no_run
//! use megaplan_core::{Context, OsEnv};
//! use megaplan_http_send_reqwest::ReqwestHttpSend;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), reqwest::Error> {
//! let client = reqwest::Client::builder()
//!     .timeout(Duration::from_secs(30))
//!     .build()?;
//!
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::new(client))
//!     .with_env(OsEnv);
//! # Ok(())
//! # }
//! ```
//!
//! reqwest is used without its `gzip` feature. Compressed bodies reach the
//! caller untouched, together with their `Content-Encoding` header, and are
//! decoded by the response layer of the `megaplan` crate.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use megaplan_core::{Error, HttpSend, Result};
use reqwest::{Client, Request};

/// [`HttpSend`] backed by a [`reqwest::Client`].
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        log::debug!("sending {} {}", req.method(), req.uri());

        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to build http request").with_source(e))?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport("failed to send http request").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport("failed to read http response body").with_source(e))?;

        log::debug!("received {} with {} bytes", parts.status, bs.len());
        Ok(http::Response::from_parts(parts, bs))
    }
}
