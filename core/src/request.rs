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

use std::mem;
use std::str::FromStr;

use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::{Error, Result};

/// Signing context for request.
///
/// Unlike a parsed url, the query is kept exactly as it was encoded by the
/// caller: the legacy signature covers the literal query string, so decoding
/// and re-encoding it here would produce a signature the server rejects.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path.
    pub path: String,
    /// Raw, already encoded query without the leading `?`.
    pub query: Option<String>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTPS),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .filter(|q| !q.is_empty())
                .map(|q| q.to_string()),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = Some(PathAndQuery::from_str(&match &self.query {
                Some(query) => format!("{}?{}", self.path, query),
                None => self.path,
            })?);
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Host (with port, if any) followed by the path and the raw query.
    ///
    /// ```text
    /// example.megaplan.ru/BumsTaskApiV01/Task/list.api?Status=actual
    /// ```
    pub fn host_path_and_query(&self) -> String {
        let mut s = String::with_capacity(
            self.authority.as_str().len()
                + self.path.len()
                + self.query.as_ref().map_or(0, |q| q.len() + 1),
        );
        s.push_str(self.authority.as_str());
        s.push_str(&self.path);
        if let Some(query) = &self.query {
            s.push('?');
            s.push_str(query);
        }
        s
    }

    /// Insert a header, replacing any previous value.
    pub fn header_insert(&mut self, key: HeaderName, value: &str) -> Result<()> {
        self.headers.insert(key, HeaderValue::from_str(value)?);
        Ok(())
    }

    /// Insert a header whose value must never be printed.
    pub fn header_insert_sensitive(&mut self, key: HeaderName, value: &str) -> Result<()> {
        let mut value = HeaderValue::from_str(value)?;
        value.set_sensitive(true);
        self.headers.insert(key, value);
        Ok(())
    }
}
