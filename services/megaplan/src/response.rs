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

use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;
use http::header::CONTENT_ENCODING;
use http::{HeaderMap, StatusCode};
use log::{debug, error};
use megaplan_core::{Decompressed, Error, Result};

use crate::envelope::Envelope;
use crate::ApiVersion;

/// A raw response, with its body already decompressed when possible.
#[derive(Debug)]
pub struct Response {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers. `Content-Encoding` is removed once the body is decoded.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
    /// Set when the body uses an encoding this client cannot decode.
    ///
    /// The body is then returned as received so the caller may decode it.
    pub compression_error: Option<Error>,
}

impl Response {
    /// Build a response from what the transport returned, decompressing gzip bodies.
    pub fn from_http(resp: http::Response<Bytes>) -> Result<Self> {
        let (mut parts, body) = resp.into_parts();

        let encoding = if parts.extensions.get::<Decompressed>().is_some() {
            None
        } else {
            parts
                .headers
                .get(CONTENT_ENCODING)
                .map(|v| v.to_str().unwrap_or_default().trim().to_ascii_lowercase())
                .filter(|v| !v.is_empty() && v != "identity")
        };

        let (body, compression_error) = match encoding.as_deref() {
            None => (body, None),
            Some("gzip") => {
                let body = gunzip(&body)?;
                parts.headers.remove(CONTENT_ENCODING);
                (body, None)
            }
            Some(other) => {
                debug!("response uses unsupported content encoding {other}");
                (
                    body,
                    Some(Error::unknown_compression(format!(
                        "unknown compression method: {other}"
                    ))),
                )
            }
        };

        Ok(Response {
            status: parts.status,
            headers: parts.headers,
            body,
            compression_error,
        })
    }

    /// Body as text, invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the response envelope.
    ///
    /// A non-2xx status whose body is not an envelope is a transport error.
    /// An envelope that declares errors is a remote api error, whatever the
    /// status.
    pub fn envelope(self, version: ApiVersion) -> Result<Envelope> {
        if let Some(err) = self.compression_error {
            return Err(err);
        }

        match Envelope::parse(version, &self.body) {
            Ok(envelope) => {
                if let Some(err) = envelope.error() {
                    return Err(err);
                }
                if !self.status.is_success() {
                    error!("megaplan returned {} without errors: {envelope:?}", self.status);
                    return Err(Error::transport(format!(
                        "unexpected http status {}",
                        self.status
                    )));
                }
                Ok(envelope)
            }
            Err(err) if self.status.is_success() => Err(err),
            Err(err) => {
                let body = String::from_utf8_lossy(&self.body);
                error!("megaplan returned {}: {body}", self.status);
                Err(Error::transport(format!(
                    "unexpected http status {}: {body}",
                    self.status
                ))
                .with_source(err))
            }
        }
    }
}

fn gunzip(body: &[u8]) -> Result<Bytes> {
    let mut out = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut out)
        .map_err(|e| Error::encoding("failed to decompress gzip body").with_source(e))?;
    Ok(Bytes::from(out))
}
