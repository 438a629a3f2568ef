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

//! The JSON wrapper every Megaplan response shares.
//!
//! v1 responses look like
//!
//! ```json
//! {"status": {"code": "ok", "message": null}, "data": {"tasks": []}}
//! ```
//!
//! and v3 responses like
//!
//! ```json
//! {"meta": {"status": 200, "errors": [], "pagination": {"count": 1}}, "data": []}
//! ```

use megaplan_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::ApiVersion;

/// One error reported by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldError {
    /// Offending field, empty when the error is not tied to a field.
    pub field: String,
    /// Human readable message.
    pub message: String,
}

/// Paging state of a list response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    /// Total number of items.
    pub count: i64,
    /// Page size.
    pub limit: i64,
    /// Current page.
    pub current_page: i64,
    /// Whether a next page exists.
    pub has_more_next: bool,
    /// Whether a previous page exists.
    pub has_more_prev: bool,
}

/// A decoded response envelope.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    /// `ok`/`error` for v1, the numeric status for v3.
    pub status_code: String,
    /// Status message, v1 only.
    pub status_message: String,
    /// Field errors reported by the server, v3 only.
    pub errors: Vec<FieldError>,
    /// Zero valued when the response carries none.
    pub pagination: Pagination,
    /// Endpoint specific payload.
    pub data: Value,
}

#[derive(Deserialize)]
struct LegacyEnvelope {
    #[serde(default)]
    status: LegacyStatus,
    #[serde(default)]
    data: Value,
}

#[derive(Default, Deserialize)]
struct LegacyStatus {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<Value>,
}

#[derive(Deserialize)]
struct ModernEnvelope {
    #[serde(default)]
    meta: ModernMeta,
    #[serde(default)]
    data: Value,
}

#[derive(Default, Deserialize)]
struct ModernMeta {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<RawFieldError>>,
    #[serde(default)]
    pagination: Option<RawPagination>,
}

/// Errors come either as `{"field": .., "message": ..}` or as plain strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldError {
    Detailed {
        #[serde(default)]
        field: Value,
        #[serde(default)]
        message: Value,
    },
    Message(Value),
}

/// Empty pagination is sent as `[]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPagination {
    Page(Pagination),
    Empty(Vec<Value>),
}

fn text(v: Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s,
        v => v.to_string(),
    }
}

impl From<RawFieldError> for FieldError {
    fn from(raw: RawFieldError) -> Self {
        match raw {
            RawFieldError::Detailed { field, message } => FieldError {
                field: text(field),
                message: text(message),
            },
            RawFieldError::Message(message) => FieldError {
                field: String::new(),
                message: text(message),
            },
        }
    }
}

impl Envelope {
    /// Parse the envelope without checking for server errors.
    pub fn parse(version: ApiVersion, body: &[u8]) -> Result<Self> {
        match version {
            ApiVersion::V1 => {
                let raw: LegacyEnvelope = serde_json::from_slice(body)?;
                Ok(Envelope {
                    status_code: raw.status.code.unwrap_or_default(),
                    status_message: raw.status.message.map(text).unwrap_or_default(),
                    errors: Vec::new(),
                    pagination: Pagination::default(),
                    data: raw.data,
                })
            }
            ApiVersion::V3 => {
                let raw: ModernEnvelope = serde_json::from_slice(body)?;
                let pagination = match raw.meta.pagination {
                    Some(RawPagination::Page(p)) => p,
                    Some(RawPagination::Empty(_)) | None => Pagination::default(),
                };

                Ok(Envelope {
                    status_code: raw.meta.status.map(text).unwrap_or_default(),
                    status_message: String::new(),
                    errors: raw
                        .meta
                        .errors
                        .unwrap_or_default()
                        .into_iter()
                        .map(FieldError::from)
                        .collect(),
                    pagination,
                    data: raw.data,
                })
            }
        }
    }

    /// Parse the envelope and fail if it declares an error.
    pub fn decode(version: ApiVersion, body: &[u8]) -> Result<Self> {
        let envelope = Self::parse(version, body)?;
        match envelope.error() {
            Some(err) => Err(err),
            None => Ok(envelope),
        }
    }

    /// Decode the payload of `body` into `target`.
    ///
    /// `target` is only written when the whole decode succeeds.
    pub fn decode_into<T: DeserializeOwned>(
        version: ApiVersion,
        body: &[u8],
        target: &mut T,
    ) -> Result<()> {
        *target = Self::decode(version, body)?.data()?;
        Ok(())
    }

    /// Whether the server reported an error.
    pub fn is_error(&self) -> bool {
        self.status_code == "error" || !self.errors.is_empty()
    }

    /// The server reported errors as a remote api error.
    pub fn error(&self) -> Option<Error> {
        if !self.is_error() {
            return None;
        }

        let message = if self.errors.is_empty() {
            self.status_message.clone()
        } else {
            self.errors
                .iter()
                .map(|e| format!("FIELD: {} MESSAGE: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("\n")
        };
        Some(Error::remote_api(message))
    }

    /// Decode the whole payload.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.data)?)
    }

    /// Decode the payload nested under `key`, as in `{"data": {"tasks": [..]}}`.
    pub fn data_by_key<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .data
            .get(key)
            .ok_or_else(|| Error::encoding(format!("response data has no {key} field")))?;
        Ok(T::deserialize(value)?)
    }

    /// Decode the only value nested in the payload object, whatever its key.
    pub fn data_single<T: DeserializeOwned>(&self) -> Result<T> {
        let Value::Object(map) = &self.data else {
            return Err(Error::encoding("response data is not an object"));
        };
        let mut values = map.values();
        match (values.next(), values.next()) {
            (Some(value), None) => Ok(T::deserialize(value)?),
            (None, _) => Err(Error::encoding("response data is empty")),
            (Some(_), Some(_)) => Err(Error::encoding(format!(
                "response data has {} fields, expected one",
                map.len()
            ))),
        }
    }

    /// Whether a next page exists.
    pub fn has_more_next(&self) -> bool {
        self.pagination.has_more_next
    }

    /// Whether a previous page exists.
    pub fn has_more_prev(&self) -> bool {
        self.pagination.has_more_prev
    }
}
