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

use std::collections::BTreeMap;

use megaplan_core::{Error, Result};

/// A scalar request parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Sent as is.
    String(String),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Sent with two decimals.
    Float(f64),
    /// Sent as `true` or `false`.
    Bool(bool),
    /// Dropped from the encoded output.
    Null,
}

impl ParamValue {
    /// Wire form of this value, `None` for [`ParamValue::Null`].
    pub fn encode(&self) -> Option<String> {
        match self {
            ParamValue::String(v) => Some(v.clone()),
            ParamValue::Int(v) => Some(v.to_string()),
            ParamValue::UInt(v) => Some(v.to_string()),
            ParamValue::Float(v) => Some(format!("{v:.2}")),
            ParamValue::Bool(v) => Some(v.to_string()),
            ParamValue::Null => None,
        }
    }
}

macro_rules! impl_from {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for ParamValue {
                fn from(v: $t) -> Self {
                    ParamValue::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

impl_from!(Int, i64, i8, i16, i32, i64);
impl_from!(UInt, u64, u8, u16, u32, u64);
impl_from!(Float, f64, f32, f64);
impl_from!(Bool, bool, bool);
impl_from!(String, String, String, &str, &String);

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ParamValue::Null, Into::into)
    }
}

impl TryFrom<serde_json::Value> for ParamValue {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(ParamValue::Null),
            Value::Bool(v) => Ok(ParamValue::Bool(v)),
            Value::String(v) => Ok(ParamValue::String(v)),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(ParamValue::Int(v))
                } else if let Some(v) = n.as_u64() {
                    Ok(ParamValue::UInt(v))
                } else {
                    n.as_f64()
                        .map(ParamValue::Float)
                        .ok_or_else(|| Error::encoding(format!("unsupported number {n}")))
                }
            }
            Value::Array(_) => Err(Error::encoding(
                "arrays are not supported as request parameters",
            )),
            Value::Object(_) => Err(Error::encoding(
                "objects are not supported as request parameters",
            )),
        }
    }
}

/// Request parameters, encoded into the query for GET and the form body for POST.
///
/// Keys are kept sorted so the encoded form is stable: the same parameters
/// always produce the same query string, and therefore the same signature.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Create empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a parameter.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Whether no parameter would be encoded.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| *v == ParamValue::Null)
    }

    /// Build parameters from a JSON object of scalars.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(Error::encoding("request parameters must be a JSON object"));
        };

        let mut params = Params::new();
        for (key, value) in map {
            let value = ParamValue::try_from(value)
                .map_err(|e| Error::encoding(format!("parameter {key}: {}", e.message())))?;
            params.insert(key, value);
        }
        Ok(params)
    }

    /// Encoded key and value pairs, nulls dropped.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.encode().map(|v| (k.clone(), v)))
            .collect()
    }

    /// `application/x-www-form-urlencoded` form of the parameters.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.pairs() {
            serializer.append_pair(&k, &v);
        }
        serializer.finish()
    }

    /// Parse an encoded query or form body back into pairs.
    pub fn decode(encoded: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(encoded.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
