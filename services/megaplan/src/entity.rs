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

//! Builders for v3 JSON payloads.
//!
//! v3 describes every typed value as an object carrying its `contentType`:
//!
//! ```
//! use megaplan::{Entity, Payload};
//!
//! let body = Payload::new()
//!     .raw("name", "Prepare report")
//!     .entity("responsible", Entity::reference("Employee", "1000005"))
//!     .entities("auditors", [Entity::reference("Employee", "1000006")])
//!     .into_value();
//!
//! assert_eq!("Employee", body["responsible"]["contentType"]);
//! ```

use std::time::Duration;

use chrono::{Datelike, FixedOffset, NaiveDate};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// `2006-01-02T15:04:05-07:00`
const ISO8601: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A typed v3 value.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    /// Any stored object, referenced by its type and id.
    Reference {
        /// Type name, such as `Employee` or `File`.
        content_type: String,
        /// Object id.
        id: Value,
    },
    /// Point in time.
    DateTime(chrono::DateTime<FixedOffset>),
    /// Calendar date.
    DateOnly(NaiveDate),
    /// Duration, sent in whole seconds.
    DateInterval(Duration),
}

impl Entity {
    /// Reference an object by type and id.
    pub fn reference(content_type: impl Into<String>, id: impl Into<Value>) -> Self {
        Entity::Reference {
            content_type: content_type.into(),
            id: id.into(),
        }
    }

    /// JSON form of the entity.
    pub fn to_value(&self) -> Value {
        match self {
            Entity::Reference { content_type, id } => json!({
                "contentType": content_type,
                "id": id,
            }),
            Entity::DateTime(t) => json!({
                "contentType": "DateTime",
                "value": t.format(ISO8601).to_string(),
            }),
            // Months are zero based on the wire.
            Entity::DateOnly(d) => json!({
                "contentType": "DateOnly",
                "year": d.year(),
                "month": d.month0(),
                "day": d.day(),
            }),
            Entity::DateInterval(d) => json!({
                "contentType": "DateInterval",
                "value": d.as_secs(),
            }),
        }
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        entity.to_value()
    }
}

/// JSON object body for v3 calls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain field.
    pub fn raw(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Set an entity field.
    pub fn entity(mut self, field: impl Into<String>, entity: Entity) -> Self {
        self.0.insert(field.into(), entity.to_value());
        self
    }

    /// Set a list of entities. An empty list leaves the field unset.
    pub fn entities(
        mut self,
        field: impl Into<String>,
        entities: impl IntoIterator<Item = Entity>,
    ) -> Self {
        let values: Vec<Value> = entities.into_iter().map(Value::from).collect();
        if !values.is_empty() {
            self.0.insert(field.into(), Value::Array(values));
        }
        self
    }

    /// The payload as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
