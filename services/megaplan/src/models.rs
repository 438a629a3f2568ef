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

//! Plain records for the most used endpoints.
//!
//! Only the commonly used fields are mapped. Decode into
//! `serde_json::Value` for anything else.

use serde::{Deserialize, Serialize};

/// `{Id, Name}` reference used across legacy payloads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Reference {
    /// Id, a number or a prefixed string depending on the endpoint.
    pub id: serde_json::Value,
    /// Display name.
    pub name: String,
}

/// Employee card.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct EmployeeCard {
    pub id: u64,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub department: Reference,
    pub position: Reference,
    pub login: String,
    pub email: String,
    pub fire_day: String,
    pub behaviour: String,
}

/// Task card.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct TaskCard {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub deadline: String,
    pub owner: Reference,
    pub responsible: Reference,
    pub time_created: String,
    pub time_updated: String,
    pub finish: String,
    pub tags: Vec<Tag>,
    pub statement: String,
    pub auditors: Vec<Reference>,
    pub planned_work: String,
    pub planned_finish: String,
    pub actual_work: String,
    pub actual_work_with_sub_tasks: String,
    pub is_overdue: bool,
}

/// Tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Tag {
    pub id: u64,
    pub name: String,
}

/// Comment left on a task or project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Comment {
    #[serde(alias = "ID")]
    pub id: u64,
    pub text: String,
    pub work: u64,
    pub work_date: String,
    pub time_created: String,
    pub author: EmployeeCard,
}

/// Answer of the embedded application user check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAppVerification {
    /// User id.
    #[serde(rename = "id")]
    pub user_id: String,
    /// Full name.
    #[serde(rename = "name")]
    pub full_name: String,
    /// Position.
    pub position: String,
}

/// Uploaded file, usable as a `File` entity in v3 payloads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Always `File` for uploads.
    pub content_type: String,
    /// File id.
    pub id: String,
}
