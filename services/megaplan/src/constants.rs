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

// Env values used in megaplan
pub const MEGAPLAN_DOMAIN: &str = "MEGAPLAN_DOMAIN";
pub const MEGAPLAN_API_VERSION: &str = "MEGAPLAN_API_VERSION";
pub const MEGAPLAN_ACCESS_ID: &str = "MEGAPLAN_ACCESS_ID";
pub const MEGAPLAN_SECRET_KEY: &str = "MEGAPLAN_SECRET_KEY";
pub const MEGAPLAN_LOGIN: &str = "MEGAPLAN_LOGIN";
pub const MEGAPLAN_PASSWORD: &str = "MEGAPLAN_PASSWORD";
pub const MEGAPLAN_TOKEN_FILE: &str = "MEGAPLAN_TOKEN_FILE";
pub const MEGAPLAN_CREDENTIAL_FILE: &str = "MEGAPLAN_CREDENTIAL_FILE";
pub const MEGAPLAN_APP_UUID: &str = "MEGAPLAN_APP_UUID";
pub const MEGAPLAN_APP_SECRET: &str = "MEGAPLAN_APP_SECRET";
pub const MEGAPLAN_ENABLE_GZIP: &str = "MEGAPLAN_ENABLE_GZIP";
pub const MEGAPLAN_USER_ID: &str = "MEGAPLAN_USER_ID";
pub const MEGAPLAN_USER_AGENT: &str = "MEGAPLAN_USER_AGENT";

// Legacy endpoints
pub const ONE_TIME_KEY_PATH: &str = "/BumsCommonApiV01/User/createOneTimeKeyAuth.api";
pub const AUTHORIZE_PATH: &str = "/BumsCommonApiV01/User/authorize.api";
pub const CHECK_USER_SIGN_PATH: &str = "/BumsSettingsApiV01/Application/checkUserSign.json";

// Modern endpoints
pub const ACCESS_TOKEN_PATH: &str = "/api/v3/auth/access_token";
pub const UPLOAD_PATH: &str = "/api/file";

// Headers
pub const X_AUTHORIZATION: &str = "x-authorization";
pub const X_USER_ID: &str = "x-user-id";

// Content types
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

pub const DEFAULT_USER_AGENT: &str = concat!("megaplan-rs/", env!("CARGO_PKG_VERSION"));

/// Seconds before the recorded expiry at which a bearer token stops being used.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 10;
