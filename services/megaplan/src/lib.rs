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

//! Megaplan API client.
//!
//! Two API generations are supported:
//!
//! - v1, where every request is signed with an access pair (`X-Authorization`
//!   holding an HMAC-SHA1 of the request). The pair comes from config, the
//!   environment, a saved credentials file, or a login and password bootstrap.
//! - v3, where requests carry a bearer token kept in a token file and
//!   refreshed when it expires.
//!
//! [`Client`] ties both together: it builds the call, authenticates it, sends
//! it through the `HttpSend` of a [`megaplan_core::Context`], decompresses
//! the body, and decodes the response [`Envelope`].

mod constants;

mod config;
pub use config::{ApiVersion, Config};

mod credential;
pub use credential::{Credential, Token};

mod params;
pub use params::{ParamValue, Params};

mod envelope;
pub use envelope::{Envelope, FieldError, Pagination};

mod models;
pub use models::*;

mod entity;
pub use entity::{Entity, Payload};

mod sign_request;
pub use sign_request::{string_to_sign, BearerSigner, RequestSigner};

mod response;
pub use response::Response;

mod upload;
pub use upload::{UploadFile, FILES_FIELD};

mod provide_credential;
pub use provide_credential::*;

mod token_store;
pub use token_store::TokenStore;

mod client;
pub use client::Client;
