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

//! Core components for authenticating Megaplan API requests.
//!
//! This crate provides the foundational types and traits shared by the
//! megaplan client crates. It does not talk to any endpoint by itself.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for file reading and writing,
//!   HTTP sending and environment access. Nothing is global: every transport is owned by
//!   the caller and handed in here.
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`) and request
//!   signing (`SignRequest`).
//! - **Signer**: The orchestrator that caches the current credential, reloads it when it
//!   stops being valid and applies it to outgoing requests.
//!
//! ## Example
//!
//! ```no_run
//! use megaplan_core::{Context, ProvideCredential, Result, SignRequest, Signer, SigningCredential};
//! use async_trait::async_trait;
//! use http::request::Parts;
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     token: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.token.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! #[async_trait]
//! impl ProvideCredential for MyProvider {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             token: "my-token".to_string(),
//!         }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MySigner;
//!
//! #[async_trait]
//! impl SignRequest for MySigner {
//!     type Credential = MyCredential;
//!
//!     async fn sign_request(
//!         &self,
//!         _ctx: &Context,
//!         req: &mut Parts,
//!         cred: Option<&Self::Credential>,
//!     ) -> Result<()> {
//!         let cred = cred.expect("credential must be loaded");
//!         req.headers
//!             .insert("x-token", cred.token.parse().expect("valid header"));
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), MyProvider, MySigner);
//!
//! let mut parts = http::Request::builder()
//!     .method("GET")
//!     .uri("https://example.megaplan.ru/api/v3/task")
//!     .body(())
//!     .expect("valid request")
//!     .into_parts()
//!     .0;
//!
//! signer.sign(&mut parts).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: HMAC/MD5/base64 helpers used by the legacy signature scheme
//! - [`time`]: Timestamps in the layouts the service expects
//! - [`utils`]: Data redaction for logs and `Debug` output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{
    Context, Decompressed, Env, FileRead, FileWrite, HttpSend, NoopEnv, NoopFileRead,
    NoopFileWrite, NoopHttpSend, OsEnv, StaticEnv,
};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod chain;
pub use chain::ProvideCredentialChain;
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::Signer;
