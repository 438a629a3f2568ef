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

use async_trait::async_trait;
use megaplan_core::{Context, ProvideCredential, Result};

use crate::constants::*;
use crate::Credential;

/// EnvCredentialProvider loads an access pair from environment variables.
///
/// This provider looks for the following environment variables:
/// - `MEGAPLAN_ACCESS_ID`: the access id
/// - `MEGAPLAN_SECRET_KEY`: the secret key
/// - `MEGAPLAN_DOMAIN`: the account domain (optional)
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        match (envs.get(MEGAPLAN_ACCESS_ID), envs.get(MEGAPLAN_SECRET_KEY)) {
            (Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => Ok(Some(Credential {
                access_id: id.clone(),
                secret_key: key.clone(),
                domain: envs.get(MEGAPLAN_DOMAIN).cloned().unwrap_or_default(),
            })),
            _ => Ok(None),
        }
    }
}
