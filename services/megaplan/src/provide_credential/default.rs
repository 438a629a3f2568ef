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
use megaplan_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

use crate::provide_credential::{
    BootstrapCredentialProvider, EnvCredentialProvider, FileCredentialProvider,
    StaticCredentialProvider,
};
use crate::{Config, Credential};

/// DefaultCredentialProvider will try to load an access pair from different sources.
///
/// Resolution order:
///
/// 1. Access pair set in the config
/// 2. Environment variables
/// 3. Saved credentials file
/// 4. Bootstrap with the configured login and password
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider.
    pub fn new(config: Config) -> Self {
        let mut chain = ProvideCredentialChain::new();
        if let (Some(id), Some(key)) = (&config.access_id, &config.secret_key) {
            chain = chain.push(
                StaticCredentialProvider::new(id, key)
                    .with_domain(config.domain.as_deref().unwrap_or_default()),
            );
        }

        let mut file = FileCredentialProvider::new();
        if let Some(path) = &config.credential_file {
            file = file.with_path(path);
        }

        let chain = chain
            .push(EnvCredentialProvider::new())
            .push(file)
            .push(BootstrapCredentialProvider::new(config));

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }

    /// Add a credential provider to the front of the default chain.
    pub fn push_front(
        mut self,
        provider: impl ProvideCredential<Credential = Credential> + 'static,
    ) -> Self {
        self.chain = self.chain.push_front(provider);
        self
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
