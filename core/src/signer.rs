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

use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex, MutexGuard};

/// Signer is the main struct used to authenticate requests.
///
/// It caches the credential returned by its provider and only asks for a new
/// one when the cached credential is no longer valid. Concurrent calls that
/// all observe an invalid credential will each ask the provider; callers that
/// need a single refresh in flight must serialize around [`Signer::sign`].
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,
            provider: Arc::new(provider),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// The context this signer loads credentials with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Return a valid credential, loading it from the provider if needed.
    pub async fn credential(&self) -> Result<Option<K>> {
        let cred = self.lock()?.clone();
        if cred.is_valid() {
            return Ok(cred);
        }

        let cred = self.provider.provide_credential(&self.ctx).await?;
        *self.lock()? = cred.clone();
        Ok(cred)
    }

    /// Drop the cached credential so the next call loads a fresh one.
    pub fn reset(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }

    /// Authenticate the request.
    pub async fn sign(&self, req: &mut http::request::Parts) -> Result<()> {
        let cred = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, req, cred.as_ref())
            .await
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<K>>> {
        self.credential
            .lock()
            .map_err(|_| Error::unexpected("credential cache lock poisoned"))
    }
}
