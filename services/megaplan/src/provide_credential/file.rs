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
use log::debug;
use megaplan_core::{Context, Error, ErrorKind, ProvideCredential, Result, SigningCredential};

use crate::constants::MEGAPLAN_CREDENTIAL_FILE;
use crate::Credential;

/// FileCredentialProvider loads an access pair saved by a previous bootstrap.
///
/// The path is taken from [`FileCredentialProvider::with_path`] or from
/// `MEGAPLAN_CREDENTIAL_FILE`. A missing file is not an error: the provider
/// simply has nothing to offer yet.
#[derive(Debug, Default, Clone)]
pub struct FileCredentialProvider {
    path: Option<String>,
}

impl FileCredentialProvider {
    /// Create a new FileCredentialProvider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from this path instead of `MEGAPLAN_CREDENTIAL_FILE`.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for FileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(path) = self
            .path
            .clone()
            .or_else(|| ctx.env_var(MEGAPLAN_CREDENTIAL_FILE))
        else {
            return Ok(None);
        };
        let path = ctx
            .expand_home_dir(&path)
            .ok_or_else(|| Error::config_invalid(format!("cannot expand home dir in {path}")))?;

        let content = match ctx.file_read(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::Storage => {
                debug!("no saved credentials at {path}: {err}");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let cred = Credential::from_json(&content).map_err(|err| {
            Error::storage(format!("saved credentials at {path} are malformed")).with_source(err)
        })?;
        if !cred.is_valid() {
            debug!("saved credentials at {path} are incomplete");
            return Ok(None);
        }
        Ok(Some(cred))
    }
}
