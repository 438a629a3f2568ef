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

//! Tokio based file access for the Megaplan client.
//!
//! Saved credentials and persisted tokens are plain JSON files. This crate
//! reads and writes them with `tokio::fs`.
//!
//! ```no_run
//! use megaplan_core::{Context, OsEnv};
//! use megaplan_file_tokio::{TokioFileRead, TokioFileWrite};
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_file_write(TokioFileWrite)
//!         .with_env(OsEnv);
//!
//!     match ctx.file_read_as_string("token.json").await {
//!         Ok(content) => println!("token file has {} bytes", content.len()),
//!         Err(e) => eprintln!("failed to read token: {e}"),
//!     }
//! }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use megaplan_core::{Error, FileRead, FileWrite, Result};
use std::path::Path;

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::storage(format!("failed to read file {path}")).with_source(e))
    }
}

/// Tokio-based implementation of the `FileWrite` trait.
///
/// Missing parent directories are created. The content replaces the whole
/// file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileWrite;

#[async_trait]
impl FileWrite for TokioFileWrite {
    async fn file_write(&self, path: &str, content: Bytes) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::storage(format!("failed to create directory for {path}")).with_source(e)
                })?;
            }
        }

        log::debug!("writing {} bytes to {path}", content.len());
        tokio::fs::write(path, &content)
            .await
            .map_err(|e| Error::storage(format!("failed to write file {path}")).with_source(e))
    }
}
