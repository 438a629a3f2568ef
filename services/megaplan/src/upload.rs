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

use bytes::{BufMut, Bytes, BytesMut};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Multipart field every uploaded file is sent under.
pub const FILES_FIELD: &str = "files[]";

/// A file to upload.
#[derive(Clone, Debug)]
pub struct UploadFile {
    /// Name the file is stored under.
    pub filename: String,
    /// File content.
    pub content: Bytes,
}

impl UploadFile {
    /// Create a new upload.
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// A `multipart/form-data` body.
#[derive(Debug)]
pub(crate) struct Multipart {
    pub boundary: String,
    pub body: Bytes,
}

impl Multipart {
    /// Encode `files` as parts of the `files[]` field.
    pub fn encode(files: &[UploadFile]) -> Self {
        let boundary: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        Self::encode_with_boundary(files, boundary)
    }

    pub fn encode_with_boundary(files: &[UploadFile], boundary: String) -> Self {
        let mut body = BytesMut::new();
        for file in files {
            body.put_slice(format!("--{boundary}\r\n").as_bytes());
            body.put_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    escape_quotes(FILES_FIELD),
                    escape_quotes(&file.filename)
                )
                .as_bytes(),
            );
            body.put_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.put_slice(&file.content);
            body.put_slice(b"\r\n");
        }
        body.put_slice(format!("--{boundary}--\r\n").as_bytes());

        Self {
            boundary,
            body: body.freeze(),
        }
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
