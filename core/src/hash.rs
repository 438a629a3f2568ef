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

//! Hash related utils.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::Hmac;
use hmac::Mac;
use sha1::Sha1;

/// Hex encoded MD5 hash.
///
/// The legacy login endpoints expect the password in this form.
pub fn hex_md5(content: &[u8]) -> String {
    format!("{:x}", md5::compute(content))
}

/// Hex encoded HMAC with SHA1 hash.
pub fn hex_hmac_sha1(key: &[u8], content: &[u8]) -> String {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha1>::new_from_slice(key).unwrap();
    h.update(content);

    hex::encode(h.finalize().into_bytes())
}

/// Base64 of the *hex text* of an HMAC-SHA1 digest.
///
/// This is what the legacy `X-Authorization` header carries. It is not
/// `base64(hmac)`: the server hex encodes the digest first and base64
/// encodes the resulting ASCII.
pub fn base64_hex_hmac_sha1(key: &[u8], content: &[u8]) -> String {
    BASE64_STANDARD.encode(hex_hmac_sha1(key, content).as_bytes())
}
