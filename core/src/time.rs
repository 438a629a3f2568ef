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

//! Time related utils.

use crate::{Error, Result};
use chrono::Utc;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Layout of the legacy `Date` header: `Mon, 02 Jan 2006 15:04:05 -0700`.
///
/// The day is always two digits, which `to_rfc2822` does not guarantee.
const RFC2822: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into the layout the legacy API signs: `Mon, 15 Aug 2022 16:50:12 +0000`
pub fn format_rfc2822(t: DateTime) -> String {
    t.format(RFC2822).to_string()
}

/// Parse time from RFC 2822, any offset is converted to UTC.
pub fn parse_rfc2822(s: &str) -> Result<DateTime> {
    Ok(chrono::DateTime::parse_from_rfc2822(s)
        .map_err(|e| Error::encoding(format!("invalid rfc2822 time {s:?}")).with_source(e))?
        .with_timezone(&Utc))
}
