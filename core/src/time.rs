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
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into unix seconds: `1660582212`
pub fn format_unix_seconds(t: DateTime) -> String {
    t.timestamp().to_string()
}

/// Parse a loosely written UTC time into datetime.
///
/// Accepted shapes:
///
/// - unix seconds: `1660582212`
/// - RFC 3339: `2022-08-15T16:50:12Z`, `2022-08-15T18:50:12+02:00`
/// - `2022-08-15 16:50:12`
/// - `2022-08-15` (midnight)
pub fn parse_datetime(s: &str) -> Result<DateTime> {
    let s = s.trim();

    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = s
            .parse()
            .map_err(|e| Error::request_invalid(format!("invalid unix seconds {s}")).with_source(e))?;
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| Error::request_invalid(format!("unix seconds {s} out of range")));
    }

    if let Ok(t) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(t.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(t) = d.and_hms_opt(0, 0, 0) {
            return Ok(t.and_utc());
        }
    }

    Err(Error::request_invalid(format!(
        "{s:?} is not a unix timestamp, RFC 3339 time, or YYYY-MM-DD[ HH:MM:SS] date"
    )))
}
