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

use cloudkick_api::Args;

use crate::command::CmdError;

/// Parse `key=value` and `key="quoted value"` tokens.
///
/// Keys are word characters. Unquoted values run until the next whitespace.
/// A repeated key keeps its last value.
pub fn parse_arguments(line: &str) -> Result<Args, CmdError> {
    let mut args = Args::new();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        let key_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let key = &rest[..key_len];
        let Some(after) = rest[key_len..].strip_prefix('=').filter(|_| !key.is_empty()) else {
            let token = rest.split_whitespace().next().unwrap_or(rest);
            return Err(CmdError::Usage(format!("Invalid argument: {token}")));
        };

        let (value, remaining) = match after.strip_prefix('"') {
            Some(quoted) => {
                let end = quoted.find('"').ok_or_else(|| {
                    CmdError::Usage(format!("Unterminated quote in argument: {key}"))
                })?;
                (&quoted[..end], &quoted[end + 1..])
            }
            None => {
                let end = after.find(char::is_whitespace).unwrap_or(after.len());
                if end == 0 {
                    return Err(CmdError::Usage(format!("Missing value for argument: {key}")));
                }
                (&after[..end], &after[end..])
            }
        };

        args.insert(key, value);
        rest = remaining.trim_start();
    }

    Ok(args)
}
