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

use std::fmt::{Debug, Formatter};

use cloudkick_core::{utils::Redact, Context};
use log::debug;

use crate::constants::*;

/// Config carries all the configuration for the cloudkick client.
#[derive(Clone)]
pub struct Config {
    /// `oauth_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDKICK_OAUTH_KEY`]
    /// - the first readable file in `config_paths`
    pub oauth_key: Option<String>,
    /// `oauth_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDKICK_OAUTH_SECRET`]
    /// - the first readable file in `config_paths`
    pub oauth_secret: Option<String>,
    /// Candidate config files, tried in order.
    ///
    /// Defaults to `~/.cloudkick.conf` then `/etc/cloudkick.conf`; the env
    /// value [`CLOUDKICK_CONFIG_FILE`] replaces the defaults with one path.
    pub config_paths: Vec<String>,
    /// Base url of the api, defaults to `https://api.cloudkick.com`.
    ///
    /// env value: [`CLOUDKICK_ENDPOINT`]
    pub endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oauth_key: None,
            oauth_secret: None,
            config_paths: DEFAULT_CONFIG_PATHS.iter().map(|v| v.to_string()).collect(),
            endpoint: None,
        }
    }
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set oauth_key
    pub fn with_oauth_key(mut self, oauth_key: impl Into<String>) -> Self {
        self.oauth_key = Some(oauth_key.into());
        self
    }

    /// Set oauth_secret
    pub fn with_oauth_secret(mut self, oauth_secret: impl Into<String>) -> Self {
        self.oauth_secret = Some(oauth_secret.into());
        self
    }

    /// Replace the candidate config files.
    pub fn with_config_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Endpoint to send requests to, without trailing slash.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/')
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(CLOUDKICK_OAUTH_KEY) {
            self.oauth_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CLOUDKICK_OAUTH_SECRET) {
            self.oauth_secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CLOUDKICK_CONFIG_FILE) {
            self.config_paths = vec![v];
        }
        if let Some(v) = ctx.env_var(CLOUDKICK_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }

        self
    }

    /// Apply the content of a cloudkick config file.
    ///
    /// Every line is `key<whitespace>value`. Empty lines, lines starting with
    /// `#`, and lines that don't split into exactly two tokens are skipped.
    /// Only `oauth_key` and `oauth_secret` are recognized; the last occurrence
    /// wins and a key the file doesn't mention keeps its current value.
    pub fn parse_config_file(&mut self, content: &str) {
        for line in content.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let (Some(key), Some(value), None) = (tokens.next(), tokens.next(), tokens.next())
            else {
                debug!("skipping malformed config line");
                continue;
            };

            match key {
                CONFIG_KEY_OAUTH_KEY => self.oauth_key = Some(value.to_string()),
                CONFIG_KEY_OAUTH_SECRET => self.oauth_secret = Some(value.to_string()),
                _ => debug!("ignoring unknown config key {key}"),
            }
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("oauth_key", &self.oauth_key.as_ref().map(Redact::from))
            .field("oauth_secret", &self.oauth_secret.as_ref().map(Redact::from))
            .field("config_paths", &self.config_paths)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
