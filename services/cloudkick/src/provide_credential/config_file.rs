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

use std::sync::Arc;

use async_trait::async_trait;
use cloudkick_core::{Context, Error, ProvideCredential, Result};
use log::{debug, warn};

use crate::config::Config;
use crate::credential::Credential;

/// ConfigFileCredentialProvider loads credentials from the first readable
/// file in [`Config::config_paths`].
///
/// Only the first readable file is used, even if it defines just one of
/// `oauth_key` / `oauth_secret`; the other keeps the value from [`Config`].
/// When no path can be read the error lists every path with its failure.
#[derive(Debug)]
pub struct ConfigFileCredentialProvider {
    config: Arc<Config>,
}

impl ConfigFileCredentialProvider {
    /// Create a new loader via config.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigFileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let mut errors = Vec::with_capacity(self.config.config_paths.len());

        for path in &self.config.config_paths {
            let Some(expanded) = ctx.expand_home_dir(path) else {
                warn!("can't expand {path}: home directory not found");
                errors.push(format!("{path}: home directory not found"));
                continue;
            };

            let content = match ctx.file_read_as_string(&expanded).await {
                Ok(content) => content,
                Err(err) => {
                    warn!("config file {expanded} is not readable: {err}");
                    errors.push(format!("{expanded}: {err}"));
                    continue;
                }
            };

            debug!("loading credential from config file {expanded}");
            let mut config = self.config.as_ref().clone();
            config.parse_config_file(&content);
            return Ok(Some(Credential::new(
                config.oauth_key.unwrap_or_default(),
                config.oauth_secret.unwrap_or_default(),
            )));
        }

        if errors.is_empty() {
            return Err(Error::config_invalid("no configuration files to read"));
        }

        Err(Error::config_invalid(format!(
            "unable to open configuration files: {} ({})",
            self.config.config_paths.join(", "),
            errors.join("; ")
        )))
    }
}
