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
use cloudkick_core::{Context, ProvideCredential, Result};
use log::debug;

use crate::config::Config;
use crate::credential::Credential;
use crate::provide_credential::ConfigFileCredentialProvider;

/// DefaultCredentialProvider resolves credentials the way the shell and
/// client do by default:
///
/// 1. `oauth_key` and `oauth_secret` from [`Config`] or the environment, when both are set
/// 2. the first readable file of [`Config::config_paths`]
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    config: Arc<Config>,
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = self.config.as_ref().clone().from_env(ctx);

        if let (Some(key), Some(secret)) = (&config.oauth_key, &config.oauth_secret) {
            debug!("loading credential from config and env");
            return Ok(Some(Credential::new(key, secret)));
        }

        ConfigFileCredentialProvider::new(Arc::new(config))
            .provide_credential(ctx)
            .await
    }
}
