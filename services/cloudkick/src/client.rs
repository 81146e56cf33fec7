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

use cloudkick_core::{Context, Error as CoreError, SigningCredential, SigningRequest, Signer};
use http::Uri;
use log::debug;

use crate::config::Config;
use crate::credential::Credential;
use crate::dispatch::{self, Args, RequestPlan, Response};
use crate::provide_credential::{DefaultCredentialProvider, StaticCredentialProvider};
use crate::registry::Registry;
use crate::sign_request::RequestSigner;
use crate::{Error, Result};

/// Client for the cloudkick api.
///
/// Every call goes through [`Client::dispatch`]: validate against the
/// [`Registry`], sign, send through the [`Context`] and decode. Credentials
/// are resolved on the first call that needs them.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: String,
    registry: Arc<Registry>,
    signer: Signer<Credential>,
}

impl Client {
    /// Create a client that resolves credentials from config, env and
    /// config files.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let config = config.from_env(&ctx);
        let endpoint = config.endpoint().to_string();
        let loader = DefaultCredentialProvider::new(Arc::new(config));

        Ok(Self {
            endpoint,
            registry: Registry::builtin()?,
            signer: Signer::new(ctx, loader, RequestSigner::new()),
        })
    }

    /// Use fixed credentials instead of resolving them.
    pub fn with_credential(self, key: &str, secret: &str) -> Self {
        let signer = Signer::new(
            self.signer.context().clone(),
            StaticCredentialProvider::new(key, secret),
            RequestSigner::new(),
        );
        self.with_signer(signer)
    }

    /// Replace the signer.
    pub fn with_signer(mut self, signer: Signer<Credential>) -> Self {
        self.signer = signer;
        self
    }

    /// Replace the call registry.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Base url requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The calls this client knows.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve the credential now instead of on the first call.
    pub async fn credential(&self) -> Result<Credential> {
        match self.signer.credential().await? {
            Some(cred) if cred.is_valid() => Ok(cred),
            _ => Err(Error::Auth(CoreError::credential_invalid(
                "no oauth_key and oauth_secret configured",
            ))),
        }
    }

    /// Forget the resolved credential.
    pub fn reset_credential(&self) {
        self.signer.reset();
    }

    /// Validate a call and build its request without sending it.
    pub fn plan(&self, version: &str, name: &str, args: &Args) -> Result<RequestPlan> {
        dispatch::plan(&self.registry, version, name, args)
    }

    /// Validate, sign and send a call, then decode its response.
    pub async fn dispatch(&self, version: &str, name: &str, args: Args) -> Result<Response> {
        let plan = self.plan(version, name, &args)?;
        let url = format!("{}{}", self.endpoint, plan.path);
        debug!("dispatching {version}/{name} as {} {url}", plan.method);

        let uri: Uri = url
            .parse()
            .map_err(|e| CoreError::request_invalid(format!("invalid url {url}")).with_source(e))?;
        let mut req = SigningRequest::new(plan.method, uri)?;
        for (k, v) in plan.query {
            req.query_push(k, v);
        }
        for (k, v) in plan.post {
            req.form_push(k, v);
        }

        let req = self.signer.sign(req).await?;
        let resp = self.signer.context().http_send(req).await?;
        let (parts, body) = resp.into_parts();

        Response::from_parts(parts.status, &url, body)
    }

    /// Dispatch a call looked up by name alone.
    pub async fn call(&self, name: &str, args: Args) -> Result<Response> {
        let version = self.registry.find(name)?.version;
        self.dispatch(version, name, args).await
    }
}

macro_rules! calls {
    ($($version:literal => [$($name:ident),* $(,)?]),* $(,)?) => {
        /// One method per builtin call.
        impl Client {
            $($(
                #[doc = concat!("Dispatch the `", stringify!($name), "` call of api ", $version, ".")]
                pub async fn $name(&self, args: Args) -> Result<Response> {
                    self.dispatch($version, stringify!($name), args).await
                }
            )*)*
        }

        #[cfg(test)]
        const FACADE_CALLS: &[(&str, &str)] = &[$($(($version, stringify!($name))),*),*];
    };
}

calls! {
    "1.0" => [
        addresses,
        address_types,
        create_address,
        query_nodes,
        query_checks,
        check_data,
        tags,
        add_tag,
        remove_tag,
    ],
    "2.0" => [
        nodes,
        node,
        create_node,
        checks,
        create_check,
        monitors,
        status_nodes,
        check_status,
    ],
}
