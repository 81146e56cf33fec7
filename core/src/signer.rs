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

use crate::{Context, ProvideCredential, Result, SignRequest, SigningCredential, SigningRequest};
use bytes::Bytes;
use log::debug;
use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// The credential is resolved on first use and cached; a cached credential
/// that is no longer valid is resolved again.
#[derive(Clone)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Debug for Signer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("ctx", &self.ctx)
            .field("loader", &self.loader)
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the context of this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Resolve the credential, loading it if nothing valid is cached yet.
    pub async fn credential(&self) -> Result<Option<K>> {
        let cached = self.lock().clone();
        if cached.is_valid() {
            return Ok(cached);
        }

        debug!("no valid cached credential, loading from {:?}", self.loader);
        let loaded = self.loader.provide_credential(&self.ctx).await?;
        *self.lock() = loaded.clone();
        Ok(loaded)
    }

    /// Drop the cached credential so the next use loads it again.
    pub fn reset(&self) {
        *self.lock() = None;
    }

    /// Sign the request and turn it into a sendable [`http::Request`].
    pub async fn sign(&self, mut req: SigningRequest) -> Result<http::Request<Bytes>> {
        let credential = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, &mut req, credential.as_ref())
            .await?;
        req.into_request()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<K>> {
        // The guarded value is a plain cache, a poisoned lock still holds usable data.
        self.credential
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
