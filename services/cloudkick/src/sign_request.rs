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

//! OAuth 1.0 request signer for the cloudkick api.

use async_trait::async_trait;
use cloudkick_core::hash::base64_hmac_sha1;
use cloudkick_core::time::{format_unix_seconds, now, DateTime};
use cloudkick_core::utils::percent_encode;
use cloudkick_core::{Context, Error, Result, SignRequest, SigningCredential, SigningRequest};
use http::Method;
use log::debug;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::constants::*;
use crate::credential::Credential;

/// RequestSigner implements two-legged OAuth 1.0 with `HMAC-SHA1`.
///
/// Every query and form parameter takes part in the signature. The OAuth
/// parameters and the signature follow the request parameters: in the query
/// string for `GET`, in the urlencoded body for `POST`.
///
/// - [RFC 5849: The OAuth 1.0 Protocol](https://www.rfc-editor.org/rfc/rfc5849)
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
    nonce: Option<String>,
}

impl RequestSigner {
    /// Create a signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Specify the nonce.
    ///
    /// # Note
    ///
    /// Every request must carry a fresh nonce.
    /// Only use this function for testing.
    pub fn with_nonce(mut self, nonce: &str) -> Self {
        self.nonce = Some(nonce.to_string());
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut SigningRequest,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let cred = credential.filter(|c| c.is_valid()).ok_or_else(|| {
            Error::credential_invalid("oauth_key and oauth_secret must be set to sign requests")
        })?;

        let oauth = [
            (OAUTH_CONSUMER_KEY, cred.key.clone()),
            (
                OAUTH_NONCE,
                self.nonce.clone().unwrap_or_else(generate_nonce),
            ),
            (OAUTH_SIGNATURE_METHOD, HMAC_SHA1.to_string()),
            (
                OAUTH_TIMESTAMP,
                format_unix_seconds(self.time.unwrap_or_else(now)),
            ),
            (OAUTH_VERSION, OAUTH_VERSION_1_0.to_string()),
        ];

        let mut params = req.params();
        params.extend(oauth.iter().map(|(k, v)| (k.to_string(), v.clone())));

        let string_to_sign = string_to_sign(&req.method, &req.base_url(), params)?;
        let signature = base64_hmac_sha1(signing_key(cred).as_bytes(), string_to_sign.as_bytes());

        let form = req.has_form_body();
        for (k, v) in oauth
            .into_iter()
            .chain([(OAUTH_SIGNATURE, signature)])
        {
            if form {
                req.form_push(k, v);
            } else {
                req.query_push(k, v);
            }
        }

        Ok(())
    }
}

/// Construct the signature base string.
///
/// ## Format
///
/// ```text
/// METHOD + "&" +
/// encode(scheme://host[:port]/path) + "&" +
/// encode(sorted encoded "key=value" pairs joined by "&")
/// ```
///
/// ## Reference
///
/// - [Signature Base String](https://www.rfc-editor.org/rfc/rfc5849#section-3.4.1)
pub fn string_to_sign(
    method: &Method,
    base_url: &str,
    params: Vec<(String, String)>,
) -> Result<String> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let mut normalized = String::with_capacity(128);
    for (idx, (k, v)) in encoded.iter().enumerate() {
        if idx != 0 {
            normalized.push('&');
        }
        normalized.push_str(k);
        normalized.push('=');
        normalized.push_str(v);
    }

    let s = format!(
        "{}&{}&{}",
        method.as_str(),
        percent_encode(base_url),
        percent_encode(&normalized)
    );
    debug!("string to sign: {s}");
    Ok(s)
}

/// Two-legged OAuth has no token, so the token secret half stays empty.
fn signing_key(cred: &Credential) -> String {
    format!("{}&", percent_encode(&cred.secret))
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
