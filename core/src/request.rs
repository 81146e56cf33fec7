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

use std::mem;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::uri::Authority;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::utils::percent_encode;
use crate::{Error, Result};

/// Content type used for signed form bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Signing context for request.
///
/// Parameters are kept decoded; they are encoded exactly once, when the request
/// is turned back into an [`http::Request`].
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path.
    pub path: String,
    /// Query string parameters.
    pub query: Vec<(String, String)>,
    /// Form parameters carried in the body.
    pub form: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from method and uri.
    ///
    /// Query parameters already present in `uri` are decoded into [`Self::query`].
    pub fn new(method: Method, uri: Uri) -> Result<Self> {
        let parts = uri.into_parts();
        let authority = parts
            .authority
            .ok_or_else(|| Error::request_invalid("request without authority is invalid for signing"))?;
        let (path, query) = match &parts.path_and_query {
            Some(paq) => (
                paq.path().to_string(),
                paq.query()
                    .map(|v| {
                        form_urlencoded::parse(v.as_bytes())
                            .map(|(k, v)| (k.into_owned(), v.into_owned()))
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            None => ("/".to_string(), Vec::new()),
        };

        Ok(SigningRequest {
            method,
            scheme: parts.scheme.unwrap_or(Scheme::HTTPS),
            authority,
            path,
            query,
            form: Vec::new(),
            headers: HeaderMap::new(),
        })
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Push a new form pair into the body parameter list.
    #[inline]
    pub fn form_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.form.push((key.into(), value.into()));
    }

    /// Whether the parameters travel in a form body rather than the query string.
    #[inline]
    pub fn has_form_body(&self) -> bool {
        self.method == Method::POST
    }

    /// All parameters, query first, then form.
    pub fn params(&self) -> Vec<(String, String)> {
        self.query.iter().chain(self.form.iter()).cloned().collect()
    }

    /// Get the base url without query: `scheme://host[:port]/path`.
    ///
    /// Host is lower cased and default ports are dropped.
    pub fn base_url(&self) -> String {
        let host = self.authority.host().to_ascii_lowercase();
        let port = match (self.scheme.as_str(), self.authority.port_u16()) {
            ("http", Some(80)) | ("https", Some(443)) | (_, None) => String::new(),
            (_, Some(p)) => format!(":{p}"),
        };

        format!("{}://{host}{port}{}", self.scheme.as_str(), self.path)
    }

    /// Encode pairs as `k=v` joined by `&` using RFC 3986 percent encoding.
    ///
    /// ```shell
    /// [(a, b c), (d, e)] => "a=b%20c&d=e"
    /// ```
    pub fn params_to_string(params: &[(String, String)]) -> String {
        let mut s = String::with_capacity(16);
        for (idx, (k, v)) in params.iter().enumerate() {
            if idx != 0 {
                s.push('&');
            }
            s.push_str(&percent_encode(k));
            s.push('=');
            s.push_str(&percent_encode(v));
        }
        s
    }

    /// Convert the signing context into a sendable request.
    ///
    /// POST requests carry the form parameters as an urlencoded body, everything
    /// else carries no body.
    pub fn into_request(mut self) -> Result<http::Request<Bytes>> {
        let mut paq = mem::take(&mut self.path);
        if !self.query.is_empty() {
            paq.push('?');
            paq.push_str(&Self::params_to_string(&self.query));
        }

        let uri = Uri::builder()
            .scheme(self.scheme)
            .authority(self.authority)
            .path_and_query(paq)
            .build()?;

        let body = if self.method == Method::POST {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            Bytes::from(Self::params_to_string(&self.form))
        } else if self.form.is_empty() {
            Bytes::new()
        } else {
            return Err(Error::request_invalid(format!(
                "{} request can't carry form parameters",
                self.method
            )));
        };

        let mut req = http::Request::builder()
            .method(self.method)
            .uri(uri)
            .body(body)?;
        *req.headers_mut() = self.headers;

        Ok(req)
    }
}
