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

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use bytes::Bytes;
use cloudkick_core::utils::percent_encode;
use http::{Method, StatusCode};
use log::{debug, warn};
use serde_json::Value;

use crate::descriptor::{PathPrefix, Placement};
use crate::registry::Registry;
use crate::{Error, Result};

/// Arguments supplied to a call, keyed by logical argument name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(BTreeMap<String, String>);

impl Args {
    /// Create empty arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, replacing any previous value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert an argument, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Get an argument value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether the argument was supplied.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of supplied arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no argument was supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Args {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Args {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Args {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Validated request for one call, before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    /// `POST` if any argument travels in the body, `GET` otherwise.
    pub method: Method,
    /// Absolute request path.
    pub path: String,
    /// Query string parameters by wire name.
    pub query: Vec<(String, String)>,
    /// Body parameters by wire name.
    pub post: Vec<(String, String)>,
}

/// Validate `args` against the call `(version, name)` and build its request.
///
/// Nothing is sent; every validation error is raised here.
pub fn plan(registry: &Registry, version: &str, name: &str, args: &Args) -> Result<RequestPlan> {
    let call = registry.get(version, name)?;

    for (supplied, _) in args.iter() {
        if call.argument(supplied).is_none() {
            warn!("call {name} ignores unknown argument {supplied}");
        }
    }

    let mut url = HashMap::new();
    let mut query = Vec::new();
    let mut post = Vec::new();

    for arg in call.arguments {
        let value = match args.get(arg.name) {
            Some(v) => v.to_string(),
            None => match arg.default.filter(|_| arg.required) {
                Some(default) => default.to_string(),
                None if arg.required => {
                    return Err(Error::MissingArgument {
                        call: call.name.to_string(),
                        argument: arg.name.to_string(),
                    })
                }
                None => continue,
            },
        };

        if !arg.valid_values.is_empty() && !arg.valid_values.contains(&value.as_str()) {
            return Err(Error::InvalidArgumentValue {
                argument: arg.name.to_string(),
                value,
                reason: format!("valid values are: {}", arg.valid_values.join(", ")),
            });
        }

        let value = match arg.format {
            Some(format) => format(&value).map_err(|err| Error::InvalidArgumentValue {
                argument: arg.name.to_string(),
                value: value.clone(),
                reason: err.to_string(),
            })?,
            None => value,
        };

        debug!("call {name} routes {} to {:?} {}", arg.name, arg.placement, arg.target);
        match arg.placement {
            Placement::Query => query.push((arg.target.to_string(), value)),
            Placement::Url => {
                url.insert(arg.target, value);
            }
            Placement::Post => post.push((arg.target.to_string(), value)),
        }
    }

    let path = substitute(call.endpoint, &url)?;
    let path = match call.prefix {
        PathPrefix::Version => format!("/{}/{}", call.version, path.trim_start_matches('/')),
        PathPrefix::Verbatim if path.starts_with('/') => path,
        PathPrefix::Verbatim => format!("/{path}"),
    };
    let method = if post.is_empty() {
        Method::GET
    } else {
        Method::POST
    };

    Ok(RequestPlan {
        method,
        path,
        query,
        post,
    })
}

/// Replace every `{placeholder}` of `template` with its percent encoded value.
fn substitute(template: &str, values: &HashMap<&str, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let placeholder = &rest[start + 1..start + len];
        let value = values
            .get(placeholder)
            .ok_or_else(|| Error::TemplateSubstitution {
                template: template.to_string(),
                placeholder: placeholder.to_string(),
            })?;

        out.push_str(&rest[..start]);
        out.push_str(&percent_encode(value));
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The body was valid JSON.
    Json(Value),
    /// The body could not be decoded and is returned byte for byte.
    Text(Bytes),
}

impl Response {
    /// Classify the status and decode the body.
    ///
    /// Any status outside `2xx` fails without looking at the body. A body that
    /// is not JSON is kept as text.
    pub fn from_parts(status: StatusCode, url: &str, body: Bytes) -> Result<Self> {
        if !status.is_success() {
            return Err(Error::Transport {
                status,
                url: url.to_string(),
            });
        }

        match serde_json::from_slice(&body) {
            Ok(v) => Ok(Response::Json(v)),
            Err(err) => {
                debug!("response of {url} is not json, keeping raw text: {err}");
                Ok(Response::Text(body))
            }
        }
    }

    /// The JSON value, if the body was JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Response::Json(v) => Some(v),
            Response::Text(_) => None,
        }
    }

    /// Take the JSON value, failing for text bodies.
    pub fn into_json(self) -> Result<Value> {
        match self {
            Response::Json(v) => Ok(v),
            Response::Text(body) => Err(Error::UnexpectedResponse(format!(
                "expected a json body, got {:?}",
                String::from_utf8_lossy(&body)
            ))),
        }
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Response::Json(v) => {
                let s = serde_json::to_string_pretty(v).map_err(|_| fmt::Error)?;
                f.write_str(&s)
            }
            Response::Text(body) => f.write_str(&String::from_utf8_lossy(body)),
        }
    }
}
