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

use std::collections::HashMap;
use std::sync::Arc;

use cloudkick_core::Error as CoreError;
use log::debug;
use once_cell::sync::Lazy;

use crate::calls::BUILTIN_CALLS;
use crate::descriptor::{CallDescriptor, Placement};
use crate::{Error, Result};

static BUILTIN: Lazy<std::result::Result<Arc<Registry>, String>> = Lazy::new(|| {
    Registry::new(BUILTIN_CALLS.iter().copied())
        .map(Arc::new)
        .map_err(|e| e.to_string())
});

/// Immutable index of call descriptors by `(version, name)` and by name alone.
///
/// Call names are unique across versions, so both lookups agree.
#[derive(Debug, Clone)]
pub struct Registry {
    calls: Vec<CallDescriptor>,
    by_name: HashMap<&'static str, usize>,
    by_version: HashMap<&'static str, HashMap<&'static str, usize>>,
}

impl Registry {
    /// Build a registry, rejecting inconsistent tables.
    ///
    /// Fails when a call name appears twice (in any version), when an
    /// argument name repeats within a call, or when an url argument has no
    /// matching `{placeholder}` in the endpoint template.
    pub fn new(calls: impl IntoIterator<Item = CallDescriptor>) -> cloudkick_core::Result<Self> {
        let mut registry = Self {
            calls: Vec::new(),
            by_name: HashMap::new(),
            by_version: HashMap::new(),
        };

        for call in calls {
            if let Some(&idx) = registry.by_name.get(call.name) {
                return Err(CoreError::unexpected(format!(
                    "call {} is declared by both api {} and api {}",
                    call.name, registry.calls[idx].version, call.version
                )));
            }

            let placeholders = call.placeholders();
            for (i, arg) in call.arguments.iter().enumerate() {
                if call.arguments[..i].iter().any(|a| a.name == arg.name) {
                    return Err(CoreError::unexpected(format!(
                        "call {} declares argument {} twice",
                        call.name, arg.name
                    )));
                }
                if arg.placement == Placement::Url && !placeholders.contains(&arg.target) {
                    return Err(CoreError::unexpected(format!(
                        "call {} routes argument {} to missing placeholder {{{}}} of {}",
                        call.name, arg.name, arg.target, call.endpoint
                    )));
                }
            }

            let idx = registry.calls.len();
            registry.by_name.insert(call.name, idx);
            registry
                .by_version
                .entry(call.version)
                .or_default()
                .insert(call.name, idx);
            registry.calls.push(call);
        }

        debug!(
            "registered {} calls across {} api versions",
            registry.calls.len(),
            registry.by_version.len()
        );
        Ok(registry)
    }

    /// The registry of every builtin call, built once per process.
    pub fn builtin() -> cloudkick_core::Result<Arc<Registry>> {
        BUILTIN.clone().map_err(CoreError::unexpected)
    }

    /// Look up a call by api version and name.
    pub fn get(&self, version: &str, name: &str) -> Result<&CallDescriptor> {
        self.by_version
            .get(version)
            .and_then(|calls| calls.get(name))
            .map(|&idx| &self.calls[idx])
            .ok_or_else(|| Error::UnknownCall {
                version: version.to_string(),
                name: name.to_string(),
            })
    }

    /// Look up a call by name alone.
    pub fn find(&self, name: &str) -> Result<&CallDescriptor> {
        self.by_name
            .get(name)
            .map(|&idx| &self.calls[idx])
            .ok_or_else(|| Error::UnknownCall {
                version: "*".to_string(),
                name: name.to_string(),
            })
    }

    /// All calls in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CallDescriptor> {
        self.calls.iter()
    }

    /// Number of registered calls.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether the registry has no calls.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ArgumentSpec, PathPrefix};
    use pretty_assertions::assert_eq;

    const TAGS: CallDescriptor = CallDescriptor {
        version: "1.0",
        name: "tags",
        endpoint: "tags",
        prefix: PathPrefix::Version,
        description: "List tags",
        arguments: &[],
    };

    #[test]
    fn test_builtin_is_consistent() -> anyhow::Result<()> {
        let registry = Registry::builtin()?;
        assert_eq!(BUILTIN_CALLS.len(), registry.len());

        let call = registry.get("2.0", "status_nodes")?;
        assert_eq!(PathPrefix::Verbatim, call.prefix);
        assert_eq!("check_data", registry.find("check_data")?.name);
        Ok(())
    }

    #[test]
    fn test_unknown_version_and_name() {
        let registry = Registry::new([TAGS]).expect("registry must build");

        let err = registry.get("3.0", "tags").expect_err("must fail");
        assert!(matches!(err, Error::UnknownCall { .. }));
        let err = registry.get("1.0", "nodes").expect_err("must fail");
        assert!(matches!(err, Error::UnknownCall { .. }));
        assert!(registry.find("nodes").is_err());
    }

    #[test]
    fn test_reject_duplicate_name_across_versions() {
        let shadow = CallDescriptor {
            version: "2.0",
            ..TAGS
        };

        let err = Registry::new([TAGS, shadow]).expect_err("must fail");
        assert_eq!("call tags is declared by both api 1.0 and api 2.0", err.to_string());
    }

    #[test]
    fn test_reject_url_argument_without_placeholder() {
        const NODE: CallDescriptor = CallDescriptor {
            name: "node",
            endpoint: "node",
            arguments: &[ArgumentSpec::url("node_id", "Node id")],
            ..TAGS
        };

        assert!(Registry::new([NODE]).is_err());
    }

    #[test]
    fn test_reject_repeated_argument() {
        const REPEATED: CallDescriptor = CallDescriptor {
            arguments: &[
                ArgumentSpec::query("query", "Query"),
                ArgumentSpec::post("query", "Query"),
            ],
            ..TAGS
        };

        assert!(Registry::new([REPEATED]).is_err());
    }
}
