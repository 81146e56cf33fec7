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

//! Declarative description of api calls.

use std::fmt::{self, Debug, Formatter};

use cloudkick_core::time::{format_unix_seconds, parse_datetime};

/// Where a validated argument value travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Query string parameter.
    Query,
    /// Substituted into the `{placeholder}` of the endpoint template.
    Url,
    /// Form parameter in a `POST` body.
    Post,
}

/// How the request path is derived from the endpoint template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPrefix {
    /// Prefix the template with `/<version>/`.
    Version,
    /// The template is already the full path.
    Verbatim,
}

/// Turns a supplied value into its wire form.
pub type FormatFn = fn(&str) -> cloudkick_core::Result<String>;

/// One logical argument of a call.
#[derive(Clone, Copy)]
pub struct ArgumentSpec {
    /// Name used by callers and shell commands.
    pub name: &'static str,
    /// Parameter name on the wire, or the placeholder name for [`Placement::Url`].
    pub target: &'static str,
    /// Human readable description.
    pub description: &'static str,
    /// Where the value travels.
    pub placement: Placement,
    /// Whether the call fails without a value.
    pub required: bool,
    /// Value used when a required argument is not supplied.
    pub default: Option<&'static str>,
    /// Allowed values, empty means unconstrained.
    pub valid_values: &'static [&'static str],
    /// Formatting applied after validation.
    pub format: Option<FormatFn>,
}

impl ArgumentSpec {
    const fn new(name: &'static str, placement: Placement, description: &'static str) -> Self {
        Self {
            name,
            target: name,
            description,
            placement,
            required: false,
            default: None,
            valid_values: &[],
            format: None,
        }
    }

    /// Optional query string argument.
    pub const fn query(name: &'static str, description: &'static str) -> Self {
        Self::new(name, Placement::Query, description)
    }

    /// Required url template argument.
    pub const fn url(name: &'static str, description: &'static str) -> Self {
        Self::new(name, Placement::Url, description).required()
    }

    /// Optional form body argument.
    pub const fn post(name: &'static str, description: &'static str) -> Self {
        Self::new(name, Placement::Post, description)
    }

    /// Mark the argument as required.
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Send the value under another parameter name.
    pub const fn target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    /// Set the default of a required argument.
    pub const fn default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Restrict the accepted values.
    pub const fn valid_values(mut self, values: &'static [&'static str]) -> Self {
        self.valid_values = values;
        self
    }

    /// Format the value before sending.
    pub const fn format(mut self, f: FormatFn) -> Self {
        self.format = Some(f);
        self
    }

    /// Whether callers must supply the argument themselves.
    ///
    /// A required argument with a default can always be left out.
    pub fn must_supply(&self) -> bool {
        self.required && self.default.is_none()
    }
}

impl Debug for ArgumentSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("placement", &self.placement)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("valid_values", &self.valid_values)
            .field("format", &self.format.is_some())
            .finish()
    }
}

/// Static declaration of one api operation.
#[derive(Debug, Clone, Copy)]
pub struct CallDescriptor {
    /// Api version the call belongs to, e.g. `2.0`.
    pub version: &'static str,
    /// Call name, unique across all versions.
    pub name: &'static str,
    /// Endpoint template, may contain `{placeholder}`s.
    pub endpoint: &'static str,
    /// How the template becomes the request path.
    pub prefix: PathPrefix,
    /// Human readable description.
    pub description: &'static str,
    /// Declared arguments, in display order.
    pub arguments: &'static [ArgumentSpec],
}

impl CallDescriptor {
    /// Look up an argument by its logical name.
    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Logical names of the arguments callers must supply.
    pub fn required_arguments(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.arguments
            .iter()
            .filter(|a| a.must_supply())
            .map(|a| a.name)
    }

    /// Names of the `{placeholder}`s in the endpoint template.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.endpoint;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            names.push(&rest[start + 1..start + len]);
            rest = &rest[start + len + 1..];
        }
        names
    }
}

/// Format a point in time as Unix seconds.
///
/// Accepts Unix seconds, RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` in UTC.
pub fn epoch(value: &str) -> cloudkick_core::Result<String> {
    parse_datetime(value).map(format_unix_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARGS: &[ArgumentSpec] = &[
        ArgumentSpec::url("node_id", "Node id"),
        ArgumentSpec::post("name", "Tag name").required(),
        ArgumentSpec::query("interval", "Interval")
            .required()
            .default("one_hour"),
    ];

    const CALL: CallDescriptor = CallDescriptor {
        version: "1.0",
        name: "add_tag",
        endpoint: "node/{node_id}/add_tag",
        prefix: PathPrefix::Version,
        description: "Add a tag",
        arguments: ARGS,
    };

    #[test]
    fn test_placeholders() {
        assert_eq!(vec!["node_id"], CALL.placeholders());

        let call = CallDescriptor {
            endpoint: "{a}/x/{b}/{unterminated",
            ..CALL
        };
        assert_eq!(vec!["a", "b"], call.placeholders());
    }

    #[test]
    fn test_required_arguments_skip_defaults() {
        assert_eq!(
            vec!["node_id", "name"],
            CALL.required_arguments().collect::<Vec<_>>()
        );
        assert!(CALL.argument("interval").is_some());
        assert!(CALL.argument("missing").is_none());
    }

    #[test]
    fn test_epoch() {
        assert_eq!("1660582212", epoch("1660582212").expect("must format"));
        assert_eq!("1660521600", epoch("2022-08-15").expect("must format"));
        assert!(epoch("last tuesday").is_err());
    }
}
