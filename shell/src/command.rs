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

use std::collections::BTreeMap;

use cloudkick_api::{Args, CallDescriptor, Client, Registry, Response};
use thiserror::Error;

use crate::args::parse_arguments;

/// Failures of one shell command, printed as a single line.
#[derive(Error, Debug)]
pub enum CmdError {
    /// The command line could not be used.
    #[error("{0}")]
    Usage(String),
    /// The command needs credentials.
    #[error("You need to be authenticated to use this command.")]
    NotAuthenticated,
    /// The call itself failed.
    #[error(transparent)]
    Api(#[from] cloudkick_api::Error),
}

/// Generated commands, one per api call.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: BTreeMap<&'static str, CallDescriptor>,
}

impl CommandTable {
    /// Register one command per call of the registry.
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            commands: registry.iter().map(|call| (call.name, *call)).collect(),
        }
    }

    /// The call behind a command.
    pub fn get(&self, name: &str) -> Option<&CallDescriptor> {
        self.commands.get(name)
    }

    /// Command names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }
}

/// Parse the arguments of a command and check the required ones are present.
pub fn validate(call: &CallDescriptor, line: &str) -> Result<Args, CmdError> {
    let args = parse_arguments(line)?;

    let missing: Vec<_> = call
        .required_arguments()
        .filter(|name| !args.contains(name))
        .collect();
    if !missing.is_empty() {
        return Err(CmdError::Usage(format!(
            "Missing required argument(s): {}",
            missing.join(", ")
        )));
    }

    Ok(args)
}

/// The client of an authenticated session.
pub fn require_auth(session: Option<&Client>) -> Result<&Client, CmdError> {
    session.ok_or(CmdError::NotAuthenticated)
}

/// Send the call.
pub async fn dispatch(client: &Client, call: &CallDescriptor, args: Args) -> Result<Response, CmdError> {
    Ok(client.dispatch(call.version, call.name, args).await?)
}

/// Run the whole pipeline for one generated command.
pub async fn run(
    call: &CallDescriptor,
    session: Option<&Client>,
    line: &str,
) -> Result<Response, CmdError> {
    let args = validate(call, line)?;
    let client = require_auth(session)?;
    dispatch(client, call, args).await
}

/// Help text of a generated command.
pub fn help_text(call: &CallDescriptor) -> String {
    let mut text = format!("Description: {}\n", call.description);

    if call.arguments.is_empty() {
        text.push_str("Arguments: none");
        return text;
    }

    text.push_str("Arguments:\n");
    for arg in call.arguments {
        text.push('\n');
        text.push_str(arg.name);
        text.push_str(" - ");
        text.push_str(arg.description);
        if !arg.valid_values.is_empty() {
            text.push_str(&format!(" (valid values: {})", arg.valid_values.join(", ")));
        }
    }
    text
}
