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

//! Cloudkick api client
//!
//! Calls are declared once in a table of [`CallDescriptor`]s. The [`Client`]
//! validates arguments against that table, signs requests with two-legged
//! OAuth 1.0 and decodes the responses.
//!
//! ```no_run
//! use cloudkick_api::{Args, Client, Config};
//! use cloudkick_core::{Context, OsEnv};
//!
//! # async fn example(ctx: Context) -> cloudkick_api::Result<()> {
//! let client = Client::new(ctx.with_env(OsEnv), Config::new())?;
//! let nodes = client.nodes(Args::from([("query", "tag:web")])).await?;
//! println!("{nodes}");
//! # Ok(())
//! # }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod error;
pub use error::{Error, Result};

mod sign_request;
pub use sign_request::{string_to_sign, RequestSigner};

mod provide_credential;
pub use provide_credential::{
    ConfigFileCredentialProvider, DefaultCredentialProvider, StaticCredentialProvider,
};

mod descriptor;
pub use descriptor::{epoch, ArgumentSpec, CallDescriptor, FormatFn, PathPrefix, Placement};

mod calls;
pub use calls::BUILTIN_CALLS;

mod registry;
pub use registry::Registry;

mod dispatch;
pub use dispatch::{plan, Args, RequestPlan, Response};

mod client;
pub use client::Client;

mod inventory;
pub use inventory::{parse_nodes, Inventory, Node, NodeCache, RoleDefs, ALL_NODES};
