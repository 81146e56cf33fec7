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

//! Command line entry of the cloudkick shell.

mod args;
mod command;
mod history;
mod shell;

use clap::{Parser, Subcommand};
use cloudkick_api::{Client, Config, Inventory};
use cloudkick_core::{Context, OsEnv};
use cloudkick_file_read_tokio::TokioFileRead;
use cloudkick_http_send_reqwest::ReqwestHttpSend;
use log::error;

use crate::shell::{Repl, Shell};

const HISTORY_FILE: &str = ".cloudkick_history";

#[derive(Parser, Debug)]
#[command(author, version, about = "Cloudkick API shell", long_about = None)]
struct Cli {
    /// Base url of the api
    #[arg(long)]
    endpoint: Option<String>,
    /// Config file to read credentials from, may be repeated
    #[arg(short, long = "config", value_name = "PATH")]
    config_paths: Vec<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive shell (default)
    Shell,
    /// Print the ip address of every node
    Hosts,
    /// Print the ip addresses matched by a role expression
    Roles {
        /// Role expression, e.g. `web +db -canary`
        #[arg(required = true, allow_hyphen_values = true)]
        expr: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let history_path = ctx.home_file(HISTORY_FILE);

    let mut config = Config::new();
    if let Some(endpoint) = cli.endpoint {
        config = config.with_endpoint(endpoint);
    }
    if !cli.config_paths.is_empty() {
        config = config.with_config_paths(cli.config_paths);
    }
    let client = Client::new(ctx, config)?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let mut shell = Shell::new(client);
            shell.auto_login().await;
            Repl::new(shell, history_path)?.run().await?;
        }
        Commands::Hosts => {
            for ip in Inventory::new(client).hosts().await? {
                println!("{ip}");
            }
        }
        Commands::Roles { expr } => {
            for ip in Inventory::new(client).evaluate(&expr.join(" ")).await? {
                println!("{ip}");
            }
        }
    }

    Ok(())
}
