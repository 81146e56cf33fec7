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

use std::io::Write;

use cloudkick_api::{Client, Config, Credential, Error};
use cloudkick_core::{Context, OsEnv};
use cloudkick_file_read_tokio::TokioFileRead;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn context() -> Context {
    let _ = env_logger::builder().is_test(true).try_init();
    Context::new().with_file_read(TokioFileRead).with_env(OsEnv)
}

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime must build")
        .block_on(f)
}

#[test]
fn test_config_file_from_env() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "# cloudkick\noauth_key file_key\noauth_secret file_secret")?;
    let path = file.path().to_string_lossy().to_string();

    temp_env::with_vars(
        [
            ("CLOUDKICK_CONFIG_FILE", Some(path.as_str())),
            ("CLOUDKICK_OAUTH_KEY", None),
            ("CLOUDKICK_OAUTH_SECRET", None),
        ],
        || {
            let client = Client::new(context(), Config::new()).expect("client must build");

            let first = block_on(client.credential()).expect("credential must resolve");
            client.reset_credential();
            let second = block_on(client.credential()).expect("credential must resolve");

            assert_eq!(Credential::new("file_key", "file_secret"), first);
            assert_eq!(first, second);
        },
    );
    Ok(())
}

#[test]
fn test_env_credential_wins_over_files() {
    temp_env::with_vars(
        [
            ("CLOUDKICK_CONFIG_FILE", Some("/nonexistent/cloudkick.conf")),
            ("CLOUDKICK_OAUTH_KEY", Some("env_key")),
            ("CLOUDKICK_OAUTH_SECRET", Some("env_secret")),
        ],
        || {
            let client = Client::new(context(), Config::new()).expect("client must build");

            let cred = block_on(client.credential()).expect("credential must resolve");
            assert_eq!(Credential::new("env_key", "env_secret"), cred);
        },
    );
}

#[test]
fn test_unreadable_config_is_config_error() {
    temp_env::with_vars(
        [
            ("CLOUDKICK_CONFIG_FILE", None::<&str>),
            ("CLOUDKICK_OAUTH_KEY", None),
            ("CLOUDKICK_OAUTH_SECRET", None),
        ],
        || {
            let config = Config::new()
                .with_config_paths(["/nonexistent/a.conf", "/nonexistent/b.conf"]);
            let client = Client::new(context(), config).expect("client must build");

            let err = block_on(client.credential()).expect_err("must fail");
            assert!(matches!(err, Error::Config(_)));
            let msg = err.to_string();
            assert!(msg.contains("/nonexistent/a.conf"), "{msg}");
            assert!(msg.contains("/nonexistent/b.conf"), "{msg}");
        },
    );
}

#[test]
fn test_partial_config_is_auth_error() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "oauth_key only_key")?;
    let path = file.path().to_string_lossy().to_string();

    temp_env::with_vars(
        [
            ("CLOUDKICK_CONFIG_FILE", Some(path.as_str())),
            ("CLOUDKICK_OAUTH_KEY", None),
            ("CLOUDKICK_OAUTH_SECRET", None),
        ],
        || {
            let client = Client::new(context(), Config::new()).expect("client must build");

            let err = block_on(client.credential()).expect_err("must fail");
            assert!(err.is_auth_failure());
        },
    );
    Ok(())
}
