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
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Error, Result};

/// Everything the cloudkick client touches outside the process.
///
/// Config files are read through [`FileRead`], signed requests leave through
/// [`HttpSend`], and `CLOUDKICK_*` variables plus the home directory come from
/// [`Env`]. A fresh context has none of them: reads and sends fail, the
/// environment is empty.
///
/// ```
/// use cloudkick_core::{Context, OsEnv};
///
/// let ctx = Context::new().with_env(OsEnv);
/// let history = ctx.home_file(".cloudkick_history");
/// ```
#[derive(Clone, Debug)]
pub struct Context {
    fs: Arc<dyn FileRead>,
    http: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a context that can neither read files nor send requests.
    pub fn new() -> Self {
        Self {
            fs: Arc::new(NoopFileRead),
            http: Arc::new(NoopHttpSend),
            env: Arc::new(NoopEnv),
        }
    }

    /// Read config files with `fs`.
    pub fn with_file_read(mut self, fs: impl FileRead) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// Send api requests with `http`.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Take env values and the home directory from `env`.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Read a whole file.
    #[inline]
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        self.fs.file_read(path).await
    }

    /// Read a config file as text; invalid utf-8 is replaced.
    pub async fn file_read_as_string(&self, path: &str) -> Result<String> {
        let bytes = self.file_read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a signed request and collect the whole response.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }

    /// Home directory of the current user.
    #[inline]
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.env.home_dir()
    }

    /// `name` inside the home directory, such as the shell history file.
    pub fn home_file(&self, name: &str) -> Option<PathBuf> {
        self.home_dir().map(|home| home.join(name))
    }

    /// Replace a leading `~/` with the home directory.
    ///
    /// Paths without it come back unchanged; `None` when the path needs a
    /// home directory and there is none.
    pub fn expand_home_dir(&self, path: &str) -> Option<String> {
        match path.strip_prefix("~/") {
            None => Some(path.to_string()),
            Some(rest) => self
                .home_dir()
                .map(|home| home.join(rest).to_string_lossy().into_owned()),
        }
    }

    /// Value of an environment variable, `None` when unset or not utf-8.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }
}

/// Reads config files.
#[async_trait::async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    /// Read the whole file at `path`.
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Sends signed api requests.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send `req` and return the response with its full body.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Source of env values and the home directory.
pub trait Env: Debug + Send + Sync + 'static {
    /// Value of `key`, `None` when unset or not utf-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Home directory of the current user, if known.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// The environment of the running process.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        home::home_dir()
    }
}

/// Fixed env values, for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// Home directory to report.
    pub home_dir: Option<PathBuf>,
    /// Variables to report.
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir.clone()
    }
}

/// Fails every read.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileRead;

#[async_trait::async_trait]
impl FileRead for NoopFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        Err(Error::unexpected(format!(
            "cannot read {path}: no file reader configured"
        )))
    }
}

/// Fails every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait::async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::unexpected(format!(
            "cannot send {} {}: no http client configured",
            req.method(),
            req.uri()
        )))
    }
}

/// Empty environment without a home directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _: &str) -> Option<String> {
        None
    }

    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn home_context() -> Context {
        Context::new().with_env(StaticEnv {
            home_dir: Some(PathBuf::from("/home/ck")),
            envs: HashMap::from([("CLOUDKICK_OAUTH_KEY".to_string(), "abc123".to_string())]),
        })
    }

    #[test]
    fn test_expand_config_paths() {
        let ctx = home_context();

        assert_eq!(
            Some("/home/ck/.cloudkick.conf".to_string()),
            ctx.expand_home_dir("~/.cloudkick.conf")
        );
        assert_eq!(
            Some("/etc/cloudkick.conf".to_string()),
            ctx.expand_home_dir("/etc/cloudkick.conf")
        );
        assert_eq!(
            Some("~cloudkick/.cloudkick.conf".to_string()),
            ctx.expand_home_dir("~cloudkick/.cloudkick.conf")
        );
    }

    #[test]
    fn test_history_file_and_env() {
        let ctx = home_context();

        assert_eq!(
            Some(PathBuf::from("/home/ck/.cloudkick_history")),
            ctx.home_file(".cloudkick_history")
        );
        assert_eq!(Some("abc123".to_string()), ctx.env_var("CLOUDKICK_OAUTH_KEY"));
        assert_eq!(None, ctx.env_var("CLOUDKICK_OAUTH_SECRET"));
    }

    #[test]
    fn test_no_home_dir() {
        let ctx = Context::new();
        assert_eq!(None, ctx.expand_home_dir("~/.cloudkick.conf"));
        assert_eq!(None, ctx.home_file(".cloudkick_history"));
    }

    #[tokio::test]
    async fn test_unconfigured_context_fails() {
        let ctx = Context::new();

        let err = ctx
            .file_read("/etc/cloudkick.conf")
            .await
            .expect_err("must fail");
        assert!(err.to_string().contains("/etc/cloudkick.conf"));

        let req = http::Request::get("https://api.cloudkick.com/1.0/tags")
            .body(Bytes::new())
            .expect("request must be valid");
        let err = ctx.http_send(req).await.expect_err("must fail");
        assert_eq!(
            "cannot send GET https://api.cloudkick.com/1.0/tags: no http client configured",
            err.to_string()
        );
    }
}
