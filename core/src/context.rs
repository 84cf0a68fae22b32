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


use crate::{Error, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Context carries the I/O a signing run is allowed to perform.
///
/// awsreq touches the outside world in exactly three ways: it reads the
/// shared AWS credentials and config files, sends http requests (to the
/// credential endpoints and to the target service) and looks up environment
/// variables. Each of them is plugged in separately, so tests can run the
/// whole flow against a [`StaticEnv`] and a mock endpoint.
///
/// A part that is not configured fails when it is used: file reads return
/// [`crate::ErrorKind::Unexpected`], http sends return
/// [`crate::ErrorKind::TransportError`], and no environment variable is set.
///
/// ## Example
///
/// ```
/// use awsreq_core::{Context, StaticEnv};
///
/// let ctx = Context::new().with_env(StaticEnv::new([("ES_HOST", "localhost:9200")]));
/// assert_eq!(ctx.env_var("ES_HOST").as_deref(), Some("localhost:9200"));
/// assert!(ctx.env_var("ES_PATH").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Context {
    files: Option<Arc<dyn FileRead>>,
    http: Option<Arc<dyn HttpSend>>,
    env: Option<Arc<dyn Env>>,
}

impl Context {
    /// Create a context with nothing configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `files` to read the shared credentials and config files.
    pub fn with_file_read(mut self, files: impl FileRead) -> Self {
        self.files = Some(Arc::new(files));
        self
    }

    /// Use `http` for every outgoing request.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Some(Arc::new(http));
        self
    }

    /// Use `env` to resolve environment variables and the home directory.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Some(Arc::new(env));
        self
    }

    /// Read the whole file at `path`.
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        let Some(files) = &self.files else {
            return Err(Error::unexpected("no file reader configured")
                .with_context(format!("path: {path}")));
        };
        files.file_read(path).await
    }

    /// Read the whole file at `path` as utf-8, replacing invalid sequences.
    pub async fn file_read_as_string(&self, path: &str) -> Result<String> {
        let bytes = self.file_read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send `req` and return the buffered response.
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let Some(http) = &self.http else {
            return Err(Error::transport("no http client configured")
                .with_context(format!("url: {}", req.uri())));
        };
        http.http_send(req).await
    }

    /// Send `req` and return the response with its body decoded as utf-8.
    pub async fn http_send_as_string(
        &self,
        req: http::Request<Bytes>,
    ) -> Result<http::Response<String>> {
        let (parts, body) = self.http_send(req).await?.into_parts();
        Ok(http::Response::from_parts(
            parts,
            String::from_utf8_lossy(&body).into_owned(),
        ))
    }

    /// Look up an environment variable.
    ///
    /// Unset variables and values that are not valid utf-8 both yield `None`.
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.as_ref()?.var(key)
    }

    /// Replace a leading `~` with the home directory.
    ///
    /// Paths without a leading `~/` (or `~\` on windows) are returned as is.
    /// Returns `None` when the path needs a home directory and none is known.
    pub fn expand_home_dir(&self, path: &str) -> Option<String> {
        let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) else {
            return Some(path.to_string());
        };

        let home = self.env.as_ref()?.home_dir()?;
        Some(home.join(rest).to_string_lossy().into_owned())
    }
}

/// FileRead reads a whole file.
///
/// Used by the profile credential provider for `~/.aws/credentials` and
/// `~/.aws/config`.
#[async_trait::async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    /// Read the file content entirely in `Vec<u8>`.
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;
}

/// HttpSend sends one http request and buffers the response.
///
/// Credential providers use it to reach IMDS or the ECS metadata endpoint, and
/// the dispatcher uses it to deliver the signed request itself.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Env resolves environment variables.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get an environment variable, `None` if unset or not utf-8.
    fn var(&self, key: &str) -> Option<String>;

    /// The current user's home directory.
    ///
    /// Taken from the first non-empty of `HOME` and `USERPROFILE`.
    fn home_dir(&self) -> Option<PathBuf> {
        ["HOME", "USERPROFILE"]
            .into_iter()
            .filter_map(|key| self.var(key))
            .find(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}

/// Env backed by the environment of the current process.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }
}

/// Env backed by a fixed set of variables.
///
/// Set `HOME` to give it a home directory.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    envs: HashMap<String, String>,
}

impl StaticEnv {
    /// Build an env from `(key, value)` pairs.
    pub fn new<K, V>(envs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        envs.into_iter().collect()
    }

    /// Set a variable, replacing any previous value.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            envs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::path::Path;

    #[test]
    fn test_expand_home_dir() {
        let ctx = Context::new().with_env(StaticEnv::new([("HOME", "/home/awsreq")]));

        let expanded = ctx
            .expand_home_dir("~/.aws/credentials")
            .expect("home is set");
        assert_eq!(
            Path::new(&expanded),
            Path::new("/home/awsreq").join(".aws/credentials")
        );
        assert_eq!(
            ctx.expand_home_dir("/etc/aws/config").as_deref(),
            Some("/etc/aws/config")
        );
    }

    #[test]
    fn test_expand_home_dir_without_home() {
        let ctx = Context::new().with_env(StaticEnv::new([("HOME", "")]));
        assert!(ctx.expand_home_dir("~/.aws/credentials").is_none());
        assert_eq!(ctx.expand_home_dir("relative").as_deref(), Some("relative"));

        assert!(Context::new().expand_home_dir("~/.aws/config").is_none());
    }

    #[test]
    fn test_home_dir_falls_back_to_userprofile() {
        let env = StaticEnv::new([("HOME", ""), ("USERPROFILE", r"C:\Users\awsreq")]);
        assert_eq!(env.home_dir(), Some(PathBuf::from(r"C:\Users\awsreq")));
    }

    #[test]
    fn test_static_env() {
        let ctx = Context::new().with_env(
            StaticEnv::new([("ES_HOST", "localhost")]).with_var("ES_PATH", "/_search"),
        );

        assert_eq!(ctx.env_var("ES_HOST").as_deref(), Some("localhost"));
        assert_eq!(ctx.env_var("ES_PATH").as_deref(), Some("/_search"));
        assert!(ctx.env_var("ES_DATA").is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_parts_fail() {
        let ctx = Context::new();

        let err = ctx
            .file_read("/root/.aws/credentials")
            .await
            .expect_err("reading without a file reader must fail");
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.context(), ["path: /root/.aws/credentials"]);

        let req = http::Request::builder()
            .uri("http://169.254.169.254/latest/api/token")
            .body(Bytes::new())
            .expect("request must be valid");
        let err = ctx
            .http_send(req)
            .await
            .expect_err("sending without a client must fail");
        assert_eq!(err.kind(), ErrorKind::TransportError);

        assert!(ctx.env_var("HOME").is_none());
    }
}
