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

use crate::{DispatchOptions, RequestParams};
use awsreq_core::{Context, Error, Result};
use clap::{Args, Parser};
use std::time::Duration;

/// Service name used by the search-indexing signer.
pub const ES_SERVICE: &str = "es";

pub const ES_AWS_REGION: &str = "ES_AWS_REGION";
pub const ES_HOST: &str = "ES_HOST";
pub const ES_HTTP_METHOD: &str = "ES_HTTP_METHOD";
pub const ES_PATH: &str = "ES_PATH";
pub const ES_DATA: &str = "ES_DATA";
pub const ES_INSECURE: &str = "ES_INSECURE";
pub const ES_TIMEOUT: &str = "ES_TIMEOUT";

/// Flags shared by both signers.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchArgs {
    /// Send the request over plain http instead of https.
    #[arg(long)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Sign and send a single AWS SigV4 request, then print the response body.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "aws-request-signer", version)]
pub struct GenericArgs {
    /// Service name used in the credential scope, like `es` or `execute-api`.
    pub service: String,
    /// AWS region, like `us-east-1`.
    pub region: String,
    /// Destination host, optionally with `:port`.
    pub host: String,
    /// HTTP method.
    pub method: String,
    /// Request path, including the query string.
    pub path: String,
    /// Raw request body, pass "" for none.
    pub body: String,

    /// `Content-Type` to send with the body.
    #[arg(long, value_name = "MIME")]
    pub content_type: Option<String>,

    #[command(flatten)]
    pub dispatch: DispatchArgs,
}

/// Sign and send a single request to an Elasticsearch / OpenSearch domain.
///
/// The request is read from `ES_AWS_REGION`, `ES_HOST`, `ES_HTTP_METHOD`,
/// `ES_PATH` and `ES_DATA`.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "es-request-signer", version)]
pub struct EsArgs {
    #[command(flatten)]
    pub dispatch: DispatchArgs,
}

impl GenericArgs {
    /// Resolve the request and dispatch options from the command line.
    pub fn resolve(&self) -> Result<(RequestParams, DispatchOptions)> {
        let mut params = RequestParams::new(
            &self.service,
            &self.region,
            &self.host,
            &self.method,
            &self.path,
            &self.body,
        );
        params.content_type = self.content_type.clone();
        params.validate()?;

        let options = DispatchOptions {
            secure: !self.dispatch.insecure,
            timeout: timeout_from_secs(self.dispatch.timeout)?.unwrap_or(crate::DEFAULT_TIMEOUT),
        };
        Ok((params, options))
    }
}

impl EsArgs {
    /// Resolve the request from the `ES_*` variables of `ctx`.
    ///
    /// Flags given on the command line win over `ES_INSECURE` and `ES_TIMEOUT`.
    pub fn resolve(&self, ctx: &Context) -> Result<(RequestParams, DispatchOptions)> {
        let required = |key: &str| {
            ctx.env_var(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::request_invalid(format!("{key} must be set and not empty")))
        };
        let optional = |key: &str| ctx.env_var(key).filter(|v| !v.is_empty());

        let region = required(ES_AWS_REGION)?;
        let host = required(ES_HOST)?;
        let method = required(ES_HTTP_METHOD)?;
        let path = optional(ES_PATH).unwrap_or_else(|| "/".to_string());
        let body = optional(ES_DATA).unwrap_or_default();

        let mut params = RequestParams::new(ES_SERVICE, region, host, method, path, body);
        if !params.body.is_empty() {
            params = params.with_content_type("application/json");
        }
        params.validate()?;

        let secure = if self.dispatch.insecure {
            false
        } else {
            match optional(ES_INSECURE) {
                None => true,
                Some(v) => !parse_bool(ES_INSECURE, &v)?,
            }
        };

        let timeout = match timeout_from_secs(self.dispatch.timeout)? {
            Some(timeout) => timeout,
            None => match optional(ES_TIMEOUT) {
                Some(v) => {
                    let secs = v.trim().parse::<u64>().map_err(|e| {
                        Error::config_invalid(format!("{ES_TIMEOUT} must be a number of seconds, got {v:?}"))
                            .with_source(e)
                    })?;
                    timeout_from_secs(Some(secs))?.unwrap_or(crate::DEFAULT_TIMEOUT)
                }
                None => crate::DEFAULT_TIMEOUT,
            },
        };

        Ok((params, DispatchOptions { secure, timeout }))
    }
}

fn timeout_from_secs(secs: Option<u64>) -> Result<Option<Duration>> {
    match secs {
        Some(0) => Err(Error::config_invalid("timeout must be greater than zero")),
        Some(secs) => Ok(Some(Duration::from_secs(secs))),
        None => Ok(None),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::config_invalid(format!(
            "{key} must be true or false, got {value:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsreq_core::{ErrorKind, StaticEnv};
    use clap::error::ErrorKind as ClapErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn context(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv::new(envs.iter().copied()))
    }

    const ES_ENVS: &[(&str, &str)] = &[
        (ES_AWS_REGION, "us-east-1"),
        (ES_HOST, "search-demo.us-east-1.es.amazonaws.com"),
        (ES_HTTP_METHOD, "GET"),
    ];

    #[test]
    fn test_generic_args() -> anyhow::Result<()> {
        let args = GenericArgs::try_parse_from([
            "aws-request-signer",
            "execute-api",
            "eu-west-1",
            "abc123.execute-api.eu-west-1.amazonaws.com",
            "POST",
            "prod/orders",
            r#"{"id":1}"#,
            "--timeout",
            "5",
        ])?;

        let (params, options) = args.resolve()?;
        assert_eq!(
            params,
            RequestParams::new(
                "execute-api",
                "eu-west-1",
                "abc123.execute-api.eu-west-1.amazonaws.com",
                "POST",
                "prod/orders",
                r#"{"id":1}"#,
            )
        );
        assert_eq!(
            options,
            DispatchOptions {
                secure: true,
                timeout: Duration::from_secs(5),
            }
        );
        Ok(())
    }

    #[test]
    fn test_generic_args_accept_empty_body() -> anyhow::Result<()> {
        let args = GenericArgs::try_parse_from([
            "aws-request-signer",
            "es",
            "us-east-1",
            "127.0.0.1:9200",
            "GET",
            "/_search",
            "",
            "--insecure",
        ])?;

        let (params, options) = args.resolve()?;
        assert_eq!(params.body, "");
        assert!(!options.secure);
        Ok(())
    }

    #[test]
    fn test_generic_args_missing_positional_is_usage_error() {
        let err = GenericArgs::try_parse_from(["aws-request-signer", "es", "us-east-1", "host"])
            .expect_err("missing arguments must be rejected");
        assert_eq!(err.kind(), ClapErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_generic_args_empty_region() -> anyhow::Result<()> {
        let args = GenericArgs::try_parse_from([
            "aws-request-signer",
            "es",
            "",
            "127.0.0.1:9200",
            "GET",
            "/",
            "",
        ])?;
        let err = args.resolve().expect_err("empty region must be rejected");
        assert_eq!(err.kind(), ErrorKind::InvalidRequestComponent);
        Ok(())
    }

    #[test]
    fn test_es_defaults() -> anyhow::Result<()> {
        let (params, options) = EsArgs::try_parse_from(["es-request-signer"])?.resolve(&context(ES_ENVS))?;

        assert_eq!(params.service, "es");
        assert_eq!(params.region, "us-east-1");
        assert_eq!(params.host, "search-demo.us-east-1.es.amazonaws.com");
        assert_eq!(params.method, "GET");
        assert_eq!(params.path, "/");
        assert_eq!(params.body, "");
        assert_eq!(params.content_type, None);
        assert_eq!(options, DispatchOptions::default());
        Ok(())
    }

    #[test]
    fn test_es_full() -> anyhow::Result<()> {
        let mut envs = ES_ENVS.to_vec();
        envs.extend([
            (ES_PATH, "/twitter/_doc/1"),
            (ES_DATA, r#"{"user":"kimchy"}"#),
            (ES_INSECURE, "true"),
            (ES_TIMEOUT, "7"),
        ]);

        let (params, options) = EsArgs::try_parse_from(["es-request-signer"])?.resolve(&context(&envs))?;
        assert_eq!(params.path, "/twitter/_doc/1");
        assert_eq!(params.body, r#"{"user":"kimchy"}"#);
        assert_eq!(params.content_type.as_deref(), Some("application/json"));
        assert_eq!(
            options,
            DispatchOptions {
                secure: false,
                timeout: Duration::from_secs(7),
            }
        );
        Ok(())
    }

    #[test]
    fn test_es_flags_take_precedence() -> anyhow::Result<()> {
        let mut envs = ES_ENVS.to_vec();
        envs.extend([(ES_INSECURE, "false"), (ES_TIMEOUT, "7")]);

        let args = EsArgs::try_parse_from(["es-request-signer", "--insecure", "--timeout", "3"])?;
        let (_, options) = args.resolve(&context(&envs))?;
        assert_eq!(
            options,
            DispatchOptions {
                secure: false,
                timeout: Duration::from_secs(3),
            }
        );
        Ok(())
    }

    #[test_case(ES_AWS_REGION; "region")]
    #[test_case(ES_HOST; "host")]
    #[test_case(ES_HTTP_METHOD; "method")]
    fn test_es_required_variable(missing: &str) {
        let unset = ES_ENVS
            .iter()
            .copied()
            .filter(|(k, _)| *k != missing)
            .collect::<Vec<_>>();
        let mut empty = unset.clone();
        empty.push((missing, ""));

        for envs in [unset, empty] {
            let err = EsArgs::default_args()
                .resolve(&context(&envs))
                .expect_err("missing variable must be rejected");
            assert_eq!(err.kind(), ErrorKind::InvalidRequestComponent);
            assert!(err.message().contains(missing), "{err} must name {missing}");
        }
    }

    #[test_case(ES_TIMEOUT, "soon"; "non numeric timeout")]
    #[test_case(ES_TIMEOUT, "0"; "zero timeout")]
    #[test_case(ES_INSECURE, "maybe"; "invalid insecure")]
    fn test_es_invalid_option(key: &str, value: &str) {
        let mut envs = ES_ENVS.to_vec();
        envs.push((key, value));

        let err = EsArgs::default_args()
            .resolve(&context(&envs))
            .expect_err("invalid option must be rejected");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    impl EsArgs {
        fn default_args() -> Self {
            EsArgs {
                dispatch: DispatchArgs::default(),
            }
        }
    }
}
