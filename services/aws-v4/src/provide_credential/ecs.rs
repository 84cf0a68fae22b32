use super::utils::send_with_timeout;
use crate::{constants::*, Credential};
use async_trait::async_trait;
use awsreq_core::time::parse_rfc3339;
use awsreq_core::{Context, Error, ProvideCredential, Result};
use bytes::Bytes;
use http::header::AUTHORIZATION;
use http::Method;
use serde::Deserialize;
use std::time::Duration;

const ECS_ENDPOINT: &str = "http://169.254.170.2";

/// EcsCredentialProvider loads the task role credential of an ECS container.
///
/// - `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI` is resolved against `http://169.254.170.2`
/// - otherwise `AWS_CONTAINER_CREDENTIALS_FULL_URI` is used as is
/// - `AWS_CONTAINER_AUTHORIZATION_TOKEN` is sent as the `Authorization` header when set
///
/// References:
/// - [IAM roles for tasks](https://docs.aws.amazon.com/AmazonECS/latest/developerguide/task-iam-roles.html)
#[derive(Debug, Clone)]
pub struct EcsCredentialProvider {
    timeout: Duration,
}

impl Default for EcsCredentialProvider {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
        }
    }
}

impl EcsCredentialProvider {
    /// Create a new `EcsCredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for the metadata request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ProvideCredential for EcsCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let relative_uri = ctx
            .env_var(AWS_CONTAINER_CREDENTIALS_RELATIVE_URI)
            .filter(|v| !v.is_empty());
        let full_uri = ctx
            .env_var(AWS_CONTAINER_CREDENTIALS_FULL_URI)
            .filter(|v| !v.is_empty());

        let url = match (relative_uri, full_uri) {
            (Some(relative), _) => format!("{ECS_ENDPOINT}{relative}"),
            (None, Some(full)) => full,
            (None, None) => return Ok(None),
        };

        let mut req = http::Request::builder().uri(&url).method(Method::GET);
        if let Some(token) = ctx.env_var(AWS_CONTAINER_AUTHORIZATION_TOKEN) {
            req = req.header(AUTHORIZATION, token);
        }
        let req = req.body(Bytes::new())?;

        let resp = send_with_timeout(ctx, req, self.timeout).await?;
        if resp.status() != http::StatusCode::OK {
            return Err(Error::unexpected(format!(
                "request to ECS task metadata endpoint failed with status {}",
                resp.status()
            ))
            .with_context(format!("url: {url}"))
            .with_context(format!("body: {}", resp.body())));
        }

        let cred: EcsTaskCredentials = serde_json::from_str(resp.body()).map_err(|e| {
            Error::unexpected("failed to parse ECS task credentials")
                .with_source(e)
                .with_context(format!("url: {url}"))
        })?;

        Ok(Some(Credential {
            access_key_id: cred.access_key_id,
            secret_access_key: cred.secret_access_key,
            session_token: Some(cred.token),
            expires_in: Some(parse_rfc3339(&cred.expiration)?),
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EcsTaskCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,
}
