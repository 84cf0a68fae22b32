use super::utils::{parse_imds_error, send_with_timeout};
use crate::{constants::*, Credential};
use async_trait::async_trait;
use awsreq_core::time::{now, parse_rfc3339, DateTime};
use awsreq_core::{Context, Error, ProvideCredential, Result};
use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::Method;
use log::debug;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://169.254.169.254";
/// 21600s (6h) is recommended by AWS.
const TOKEN_TTL_SECONDS: i64 = 21600;

/// IMDSv2CredentialProvider loads the instance role credential from the EC2
/// instance metadata service, using the session-token flow.
///
/// - Endpoint: `AWS_EC2_METADATA_SERVICE_ENDPOINT`, or `http://169.254.169.254`
/// - Disabled when `AWS_EC2_METADATA_DISABLED` is `true`
///
/// The metadata token is cached and refreshed 10 minutes before it expires.
#[derive(Debug, Clone)]
pub struct IMDSv2CredentialProvider {
    endpoint: Option<String>,
    timeout: Duration,
    token: Arc<Mutex<(String, DateTime)>>,
}

impl Default for IMDSv2CredentialProvider {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(1),
            token: Arc::new(Mutex::new((String::new(), DateTime::default()))),
        }
    }
}

impl IMDSv2CredentialProvider {
    /// Create a new `IMDSv2CredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint for the metadata service.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the timeout for each metadata request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn get_endpoint(&self, ctx: &Context) -> String {
        self.endpoint
            .clone()
            .or_else(|| ctx.env_var(AWS_EC2_METADATA_SERVICE_ENDPOINT))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    async fn load_ec2_metadata_token(&self, ctx: &Context, endpoint: &str) -> Result<String> {
        {
            let (token, expires_in) = self.token.lock().expect("lock poisoned").clone();
            if expires_in > now() {
                return Ok(token);
            }
        }

        let url = format!("{endpoint}/latest/api/token");
        let req = http::Request::builder()
            .uri(&url)
            .method(Method::PUT)
            .header(CONTENT_LENGTH, "0")
            .header(
                "x-aws-ec2-metadata-token-ttl-seconds",
                TOKEN_TTL_SECONDS.to_string(),
            )
            .body(Bytes::new())?;

        let resp = send_with_timeout(ctx, req, self.timeout)
            .await
            .map_err(|e| e.with_context("hint: check if running on EC2 instance"))?;
        if resp.status() != http::StatusCode::OK {
            return Err(parse_imds_error(
                "fetch_token",
                resp.status(),
                resp.body(),
            ));
        }
        let ec2_token = resp.into_body();

        // Refresh 10 minutes before the token actually expires.
        let expires_in = now() + chrono::TimeDelta::seconds(TOKEN_TTL_SECONDS)
            - chrono::TimeDelta::minutes(10);
        *self.token.lock().expect("lock poisoned") = (ec2_token.clone(), expires_in);

        Ok(ec2_token)
    }

    async fn get_with_token(&self, ctx: &Context, url: &str, token: &str) -> Result<http::Response<String>> {
        let req = http::Request::builder()
            .uri(url)
            .method(Method::GET)
            .header("x-aws-ec2-metadata-token", token)
            .body(Bytes::new())?;

        send_with_timeout(ctx, req, self.timeout).await
    }
}

#[async_trait]
impl ProvideCredential for IMDSv2CredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if ctx
            .env_var(AWS_EC2_METADATA_DISABLED)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            debug!("IMDS is disabled by {AWS_EC2_METADATA_DISABLED}");
            return Ok(None);
        }

        let endpoint = self.get_endpoint(ctx);
        let token = self.load_ec2_metadata_token(ctx, &endpoint).await?;

        // List all credentials that node has.
        let url = format!("{endpoint}/latest/meta-data/iam/security-credentials/");
        let resp = self.get_with_token(ctx, &url, &token).await?;
        if resp.status() != http::StatusCode::OK {
            return Err(parse_imds_error(
                "list_instance_profiles",
                resp.status(),
                resp.body(),
            ));
        }

        // Only the first role is used if several are listed.
        let profile_name = resp.body().lines().next().unwrap_or_default().trim().to_string();
        if profile_name.is_empty() {
            return Err(
                Error::credentials_missing("no IAM role attached to EC2 instance")
                    .with_context("hint: attach an IAM role to your EC2 instance"),
            );
        }

        // Get the credentials via role_name.
        let url = format!("{endpoint}/latest/meta-data/iam/security-credentials/{profile_name}");
        let resp = self.get_with_token(ctx, &url, &token).await?;
        if resp.status() != http::StatusCode::OK {
            return Err(
                parse_imds_error("fetch_credentials", resp.status(), resp.body())
                    .with_context(format!("profile: {profile_name}")),
            );
        }

        let content = resp.into_body();
        let resp: Ec2MetadataIamSecurityCredentials =
            serde_json::from_str(&content).map_err(|e| {
                Error::unexpected("failed to parse IMDS credentials response")
                    .with_source(e)
                    .with_context(format!("profile: {profile_name}"))
            })?;

        match resp.code.as_str() {
            "Success" => {}
            code if code.contains("Expired") => {
                return Err(Error::credential_invalid(format!(
                    "IMDS credentials expired: {}",
                    resp.message
                ))
                .with_context(format!("error_code: {code}"))
                .with_context(format!("profile: {profile_name}")));
            }
            code => {
                return Err(Error::unexpected(format!(
                    "IMDS returned error: [{code}] {}",
                    resp.message
                ))
                .with_context(format!("profile: {profile_name}")));
            }
        }

        Ok(Some(Credential {
            access_key_id: resp.access_key_id,
            secret_access_key: resp.secret_access_key,
            session_token: Some(resp.token),
            expires_in: Some(parse_rfc3339(&resp.expiration)?),
        }))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Ec2MetadataIamSecurityCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,

    code: String,
    message: String,
}
