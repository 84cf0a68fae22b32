//! Reqwest-based HTTP sending implementation for awsreq.
//!
//! `ReqwestHttpSend` implements the `HttpSend` trait from `awsreq_core` on top
//! of a `reqwest::Client`. Configure timeouts, proxies or TLS on the client
//! you pass in.
//!
//! ```no_run
//! use awsreq_core::Context;
//! use awsreq_http_send_reqwest::ReqwestHttpSend;
//! use std::time::Duration;
//!
//! # fn example() -> anyhow::Result<()> {
//! let client = reqwest::Client::builder()
//!     .timeout(Duration::from_secs(30))
//!     .build()?;
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use awsreq_core::{Error, HttpSend, Result};
use bytes::Bytes;
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Request};

/// Reqwest-based implementation of the `HttpSend` trait.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let url = req.uri().to_string();
        let req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("failed to build http request")
                .with_context(format!("url: {url}"))
                .with_source(e)
        })?;

        debug!("sending {} {url}", req.method());
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| transport_error(&url, e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| transport_error(&url, e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> Error {
    let message = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "failed to connect"
    } else {
        "failed to send request"
    };

    Error::transport(message)
        .with_context(format!("url: {url}"))
        .with_source(e)
}
