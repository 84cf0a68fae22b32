use awsreq_core::{Context, Result};
use bytes::Bytes;
use log::{debug, warn};
use std::time::Duration;

/// Default timeout for the whole request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the signed request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Use TLS. Plain http is only used when this is turned off explicitly.
    pub secure: bool,
    /// Timeout for the request, connecting included.
    pub timeout: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            secure: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Dispatcher sends a signed request and returns the response body.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    ctx: Context,
}

impl Dispatcher {
    /// Create a dispatcher sending through the http client of `ctx`.
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Send the request and read the body entirely.
    ///
    /// A non-2xx status is not an error: it is logged and the body is
    /// returned like any other.
    pub async fn send(&self, req: http::Request<Bytes>) -> Result<Bytes> {
        let method = req.method().clone();
        let uri = req.uri().clone();

        let resp = self.ctx.http_send(req).await?;
        let status = resp.status();
        if status.is_success() {
            debug!("{method} {uri} returned {status}");
        } else {
            warn!("{method} {uri} returned non-success status {status}");
        }

        Ok(resp.into_body())
    }
}
