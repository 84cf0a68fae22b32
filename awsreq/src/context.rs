use crate::DispatchOptions;
use awsreq_core::{Context, Error, OsEnv, Result};
use awsreq_file_read_tokio::TokioFileRead;
use awsreq_http_send_reqwest::ReqwestHttpSend;

/// Create a context backed by tokio file reads, a reqwest client and the
/// process environment.
///
/// The client enforces `options.timeout` on every request it sends.
pub fn default_context(options: &DispatchOptions) -> Result<Context> {
    let client = reqwest::Client::builder()
        .timeout(options.timeout)
        .build()
        .map_err(|e| Error::unexpected("failed to build http client").with_source(e))?;

    Ok(Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::new(client))
        .with_env(OsEnv))
}
