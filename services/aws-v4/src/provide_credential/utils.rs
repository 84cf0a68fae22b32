use awsreq_core::{Context, Error, Result};
use bytes::Bytes;
use http::StatusCode;
use std::time::Duration;

/// Send a metadata request, failing with a transport error once `timeout` elapses.
pub async fn send_with_timeout(
    ctx: &Context,
    req: http::Request<Bytes>,
    timeout: Duration,
) -> Result<http::Response<String>> {
    let url = req.uri().to_string();
    tokio::time::timeout(timeout, ctx.http_send_as_string(req))
        .await
        .map_err(|e| {
            Error::transport(format!("metadata request timed out after {timeout:?}"))
                .with_source(e)
                .with_context(format!("url: {url}"))
        })?
}

/// Turn a failed IMDS response into an error that names the failing step.
pub fn parse_imds_error(action: &str, status: StatusCode, body: &str) -> Error {
    let message = format!("IMDS {action} failed with status {status}");
    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::credential_invalid(message),
        StatusCode::NOT_FOUND => Error::credentials_missing(message),
        _ => Error::unexpected(message),
    };

    if body.is_empty() {
        err
    } else {
        err.with_context(format!("body: {body}"))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use awsreq_core::ErrorKind;
    use test_case::test_case;

    #[test_case(StatusCode::UNAUTHORIZED, ErrorKind::CredentialInvalid)]
    #[test_case(StatusCode::NOT_FOUND, ErrorKind::CredentialsMissing)]
    #[test_case(StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Unexpected)]
    fn test_parse_imds_error(status: StatusCode, kind: ErrorKind) {
        let err = parse_imds_error("fetch_token", status, "denied");
        assert_eq!(err.kind(), kind);
        assert!(err.message().contains("fetch_token"));
        assert_eq!(err.context(), ["body: denied"]);
    }
}
