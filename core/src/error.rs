use std::fmt;
use thiserror::Error;

/// The error type for awsreq operations
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<String>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No credential could be resolved from any source
    CredentialsMissing,

    /// Credentials exist but are invalid/malformed
    CredentialInvalid,

    /// Request cannot be signed (empty host/region/service, bad header, bad uri)
    InvalidRequestComponent,

    /// Configuration error (unparsable files, invalid values)
    ConfigInvalid,

    /// Connection failure, timeout or any other failure while talking to a remote endpoint
    TransportError,

    /// Unexpected errors (I/O, malformed service responses, etc.)
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a line of context, such as the endpoint or the profile involved.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the message without kind prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the attached context lines.
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Check if this is a credential error
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::CredentialsMissing | ErrorKind::CredentialInvalid
        )
    }
}

// Convenience constructors
impl Error {
    /// Create a credentials missing error
    pub fn credentials_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialsMissing, message)
    }

    /// Create a credential invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Create an invalid request component error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequestComponent, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportError, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::CredentialsMissing => write!(f, "CredentialsMissing"),
            ErrorKind::CredentialInvalid => write!(f, "CredentialInvalid"),
            ErrorKind::InvalidRequestComponent => write!(f, "InvalidRequestComponent"),
            ErrorKind::ConfigInvalid => write!(f, "ConfigInvalid"),
            ErrorKind::TransportError => write!(f, "TransportError"),
            ErrorKind::Unexpected => write!(f, "Unexpected"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::method::InvalidMethod> for Error {
    fn from(err: http::method::InvalidMethod) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(err: http::uri::InvalidUriParts) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_kind() {
        let err = Error::credentials_missing("no credential found in the provider chain");
        assert_eq!(
            err.to_string(),
            "CredentialsMissing: no credential found in the provider chain"
        );
        assert!(err.is_credential_error());
    }

    #[test]
    fn test_context_and_source() {
        let err = Error::transport("failed to send request")
            .with_context("url: http://127.0.0.1:1/")
            .with_source(anyhow::anyhow!("connection refused"));

        assert_eq!(err.kind(), ErrorKind::TransportError);
        assert_eq!(err.context(), ["url: http://127.0.0.1:1/"]);
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()),
            Some("connection refused".to_string())
        );
        assert!(!err.is_credential_error());
    }

    #[test]
    fn test_http_errors_are_request_errors() {
        let err: Error = http::HeaderValue::from_str("bad\nvalue")
            .expect_err("newline is not a valid header value")
            .into();
        assert_eq!(err.kind(), ErrorKind::InvalidRequestComponent);

        let err: Error = "not a uri".parse::<http::Uri>().expect_err("invalid").into();
        assert_eq!(err.kind(), ErrorKind::InvalidRequestComponent);
    }
}
