//! Helpers for keeping secrets out of logs.

use std::fmt;

/// Debug wrapper that hides a secret such as an access key or session token.
///
/// An empty or absent value prints `EMPTY`. Values shorter than 12 bytes
/// print `***`, longer ones keep only their first and last three characters
/// so two different keys can still be told apart in a log line.
#[derive(Clone, Copy)]
pub struct Redact<'a>(Option<&'a str>);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(Some(value))
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(Some(value))
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref())
    }
}

impl fmt::Debug for Redact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = self.0.unwrap_or_default();
        if secret.is_empty() {
            return f.write_str("EMPTY");
        }
        if secret.len() < 12 {
            return f.write_str("***");
        }

        // Keys are ascii, but never split a multi-byte char.
        match (secret.get(..3), secret.get(secret.len() - 3..)) {
            (Some(head), Some(tail)) => write!(f, "{head}***{tail}"),
            _ => f.write_str("***"),
        }
    }
}
