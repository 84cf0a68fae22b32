//! AWS SigV4 signing for awsreq.
//!
//! This crate provides the [`Credential`] type, the SigV4 [`RequestSigner`]
//! and the credential providers that make up the default chain.
//!
//! ## Example
//!
//! ```no_run
//! use awsreq_aws_v4::{DefaultCredentialProvider, RequestSigner};
//! use awsreq_core::{Context, OsEnv, Result, Signer};
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let signer = Signer::new(
//!     ctx,
//!     DefaultCredentialProvider::new(),
//!     RequestSigner::new("es", "us-east-1"),
//! );
//!
//! let mut parts = http::Request::get("https://search-demo.us-east-1.es.amazonaws.com/_search")
//!     .body(())?
//!     .into_parts()
//!     .0;
//! signer.sign(&mut parts, None).await?;
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::*;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;
