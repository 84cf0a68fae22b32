//! Sign and send a single AWS SigV4 request.
//!
//! This crate glues the awsreq signing crates into the two command line
//! tools:
//!
//! - `aws-request-signer <service> <region> <host> <method> <path> <body>`
//! - `es-request-signer`, reading `ES_AWS_REGION`, `ES_HOST`, `ES_HTTP_METHOD`,
//!   `ES_PATH` and `ES_DATA`
//!
//! Both resolve a [`RequestParams`], sign it with the default credential chain
//! and print the response body.
//!
//! ```no_run
//! use awsreq::{default_context, run, DispatchOptions, RequestParams};
//!
//! # async fn example() -> awsreq::Result<()> {
//! let params = RequestParams::new(
//!     "es",
//!     "us-east-1",
//!     "search-demo.us-east-1.es.amazonaws.com",
//!     "GET",
//!     "/_search",
//!     "",
//! );
//! let options = DispatchOptions::default();
//! let ctx = default_context(&options)?;
//! run(&ctx, &params, &options, &mut std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub use awsreq_core::{Context, Error, ErrorKind, Result};

/// AWS SigV4 signer and credential providers.
pub mod aws {
    pub use awsreq_aws_v4::*;
}

mod config;
pub use config::*;

mod context;
pub use context::default_context;

mod dispatch;
pub use dispatch::{DispatchOptions, Dispatcher, DEFAULT_TIMEOUT};

mod request;
pub use request::RequestParams;

mod run;
pub use run::{report_error, run, run_with_signer};

mod sign;
pub use sign::{default_signer, sign_headers, sign_request, AwsSigner};
