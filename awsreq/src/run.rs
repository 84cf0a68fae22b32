use crate::{default_signer, sign_request, AwsSigner, DispatchOptions, Dispatcher, RequestParams};
use awsreq_core::{Context, Error, Result};
use log::debug;
use std::error::Error as _;
use std::io::Write;

/// Sign `params` with the default credential chain, send it and write the
/// response body to `out`.
pub async fn run(
    ctx: &Context,
    params: &RequestParams,
    options: &DispatchOptions,
    out: &mut impl Write,
) -> Result<()> {
    let signer = default_signer(ctx.clone(), &params.service, &params.region);
    run_with_signer(ctx, &signer, params, options, out).await
}

/// Same as [`run`] with an explicit signer.
///
/// Nothing is sent when the request is invalid or no credential can be loaded.
pub async fn run_with_signer(
    ctx: &Context,
    signer: &AwsSigner,
    params: &RequestParams,
    options: &DispatchOptions,
    out: &mut impl Write,
) -> Result<()> {
    let req = params.to_http_request(options.secure)?;
    debug!("signing {} {}", req.method(), req.uri());
    let req = sign_request(signer, req).await?;

    let body = Dispatcher::new(ctx.clone()).send(req).await?;
    out.write_all(&body)?;
    out.flush()?;
    Ok(())
}

/// Write `err` the way the binaries report failures:
/// `Error: <kind>: <message>`, then its context lines and source chain.
pub fn report_error(err: &Error, w: &mut impl Write) -> std::io::Result<()> {
    writeln!(w, "Error: {err}")?;
    for line in err.context() {
        writeln!(w, "  {line}")?;
    }

    let mut source = err.source();
    while let Some(cause) = source {
        writeln!(w, "  caused by: {cause}")?;
        source = cause.source();
    }
    Ok(())
}
