use awsreq::{default_context, report_error, run, EsArgs};
use awsreq_core::{Context, OsEnv};
use clap::Parser;
use std::io;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = EsArgs::parse();

    let result: awsreq::Result<()> = async {
        let (params, options) = args.resolve(&Context::new().with_env(OsEnv))?;
        let ctx = default_context(&options)?;
        run(&ctx, &params, &options, &mut io::stdout().lock()).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = report_error(&err, &mut io::stderr().lock());
            ExitCode::FAILURE
        }
    }
}
