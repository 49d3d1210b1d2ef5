use std::process::ExitCode;

use clap::Parser;
mod commands;
mod error;
mod http;
mod logging;
use commands::cli;
use dltrigger_core::config;
use error::CliError;

const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = cli::Args::parse();
    let cmd = args.command.take();

    match dispatch(cmd, args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "dltrigger failed");
            eprintln!("dltrigger: {}", error_chain(&e));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn dispatch(cmd: Option<cli::Commands>, args: cli::Args) -> Result<u8, CliError> {
    let mut cfg = config::load(args.config.as_deref())?;
    args.overrides.apply(&mut cfg);
    config::validate(&cfg)?;

    let _guard = logging::init_logging(&cfg.logging)?;

    match cmd {
        None | Some(cli::Commands::Serve) => {
            commands::http_server::handle_http_server(&cfg).await?;
            Ok(0)
        }
        Some(cli::Commands::Run(run_args)) => {
            commands::run::handle_run(&run_args, &cfg).await
        }
    }
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        let next = s.to_string();
        if !msg.contains(&next) {
            msg.push_str(": ");
            msg.push_str(&next);
        }
        source = s.source();
    }
    msg
}
