use std::process::ExitCode;

use clap::Parser;
use roi::cli::{Cli, init_tracing, run};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(&err)
        }
    }
}
