// SPDX-License-Identifier: MPL-2.0
use nginxpulse_client::cli::{self, Flags};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let flags = match Flags::from_env() {
        Ok(flags) => flags,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    match cli::run(flags).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
