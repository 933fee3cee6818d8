use std::process::ExitCode;

use clap::Parser;

use dockinspect_cli::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match dockinspect_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dockinspect: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
