mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    notifybox::observability::init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Send(args) => commands::send(args).await,
        Commands::Parse(args) => commands::parse(args),
        Commands::Providers => commands::providers(),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
