//! Barista command-line client

use std::process::ExitCode;

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    barista::config::load_dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = barista::observability::init(cli.logging()) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    cli.run().await
}
