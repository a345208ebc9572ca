//! HTTP service and command-line entry points for the talent matching engine.

mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use talent_match::error::AppError;

/// Parse the command line and run the selected subcommand, serving HTTP when none is given.
pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
