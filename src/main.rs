//! ldapcached CLI entry point.

use clap::Parser;

use ldapcached::cli::{Cli, Commands};
use ldapcached::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _logger = match LoggerImpl::init(&cli.log_config()) {
        Ok(logger) => logger,
        Err(err) => ldapcached::cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Check(args) => ldapcached::cli::commands::check::execute(args, cli.json).await,
        Commands::Route(args) => ldapcached::cli::commands::route::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        ldapcached::cli::handle_error(err, cli.json);
    }
}
