//! picalc CLI entry point.

use clap::Parser;

use picalc::cli::{self, Cli};
use picalc::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli::load_config(&cli) {
        Ok(config) => config,
        Err(err) => cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Logging disabled: {err:#}");
            None
        }
    };

    if let Err(err) = cli::commands::compute::execute(&cli, config).await {
        cli::handle_error(err, cli.json);
    }
}
