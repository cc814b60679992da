use clap::Parser;

use ndvi_retriever::adapter::inbound::cli::command::{CheckCommand, Cli, Commands};
use ndvi_retriever::adapter::inbound::cli::output::{self, OutputConfig};
use ndvi_retriever::adapter::inbound::cli::{check, fetch, lookup};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    let result = match &cli.command {
        Commands::Fetch(args) => fetch::execute(args).await,
        Commands::Lookup(args) => lookup::execute(args).await,
        Commands::Check(CheckCommand::Config(arg)) => check::config::execute_config(&arg.config),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
