//! Civic Quest CLI entry point.

use clap::Parser;

use civic_quest::cli::{commands, handle_error, Cli, Commands};
use civic_quest::infrastructure::config::ConfigLoader;
use civic_quest::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    let json = cli.json;
    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, &config, cli.config.as_deref(), json).await,
        Commands::Tasks(args) => commands::task::list(args, &config, json).await,
        Commands::Complete(args) => commands::task::complete(args, &config, json).await,
        Commands::Grant(args) => commands::task::grant(args, &config, json).await,
        Commands::Member(args) => commands::member::execute(args, &config, json).await,
        Commands::Leaderboard(args) => commands::member::leaderboard(args, &config, json).await,
        Commands::Tiers(args) => commands::tier::execute(&args, &config, json),
        Commands::Reconcile(args) => commands::reconcile::execute(args, &config, json).await,
    };

    if let Err(err) = result {
        handle_error(err, json);
    }
}
