//! CLI entry point - the composition root.
//!
//! This is the ONLY place where logging is initialized and where the CLI
//! context is bootstrapped. Command dispatch routes to handlers.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use prochub_cli::{Cli, CliConfig, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // Bootstrap the CLI context (composition root)
    let config = CliConfig::resolve(cli.config.as_deref())?;
    let ctx = bootstrap(config)?;

    match command {
        Commands::Run { only } => handlers::run::execute(&ctx, &only).await?,
        Commands::List { json } => handlers::list::execute(&ctx, json)?,
        Commands::Add(args) => handlers::add::execute(&ctx, args)?,
        Commands::Update(args) => handlers::update::execute(&ctx, args)?,
        Commands::Remove { id } => handlers::remove::execute(&ctx, &id)?,
        Commands::Logs { id, tail, output } => {
            handlers::logs::execute(&ctx, &id, tail, output.as_deref())?;
        }
        Commands::Paths => handlers::paths::execute(&ctx)?,
    }

    Ok(())
}
