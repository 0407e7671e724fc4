mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The server logs at info; client commands keep stdout for answers.
    let default_directive = match cli.command {
        Commands::Serve(_) => "scholarai=info",
        _ => "scholarai=warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Health(args) => commands::health::run(args).await,
        Commands::Ask(args) => commands::ask::run(args).await,
        Commands::Key(args) => commands::local::key(args).await,
        Commands::Profile(args) => commands::local::profile(args).await,
        Commands::Theme(args) => commands::local::theme(args).await,
    }
}
