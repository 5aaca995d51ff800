//! `owlstream` CLI - resolve AnimeOwl streams or run the addon server

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use owlstream::Config;

#[derive(Parser)]
#[command(name = "owlstream")]
#[command(about = "AnimeOwl stream resolver and media-center addon")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/owlstream/config.toml)
    #[arg(long, global = true, env = "OWLSTREAM_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the addon HTTP server
    Serve {
        /// Listen address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Resolve streams for a content id (e.g. animeowl:frieren)
    Streams {
        /// Prefixed content id
        id: String,

        /// Print the wire JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// List a catalog section (trending, recent-sub, recent-dub, movies)
    Catalog {
        /// Section key
        section: String,

        /// Number of items to skip
        #[arg(short, long, default_value = "0")]
        skip: usize,
    },

    /// Print the addon manifest
    Manifest,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => cmd::serve::cmd_serve(config, bind).await?,
        Commands::Streams { id, json } => cmd::streams::cmd_streams(&config, &id, json).await?,
        Commands::Catalog { section, skip } => {
            cmd::catalog::cmd_catalog(&config, &section, skip).await?;
        }
        Commands::Manifest => cmd::manifest::cmd_manifest(&config)?,
    }

    Ok(())
}
