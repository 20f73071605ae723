mod route;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "visitmap-cli")]
#[command(about = "Map a sales rep's visits as a numbered route")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a visits file and write the route as GeoJSON
    Route {
        /// JSON or YAML file holding the ordered visit list
        #[arg(long)]
        visits: PathBuf,
        /// Write the GeoJSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Show which visits need geocoding without calling the geocoder
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = visitmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Route {
            visits,
            out,
            dry_run,
        }) => route::run_route(&config, &visits, out.as_deref(), dry_run).await?,
        None => println!("visitmap-cli: run `visitmap-cli route --visits <file>`"),
    }

    Ok(())
}
