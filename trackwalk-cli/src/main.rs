//! TrackWalk CLI - Command-line interface
//!
//! Steps through a GPS track in the terminal while keeping a street-level
//! imagery link in sync with the current position.

mod commands;
mod error;
mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use trackwalk::config::ConfigFile;

use commands::config::ConfigCommands;
use commands::view::ViewArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "trackwalk")]
#[command(version, about = "Step through a GPS track with synchronized street-level imagery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a GPX track point by point
    View {
        /// GPX file to load
        file: PathBuf,

        /// Google Maps API key (overrides imagery.api_key)
        #[arg(long)]
        api_key: Option<String>,

        /// Do not recenter the map after each imagery update
        #[arg(long)]
        no_follow: bool,
    },

    /// View or modify configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::View {
            file,
            api_key,
            no_follow,
        } => {
            let config = ConfigFile::load()?;
            let _log_guard =
                trackwalk::logging::init(&config.logging.directory, &config.logging.level)?;
            tracing::info!(file = %file.display(), "Starting view");

            commands::view::run(
                ViewArgs {
                    file,
                    api_key,
                    no_follow,
                },
                &config,
            )
        }
        Commands::Config(command) => commands::config::run(command),
    }
}
