//! CLI frontend for moving ShinyMUD areas in and out of plain-text files.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use shiny_port::PortConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shiny",
    about = "ShinyMUD area import and export",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    dirs: DirArgs,

    /// Log debug output from every import and export step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Directory overrides shared by every command.
#[derive(Args)]
struct DirArgs {
    /// Directory holding area files to import (default: $SHINY_IMPORT_DIR or ./areas)
    #[arg(long, global = true)]
    import_dir: Option<PathBuf>,

    /// Directory exported area files are written to (default: $SHINY_EXPORT_DIR or ./areas)
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,
}

impl DirArgs {
    fn into_config(self) -> PortConfig {
        let mut config = PortConfig::from_env();
        if let Some(dir) = self.import_dir {
            config = config.with_import_dir(dir);
        }
        if let Some(dir) = self.export_dir {
            config = config.with_export_dir(dir);
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the area files available for import
    List,

    /// Import area files and report how each one went
    Import {
        /// Area names (file names without .txt), or `all`
        #[arg(required = true)]
        areas: Vec<String>,
    },

    /// Import area files and write them back out in the current format
    Convert {
        /// Area names (file names without .txt), or `all`
        #[arg(required = true)]
        areas: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("shiny=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shiny=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = cli.dirs.into_config();

    let result = match cli.command {
        Commands::List => commands::list::run(&config),
        Commands::Import { areas } => commands::import::run(config, areas),
        Commands::Convert { areas } => commands::convert::run(config, areas),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
