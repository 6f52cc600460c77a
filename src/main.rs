use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "eqb")]
#[command(author, version, about = "Build Elasticsearch boolean queries from request parameters")]
struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample definition file
    Init {
        /// Path of the definition file to create
        path: PathBuf,
    },

    /// Validate a definition file, or every YAML file under a directory
    Check {
        /// File or directory to check
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List the parameters a definition declares
    Fields {
        /// Definition file (defaults to the configured one)
        #[arg(long, short)]
        definition: Option<PathBuf>,
    },

    /// Print the query document for a set of parameters
    Build {
        /// Definition file (defaults to the configured one)
        #[arg(long, short)]
        definition: Option<PathBuf>,

        /// JSON or YAML file with parameters
        #[arg(long)]
        params_file: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Parameters (name=value), applied after the params file
        #[arg(trailing_var_arg = true)]
        params: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    cli::logger::init_logger(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Init { path } => cli::commands::init(&path),
        Commands::Check { path } => cli::commands::check(&path),
        Commands::Fields { definition } => {
            let definition = config.resolve_definition(definition)?;
            cli::commands::fields(&definition)
        }
        Commands::Build {
            definition,
            params_file,
            pretty,
            params,
        } => {
            let definition = config.resolve_definition(definition)?;
            cli::commands::build(
                &definition,
                params_file.as_deref(),
                &params,
                pretty || config.pretty,
            )
        }
    }
}
