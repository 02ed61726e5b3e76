//! # roost-cli
//!
//! Command-line client for the Roost module registry. Handles command
//! parsing, sets up logging, and dispatches to the command handlers.

use clap::{Parser, Subcommand, ValueEnum};
use roost_config::ConfigFormat;
use roost_core::error::RoostResult;
use tracing::error;

mod commands;
mod keyfile;
mod output;

/// Command-line client for the Roost module registry
#[derive(Parser)]
#[command(name = "roost", version, about = "Module registry client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display the dependency tree of a local or remote module
    Info {
        /// Entry module, a file path or an http(s) URL
        file: String,
        /// Expand repeated subtrees instead of folding them
        #[arg(short, long)]
        full: bool,
        /// Print canonical URLs without shortening
        #[arg(short, long)]
        raw: bool,
    },
    /// Create a module configuration in the current directory
    Init {
        /// Module name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
        /// Gallery description
        #[arg(long)]
        description: Option<String>,
        /// Entry file
        #[arg(long, default_value = "mod.ts")]
        entry: String,
        /// Configuration format
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
    /// Store the registry API key
    Link {
        /// API key created on the registry
        key: String,
    },
    /// Publish the current module to the registry
    Publish {
        /// Module name (overrides the configuration)
        name: Option<String>,
        /// Stop before anything is uploaded
        #[arg(short, long)]
        dry_run: bool,
        /// Version to publish
        #[arg(long)]
        version: Option<String>,
        /// Gallery description
        #[arg(long)]
        description: Option<String>,
        /// Link to the source repository
        #[arg(long)]
        repository: Option<String>,
        /// Entry file of the module
        #[arg(long, default_value = "mod.ts")]
        entry: String,
        /// Flag this version as unstable
        #[arg(long)]
        unstable: bool,
        /// Hide the module from the gallery
        #[arg(long)]
        unlisted: bool,
        /// Do not mark this version as the latest
        #[arg(long)]
        no_latest: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for ConfigFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => ConfigFormat::Json,
            FormatArg::Yaml => ConfigFormat::Yaml,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if let Err(err) = run(cli) {
        error!("{err}");
        if let Some(tip) = err.suggestion() {
            eprintln!("tip: {tip}");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> RoostResult<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| roost_core::error::RoostError::io("failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = commands::CommandContext::new()?;
        commands::dispatch(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "roost_cli={level},roost_core={level},roost_config={level},roost_registry={level},roost_resolver={level}"
        ))
        .with_target(false)
        .without_time()
        .init();
}
