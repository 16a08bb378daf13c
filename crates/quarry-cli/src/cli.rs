use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for the `quarry` binary.
#[derive(Debug, Parser)]
#[command(name = "quarry", version, about = "Quarry - JSON to RDF batch conversion")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Compact JSON output instead of pretty-printed
    #[arg(long, global = true)]
    pub compact: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra TOML configuration file layered above the defaults
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            compact: self.compact,
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
        }
    }
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub compact: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub config: Option<String>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Process one batch job request and print its response.
    Run(RunArgs),
    /// List the mappings loaded from the mapping configuration.
    Mappings,
    /// Show which mapping and context a source file would get.
    Select(SelectArgs),
}

#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    /// Request document (reads stdin when omitted or `-`)
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    /// Append the job log to this JSON Lines file
    #[arg(long)]
    pub job_log: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct SelectArgs {
    /// Source file name or object key
    pub file_name: String,
}
