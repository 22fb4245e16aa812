//! Clap derive structures for the `lightpoke` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lightpoke -- bridge server-pushed pokes to a WLED-style LED controller
#[derive(Debug, Parser)]
#[command(
    name = "lightpoke",
    version,
    about = "Bridge LightPoke events to a WLED-style LED controller",
    long_about = "Subscribes to a LightPoke server's event stream and briefly overrides\n\
        the lighting state of an LED controller whenever a poke arrives, then\n\
        restores the previous state from a reserved preset.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "LIGHTPOKE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Subscribe to the poke stream and drive the LED controller
    Run(RunArgs),

    /// Trigger a poke for the configured device and exit
    Poke(PokeArgs),

    /// Check whether a server URL would be accepted
    CheckUrl(CheckUrlArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Device API key (overrides the config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// LED controller base URL (overrides the config file)
    #[arg(long)]
    pub device: Option<String>,
}

#[derive(Debug, Args)]
pub struct PokeArgs {
    /// Device API key (overrides the config file)
    #[arg(long)]
    pub api_key: Option<String>,
}

#[derive(Debug, Args)]
pub struct CheckUrlArgs {
    /// Candidate poke server URL
    pub url: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a new config file
    Init {
        /// Device API key
        #[arg(long)]
        api_key: Option<String>,

        /// Poke server URL
        #[arg(long)]
        server: Option<String>,

        /// LED controller base URL
        #[arg(long)]
        device: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
