//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::fil::FilCommands;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::order::OrderCommands;
use crate::cli::commands::prod::ProdCommands;

#[derive(Parser, Debug)]
#[command(
    name = "printdesk",
    version,
    about = "Plain-text order book for a small 3D-print shop"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a printdesk project in the current directory
    Init(InitArgs),

    /// Manage filament inventory
    #[command(subcommand)]
    Fil(FilCommands),

    /// Manage product templates
    #[command(subcommand)]
    Prod(ProdCommands),

    /// Manage orders
    #[command(subcommand)]
    Order(OrderCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table for lists, pretty text for single entities
    Auto,
    /// Aligned table
    Table,
    /// Raw YAML
    Yaml,
    /// Pretty-printed JSON
    Json,
    /// Comma-separated values
    Csv,
    /// Bare entity ids, one per line (for pipelines)
    Id,
}
