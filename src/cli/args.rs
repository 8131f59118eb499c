//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    check::CheckArgs, completions::CompletionsArgs, init::InitArgs,
    interactive::InteractiveArgs, list::ListArgs, lot::LotArgs, search::SearchArgs,
    show::ShowArgs, zone::ZoneArgs, zones::ZonesArgs,
};

#[derive(Parser)]
#[command(name = "valves")]
#[command(author, version, about = "Water valve lookup and shutoff impact")]
#[command(long_about = "Look up the valves that isolate a zone or lot, and see which zones and lots lose or keep pressure when they close.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .valves/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new valve lookup project
    Init(InitArgs),

    /// Search valves, zones, and lots and classify the shutoff impact
    Search(SearchArgs),

    /// Show one valve
    Show(ShowArgs),

    /// List every valve
    List(ListArgs),

    /// List every zone with its valve count
    Zones(ZonesArgs),

    /// Show the zone(s) a lot belongs to
    Lot(LotArgs),

    /// Show the lots that belong to a zone
    Zone(ZoneArgs),

    /// Check the sheets for orphaned rows and thinly served zones
    Check(CheckArgs),

    /// Answer repeated searches from a prompt
    Interactive(InteractiveArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables and summaries
    #[default]
    Auto,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
