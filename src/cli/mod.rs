//! Command-line parsing for the interval engine.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the engine code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::io::snapshot::GroupKeys;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "dci",
    version,
    about = "Displacement-characteristic settings/forecast interval engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the current snapshot and print the form + interval table.
    Show(FetchArgs),
    /// Fetch, submit a recalculate request, and print the refreshed table.
    Recalc(FetchArgs),
    /// Recalculate, then persist the result through the save service.
    Save(FetchArgs),
    /// Apply a recorded event script to a synthetic snapshot and print the
    /// resulting table (deterministic, offline).
    Replay(ReplayArgs),
    /// Print the table built from a synthetic snapshot.
    Sample(SampleArgs),
}

/// Well-group selection shared by the backend-facing commands.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// Ventures key of the well group.
    #[arg(long)]
    pub ventures: String,

    /// Workshop key of the well group.
    #[arg(long)]
    pub workshop: String,

    /// Field key of the well group.
    #[arg(long)]
    pub field: String,

    /// Well-group key.
    #[arg(long = "group-well")]
    pub group_well: String,

    /// Write the export-boundary report content to this JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

impl FetchArgs {
    pub fn keys(&self) -> GroupKeys {
        GroupKeys {
            ventures: self.ventures.clone(),
            workshop: self.workshop.clone(),
            field: self.field.clone(),
            group_well: self.group_well.clone(),
        }
    }
}

/// Options for offline event replay.
#[derive(Debug, Parser)]
pub struct ReplayArgs {
    /// Event script: a JSON array of table events.
    #[arg(long, value_name = "JSON")]
    pub script: PathBuf,

    /// Seed for the synthetic snapshot the script is applied to.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of algorithm rows in the synthetic snapshot.
    #[arg(long, default_value_t = 5)]
    pub algorithms: usize,

    /// Write the export-boundary report content to this JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

/// Options for printing a synthetic snapshot.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Seed for the synthetic snapshot.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of algorithm rows.
    #[arg(long, default_value_t = 5)]
    pub algorithms: usize,
}
