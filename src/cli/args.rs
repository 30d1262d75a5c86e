//! Defines the command-line arguments and subcommands for the aritygen CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "aritygen",
    version,
    about = "Generates arity-indexed macro families, their dispatch layer, short aliases and undefine sets."
)]
pub struct GenArgs {
    /// Path of the generator configuration.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Maximum arity; overrides the configuration and the arity file.
    #[arg(long, global = true)]
    pub max_arity: Option<usize>,

    /// More log output (repeat for trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate and write every artifact (the default).
    Generate,
    /// Compare the artifacts on disk with a fresh generation; fail if any differ.
    Check,
    /// Print one generated artifact to stdout without writing anything.
    Print {
        /// Destination file name of the artifact, e.g. `no_arity_message_macros.ipp`.
        #[arg(required = true)]
        file: String,
    },
    /// List the destinations `generate` writes.
    List,
}
