//! The aritygen Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, GenArgs};
use crate::engine::Generator;
use crate::output::{self as writer, FileStatus};
use crate::{err_msg, GenError};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = GenArgs::parse();
    init_logging(args.verbose, args.quiet);

    let result = Generator::from_config_file(&args.config)
        .map(|generator| generator.with_max_arity(args.max_arity))
        .and_then(|generator| match args.command.unwrap_or(Command::Generate) {
            Command::Generate => handle_generate(&generator),
            Command::Check => handle_check(&generator),
            Command::Print { file } => handle_print(&generator, &file),
            Command::List => handle_list(&generator),
        });

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Handles `generate`. Nothing is written unless every pass succeeds.
fn handle_generate(generator: &Generator) -> Result<bool, GenError> {
    let artifacts = generator.run()?;
    let dir = generator.output_dir();
    let written = writer::write_all(&artifacts, &dir, &generator.config().banner)?;
    println!("wrote {} artifacts to {}", written.len(), dir.display());
    Ok(true)
}

/// Handles `check`. Returns `false` when any destination is missing or stale.
fn handle_check(generator: &Generator) -> Result<bool, GenError> {
    let artifacts = generator.run()?;
    let files = writer::render_all(&artifacts, &generator.output_dir(), &generator.config().banner);
    let mut stale = 0;
    for file in &files {
        let status = writer::status(file)?;
        if status != FileStatus::UpToDate {
            stale += 1;
        }
        output::print_status(file, &status);
    }
    output::print_summary(stale, files.len());
    Ok(stale == 0)
}

fn handle_print(generator: &Generator, file: &str) -> Result<bool, GenError> {
    let artifacts = generator.run()?;
    let artifact = artifacts
        .iter()
        .find(|a| a.file_name() == file)
        .ok_or_else(|| {
            let known: Vec<_> = artifacts.iter().map(|a| a.file_name()).collect();
            err_msg!(Config, "no artifact named '{}'", file)
                .with_help(format!("generated artifacts: {}", known.join(", ")))
        })?;
    print!("{}", artifact.render(&generator.config().banner));
    Ok(true)
}

fn handle_list(generator: &Generator) -> Result<bool, GenError> {
    let dir = generator.output_dir();
    for artifact in generator.run()? {
        println!("{}", dir.join(artifact.file_name()).display());
    }
    Ok(true)
}
