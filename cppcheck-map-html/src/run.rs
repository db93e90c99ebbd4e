//! This module is the executable backend: it glues the CLI boundary to the
//! finding transform and the page shell.

use std::io::{self, BufRead, Write};

// non-std crates
use anyhow::Result;
use clap::{error::ErrorKind, Parser};
use log::{set_max_level, LevelFilter};

// project specific modules/crates
use crate::{cli::Cli, logger, report};

/// This is the backend entry point for the console application.
///
/// `args` is the full argument vector, leading program path included, as
/// produced by [`std::env::args`]. The returned number is the process exit
/// code: `0` on success, `2` for a usage error. The caller contract for a
/// wrong argument count is fixed: a two-line usage feedback on standard
/// output (not standard error) and exit code `2`.
pub fn run_main(args: Vec<String>) -> Result<u8> {
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print()?;
            return Ok(0);
        }
        Err(_) => {
            println!("Usage: script project repo branch commit < text_report > html_report");
            println!(
                "Received ({:?}) argument vector",
                args.get(1..).unwrap_or_default()
            );
            return Ok(2);
        }
    };

    logger::init().unwrap_or(());
    set_max_level(if cli.verbosity.is_debug() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    log::info!(
        "Mapping findings for {}/{} at {}",
        cli.project,
        cli.repo,
        cli.commit
    );

    let stdin = io::stdin();
    let lines = stdin.lock().lines().map_while(io::Result::ok);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_report(&mut out, lines, &cli)?;
    out.flush()?;
    Ok(0)
}
