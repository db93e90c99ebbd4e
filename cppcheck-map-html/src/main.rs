#![cfg(not(test))]
/// This crate is the binary executable's entrypoint.
use std::{env, process::ExitCode};

use ::cppcheck_map_html::run::run_main;
use anyhow::Result;

/// This function simply forwards CLI args to [`run_main()`].
pub fn main() -> Result<ExitCode> {
    Ok(ExitCode::from(run_main(
        env::args().collect::<Vec<String>>(),
    )?))
}
