#![deny(clippy::unwrap_used)]

//! This module holds the Command Line Interface design.

// non-std crates
use clap::{Parser, ValueEnum};

// project specific modules/crates
use crate::findings::SourceTarget;

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum Verbosity {
    Info,
    Debug,
}

impl Verbosity {
    pub fn is_debug(&self) -> bool {
        matches!(self, Verbosity::Debug)
    }
}

/// A structure to contain parsed CLI options.
#[derive(Debug, Clone, Parser)]
#[command(author, about)]
pub struct Cli {
    /// The project key used when addressing source files in the browser.
    pub project: String,

    /// The repository slug within the project.
    pub repo: String,

    /// The branch the analyzed sources were taken from.
    ///
    /// This only appears in the report's generation stamp;
    /// links address the commit ref instead.
    #[arg(verbatim_doc_comment)]
    pub branch: String,

    /// The commit or ref used as the `at=` query value of every link.
    ///
    /// Expected pre-encoded, eg. `refs%2Fheads%2Fmain`.
    #[arg(verbatim_doc_comment)]
    pub commit: String,

    /// This controls the tool's verbosity on the standard error stream.
    ///
    /// This option does not affect the generated report.
    #[arg(
        short,
        long,
        default_value = "info",
        default_missing_value = "debug",
        num_args = 0..=1
    )]
    pub verbosity: Verbosity,
}

impl From<&Cli> for SourceTarget {
    /// Extract the link-addressing parameters from parsed CLI options.
    fn from(args: &Cli) -> Self {
        SourceTarget {
            project: args.project.clone(),
            repo: args.repo.clone(),
            commit: args.commit.clone(),
        }
    }
}
