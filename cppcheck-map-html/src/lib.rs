#![doc = include_str!("../README.md")]

// project specific modules/crates
pub mod cli;
pub mod findings;
pub mod logger;
pub mod report;
pub mod run;
