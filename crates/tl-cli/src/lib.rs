//! Timelog CLI library.
//!
//! This crate provides the CLI interface for timelog.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, PeriodArgs, ReportArgs};
pub use config::Config;
