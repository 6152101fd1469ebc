//! Tahap - a procurement stage ledger
//!
//! This library provides the core functionality for Tahap, including:
//! - The stage scheduler: initial schedule building, the cascade rescheduler
//!   run on actual completion of a variable-duration stage, and planned date
//!   overrides
//! - The built-in catalog of procurement types and their stage templates
//! - Database operations and migrations
//! - Data models and the repository layer for data access
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use tahap::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod repo;
pub mod schedule;
pub mod utils;
