//! `macro-catalog` library crate.
//!
//! Catalogs macroeconomic indicator series across the World Bank, Eurostat and
//! the IMF, resolves each catalog entry to a fetchable endpoint, and normalizes
//! the three providers' payloads into one annual (period, year, value) table.
//!
//! The binary (`macrocat`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or touching the network
//! - modules are reusable (e.g., notebooks, scheduled jobs)

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod io;
pub mod logging;
pub mod parsers;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod transport;
