//! Series registry: which provider series stand in for which canonical indicator.
//!
//! - static country-code table (`countries`)
//! - indicator → source mapping table and `build_series_registry` (`catalog`)

pub mod catalog;
pub mod countries;

pub use catalog::*;
pub use countries::*;
