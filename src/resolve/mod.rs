//! Endpoint resolution.
//!
//! - provider URL templates (`url`)
//! - the resolution stage that validates every registry row (`endpoints`)

pub mod endpoints;
pub mod url;

pub use endpoints::*;
pub use url::*;
