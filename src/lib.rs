//! Electric propulsion designer.
//!
//! The physics and search logic lives in the workspace crates; this facade
//! re-exports them so front-ends (CLI, notebooks, services) share one entry point.

pub use eprop_catalog as catalog;
pub use eprop_core::{atmosphere, constants, units};
pub use eprop_config as config;
pub use eprop_export as export;
pub use eprop_performance as performance;
pub use eprop_propulsion as propulsion;
pub use eprop_search as search;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
