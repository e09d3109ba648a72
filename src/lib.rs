pub mod cli;
pub mod command;
pub mod config;
pub mod diff;
pub mod error;
pub mod forge;
pub mod reconciler;
pub mod version;

pub use error::{PrereleaseError, Result};
pub use reconciler::{Outcome, Reconciler};

#[cfg(test)]
pub mod test_helpers;
