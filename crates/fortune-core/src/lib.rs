//! Core types and the reward engine for the fortune-cookie rewards program.
//!
//! No HTTP or database code lives here. Storage backends implement
//! [`store::DocumentStore`]; set progress, summaries and merge rules are
//! plain data in and out.

pub mod automation;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod lenient;
pub mod profile;
pub mod progress;
pub mod settings;
pub mod store;
pub mod summary;

pub use engine::{RewardEngine, RewardsConfig};
pub use error::{Error, Result};
