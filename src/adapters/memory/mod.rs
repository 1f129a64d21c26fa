//! In-memory adapters.
//!
//! - [`store`] - Entity store for equipment, alerts, breakdowns and reorders
//! - [`directory`] - Static recipient directory

mod directory;
mod store;

pub use directory::{DirectorySeed, LabSeed, StaticRecipientDirectory};
pub use store::InMemoryStore;
