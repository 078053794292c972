//! Bitácora append-only de las acciones aplicadas por el store.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{WizardEvent, WizardEventKind};
