//! Motor del wizard: reducer puro, store, cola de escrituras y servicio de
//! persistencia.

pub mod reducer;
pub mod service;
pub mod store;
pub mod write_queue;

pub use reducer::{reduce, IgnoredReason, Reduction, Transition, WizardAction, WizardState};
pub use service::update_wizard_state;
pub use store::FlowStore;
pub use write_queue::{PendingWrite, WriteOutcome, WriteQueue};
