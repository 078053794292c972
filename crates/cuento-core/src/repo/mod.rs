pub mod types;
pub use types::{InMemoryWizardStateRepository, StoredWizardState, WizardStateRepository};
