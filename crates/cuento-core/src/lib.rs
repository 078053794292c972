//! cuento-core: máquina de estados del wizard de creación de cuentos.
//!
//! Seis etapas en orden fijo (personajes, cuento, diseño, vista previa,
//! elección de dedicatoria, dedicatoria) con avance monótono, persistencia
//! ordenada hacia la fila remota y recuperación desde el caché local.
pub mod cache;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod recovery;
pub mod repo;

pub use cache::{DraftEntry, InMemoryLocalCache, LocalCache};
pub use engine::{FlowStore, IgnoredReason, Transition, WizardAction, WizardState};
pub use errors::WizardError;
pub use event::{EventStore, InMemoryEventStore, WizardEvent, WizardEventKind};
pub use model::{FlowState, PersonajesState, Stage, StageStatus};
pub use recovery::{recover, Recovery, RecoverySource};
pub use repo::{InMemoryWizardStateRepository, WizardStateRepository};
