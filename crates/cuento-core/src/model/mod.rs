//! Modelo de datos del flujo: etapas, estados y el registro por cuento.

pub mod flow_state;
pub mod stage;
pub mod status;

pub use flow_state::{personajes_status_for, FlowState, Inconsistency, PersonajesState};
pub use stage::{Stage, UnknownStage};
pub use status::StageStatus;
