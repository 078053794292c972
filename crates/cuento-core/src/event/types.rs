//! Tipos de evento del wizard y estructura `WizardEvent`.
//!
//! Rol en el flujo:
//! - Cada acción despachada al `FlowStore` deja un evento, aplicada o no.
//! - Las escrituras remotas (exitosas o fallidas) también quedan registradas,
//!   lo que permite ver en qué orden llegaron al backend.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::IgnoredReason;
use crate::model::{Stage, StageStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WizardEventKind {
    StoryIdSet { story_id: String },
    PersonajesUpdated { assigned_count: u32, estado: StageStatus },
    StageAdvanced { stage: Stage },
    StageReverted { stage: Stage },
    /// Una transición rechazada por guarda. No altera el estado.
    TransitionIgnored { action: String, reason: IgnoredReason },
    StateReplaced,
    StateReset,
    /// La escritura `seq` llegó al backend.
    WritePersisted { write_seq: u64, updated_at: DateTime<Utc> },
    /// La escritura `seq` falló; `retained` indica si sigue en la cola.
    WriteFailed { write_seq: u64, error: String, retained: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub story_id: Option<String>,
    pub kind: WizardEventKind,
    pub ts: DateTime<Utc>,
}
