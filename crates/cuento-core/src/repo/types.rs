//! Puerto hacia la fila remota de cada cuento (`stories.wizard_state`).
//!
//! La fila es la copia durable del `FlowState`: cada escritura la reemplaza
//! completa, sin merge. El backend estampa `updated_at` en cada escritura.
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::errors::WizardError;
use crate::model::FlowState;

/// Contrato de persistencia remota del estado del wizard.
pub trait WizardStateRepository {
    /// Sobrescribe el estado del cuento y devuelve el `updated_at` aplicado.
    fn update_wizard_state(&mut self, story_id: &str, estado: &FlowState) -> Result<DateTime<Utc>, WizardError>;

    /// Lee el estado guardado. `Ok(None)` si el cuento no existe o la columna
    /// está vacía; `Err(CorruptState)` si el blob no tiene forma de `FlowState`.
    fn load_wizard_state(&self, story_id: &str) -> Result<Option<FlowState>, WizardError>;
}

/// Fila tal como la guarda el backend en memoria.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredWizardState {
    pub wizard_state: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Backend en memoria; guarda el blob JSON igual que lo haría la columna real,
/// de modo que los tests puedan sembrar filas corruptas.
#[derive(Default)]
pub struct InMemoryWizardStateRepository {
    pub rows: HashMap<String, StoredWizardState>,
}

impl InMemoryWizardStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta un blob arbitrario (útil para simular filas escritas por otro cliente).
    pub fn seed_raw(&mut self, story_id: &str, wizard_state: serde_json::Value) {
        self.rows.insert(story_id.to_string(),
                         StoredWizardState { wizard_state,
                                             updated_at: Utc::now() });
    }

    pub fn row(&self, story_id: &str) -> Option<&StoredWizardState> {
        self.rows.get(story_id)
    }
}

impl WizardStateRepository for InMemoryWizardStateRepository {
    fn update_wizard_state(&mut self, story_id: &str, estado: &FlowState) -> Result<DateTime<Utc>, WizardError> {
        let wizard_state = serde_json::to_value(estado).map_err(|e| WizardError::Internal(format!("serialize FlowState: {e}")))?;
        let updated_at = Utc::now();
        self.rows.insert(story_id.to_string(), StoredWizardState { wizard_state, updated_at });
        Ok(updated_at)
    }

    fn load_wizard_state(&self, story_id: &str) -> Result<Option<FlowState>, WizardError> {
        match self.rows.get(story_id) {
            None => Ok(None),
            Some(row) if row.wizard_state.is_null() => Ok(None),
            Some(row) => serde_json::from_value(row.wizard_state.clone()).map(Some)
                                                                        .map_err(|e| WizardError::CorruptState(e.to_string())),
        }
    }
}
