//! Registro de progreso por cuento (`FlowState`).
//!
//! Es el mismo blob JSON que se guarda en la columna `wizard_state` y en el
//! campo `flow` del borrador local, por eso los nombres de campo siguen el
//! formato camelCase del cliente web.

use serde::{Deserialize, Serialize};

use super::stage::Stage;
use super::status::StageStatus;
use crate::constants::{PERSONAJES_COMPLETED_MIN, PERSONAJES_DRAFT_MIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonajesState {
    pub estado: StageStatus,
    pub assigned_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowState {
    pub personajes: PersonajesState,
    pub cuento: StageStatus,
    pub diseno: StageStatus,
    pub vista_previa: StageStatus,
    pub dedicatoria_choice: StageStatus,
    pub dedicatoria: StageStatus,
}

/// Regla de umbral: 0 -> not_started, 1..=2 -> draft, >=3 -> completed.
pub fn personajes_status_for(count: u32) -> StageStatus {
    if count >= PERSONAJES_COMPLETED_MIN {
        StageStatus::Completed
    } else if count >= PERSONAJES_DRAFT_MIN {
        StageStatus::Draft
    } else {
        StageStatus::NotStarted
    }
}

/// Incoherencia detectada en un estado cargado desde fuera del store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// La etapa figura completa sin que su prerrequisito lo esté.
    CompletedWithoutPrerequisite { stage: Stage, requires: Stage },
    /// `personajes.estado` no coincide con el umbral de `assignedCount`.
    PersonajesMismatch { assigned_count: u32, estado: StageStatus, expected: StageStatus },
}

impl std::fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Inconsistency::CompletedWithoutPrerequisite { stage, requires } => {
                write!(f, "{stage} completed but {requires} is not")
            }
            Inconsistency::PersonajesMismatch { assigned_count, estado, expected } => {
                write!(f, "personajes is {estado} with assignedCount={assigned_count} (expected {expected})")
            }
        }
    }
}

impl FlowState {
    /// Registro inicial: todo `not_started`, sin personajes asignados.
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn status_of(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Personajes => self.personajes.estado,
            Stage::Cuento => self.cuento,
            Stage::Diseno => self.diseno,
            Stage::VistaPrevia => self.vista_previa,
            Stage::DedicatoriaChoice => self.dedicatoria_choice,
            Stage::Dedicatoria => self.dedicatoria,
        }
    }

    pub(crate) fn set_status(&mut self, stage: Stage, status: StageStatus) {
        match stage {
            Stage::Personajes => self.personajes.estado = status,
            Stage::Cuento => self.cuento = status,
            Stage::Diseno => self.diseno = status,
            Stage::VistaPrevia => self.vista_previa = status,
            Stage::DedicatoriaChoice => self.dedicatoria_choice = status,
            Stage::Dedicatoria => self.dedicatoria = status,
        }
    }

    /// El prerrequisito de `stage` está completo (o no tiene).
    pub fn can_advance(&self, stage: Stage) -> bool {
        match stage.prerequisite() {
            Some(req) => self.status_of(req).is_completed(),
            None => true,
        }
    }

    /// Una etapa está desbloqueada si ya fue abierta o si su prerrequisito
    /// está completo. La UI usa esto para habilitar la navegación.
    pub fn is_unlocked(&self, stage: Stage) -> bool {
        self.status_of(stage) != StageStatus::NotStarted || self.can_advance(stage)
    }

    /// Primera etapa no completada, en orden. `None` cuando todo está completo.
    pub fn current_stage(&self) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| !self.status_of(*s).is_completed())
    }

    pub fn completed_count(&self) -> usize {
        Stage::ALL.iter().filter(|s| self.status_of(**s).is_completed()).count()
    }

    /// Ninguna etapa fue abierta todavía.
    pub fn is_unstarted(&self) -> bool {
        Stage::ALL.iter().all(|s| self.status_of(*s) == StageStatus::NotStarted)
    }

    /// Lista las violaciones de orden y de umbral. Sólo informativo: un estado
    /// recuperado se adopta igual aunque tenga incoherencias.
    pub fn inconsistencies(&self) -> Vec<Inconsistency> {
        let mut out = Vec::new();
        let expected = personajes_status_for(self.personajes.assigned_count);
        if expected != self.personajes.estado {
            out.push(Inconsistency::PersonajesMismatch { assigned_count: self.personajes.assigned_count,
                                                         estado: self.personajes.estado,
                                                         expected });
        }
        for stage in Stage::ALL {
            if let Some(req) = stage.prerequisite() {
                if self.status_of(stage).is_completed() && !self.status_of(req).is_completed() {
                    out.push(Inconsistency::CompletedWithoutPrerequisite { stage, requires: req });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn threshold_rule() {
        assert_eq!(personajes_status_for(0), StageStatus::NotStarted);
        assert_eq!(personajes_status_for(1), StageStatus::Draft);
        assert_eq!(personajes_status_for(2), StageStatus::Draft);
        assert_eq!(personajes_status_for(3), StageStatus::Completed);
        assert_eq!(personajes_status_for(40), StageStatus::Completed);
    }

    #[test]
    fn wire_format_matches_client_blob() {
        let state = FlowState::initial();
        let v = serde_json::to_value(&state).expect("serialize");
        assert_eq!(v,
                   json!({
                       "personajes": { "estado": "not_started", "assignedCount": 0 },
                       "cuento": "not_started",
                       "diseno": "not_started",
                       "vistaPrevia": "not_started",
                       "dedicatoriaChoice": "not_started",
                       "dedicatoria": "not_started"
                   }));
    }

    #[test]
    fn missing_fields_fail_to_parse() {
        let v = json!({ "personajes": { "estado": "draft", "assignedCount": 1 }, "cuento": "draft" });
        assert!(serde_json::from_value::<FlowState>(v).is_err());
    }

    #[test]
    fn derived_flags() {
        let mut s = FlowState::initial();
        assert_eq!(s.current_stage(), Some(Stage::Personajes));
        assert!(s.is_unlocked(Stage::Personajes));
        assert!(!s.is_unlocked(Stage::Cuento));
        s.personajes = PersonajesState { estado: StageStatus::Completed, assigned_count: 3 };
        assert!(s.is_unlocked(Stage::Cuento));
        assert!(s.can_advance(Stage::Cuento));
        assert!(!s.can_advance(Stage::Diseno));
        assert_eq!(s.current_stage(), Some(Stage::Cuento));
        assert_eq!(s.completed_count(), 1);
        assert!(!s.is_unstarted());
    }

    #[test]
    fn detects_inconsistencies() {
        let mut s = FlowState::initial();
        s.diseno = StageStatus::Completed;
        s.personajes.assigned_count = 2;
        let found = s.inconsistencies();
        assert!(found.contains(&Inconsistency::CompletedWithoutPrerequisite { stage: Stage::Diseno,
                                                                              requires: Stage::Cuento }));
        assert!(found.iter().any(|i| matches!(i, Inconsistency::PersonajesMismatch { .. })));
        assert!(FlowState::initial().inconsistencies().is_empty());
    }
}
