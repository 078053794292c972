//! Reducer puro del wizard.
//!
//! `reduce` recibe el estado actual y una acción, y devuelve el estado
//! siguiente junto con el resultado de la transición. No hace I/O: el
//! `FlowStore` decide qué hacer con `persist`.

use serde::{Deserialize, Serialize};

use crate::model::{personajes_status_for, FlowState, Stage, StageStatus};

/// Estado completo del store: cuento en curso + progreso.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WizardState {
    pub current_story_id: Option<String>,
    pub estado: FlowState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    SetStoryId(String),
    SetPersonajes(u32),
    AvanzarEtapa(Stage),
    RegresarEtapa(Stage),
    SetEstadoCompleto(FlowState),
    ResetEstado,
}

impl WizardAction {
    pub fn name(&self) -> &'static str {
        match self {
            WizardAction::SetStoryId(_) => "setStoryId",
            WizardAction::SetPersonajes(_) => "setPersonajes",
            WizardAction::AvanzarEtapa(_) => "avanzarEtapa",
            WizardAction::RegresarEtapa(_) => "regresarEtapa",
            WizardAction::SetEstadoCompleto(_) => "setEstadoCompleto",
            WizardAction::ResetEstado => "resetEstado",
        }
    }
}

/// Motivo por el que una guarda rechazó la acción.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoredReason {
    /// El prerrequisito de la etapa no está completo.
    PrerequisiteIncomplete { stage: Stage, requires: Stage },
    /// La etapa se deriva del conteo de personajes.
    DerivedStage { stage: Stage },
    /// No se retrocede una etapa completa.
    AlreadyCompleted { stage: Stage },
}

impl std::fmt::Display for IgnoredReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IgnoredReason::PrerequisiteIncomplete { stage, requires } => {
                write!(f, "{stage} requires {requires} to be completed")
            }
            IgnoredReason::DerivedStage { stage } => write!(f, "{stage} is derived from assignedCount"),
            IgnoredReason::AlreadyCompleted { stage } => write!(f, "{stage} is already completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored(IgnoredReason),
}

impl Transition {
    pub fn is_applied(self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Resultado de `reduce`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub state: WizardState,
    pub transition: Transition,
    /// La acción cambia el progreso y debe llegar a la fila remota (si hay
    /// cuento en curso).
    pub persist: bool,
}

pub fn reduce(state: &WizardState, action: WizardAction) -> Reduction {
    let mut next = state.clone();
    let (transition, persist) = match action {
        WizardAction::SetStoryId(id) => {
            next.current_story_id = Some(id);
            (Transition::Applied, false)
        }
        WizardAction::SetPersonajes(count) => {
            apply_personajes(&mut next.estado, count);
            (Transition::Applied, true)
        }
        WizardAction::AvanzarEtapa(stage) => match apply_avanzar(&mut next.estado, stage) {
            Ok(()) => (Transition::Applied, true),
            Err(reason) => (Transition::Ignored(reason), false),
        },
        WizardAction::RegresarEtapa(stage) => match apply_regresar(&mut next.estado, stage) {
            Ok(()) => (Transition::Applied, true),
            Err(reason) => (Transition::Ignored(reason), false),
        },
        WizardAction::SetEstadoCompleto(estado) => {
            next.estado = estado;
            (Transition::Applied, false)
        }
        WizardAction::ResetEstado => {
            next = WizardState::default();
            (Transition::Applied, false)
        }
    };
    if !transition.is_applied() {
        next = state.clone();
    }
    Reduction { state: next, transition, persist }
}

fn apply_personajes(estado: &mut FlowState, count: u32) {
    estado.personajes.assigned_count = count;
    estado.personajes.estado = personajes_status_for(count);
    // Bajar el conteo no retrocede etapas ya avanzadas.
    if estado.personajes.estado.is_completed() && estado.cuento == StageStatus::NotStarted {
        estado.cuento = StageStatus::Draft;
    }
}

fn apply_avanzar(estado: &mut FlowState, stage: Stage) -> Result<(), IgnoredReason> {
    if stage.is_derived() {
        return Err(IgnoredReason::DerivedStage { stage });
    }
    if let Some(req) = stage.prerequisite() {
        if !estado.status_of(req).is_completed() {
            return Err(IgnoredReason::PrerequisiteIncomplete { stage, requires: req });
        }
    }
    estado.set_status(stage, StageStatus::Completed);
    if let Some(next) = stage.next() {
        if estado.status_of(next) == StageStatus::NotStarted {
            estado.set_status(next, StageStatus::Draft);
        }
    }
    Ok(())
}

fn apply_regresar(estado: &mut FlowState, stage: Stage) -> Result<(), IgnoredReason> {
    if stage.is_derived() {
        return Err(IgnoredReason::DerivedStage { stage });
    }
    if estado.status_of(stage).is_completed() {
        return Err(IgnoredReason::AlreadyCompleted { stage });
    }
    estado.set_status(stage, StageStatus::Draft);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_personajes(count: u32) -> WizardState {
        reduce(&WizardState::default(), WizardAction::SetPersonajes(count)).state
    }

    #[test]
    fn personajes_completed_unlocks_cuento() {
        let s = with_personajes(3);
        assert_eq!(s.estado.personajes.estado, StageStatus::Completed);
        assert_eq!(s.estado.cuento, StageStatus::Draft);
    }

    #[test]
    fn avanzar_without_prerequisite_is_ignored() {
        let s = with_personajes(2);
        let r = reduce(&s, WizardAction::AvanzarEtapa(Stage::Cuento));
        assert_eq!(r.transition,
                   Transition::Ignored(IgnoredReason::PrerequisiteIncomplete { stage: Stage::Cuento,
                                                                                requires: Stage::Personajes }));
        assert!(!r.persist);
        assert_eq!(r.state, s);
    }

    #[test]
    fn avanzar_personajes_is_derived() {
        let r = reduce(&with_personajes(3), WizardAction::AvanzarEtapa(Stage::Personajes));
        assert_eq!(r.transition, Transition::Ignored(IgnoredReason::DerivedStage { stage: Stage::Personajes }));
    }

    #[test]
    fn avanzar_does_not_downgrade_next_stage() {
        let mut s = with_personajes(3);
        s.estado.diseno = StageStatus::Completed;
        let r = reduce(&s, WizardAction::AvanzarEtapa(Stage::Cuento));
        assert_eq!(r.state.estado.cuento, StageStatus::Completed);
        assert_eq!(r.state.estado.diseno, StageStatus::Completed);
    }

    #[test]
    fn avanzar_last_stage_has_no_next() {
        let mut s = WizardState::default();
        s.estado.dedicatoria_choice = StageStatus::Completed;
        let r = reduce(&s, WizardAction::AvanzarEtapa(Stage::Dedicatoria));
        assert!(r.transition.is_applied());
        assert_eq!(r.state.estado.dedicatoria, StageStatus::Completed);
    }

    #[test]
    fn regresar_never_downgrades_completed() {
        let s = reduce(&with_personajes(3), WizardAction::AvanzarEtapa(Stage::Cuento)).state;
        let r = reduce(&s, WizardAction::RegresarEtapa(Stage::Cuento));
        assert_eq!(r.transition, Transition::Ignored(IgnoredReason::AlreadyCompleted { stage: Stage::Cuento }));
        assert_eq!(r.state.estado.cuento, StageStatus::Completed);
    }

    #[test]
    fn regresar_marks_not_started_as_draft() {
        let r = reduce(&WizardState::default(), WizardAction::RegresarEtapa(Stage::VistaPrevia));
        assert!(r.transition.is_applied());
        assert!(r.persist);
        assert_eq!(r.state.estado.vista_previa, StageStatus::Draft);
    }

    #[test]
    fn set_estado_completo_skips_validation_and_persistence() {
        let mut estado = FlowState::initial();
        estado.dedicatoria = StageStatus::Completed;
        let r = reduce(&WizardState::default(), WizardAction::SetEstadoCompleto(estado.clone()));
        assert_eq!(r.state.estado, estado);
        assert!(!r.persist);
    }

    #[test]
    fn reset_clears_story_id() {
        let mut s = with_personajes(3);
        s.current_story_id = Some("s-1".into());
        let r = reduce(&s, WizardAction::ResetEstado);
        assert_eq!(r.state, WizardState::default());
    }
}
