//! `FlowStore`: dueño del estado en memoria del wizard.
//!
//! Aplica las acciones con `reduce`, deja cada una en la bitácora y encola la
//! escritura remota cuando corresponde. El store es un valor explícito: quien
//! lo crea decide su vida útil y qué backends recibe.

use log::{debug, warn};

use super::reducer::{reduce, Transition, WizardAction, WizardState};
use super::write_queue::{WriteOutcome, WriteQueue};
use crate::cache::LocalCache;
use crate::errors::WizardError;
use crate::event::{EventStore, InMemoryEventStore, WizardEventKind};
use crate::model::{FlowState, Stage};
use crate::recovery::{recover, Recovery};
use crate::repo::WizardStateRepository;

pub struct FlowStore<R: WizardStateRepository, E: EventStore = InMemoryEventStore> {
    state: WizardState,
    repo: R,
    events: E,
    queue: WriteQueue,
    auto_flush: bool,
}

impl<R: WizardStateRepository> FlowStore<R, InMemoryEventStore> {
    pub fn new(repo: R) -> Self {
        Self::new_with_stores(repo, InMemoryEventStore::default())
    }
}

impl<R: WizardStateRepository, E: EventStore> FlowStore<R, E> {
    pub fn new_with_stores(repo: R, events: E) -> Self {
        Self { state: WizardState::default(),
               repo,
               events,
               queue: WriteQueue::new(),
               auto_flush: true }
    }

    /// Con `false`, las escrituras quedan en cola hasta llamar a `flush`.
    pub fn with_auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = auto_flush;
        self
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn estado(&self) -> &FlowState {
        &self.state.estado
    }

    pub fn current_story_id(&self) -> Option<&str> {
        self.state.current_story_id.as_deref()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn event_store(&self) -> &E {
        &self.events
    }

    pub fn pending_writes(&self) -> usize {
        self.queue.len()
    }

    /// Aplica una acción. Nunca falla: una guarda rechazada vuelve como
    /// `Transition::Ignored` y el estado queda intacto.
    pub fn dispatch(&mut self, action: WizardAction) -> Transition {
        let name = action.name();
        let story_before = self.state.current_story_id.clone();
        let reduction = reduce(&self.state, action.clone());
        self.state = reduction.state;
        let story = self.state.current_story_id.clone().or(story_before);

        let kind = match reduction.transition {
            Transition::Applied => {
                debug!("dispatch:{name} applied story_id={story:?}");
                applied_kind(&action, &self.state.estado)
            }
            Transition::Ignored(reason) => {
                debug!("dispatch:{name} ignored story_id={story:?} reason={reason}");
                WizardEventKind::TransitionIgnored { action: name.to_string(), reason }
            }
        };
        self.events.append_kind(story.as_deref(), kind);

        if reduction.persist {
            if let Some(story_id) = self.state.current_story_id.clone() {
                self.queue.enqueue(&story_id, &self.state.estado);
                if self.auto_flush {
                    if let Err(e) = self.flush() {
                        warn!("dispatch:{name} write not persisted story_id={story_id} err={e} pending={}",
                              self.queue.len());
                    }
                }
            }
        }
        reduction.transition
    }

    pub fn set_story_id(&mut self, id: impl Into<String>) -> Transition {
        let id = id.into();
        if id.trim().is_empty() {
            warn!("set_story_id: empty story id accepted");
        }
        self.dispatch(WizardAction::SetStoryId(id))
    }

    pub fn set_personajes(&mut self, count: u32) -> Transition {
        self.dispatch(WizardAction::SetPersonajes(count))
    }

    pub fn avanzar_etapa(&mut self, stage: Stage) -> Transition {
        self.dispatch(WizardAction::AvanzarEtapa(stage))
    }

    pub fn regresar_etapa(&mut self, stage: Stage) -> Transition {
        self.dispatch(WizardAction::RegresarEtapa(stage))
    }

    pub fn set_estado_completo(&mut self, estado: FlowState) -> Transition {
        self.dispatch(WizardAction::SetEstadoCompleto(estado))
    }

    pub fn reset_estado(&mut self) -> Transition {
        self.dispatch(WizardAction::ResetEstado)
    }

    /// Empieza un cuento nuevo: descarta el progreso anterior y fija el id.
    pub fn begin_story(&mut self, id: impl Into<String>) {
        self.reset_estado();
        self.set_story_id(id);
    }

    /// Si el cuento en curso no tiene ninguna etapa abierta, lo descarta.
    pub fn abandon_if_unstarted(&mut self) -> bool {
        if self.state.estado.is_unstarted() {
            self.reset_estado();
            true
        } else {
            false
        }
    }

    /// Fija el cuento y adopta el progreso recuperado (caché local primero,
    /// luego fila remota, luego estado inicial).
    pub fn restore<C: LocalCache + ?Sized>(&mut self, story_id: &str, cache: &C) -> Recovery {
        self.set_story_id(story_id);
        let recovery = recover(story_id, cache, &self.repo);
        self.set_estado_completo(recovery.estado.clone());
        recovery
    }

    /// Envía las escrituras pendientes en orden. Devuelve cuántas llegaron al
    /// backend, o el primer error si alguna falló (retenida o descartada).
    pub fn flush(&mut self) -> Result<usize, WizardError> {
        let outcomes = self.queue.flush(&mut self.repo);
        let mut persisted = 0;
        let mut first_error: Option<WizardError> = None;
        for outcome in outcomes {
            match outcome {
                WriteOutcome::Persisted { seq, story_id, updated_at } => {
                    persisted += 1;
                    self.events
                        .append_kind(Some(story_id.as_str()), WizardEventKind::WritePersisted { write_seq: seq, updated_at });
                }
                WriteOutcome::Dropped { seq, story_id, error } | WriteOutcome::Retained { seq, story_id, error } => {
                    let retained = self.queue.pending().any(|w| w.seq == seq);
                    self.events.append_kind(Some(story_id.as_str()),
                                            WizardEventKind::WriteFailed { write_seq: seq,
                                                                           error: error.to_string(),
                                                                           retained });
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(persisted),
        }
    }
}

fn applied_kind(action: &WizardAction, estado: &FlowState) -> WizardEventKind {
    match action {
        WizardAction::SetStoryId(id) => WizardEventKind::StoryIdSet { story_id: id.clone() },
        WizardAction::SetPersonajes(count) => WizardEventKind::PersonajesUpdated { assigned_count: *count,
                                                                                   estado: estado.personajes.estado },
        WizardAction::AvanzarEtapa(stage) => WizardEventKind::StageAdvanced { stage: *stage },
        WizardAction::RegresarEtapa(stage) => WizardEventKind::StageReverted { stage: *stage },
        WizardAction::SetEstadoCompleto(_) => WizardEventKind::StateReplaced,
        WizardAction::ResetEstado => WizardEventKind::StateReset,
    }
}
