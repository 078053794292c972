use chrono::Utc;

use super::{WizardEvent, WizardEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, story_id: Option<&str>, kind: WizardEventKind) -> WizardEvent;
    /// Lista todos los eventos en orden de `seq`.
    fn list(&self) -> Vec<WizardEvent>;
    /// Eventos de un cuento concreto.
    fn list_for(&self, story_id: &str) -> Vec<WizardEvent> {
        self.list()
            .into_iter()
            .filter(|e| e.story_id.as_deref() == Some(story_id))
            .collect()
    }
}

#[derive(Default)]
pub struct InMemoryEventStore {
    pub inner: Vec<WizardEvent>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, story_id: Option<&str>, kind: WizardEventKind) -> WizardEvent {
        let seq = self.inner.len() as u64;
        let ev = WizardEvent { seq,
                               story_id: story_id.map(str::to_string),
                               kind,
                               ts: Utc::now() };
        self.inner.push(ev.clone());
        ev
    }

    fn list(&self) -> Vec<WizardEvent> {
        self.inner.clone()
    }
}
