//! Cola ordenada de escrituras hacia la fila remota.
//!
//! Invariantes:
//! - FIFO estricto: las escrituras llegan al backend en el orden de las
//!   transiciones (`seq` creciente).
//! - Una escritura nueva para el mismo cuento que la cola reemplaza a la cola
//!   (la fila se sobrescribe completa, la anterior ya no aporta nada).
//! - Toda transición aplicada produce una escritura, aunque el estado sea igual
//!   al último enviado: otro cliente pudo haber pisado la fila entretanto.
//! - Un error transitorio detiene el vaciado y deja la escritura al frente;
//!   uno permanente o de validación la descarta y sigue con la próxima.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::service::update_wizard_state;
use crate::errors::{classify_error, ErrorClass, WizardError};
use crate::hashing::fingerprint;
use crate::model::FlowState;
use crate::repo::WizardStateRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub seq: u64,
    pub story_id: String,
    pub estado: FlowState,
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Persisted { seq: u64, story_id: String, updated_at: DateTime<Utc> },
    /// Error no recuperable; la escritura se descartó.
    Dropped { seq: u64, story_id: String, error: WizardError },
    /// Error transitorio; la escritura sigue al frente de la cola.
    Retained { seq: u64, story_id: String, error: WizardError },
}

#[derive(Debug, Default)]
pub struct WriteQueue {
    pending: VecDeque<PendingWrite>,
    next_seq: u64,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingWrite> {
        self.pending.iter()
    }

    /// Encola el estado del cuento y devuelve el `seq` asignado.
    pub fn enqueue(&mut self, story_id: &str, estado: &FlowState) -> u64 {
        let fp = fingerprint(estado);
        let seq = self.next_seq;
        self.next_seq += 1;
        let write = PendingWrite { seq,
                                   story_id: story_id.to_string(),
                                   estado: estado.clone(),
                                   fingerprint: fp };
        match self.pending.back_mut() {
            Some(tail) if tail.story_id == story_id => {
                debug!("write_queue:coalesce story_id={story_id} seq {} -> {seq}", tail.seq);
                *tail = write;
            }
            _ => self.pending.push_back(write),
        }
        seq
    }

    /// Vacía la cola en orden. Se detiene en el primer error transitorio.
    pub fn flush<R>(&mut self, repo: &mut R) -> Vec<WriteOutcome>
        where R: WizardStateRepository + ?Sized
    {
        let mut outcomes = Vec::new();
        while let Some(head) = self.pending.pop_front() {
            match update_wizard_state(&mut *repo, &head.story_id, &head.estado) {
                Ok(updated_at) => {
                    debug!("write_queue:persisted seq={} story_id={} fp={}", head.seq, head.story_id, head.fingerprint);
                    outcomes.push(WriteOutcome::Persisted { seq: head.seq,
                                                            story_id: head.story_id,
                                                            updated_at });
                }
                Err(error) => match classify_error(&error) {
                    ErrorClass::Transient => {
                        warn!("write_queue:retain seq={} story_id={} err={error}", head.seq, head.story_id);
                        outcomes.push(WriteOutcome::Retained { seq: head.seq,
                                                               story_id: head.story_id.clone(),
                                                               error });
                        self.pending.push_front(head);
                        break;
                    }
                    ErrorClass::Permanent | ErrorClass::Validation => {
                        warn!("write_queue:drop seq={} story_id={} err={error}", head.seq, head.story_id);
                        outcomes.push(WriteOutcome::Dropped { seq: head.seq,
                                                              story_id: head.story_id,
                                                              error });
                    }
                },
            }
        }
        outcomes
    }
}
