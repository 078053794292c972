//! Recuperación del progreso al abrir el wizard.
//!
//! Orden fijo: borrador local, respaldo local, fila remota, estado inicial.
//! Lo corrupto o fallido cuenta como ausente y se pasa al siguiente origen.

use log::{debug, warn};

use crate::cache::{backup_key, draft_key, read_draft, LocalCache};
use crate::model::FlowState;
use crate::repo::WizardStateRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySource {
    LocalDraft,
    LocalBackup,
    Remote,
    Initial,
}

impl RecoverySource {
    pub fn as_str(self) -> &'static str {
        match self {
            RecoverySource::LocalDraft => "local_draft",
            RecoverySource::LocalBackup => "local_backup",
            RecoverySource::Remote => "remote",
            RecoverySource::Initial => "initial",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recovery {
    pub estado: FlowState,
    pub source: RecoverySource,
    /// Estado libre del formulario, si vino de un borrador local.
    pub draft: Option<serde_json::Value>,
}

pub fn recover<C, R>(story_id: &str, cache: &C, repo: &R) -> Recovery
    where C: LocalCache + ?Sized,
          R: WizardStateRepository + ?Sized
{
    let local = [(draft_key(story_id), RecoverySource::LocalDraft),
                 (backup_key(story_id), RecoverySource::LocalBackup)];
    for (key, source) in local {
        if let Some(entry) = read_draft(cache, &key) {
            log_inconsistencies(story_id, &entry.flow);
            debug!("recover story_id={story_id} source={}", source.as_str());
            return Recovery { estado: entry.flow,
                              source,
                              draft: Some(entry.state) };
        }
    }
    match repo.load_wizard_state(story_id) {
        Ok(Some(estado)) => {
            log_inconsistencies(story_id, &estado);
            debug!("recover story_id={story_id} source=remote");
            Recovery { estado,
                       source: RecoverySource::Remote,
                       draft: None }
        }
        Ok(None) => {
            debug!("recover story_id={story_id} source=initial (no remote row)");
            initial()
        }
        Err(e) => {
            warn!("recover story_id={story_id}: remote state unusable ({e}); using initial");
            initial()
        }
    }
}

fn initial() -> Recovery {
    Recovery { estado: FlowState::initial(),
               source: RecoverySource::Initial,
               draft: None }
}

fn log_inconsistencies(story_id: &str, estado: &FlowState) {
    for issue in estado.inconsistencies() {
        warn!("recover story_id={story_id}: {issue}");
    }
}
