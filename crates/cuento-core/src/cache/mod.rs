//! Caché local de borradores (`story_draft_<storyId>`).
//!
//! El cliente guarda junto al progreso (`flow`) el estado libre del
//! formulario (`state`) y la hora de guardado. Cada guardado mueve la entrada
//! anterior a `story_draft_<storyId>_backup`.

use std::collections::HashMap;

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{DRAFT_BACKUP_SUFFIX, DRAFT_KEY_PREFIX};
use crate::errors::WizardError;
use crate::model::FlowState;

/// Almacén clave/valor de strings, al estilo `localStorage`.
pub trait LocalCache {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), WizardError>;
    fn remove(&mut self, key: &str) -> Result<(), WizardError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryLocalCache {
    pub entries: HashMap<String, String>,
}

impl InMemoryLocalCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for InMemoryLocalCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), WizardError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), WizardError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Entrada del borrador local: `{ state, flow, timestamp }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEntry {
    /// Estado libre del formulario; el core no lo interpreta.
    pub state: serde_json::Value,
    pub flow: FlowState,
    /// Milisegundos desde epoch.
    pub timestamp: i64,
}

pub fn draft_key(story_id: &str) -> String {
    format!("{DRAFT_KEY_PREFIX}{story_id}")
}

pub fn backup_key(story_id: &str) -> String {
    format!("{DRAFT_KEY_PREFIX}{story_id}{DRAFT_BACKUP_SUFFIX}")
}

/// Lee y parsea una entrada. Una entrada corrupta cuenta como ausente.
pub fn read_draft<C: LocalCache + ?Sized>(cache: &C, key: &str) -> Option<DraftEntry> {
    let raw = cache.get(key)?;
    match serde_json::from_str::<DraftEntry>(&raw) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("read_draft: corrupt entry key={key} err={e}");
            None
        }
    }
}

/// Guarda el borrador del cuento, rotando el anterior a la clave de respaldo.
pub fn save_draft<C: LocalCache + ?Sized>(cache: &mut C,
                                          story_id: &str,
                                          state: serde_json::Value,
                                          flow: &FlowState)
                                          -> Result<DraftEntry, WizardError> {
    let key = draft_key(story_id);
    if let Some(previous) = cache.get(&key) {
        cache.set(&backup_key(story_id), previous)?;
    }
    let entry = DraftEntry { state,
                             flow: flow.clone(),
                             timestamp: Utc::now().timestamp_millis() };
    let raw = serde_json::to_string(&entry).map_err(|e| WizardError::Cache(format!("serialize draft: {e}")))?;
    cache.set(&key, raw)?;
    debug!("save_draft story_id={story_id} ts={}", entry.timestamp);
    Ok(entry)
}

/// Elimina la entrada principal y la de respaldo.
pub fn discard_draft<C: LocalCache + ?Sized>(cache: &mut C, story_id: &str) -> Result<(), WizardError> {
    cache.remove(&draft_key(story_id))?;
    cache.remove(&backup_key(story_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_format() {
        assert_eq!(draft_key("abc"), "story_draft_abc");
        assert_eq!(backup_key("abc"), "story_draft_abc_backup");
    }

    #[test]
    fn save_rotates_previous_entry_to_backup() {
        let mut cache = InMemoryLocalCache::new();
        let mut flow = FlowState::initial();
        save_draft(&mut cache, "s", json!({"titulo": "uno"}), &flow).expect("save");
        flow.personajes.assigned_count = 1;
        save_draft(&mut cache, "s", json!({"titulo": "dos"}), &flow).expect("save");

        let primary = read_draft(&cache, &draft_key("s")).expect("primary");
        let backup = read_draft(&cache, &backup_key("s")).expect("backup");
        assert_eq!(primary.state, json!({"titulo": "dos"}));
        assert_eq!(backup.state, json!({"titulo": "uno"}));
    }

    #[test]
    fn corrupt_entry_reads_as_absent() {
        let mut cache = InMemoryLocalCache::new();
        cache.set(&draft_key("s"), "{not json".into()).expect("set");
        assert!(read_draft(&cache, &draft_key("s")).is_none());
        cache.set(&draft_key("s"), r#"{"state":{},"flow":{"cuento":"draft"},"timestamp":1}"#.into())
             .expect("set");
        assert!(read_draft(&cache, &draft_key("s")).is_none());
    }

    #[test]
    fn discard_removes_both_keys() {
        let mut cache = InMemoryLocalCache::new();
        let flow = FlowState::initial();
        save_draft(&mut cache, "s", json!({}), &flow).expect("save");
        save_draft(&mut cache, "s", json!({}), &flow).expect("save");
        discard_draft(&mut cache, "s").expect("discard");
        assert!(cache.entries.is_empty());
    }
}
