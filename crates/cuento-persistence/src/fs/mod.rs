//! Backends en sistema de archivos.
//!
//! - `FsLocalCache`: caché local de borradores, un archivo por clave.
//! - `FsWizardStateRepository`: una fila por cuento en `<dir>/<id>.json`,
//!   para operar sin base de datos configurada.
//!
//! Las escrituras van a un archivo temporal y luego se renombran, de modo que
//! un lector nunca ve un archivo a medio escribir.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use cuento_core::{FlowState, LocalCache, WizardError, WizardStateRepository};

use crate::error::PersistenceError;

/// Nombre de archivo para una clave arbitraria. Percent-encoding: claves
/// distintas nunca comparten archivo y `/` no puede escapar del directorio.
fn file_name_for(key: &str) -> String {
    format!("{}.json", urlencoding::encode(key))
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_optional(path: &Path) -> Result<Option<String>, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone)]
pub struct FsLocalCache {
    dir: PathBuf,
}

impl FsLocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name_for(key))
    }
}

impl LocalCache for FsLocalCache {
    fn get(&self, key: &str) -> Option<String> {
        read_optional(&self.path_for(key)).ok().flatten()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), WizardError> {
        write_atomic(&self.path_for(key), &value).map_err(|e| WizardError::Cache(e.to_string()))
    }

    fn remove(&mut self, key: &str) -> Result<(), WizardError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WizardError::Cache(e.to_string())),
        }
    }
}

/// Contenido de cada archivo de fila.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRow {
    pub id: String,
    pub wizard_state: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FsWizardStateRepository {
    dir: PathBuf,
}

impl FsWizardStateRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, story_id: &str) -> PathBuf {
        self.dir.join(file_name_for(story_id))
    }

    pub fn load_row(&self, story_id: &str) -> Result<Option<StoryRow>, PersistenceError> {
        match read_optional(&self.path_for(story_id))? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw).map(Some)
                                                   .map_err(|e| PersistenceError::InvalidPayload(e.to_string())),
        }
    }
}

impl WizardStateRepository for FsWizardStateRepository {
    fn update_wizard_state(&mut self, story_id: &str, estado: &FlowState) -> Result<DateTime<Utc>, WizardError> {
        let wizard_state = serde_json::to_value(estado).map_err(|e| WizardError::Internal(format!("serialize FlowState: {e}")))?;
        let row = StoryRow { id: story_id.to_string(),
                             wizard_state: Some(wizard_state),
                             updated_at: Utc::now() };
        let raw = serde_json::to_string_pretty(&row).map_err(|e| WizardError::Internal(e.to_string()))?;
        write_atomic(&self.path_for(story_id), &raw)?;
        debug!("fs:update_wizard_state story_id={story_id} updated_at={}", row.updated_at);
        Ok(row.updated_at)
    }

    fn load_wizard_state(&self, story_id: &str) -> Result<Option<FlowState>, WizardError> {
        let Some(row) = self.load_row(story_id)? else {
            return Ok(None);
        };
        if row.id != story_id {
            warn!("fs:load_wizard_state story_id={story_id} file belongs to {}; ignored", row.id);
            return Ok(None);
        }
        match row.wizard_state {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => serde_json::from_value(v).map(Some)
                                                .map_err(|e| WizardError::CorruptState(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_encoded() {
        assert_eq!(file_name_for("story_draft_abc-1"), "story_draft_abc-1.json");
        assert_eq!(file_name_for("../etc/passwd"), "..%2Fetc%2Fpasswd.json");
        assert_ne!(file_name_for("cuento.1"), file_name_for("cuento_1"));
        assert_ne!(file_name_for("a/b"), file_name_for("a_b"));
    }
}
