//! Servicio de persistencia: una escritura completa del `FlowState`.

use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::errors::WizardError;
use crate::model::FlowState;
use crate::repo::WizardStateRepository;

/// Escribe el estado completo en la fila del cuento y estampa `updated_at`.
///
/// El error se registra y se devuelve; reintentar es decisión del llamador
/// (la `WriteQueue` lo hace según la clase del error).
pub fn update_wizard_state<R>(repo: &mut R, story_id: &str, estado: &FlowState) -> Result<DateTime<Utc>, WizardError>
    where R: WizardStateRepository + ?Sized
{
    debug!("update_wizard_state:start story_id={story_id}");
    match repo.update_wizard_state(story_id, estado) {
        Ok(ts) => {
            debug!("update_wizard_state:done story_id={story_id} updated_at={ts}");
            Ok(ts)
        }
        Err(e) => {
            error!("update_wizard_state:error story_id={story_id} err={e}");
            Err(e)
        }
    }
}
