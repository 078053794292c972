//! CLI mínima sobre el wizard:
//!
//! ```text
//! cuenteria nuevo
//! cuenteria estado     --story <ID>
//! cuenteria personajes --story <ID> --count <N>
//! cuenteria avanzar    --story <ID> --etapa <ETAPA>
//! cuenteria regresar   --story <ID> --etapa <ETAPA>
//! cuenteria abandonar  --story <ID>
//! ```
//!
//! Cada comando recupera el progreso (borrador local, fila remota o inicial),
//! aplica la acción, guarda el borrador local y vacía la cola de escrituras.
//! Una escritura remota fallida sólo se registra: el borrador local manda en
//! la próxima ejecución.

use log::{info, warn};
use serde_json::json;
use uuid::Uuid;

use cuento_core::cache::{discard_draft, save_draft};
use cuento_core::engine::update_wizard_state;
use cuento_core::{FlowState, FlowStore, LocalCache, RecoverySource, Stage, Transition, WizardStateRepository};

use crate::errors::AppError;

pub const USAGE: &str = "Uso: cuenteria <nuevo|estado|personajes|avanzar|regresar|abandonar> [--story <ID>] [--count <N>] [--etapa <ETAPA>]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Nuevo,
    Estado { story: String },
    Personajes { story: String, count: u32 },
    Avanzar { story: String, etapa: Stage },
    Regresar { story: String, etapa: Stage },
    Abandonar { story: String },
}

/// Parsea `args` sin el nombre del binario.
pub fn parse_args(args: &[String]) -> Result<Command, AppError> {
    let Some(cmd) = args.first() else {
        return Err(AppError::Usage(USAGE.into()));
    };
    let mut story: Option<String> = None;
    let mut count: Option<String> = None;
    let mut etapa: Option<String> = None;
    let mut i = 1;
    while i < args.len() {
        let slot = match args[i].as_str() {
            "--story" => &mut story,
            "--count" => &mut count,
            "--etapa" => &mut etapa,
            other => return Err(AppError::Usage(format!("opción desconocida: {other}"))),
        };
        i += 1;
        match args.get(i) {
            Some(v) => *slot = Some(v.clone()),
            None => return Err(AppError::Usage(format!("falta el valor de {}", args[i - 1]))),
        }
        i += 1;
    }

    let need_story = || story.clone().ok_or_else(|| AppError::Usage("falta --story <ID>".into()));
    let need_etapa = || -> Result<Stage, AppError> {
        let raw = etapa.as_deref().ok_or_else(|| AppError::Usage("falta --etapa <ETAPA>".into()))?;
        Ok(raw.parse::<Stage>()?)
    };
    match cmd.as_str() {
        "nuevo" => Ok(Command::Nuevo),
        "estado" => Ok(Command::Estado { story: need_story()? }),
        "personajes" => {
            let raw = count.as_deref().ok_or_else(|| AppError::Usage("falta --count <N>".into()))?;
            let count = raw.parse::<u32>()
                           .map_err(|_| AppError::Usage(format!("--count debe ser un entero no negativo: {raw}")))?;
            Ok(Command::Personajes { story: need_story()?, count })
        }
        "avanzar" => Ok(Command::Avanzar { story: need_story()?, etapa: need_etapa()? }),
        "regresar" => Ok(Command::Regresar { story: need_story()?, etapa: need_etapa()? }),
        "abandonar" => Ok(Command::Abandonar { story: need_story()? }),
        other => Err(AppError::Usage(format!("comando desconocido: {other}\n{USAGE}"))),
    }
}

/// Resultado de un comando, listo para imprimir.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub story_id: Option<String>,
    pub estado: FlowState,
    pub source: Option<RecoverySource>,
    pub transition: Option<Transition>,
    pub message: Option<String>,
}

impl CommandOutput {
    /// 0 si la acción se aplicó, 4 si una guarda la rechazó.
    pub fn exit_code(&self) -> i32 {
        match self.transition {
            Some(Transition::Ignored(_)) => 4,
            _ => 0,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(id) = &self.story_id {
            out.push_str(&format!("story: {id}\n"));
        }
        if let Some(source) = self.source {
            out.push_str(&format!("origen: {}\n", source.as_str()));
        }
        match self.transition {
            Some(Transition::Ignored(reason)) => out.push_str(&format!("ignorado: {reason}\n")),
            Some(Transition::Applied) => out.push_str("aplicado\n"),
            None => {}
        }
        if let Some(msg) = &self.message {
            out.push_str(msg);
            out.push('\n');
        }
        let etapa = self.estado.current_stage().map(|s| s.as_str()).unwrap_or("terminado");
        out.push_str(&format!("etapa actual: {etapa}\n"));
        for issue in self.estado.inconsistencies() {
            out.push_str(&format!("inconsistencia: {issue}\n"));
        }
        let body = serde_json::to_string_pretty(&self.estado).unwrap_or_default();
        out.push_str(&body);
        out
    }
}

impl Command {
    pub fn story_id(&self) -> Option<&str> {
        match self {
            Command::Nuevo => None,
            Command::Estado { story }
            | Command::Personajes { story, .. }
            | Command::Avanzar { story, .. }
            | Command::Regresar { story, .. }
            | Command::Abandonar { story } => Some(story),
        }
    }
}

/// Ejecuta un comando contra los backends provistos.
pub fn execute<R, C>(cmd: Command, repo: R, cache: &mut C) -> Result<CommandOutput, AppError>
    where R: WizardStateRepository,
          C: LocalCache
{
    let mut store = FlowStore::new(repo).with_auto_flush(false);
    let Some(story_id) = cmd.story_id().map(str::to_string) else {
        return nuevo(&mut store, cache);
    };
    let recovery = store.restore(&story_id, &*cache);
    let draft_state = recovery.draft.clone().unwrap_or_else(|| json!({}));

    let (transition, message) = match cmd {
        Command::Nuevo | Command::Estado { .. } => (None, None),
        Command::Personajes { count, .. } => (Some(store.set_personajes(count)), None),
        Command::Avanzar { etapa, .. } => (Some(store.avanzar_etapa(etapa)), None),
        Command::Regresar { etapa, .. } => (Some(store.regresar_etapa(etapa)), None),
        Command::Abandonar { .. } => {
            if store.abandon_if_unstarted() {
                discard_draft(cache, &story_id)?;
                return Ok(CommandOutput { story_id: Some(story_id),
                                          estado: store.estado().clone(),
                                          source: Some(recovery.source),
                                          transition: None,
                                          message: Some("cuento sin empezar: descartado".into()) });
            }
            (None, Some("el cuento ya tiene progreso; no se descarta".to_string()))
        }
    };

    if transition.map(Transition::is_applied).unwrap_or(false) {
        save_draft(cache, &story_id, draft_state, store.estado())?;
    }
    let message = match store.flush() {
        Ok(_) => message,
        Err(e) => {
            warn!("{story_id}: escritura remota fallida ({e}); queda el borrador local");
            Some("no se pudo guardar en el servidor: el progreso quedó en el borrador local".to_string())
        }
    };
    Ok(CommandOutput { story_id: Some(story_id),
                       estado: store.estado().clone(),
                       source: Some(recovery.source),
                       transition,
                       message })
}

fn nuevo<R, C>(store: &mut FlowStore<R>, cache: &mut C) -> Result<CommandOutput, AppError>
    where R: WizardStateRepository,
          C: LocalCache
{
    let story_id = Uuid::new_v4().to_string();
    store.begin_story(story_id.clone());
    save_draft(cache, &story_id, json!({}), store.estado())?;
    if let Err(e) = update_wizard_state(store.repository_mut(), &story_id, &FlowState::initial()) {
        warn!("nuevo cuento story_id={story_id}: fila remota no creada ({e})");
    }
    info!("nuevo cuento story_id={story_id}");
    Ok(CommandOutput { story_id: Some(story_id),
                       estado: store.estado().clone(),
                       source: None,
                       transition: None,
                       message: Some("cuento creado".into()) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_args(&args(&["nuevo"])).expect("ok"), Command::Nuevo);
        assert_eq!(parse_args(&args(&["personajes", "--story", "a", "--count", "3"])).expect("ok"),
                   Command::Personajes { story: "a".into(), count: 3 });
        assert_eq!(parse_args(&args(&["avanzar", "--etapa", "diseño", "--story", "a"])).expect("ok"),
                   Command::Avanzar { story: "a".into(), etapa: Stage::Diseno });
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(parse_args(&[]), Err(AppError::Usage(_))));
        assert!(matches!(parse_args(&args(&["estado"])), Err(AppError::Usage(_))));
        assert!(matches!(parse_args(&args(&["personajes", "--story", "a", "--count", "-1"])),
                         Err(AppError::Usage(_))));
        assert!(matches!(parse_args(&args(&["avanzar", "--story", "a", "--etapa", "checkout"])),
                         Err(AppError::Usage(_))));
        assert!(matches!(parse_args(&args(&["estado", "--story"])), Err(AppError::Usage(_))));
        assert!(matches!(parse_args(&args(&["borrar", "--story", "a"])), Err(AppError::Usage(_))));
    }
}
