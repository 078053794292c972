//! Constantes del flujo del wizard.
//!
//! Agrupa los umbrales que derivan el estado de `personajes` y el formato de
//! las claves del caché local. Cambiar cualquiera de estos valores rompe la
//! compatibilidad con borradores ya guardados en los clientes.

/// Cantidad mínima de personajes asignados para considerar la etapa iniciada.
pub const PERSONAJES_DRAFT_MIN: u32 = 1;

/// Cantidad mínima de personajes asignados para considerar la etapa completa.
pub const PERSONAJES_COMPLETED_MIN: u32 = 3;

/// Prefijo de la clave del borrador local: `story_draft_<storyId>`.
pub const DRAFT_KEY_PREFIX: &str = "story_draft_";

/// Sufijo de la copia de respaldo del borrador local.
pub const DRAFT_BACKUP_SUFFIX: &str = "_backup";
