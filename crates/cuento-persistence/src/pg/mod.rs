//! Implementación Postgres (Diesel) del repositorio de estado del wizard.
//!
//! Objetivo del módulo:
//! - Guardar el `FlowState` de cada cuento en la columna `stories.wizard_state`,
//!   con paridad exacta respecto al backend en memoria del core.
//! - Cada escritura es un upsert de la fila completa y estampa `updated_at`;
//!   no hay merge con lo que hubiera antes (última escritura gana).
//! - Errores transitorios (pool, desconexión, conflicto de serialización) se
//!   reintentan en el lugar con backoff corto antes de subir al core.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::upsert::excluded;
use log::{debug, warn};
use serde_json::Value;

use cuento_core::{FlowState, WizardError, WizardStateRepository};

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::stories;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
///
/// Al construirlo se corre el set de migraciones pendientes (una sola vez).
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real (producción/tests de integración) o
/// simular en tests unitarios sin acoplar a r2d2.
pub trait ConnectionProvider: Send + Sync + 'static {
    /// Obtiene una conexión lista para ejecutar consultas Diesel.
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Fila para el upsert en `stories`.
#[derive(Insertable, Debug)]
#[diesel(table_name = stories)]
pub struct NewWizardStateRow<'a> {
    pub id: &'a str,
    pub wizard_state: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

const TRANSIENT_MESSAGES: &[&str] = &["deadlock detected",
                                       "could not serialize access",
                                       "terminating connection",
                                       "connection closed",
                                       "connection refused",
                                       "timeout"];

/// Errores del upsert de `wizard_state` que vale la pena repetir dentro de la
/// misma llamada. Lo que no entre aquí sube como error a la cola de escrituras,
/// que decide si retener la transición o descartarla.
pub(crate) fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            TRANSIENT_MESSAGES.iter().any(|p| m.contains(p))
        }
        _ => false,
    }
}

/// Repite el upsert de una transición hasta 3 veces (15, 30 y 45 ms) antes de
/// devolver el error a la cola.
pub(crate) fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("wizard_state upsert retry {}/3 in {delay_ms}ms: {e}", attempts + 1);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Implementación Postgres de `WizardStateRepository`.
pub struct PgWizardStateRepository<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgWizardStateRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Lee el blob crudo de la columna (sin validar forma).
    pub fn load_raw(&self, story_id: &str) -> Result<Option<Value>, PersistenceError> {
        let found: Option<Option<Value>> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            stories::table.find(story_id)
                          .select(stories::wizard_state)
                          .first::<Option<Value>>(&mut conn)
                          .optional()
                          .map_err(PersistenceError::from)
        })?;
        Ok(found.flatten())
    }
}

impl<P: ConnectionProvider> WizardStateRepository for PgWizardStateRepository<P> {
    fn update_wizard_state(&mut self, story_id: &str, estado: &FlowState) -> Result<DateTime<Utc>, WizardError> {
        debug!("update_wizard_state:start story_id={story_id}");
        let payload = serde_json::to_value(estado).map_err(|e| WizardError::Internal(format!("serialize FlowState: {e}")))?;
        let updated_at: DateTime<Utc> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            let row = NewWizardStateRow { id: story_id,
                                          wizard_state: Some(payload.clone()),
                                          updated_at: Utc::now() };
            diesel::insert_into(stories::table).values(&row)
                                               .on_conflict(stories::id)
                                               .do_update()
                                               .set((stories::wizard_state.eq(excluded(stories::wizard_state)),
                                                     stories::updated_at.eq(excluded(stories::updated_at))))
                                               .returning(stories::updated_at)
                                               .get_result(&mut conn)
                                               .map_err(PersistenceError::from)
        })?;
        debug!("update_wizard_state:done story_id={story_id} updated_at={updated_at}");
        Ok(updated_at)
    }

    fn load_wizard_state(&self, story_id: &str) -> Result<Option<FlowState>, WizardError> {
        match self.load_raw(story_id)? {
            None => Ok(None),
            Some(raw) => serde_json::from_value(raw).map(Some)
                                                    .map_err(|e| PersistenceError::InvalidPayload(e.to_string()).into()),
        }
    }
}

/// Pool para la tabla `stories`, con la migración que crea la tabla ya aplicada.
/// Tamaños en cero suben a 1; un mínimo mayor al máximo se recorta al máximo.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = if min_size == 0 { 1 } else { min_size };
    let validated_max = if max_size == 0 { 1 } else { max_size };
    if validated_min > validated_max {
        warn!("DATABASE_MIN_CONNECTIONS={validated_min} > DATABASE_MAX_CONNECTIONS={validated_max}; usando {validated_max}");
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Pool desde `.env`; lo usan los tests de Postgres.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env()?;
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn retry_stops_after_three_retries() {
        let calls = Cell::new(0);
        let r: Result<(), _> = with_retry(|| {
            calls.set(calls.get() + 1);
            Err(PersistenceError::TransientIo("connection refused".into()))
        });
        assert!(r.is_err());
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn non_retryable_fails_fast() {
        let calls = Cell::new(0);
        let r: Result<(), _> = with_retry(|| {
            calls.set(calls.get() + 1);
            Err(PersistenceError::CheckViolation("bad".into()))
        });
        assert!(r.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unknown_timeouts_are_retryable() {
        assert!(is_retryable(&PersistenceError::Unknown("statement timeout".into())));
        assert!(!is_retryable(&PersistenceError::Unknown("syntax error".into())));
    }
}
