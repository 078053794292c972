//! cuento-persistence
//!
//! Backends durables para el estado del wizard:
//! - `pg`: columna `stories.wizard_state` en Postgres (Diesel + r2d2).
//! - `fs`: fila por cuento y caché local de borradores en disco.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod fs;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use fs::{FsLocalCache, FsWizardStateRepository};
pub use pg::{build_dev_pool_from_env, build_pool, ConnectionProvider, PgPool, PgWizardStateRepository, PoolProvider};
