//! Cuentería
//!
//! Este crate arma la aplicación sobre el core del wizard:
//! - `config`: configuración desde entorno/.env.
//! - `errors`: error de aplicación y códigos de salida.
//! - `cli`: parseo y ejecución de comandos contra los backends.
//!
//! Puede usarse desde `main.rs` o por otros clientes.

pub mod cli;
pub mod config;
pub mod errors;

use cuento_core::LocalCache;
use cuento_persistence::{build_pool, FsLocalCache, FsWizardStateRepository, PgWizardStateRepository, PoolProvider};

use crate::cli::{execute, Command, CommandOutput};
use crate::config::AppConfig;
use crate::errors::AppError;

/// Ejecuta `cmd` eligiendo el backend según la configuración: Postgres si hay
/// `DATABASE_URL`, filas en disco si no. El borrador local siempre va a disco.
pub fn run_with_config(cmd: Command, config: &AppConfig) -> Result<CommandOutput, AppError> {
    let mut cache = FsLocalCache::new(config.drafts_dir());
    run_with_cache(cmd, config, &mut cache)
}

pub fn run_with_cache<C: LocalCache>(cmd: Command, config: &AppConfig, cache: &mut C) -> Result<CommandOutput, AppError> {
    match &config.database {
        Some(db) => {
            let pool = build_pool(&db.url, db.min_connections, db.max_connections)?;
            execute(cmd, PgWizardStateRepository::new(PoolProvider { pool }), cache)
        }
        None => execute(cmd, FsWizardStateRepository::new(config.stories_dir()), cache),
    }
}
