//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
//! Sin `DATABASE_URL` la aplicación usa los backends en disco bajo `data_dir`.
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

use cuento_persistence::DbConfig;

use crate::errors::AppError;

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Conexión a Postgres, si está configurada.
    pub database: Option<DbConfig>,
    /// Raíz de los datos locales (borradores y filas en disco).
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        cuento_persistence::init_dotenv();
        let min = env::var("DATABASE_MIN_CONNECTIONS").ok();
        let max = env::var("DATABASE_MAX_CONNECTIONS").ok();
        let database = env::var("DATABASE_URL").ok()
                                               .map(|url| DbConfig::from_parts(url, min.as_deref(), max.as_deref()));
        let data_dir = env::var("CUENTERIA_DATA_DIR").ok().map(PathBuf::from);
        Self::from_parts(database, data_dir)
    }

    /// Valida y arma la configuración. Una `DATABASE_URL` que no es de
    /// Postgres es un error, no un motivo para caer al disco.
    pub fn from_parts(database: Option<DbConfig>, data_dir: Option<PathBuf>) -> Result<Self, AppError> {
        if let Some(db) = &database {
            let url = db.url.trim();
            if url.is_empty() {
                return Err(AppError::Config("DATABASE_URL vacío".into()));
            }
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(AppError::Config(format!("DATABASE_URL debe ser postgres:// o postgresql://, no {url}")));
            }
        }
        Ok(Self { database,
                  data_dir: data_dir.unwrap_or_else(|| PathBuf::from(".cuenteria")) })
    }

    /// Configuración sólo-disco, útil en tests.
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        Self { database: None,
               data_dir: data_dir.into() }
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.data_dir.join("drafts")
    }

    pub fn stories_dir(&self) -> PathBuf {
        self.data_dir.join("stories")
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<Result<AppConfig, AppError>> = Lazy::new(AppConfig::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_postgres_url_is_a_config_error() {
        let db = DbConfig::from_parts("mysql://localhost/cuentos".into(), None, None);
        let err = AppConfig::from_parts(Some(db), None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn missing_database_falls_back_to_disk() {
        let cfg = AppConfig::from_parts(None, None).expect("config");
        assert!(cfg.database.is_none());
        assert_eq!(cfg.drafts_dir(), PathBuf::from(".cuenteria").join("drafts"));

        let db = DbConfig::from_parts("postgresql://u@h/db".into(), None, None);
        assert!(AppConfig::from_parts(Some(db), Some("/tmp/x".into())).is_ok());
    }
}
