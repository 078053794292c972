use thiserror::Error;

use cuento_core::model::UnknownStage;
use cuento_core::WizardError;
use cuento_persistence::PersistenceError;

/// Errores de la aplicación (CLI y armado de backends).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Uso inválido: {0}")]
    Usage(String),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error del wizard: {0}")]
    Wizard(#[from] WizardError),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
}

impl From<UnknownStage> for AppError {
    fn from(err: UnknownStage) -> Self {
        AppError::Usage(err.to_string())
    }
}

impl AppError {
    /// Código de salida del proceso: 2 uso, 5 error operativo.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) => 2,
            _ => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_variant_format() {
        let err = AppError::Usage("falta --story".into());
        assert_eq!(err.to_string(), "Uso inválido: falta --story");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_wizard_variant_from() {
        let err: AppError = WizardError::Transient("sin red".into()).into();
        assert_eq!(err.to_string(), "Error del wizard: transient storage error: sin red");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_unknown_stage_is_usage() {
        let err: AppError = "checkout".parse::<cuento_core::Stage>().unwrap_err().into();
        assert_eq!(err.exit_code(), 2);
    }
}
