//! Errores del core del wizard.
//!
//! Las transiciones del store nunca devuelven error; estos tipos sólo
//! aparecen en los puertos de persistencia y caché.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum WizardError {
    #[error("story not found: {0}")] StoryNotFound(String),
    #[error("corrupt wizard state: {0}")] CorruptState(String),
    #[error("transient storage error: {0}")] Transient(String),
    #[error("storage error: {0}")] Storage(String),
    #[error("local cache error: {0}")] Cache(String),
    #[error("internal: {0}")] Internal(String),
}

/// Clasificación gruesa usada por la cola de escrituras para decidir si
/// reintentar o descartar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Vale la pena reintentar más tarde (red, pool, conflicto).
    Transient,
    /// El backend rechazó la escritura; reintentar no cambia el resultado.
    Permanent,
    /// El dato en sí es inválido.
    Validation,
}

pub fn classify_error(err: &WizardError) -> ErrorClass {
    match err {
        WizardError::Transient(_) => ErrorClass::Transient,
        WizardError::Cache(_) => ErrorClass::Transient,
        WizardError::CorruptState(_) => ErrorClass::Validation,
        WizardError::StoryNotFound(_) | WizardError::Storage(_) | WizardError::Internal(_) => ErrorClass::Permanent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert_eq!(classify_error(&WizardError::Transient("pool".into())), ErrorClass::Transient);
        assert_eq!(classify_error(&WizardError::Storage("check".into())), ErrorClass::Permanent);
        assert_eq!(classify_error(&WizardError::CorruptState("x".into())), ErrorClass::Validation);
    }

    #[test]
    fn display_includes_detail() {
        let err = WizardError::StoryNotFound("abc".into());
        assert_eq!(err.to_string(), "story not found: abc");
    }
}
