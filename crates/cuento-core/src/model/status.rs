use serde::{Deserialize, Serialize};

/// Estado de una etapa del wizard.
///
/// Las transiciones normales son monótonas:
/// - `NotStarted` -> `Draft`
/// - `Draft` -> `Completed`
///
/// `Completed` nunca vuelve a `Draft` por una transición del store; sólo un
/// reemplazo completo (`SetEstadoCompleto`) o un reset pueden hacerlo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// La etapa no fue abierta todavía.
    #[default]
    NotStarted,
    /// Etapa iniciada y editable.
    Draft,
    /// Etapa terminada.
    Completed,
}

impl StageStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, StageStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StageStatus::NotStarted => "not_started",
            StageStatus::Draft => "draft",
            StageStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
