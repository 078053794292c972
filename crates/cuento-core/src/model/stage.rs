//! Etapas del wizard y su orden.
//!
//! El orden y los prerrequisitos viven en una tabla (`PREREQUISITES`) en lugar
//! de condicionales por etapa: agregar una etapa es agregar una fila.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Personajes,
    Cuento,
    Diseno,
    VistaPrevia,
    DedicatoriaChoice,
    Dedicatoria,
}

/// Pares `(etapa, prerrequisito)`. `personajes` no tiene prerrequisito.
const PREREQUISITES: [(Stage, Stage); 5] = [(Stage::Cuento, Stage::Personajes),
                                            (Stage::Diseno, Stage::Cuento),
                                            (Stage::VistaPrevia, Stage::Diseno),
                                            (Stage::DedicatoriaChoice, Stage::VistaPrevia),
                                            (Stage::Dedicatoria, Stage::DedicatoriaChoice)];

impl Stage {
    /// Todas las etapas en orden de avance.
    pub const ALL: [Stage; 6] = [Stage::Personajes,
                                 Stage::Cuento,
                                 Stage::Diseno,
                                 Stage::VistaPrevia,
                                 Stage::DedicatoriaChoice,
                                 Stage::Dedicatoria];

    pub fn prerequisite(self) -> Option<Stage> {
        PREREQUISITES.iter().find(|(s, _)| *s == self).map(|(_, p)| *p)
    }

    /// Etapa que se desbloquea al completar ésta.
    pub fn next(self) -> Option<Stage> {
        PREREQUISITES.iter().find(|(_, p)| *p == self).map(|(s, _)| *s)
    }

    /// `personajes` se deriva del conteo de personajes asignados; no se
    /// avanza ni se retrocede explícitamente.
    pub fn is_derived(self) -> bool {
        matches!(self, Stage::Personajes)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Personajes => "personajes",
            Stage::Cuento => "cuento",
            Stage::Diseno => "diseno",
            Stage::VistaPrevia => "vistaPrevia",
            Stage::DedicatoriaChoice => "dedicatoriaChoice",
            Stage::Dedicatoria => "dedicatoria",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStage(pub String);

impl fmt::Display for UnknownStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "etapa desconocida: {}", self.0)
    }
}

impl std::error::Error for UnknownStage {}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "personajes" => Ok(Stage::Personajes),
            "cuento" => Ok(Stage::Cuento),
            "diseno" | "diseño" => Ok(Stage::Diseno),
            "vistaPrevia" => Ok(Stage::VistaPrevia),
            "dedicatoriaChoice" => Ok(Stage::DedicatoriaChoice),
            "dedicatoria" => Ok(Stage::Dedicatoria),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}
