use serde::{Deserialize, Serialize};

use super::quiz::QuizKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    Initial,
    Developing,
    Defined,
    Managed,
    Optimized,
}

impl MaturityLevel {
    const ORDERED: [MaturityLevel; 5] = [
        MaturityLevel::Initial,
        MaturityLevel::Developing,
        MaturityLevel::Defined,
        MaturityLevel::Managed,
        MaturityLevel::Optimized,
    ];

    pub const fn number(self) -> u8 {
        match self {
            Self::Initial => 1,
            Self::Developing => 2,
            Self::Defined => 3,
            Self::Managed => 4,
            Self::Optimized => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Initial => "Inicial",
            Self::Developing => "En desarrollo",
            Self::Defined => "Definido",
            Self::Managed => "Gestionado",
            Self::Optimized => "Optimizado",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Initial => "La seguridad se gestiona de forma reactiva y sin procesos definidos. La organización está expuesta a riesgos significativos.",
            Self::Developing => "Existen algunas prácticas de seguridad, pero se aplican de forma inconsistente y dependen de personas concretas.",
            Self::Defined => "Los controles principales están documentados y se aplican de forma general, aunque todavía no se miden.",
            Self::Managed => "La seguridad se gestiona con procesos medidos y revisados periódicamente por la dirección.",
            Self::Optimized => "La seguridad forma parte de la cultura de la organización y se mejora de forma continua a partir de indicadores.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityResult {
    pub level: String,
    pub description: String,
    pub level_number: u8,
}

impl From<MaturityLevel> for MaturityResult {
    fn from(level: MaturityLevel) -> Self {
        Self {
            level: level.label().to_string(),
            description: level.description().to_string(),
            level_number: level.number(),
        }
    }
}

/// Five bands delimited by four ascending lower bounds for levels 2 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaturityScale {
    lower_bounds: [i32; 4],
}

impl MaturityScale {
    /// Raw points out of 45.
    pub const INITIAL: Self = Self {
        lower_bounds: [9, 18, 27, 36],
    };
    /// Percentage of the quiz maximum.
    pub const ADVANCED: Self = Self {
        lower_bounds: [20, 40, 60, 80],
    };

    pub const fn for_kind(kind: QuizKind) -> Self {
        match kind {
            QuizKind::Initial => Self::INITIAL,
            QuizKind::Advanced => Self::ADVANCED,
        }
    }

    pub fn level(&self, total: i32) -> MaturityLevel {
        let reached = self
            .lower_bounds
            .iter()
            .take_while(|bound| total >= **bound)
            .count();
        MaturityLevel::ORDERED[reached]
    }
}

/// Maps a total on the quiz's own scale to its maturity band.
///
/// The scale is inferred from the id: only the built-in initial questionnaire
/// uses raw points. Custom quizzes should go through [`classify_kind`] with
/// their declared kind.
pub fn classify(total: i32, quiz_id: &str) -> MaturityResult {
    classify_kind(total, QuizKind::from_quiz_id(quiz_id))
}

pub fn classify_kind(total: i32, kind: QuizKind) -> MaturityResult {
    MaturityScale::for_kind(kind).level(total).into()
}
