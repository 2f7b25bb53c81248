use serde::{Deserialize, Serialize};

use super::answers::NormalizedAnswers;
use super::quiz::{QuizDefinition, QuizKind};
use super::scoring::CategoryScore;

const UNANSWERED_LABEL: &str = "Sin respuesta";

const INITIAL_TEXTS: [&str; 5] = [
    "Es urgente implementar este control. Solicite apoyo de un especialista para definir un plan de acción inmediato.",
    "Este control está en una etapa muy temprana. Priorice su implementación y asigne un responsable.",
    "El control está parcialmente implementado. Documente el proceso y extiéndalo a toda la organización.",
    "El control está bien encaminado. Revise periódicamente su eficacia y corrija las desviaciones.",
    "Excelente nivel en este control. Mantenga las buenas prácticas y compártalas con su equipo.",
];

const ADVANCED_TEXTS: [&str; 5] = [
    "Brecha crítica: defina e implemente el control con prioridad máxima y asigne presupuesto específico.",
    "Control incipiente: formalice el proceso, documente responsabilidades y establezca plazos de implantación.",
    "Control definido pero irregular: estandarice su aplicación y comience a medir su cumplimiento.",
    "Control gestionado: incorpore métricas de eficacia y revisiones independientes para consolidarlo.",
    "Control optimizado: mantenga la mejora continua y evalúe automatizar su seguimiento.",
];

/// Percentage-of-maximum band for a single answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationBand {
    Critical,
    Low,
    Moderate,
    Good,
    Strong,
}

impl RecommendationBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage <= 20.0 {
            Self::Critical
        } else if percentage <= 40.0 {
            Self::Low
        } else if percentage <= 60.0 {
            Self::Moderate
        } else if percentage <= 80.0 {
            Self::Good
        } else {
            Self::Strong
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Critical => 0,
            Self::Low => 1,
            Self::Moderate => 2,
            Self::Good => 3,
            Self::Strong => 4,
        }
    }
}

pub fn recommendation_text(kind: QuizKind, band: RecommendationBand) -> &'static str {
    match kind {
        QuizKind::Initial => INITIAL_TEXTS[band.index()],
        QuizKind::Advanced => ADVANCED_TEXTS[band.index()],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub question_id: String,
    pub category: String,
    pub score: i32,
    pub max_score: i32,
    pub selected_option_label: String,
    pub band: RecommendationBand,
    pub recommendation_text: String,
}

/// One recommendation per question, in definition order.
pub fn recommend(answers: &NormalizedAnswers, quiz: &QuizDefinition) -> Vec<Recommendation> {
    quiz.questions
        .iter()
        .map(|question| {
            let score = answers.value(&question.id).unwrap_or(0);
            let max_score = question.max_value();
            let percentage = if max_score <= 0 {
                0.0
            } else {
                score as f64 / max_score as f64 * 100.0
            };
            let band = RecommendationBand::from_percentage(percentage);

            Recommendation {
                question_id: question.id.clone(),
                category: question.category.clone(),
                score,
                max_score,
                selected_option_label: question
                    .option_label(score)
                    .unwrap_or(UNANSWERED_LABEL)
                    .to_string(),
                band,
                recommendation_text: recommendation_text(quiz.kind, band).to_string(),
            }
        })
        .collect()
}

/// Names of the `n` categories with the lowest score percentage. Ties keep
/// definition order.
pub fn weakest_categories(categories: &[CategoryScore], n: usize) -> Vec<String> {
    let mut ranked: Vec<&CategoryScore> = categories.iter().collect();
    ranked.sort_by(|a, b| a.percentage().total_cmp(&b.percentage()));
    ranked
        .into_iter()
        .take(n)
        .map(|category| category.name.clone())
        .collect()
}
