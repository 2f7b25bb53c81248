use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::answers::NormalizedAnswers;
use super::quiz::{QuizDefinition, QuizKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub name: String,
    pub score: i32,
    pub max_score: i32,
}

impl CategoryScore {
    pub fn percentage(&self) -> f64 {
        if self.max_score <= 0 {
            0.0
        } else {
            self.score as f64 / self.max_score as f64 * 100.0
        }
    }
}

/// Raw totals for one questionnaire submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total: i32,
    pub max_total: i32,
    pub categories: Vec<CategoryScore>,
}

impl ScoreSummary {
    /// Total as a rounded 0-100 percentage of the quiz maximum.
    pub fn percentage(&self) -> i32 {
        if self.max_total <= 0 {
            return 0;
        }
        let pct = self.total as f64 / self.max_total as f64 * 100.0;
        pct.round().clamp(0.0, 100.0) as i32
    }
}

/// Sums answers that belong to the quiz into a total and per-category scores.
///
/// On the initial questionnaire category scores are clamped to `[0, max_score]`;
/// that only matters when duplicated or out-of-range answers reach this point.
pub fn aggregate(answers: &NormalizedAnswers, quiz: &QuizDefinition) -> ScoreSummary {
    let mut categories: Vec<CategoryScore> = quiz
        .categories()
        .into_iter()
        .map(|name| CategoryScore {
            name: name.to_string(),
            score: 0,
            max_score: 0,
        })
        .collect();

    for question in &quiz.questions {
        if let Some(category) = categories
            .iter_mut()
            .find(|category| category.name == question.category)
        {
            category.max_score = category.max_score.saturating_add(question.max_value());
        }
    }

    let mut total: i32 = 0;
    for answer in answers.iter() {
        let Some(question) = quiz.question(&answer.question_id) else {
            continue;
        };
        total = total.saturating_add(answer.value);
        if let Some(category) = categories
            .iter_mut()
            .find(|category| category.name == question.category)
        {
            category.score = category.score.saturating_add(answer.value);
        }
    }

    if quiz.kind == QuizKind::Initial {
        for category in &mut categories {
            let bounded = category.score.clamp(0, category.max_score.max(0));
            if bounded != category.score {
                debug!(
                    category = %category.name,
                    score = category.score,
                    max_score = category.max_score,
                    "clamping category score"
                );
                category.score = bounded;
            }
        }
    }

    ScoreSummary {
        total,
        max_total: quiz.max_total(),
        categories,
    }
}

/// Outcome of comparing a persisted score with the freshly computed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReconciliation {
    /// Score on the quiz's classification scale: raw points for the initial
    /// questionnaire, a 0-100 percentage otherwise.
    pub score: i32,
    pub stored_score: Option<i32>,
    pub legacy_percentage: bool,
}

/// Resolves the score used for classification.
///
/// Initial records whose stored score exceeds the raw maximum were saved as a
/// percentage; those fall back to the fresh total. The result only depends on
/// its inputs, so reconciling an already reconciled score is a no-op.
pub fn reconcile_stored_score(
    stored_score: Option<i32>,
    summary: &ScoreSummary,
    quiz: &QuizDefinition,
) -> ScoreReconciliation {
    let (score, legacy_percentage) = match quiz.kind {
        QuizKind::Initial => match stored_score {
            Some(stored) if stored > summary.max_total => {
                info!(
                    quiz_id = %quiz.id,
                    stored,
                    recomputed = summary.total,
                    "stored score looks like a legacy percentage; using recomputed total"
                );
                (summary.total, true)
            }
            Some(stored) if stored >= 0 => (stored, false),
            _ => (summary.total, false),
        },
        QuizKind::Advanced => match stored_score {
            Some(stored) if (0..=100).contains(&stored) => (stored, false),
            _ => (summary.percentage(), false),
        },
    };

    ScoreReconciliation {
        score,
        stored_score,
        legacy_percentage,
    }
}
