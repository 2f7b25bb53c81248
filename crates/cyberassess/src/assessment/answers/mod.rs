//! Turns stored answers of any historical shape into one value per question.

mod decoder;
mod legacy;

pub use legacy::LegacyKeyTable;

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::config::ScoringConfig;
use super::quiz::QuizDefinition;
use legacy::is_descriptive_key;

/// Where a normalized value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerSource {
    Direct,
    Legacy { key: String },
    Copied { from: String },
    Averaged,
    Default,
}

impl AnswerSource {
    pub fn is_filled(&self) -> bool {
        matches!(
            self,
            AnswerSource::Copied { .. } | AnswerSource::Averaged | AnswerSource::Default
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAnswer {
    pub question_id: String,
    pub value: i32,
    pub source: AnswerSource,
}

/// One value per question of a quiz, in definition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedAnswers {
    quiz_id: String,
    answers: Vec<ResolvedAnswer>,
}

impl NormalizedAnswers {
    /// Builds answers from already-trusted values, e.g. a fresh form submission.
    pub fn from_values<I, K>(quiz_id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, i32)>,
        K: Into<String>,
    {
        Self {
            quiz_id: quiz_id.into(),
            answers: values
                .into_iter()
                .map(|(question_id, value)| ResolvedAnswer {
                    question_id: question_id.into(),
                    value,
                    source: AnswerSource::Direct,
                })
                .collect(),
        }
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn value(&self, question_id: &str) -> Option<i32> {
        self.get(question_id).map(|answer| answer.value)
    }

    pub fn get(&self, question_id: &str) -> Option<&ResolvedAnswer> {
        self.answers
            .iter()
            .find(|answer| answer.question_id == question_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedAnswer> {
        self.answers.iter()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn question_ids(&self) -> impl Iterator<Item = &str> {
        self.answers.iter().map(|answer| answer.question_id.as_str())
    }

    pub fn filled_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|answer| answer.source.is_filled())
            .count()
    }

    pub fn to_map(&self) -> BTreeMap<String, i32> {
        self.answers
            .iter()
            .map(|answer| (answer.question_id.clone(), answer.value))
            .collect()
    }
}

/// Normalizes with the quiz's own legacy key table and the default fill value.
pub fn normalize(raw: &Value, quiz: &QuizDefinition) -> NormalizedAnswers {
    normalize_with(
        raw,
        quiz,
        &LegacyKeyTable::for_quiz(quiz),
        &ScoringConfig::default(),
    )
}

/// Resolution order per question: direct key, legacy alias, claimed descriptive
/// key, copy rule, then the rounded mean of everything resolved so far.
pub fn normalize_with(
    raw: &Value,
    quiz: &QuizDefinition,
    legacy: &LegacyKeyTable,
    config: &ScoringConfig,
) -> NormalizedAnswers {
    let raw = decoder::decode(raw);
    let mut resolved: Vec<Option<(i32, AnswerSource)>> = vec![None; quiz.questions.len()];
    let mut claimed: HashSet<&str> = HashSet::new();

    for (slot, question) in resolved.iter_mut().zip(&quiz.questions) {
        if let Some(value) = raw.value(&question.id) {
            *slot = Some((value, AnswerSource::Direct));
            claimed.insert(question.id.as_str());
        }
    }

    for (slot, question) in resolved.iter_mut().zip(&quiz.questions) {
        if slot.is_some() {
            continue;
        }
        for key in legacy.aliases_for(&question.id) {
            if claimed.contains(key.as_str()) || quiz.contains(key) {
                continue;
            }
            if let Some(value) = raw.value(key) {
                *slot = Some((value, AnswerSource::Legacy { key: key.clone() }));
                claimed.insert(key.as_str());
                break;
            }
        }
    }

    if legacy.claims_descriptive_keys() {
        let mut unclaimed = raw
            .entries()
            .filter(|(key, _)| {
                is_descriptive_key(key)
                    && !quiz.contains(key)
                    && !claimed.contains(key)
            })
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect::<Vec<_>>()
            .into_iter();

        for slot in resolved.iter_mut().filter(|slot| slot.is_none()) {
            match unclaimed.next() {
                Some((key, value)) => {
                    *slot = Some((
                        value,
                        AnswerSource::Legacy {
                            key: key.to_string(),
                        },
                    ));
                }
                None => break,
            }
        }
    }

    for rule in &quiz.copy_rules {
        let position = |id: &str| quiz.questions.iter().position(|question| question.id == id);
        let (Some(target), Some(source)) = (position(&rule.target), position(&rule.source)) else {
            continue;
        };
        let source_value = resolved[source].as_ref().map(|(value, _)| *value);
        if resolved[target].is_none() {
            if let Some(value) = source_value {
                resolved[target] = Some((
                    value,
                    AnswerSource::Copied {
                        from: rule.source.clone(),
                    },
                ));
            }
        }
    }

    let known: Vec<i32> = resolved.iter().flatten().map(|(value, _)| *value).collect();
    let (fill_value, fill_source) = if known.is_empty() {
        (config.default_fill_value, AnswerSource::Default)
    } else {
        let mean = known.iter().map(|value| *value as f64).sum::<f64>() / known.len() as f64;
        // Halves round toward positive infinity.
        ((mean + 0.5).floor() as i32, AnswerSource::Averaged)
    };

    let missing = resolved.iter().filter(|slot| slot.is_none()).count();
    if missing > 0 {
        debug!(
            quiz_id = %quiz.id,
            raw_keys = raw.len(),
            missing,
            fill_value,
            "filling unanswered questions"
        );
    }

    let answers: Vec<ResolvedAnswer> = quiz
        .questions
        .iter()
        .zip(resolved)
        .map(|(question, slot)| {
            let (value, source) = slot.unwrap_or_else(|| (fill_value, fill_source.clone()));
            ResolvedAnswer {
                question_id: question.id.clone(),
                value,
                source,
            }
        })
        .collect();

    debug_assert_eq!(answers.len(), quiz.questions.len());

    NormalizedAnswers {
        quiz_id: quiz.id.clone(),
        answers,
    }
}
