use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

pub const INITIAL_QUIZ_ID: &str = "evaluacion-inicial";
pub const ADVANCED_QUIZ_ID: &str = "evaluacion-avanzada";

/// Questionnaire variant. Drives threshold tables and recommendation language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    Initial,
    Advanced,
}

impl QuizKind {
    /// Any id other than the initial questionnaire is scored on the percentage scale.
    pub fn from_quiz_id(quiz_id: &str) -> Self {
        if same_quiz_id(quiz_id, INITIAL_QUIZ_ID) {
            Self::Initial
        } else {
            Self::Advanced
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Initial => "Evaluación inicial",
            Self::Advanced => "Evaluación avanzada",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: String,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub text: String,
    pub options: Vec<AnswerOption>,
}

impl QuestionDefinition {
    pub fn max_value(&self) -> i32 {
        self.options
            .iter()
            .map(|option| option.value)
            .max()
            .unwrap_or(0)
    }

    pub fn option_label(&self, value: i32) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
    }
}

/// Historical gap where `target` was never persisted although `source` was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    pub target: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDefinition {
    pub id: String,
    pub kind: QuizKind,
    #[serde(default)]
    pub title: String,
    pub questions: Vec<QuestionDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copy_rules: Vec<CopyRule>,
    /// Extra legacy keys per question id, consulted after the positional aliases.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub legacy_aliases: BTreeMap<String, Vec<String>>,
}

impl QuizDefinition {
    pub fn question(&self, id: &str) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.question(id).is_some()
    }

    /// Saturates at `i32::MAX` for catalogs with oversized option values.
    pub fn max_total(&self) -> i32 {
        self.questions
            .iter()
            .map(QuestionDefinition::max_value)
            .fold(0, i32::saturating_add)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .map(|question| question.category.as_str())
            .filter(|category| seen.insert(*category))
            .collect()
    }

    pub fn uses_positional_ids(&self) -> bool {
        !self.questions.is_empty()
            && self
                .questions
                .iter()
                .all(|question| is_positional_key(&question.id))
    }

    pub fn validate(&self) -> Result<(), QuizDefinitionError> {
        if self.questions.is_empty() {
            return Err(QuizDefinitionError::NoQuestions {
                quiz_id: self.id.clone(),
            });
        }

        let mut ids = HashSet::new();
        for question in &self.questions {
            if !ids.insert(question.id.as_str()) {
                return Err(QuizDefinitionError::DuplicateQuestion {
                    quiz_id: self.id.clone(),
                    question_id: question.id.clone(),
                });
            }
            if question.options.is_empty() {
                return Err(QuizDefinitionError::EmptyOptions {
                    quiz_id: self.id.clone(),
                    question_id: question.id.clone(),
                });
            }
        }

        let referenced = self
            .copy_rules
            .iter()
            .flat_map(|rule| [&rule.target, &rule.source])
            .chain(self.legacy_aliases.keys());
        for question_id in referenced {
            if !ids.contains(question_id.as_str()) {
                return Err(QuizDefinitionError::UnknownQuestion {
                    quiz_id: self.id.clone(),
                    question_id: question_id.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Quiz ids compare trimmed and ASCII case-insensitively.
pub(crate) fn same_quiz_id(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

/// `q1`, `q2`, ... as produced by the first generation of the questionnaire.
pub(crate) fn is_positional_key(key: &str) -> bool {
    key.strip_prefix('q')
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

pub(crate) fn positional_key(index: usize) -> String {
    format!("q{}", index + 1)
}

#[derive(Debug, thiserror::Error)]
pub enum QuizDefinitionError {
    #[error("quiz '{quiz_id}' has no questions")]
    NoQuestions { quiz_id: String },
    #[error("quiz '{quiz_id}' declares question '{question_id}' more than once")]
    DuplicateQuestion {
        quiz_id: String,
        question_id: String,
    },
    #[error("question '{question_id}' in quiz '{quiz_id}' has no answer options")]
    EmptyOptions {
        quiz_id: String,
        question_id: String,
    },
    #[error("quiz '{quiz_id}' references unknown question '{question_id}'")]
    UnknownQuestion {
        quiz_id: String,
        question_id: String,
    },
    #[error("failed to read quiz catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid quiz catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, category: &str, values: &[i32]) -> QuestionDefinition {
        QuestionDefinition {
            id: id.to_string(),
            category: category.to_string(),
            text: String::new(),
            options: values
                .iter()
                .map(|value| AnswerOption {
                    label: format!("option {value}"),
                    value: *value,
                })
                .collect(),
        }
    }

    fn quiz(questions: Vec<QuestionDefinition>) -> QuizDefinition {
        QuizDefinition {
            id: "custom".to_string(),
            kind: QuizKind::Advanced,
            title: String::new(),
            questions,
            copy_rules: Vec::new(),
            legacy_aliases: BTreeMap::new(),
        }
    }

    #[test]
    fn max_value_is_derived_from_options() {
        let q = question("a-1", "A", &[2, 0, 5, 1]);
        assert_eq!(q.max_value(), 5);
        assert_eq!(q.option_label(5), Some("option 5"));
        assert_eq!(q.option_label(4), None);
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let quiz = quiz(vec![
            question("b-1", "B", &[0, 3]),
            question("a-1", "A", &[0, 3]),
            question("b-2", "B", &[0, 3]),
        ]);
        assert_eq!(quiz.categories(), vec!["B", "A"]);
        assert_eq!(quiz.max_total(), 9);
    }

    #[test]
    fn validate_rejects_duplicates_and_empty_options() {
        let duplicate = quiz(vec![question("a-1", "A", &[0]), question("a-1", "A", &[0])]);
        assert!(matches!(
            duplicate.validate(),
            Err(QuizDefinitionError::DuplicateQuestion { .. })
        ));

        let empty = quiz(vec![question("a-1", "A", &[])]);
        assert!(matches!(
            empty.validate(),
            Err(QuizDefinitionError::EmptyOptions { .. })
        ));
    }

    #[test]
    fn validate_rejects_copy_rules_for_unknown_questions() {
        let mut definition = quiz(vec![question("a-1", "A", &[0, 1])]);
        definition.copy_rules.push(CopyRule {
            target: "a-2".to_string(),
            source: "a-1".to_string(),
        });
        assert!(matches!(
            definition.validate(),
            Err(QuizDefinitionError::UnknownQuestion { .. })
        ));
    }

    #[test]
    fn positional_keys_are_recognized() {
        assert!(is_positional_key("q1"));
        assert!(is_positional_key("q15"));
        assert!(!is_positional_key("q"));
        assert!(!is_positional_key("qa"));
        assert!(!is_positional_key("politicas-1"));
        assert_eq!(positional_key(0), "q1");
    }

    #[test]
    fn quiz_kind_follows_quiz_id() {
        assert_eq!(QuizKind::from_quiz_id(INITIAL_QUIZ_ID), QuizKind::Initial);
        assert_eq!(QuizKind::from_quiz_id(ADVANCED_QUIZ_ID), QuizKind::Advanced);
        assert_eq!(QuizKind::from_quiz_id("unknown"), QuizKind::Advanced);
        assert_eq!(QuizKind::from_quiz_id(" Evaluacion-Inicial "), QuizKind::Initial);
    }

    #[test]
    fn max_total_saturates_on_oversized_options() {
        let definition = quiz(vec![
            question("a-1", "A", &[0, i32::MAX]),
            question("a-2", "A", &[0, i32::MAX]),
        ]);
        definition.validate().expect("large options are valid");
        assert_eq!(definition.max_total(), i32::MAX);
    }
}
