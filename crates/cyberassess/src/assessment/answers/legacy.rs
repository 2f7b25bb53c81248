use std::collections::BTreeMap;

use super::super::quiz::{is_positional_key, positional_key, QuizDefinition};

/// Declarative mapping from canonical question ids to the keys older records used.
///
/// Descriptive quizzes (`politicas-1`, ...) accept the positional key of the same
/// question (`q1`, ...). Positional quizzes instead claim unmatched descriptive keys
/// in record order. Direct keys always win over anything listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyKeyTable {
    aliases: BTreeMap<String, Vec<String>>,
    claim_descriptive_keys: bool,
}

impl LegacyKeyTable {
    /// A table that never matches anything beyond direct keys.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn for_quiz(quiz: &QuizDefinition) -> Self {
        let mut table = Self::empty();

        if quiz.uses_positional_ids() {
            table.claim_descriptive_keys = true;
        } else {
            for (index, question) in quiz.questions.iter().enumerate() {
                if !is_positional_key(&question.id) {
                    table
                        .aliases
                        .entry(question.id.clone())
                        .or_default()
                        .push(positional_key(index));
                }
            }
        }

        for (question_id, keys) in &quiz.legacy_aliases {
            table
                .aliases
                .entry(question_id.clone())
                .or_default()
                .extend(keys.iter().cloned());
        }

        table
    }

    pub fn with_alias(mut self, question_id: impl Into<String>, legacy_key: impl Into<String>) -> Self {
        self.aliases
            .entry(question_id.into())
            .or_default()
            .push(legacy_key.into());
        self
    }

    pub fn with_descriptive_key_claims(mut self, enabled: bool) -> Self {
        self.claim_descriptive_keys = enabled;
        self
    }

    pub fn aliases_for(&self, question_id: &str) -> &[String] {
        self.aliases
            .get(question_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn claims_descriptive_keys(&self) -> bool {
        self.claim_descriptive_keys
    }
}

pub(crate) fn is_descriptive_key(key: &str) -> bool {
    key.contains('-')
}
