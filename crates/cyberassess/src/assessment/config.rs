use serde::{Deserialize, Serialize};

pub const DEFAULT_FILL_VALUE: i32 = 2;
pub const DEFAULT_WEAKEST_CATEGORY_COUNT: usize = 2;

/// Tunables for answer normalization and report assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Value assigned to unanswered questions when no answer could be resolved at all.
    pub default_fill_value: i32,
    pub weakest_category_count: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_fill_value: DEFAULT_FILL_VALUE,
            weakest_category_count: DEFAULT_WEAKEST_CATEGORY_COUNT,
        }
    }
}
