//! Evaluation options

use serde::{Deserialize, Serialize};

/// Knobs controlling validation and path resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationOptions {
    /// Require `k <= children` on MIN_OR / MAX_OR nodes
    ///
    /// When disabled only `k >= 1` is enforced; scoring then pads the
    /// missing top-k / bottom-k slots with zero and MIN_OR never matches.
    pub strict_modifier_bounds: bool,
    /// Reject predicates whose path belongs to another entity type
    pub check_entity_paths: bool,
    /// Wrapper segment prepended to every resolved path, e.g. `contained`
    pub path_prefix: Option<String>,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            strict_modifier_bounds: true,
            check_entity_paths: false,
            path_prefix: None,
        }
    }
}

impl EvaluationOptions {
    pub fn lenient_modifiers(mut self) -> Self {
        self.strict_modifier_bounds = false;
        self
    }

    pub fn with_entity_path_check(mut self) -> Self {
        self.check_entity_paths = true;
        self
    }

    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }
}
