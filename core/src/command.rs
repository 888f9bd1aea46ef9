use serde::{Deserialize, Serialize};

/// All UI-issued events that change the active filter.
/// Dropdown fields carry the raw label; a missing value or the "any"
/// label means no constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum HubEvent {
    /// Search box changed.
    Search { query: String },

    /// Any dropdown changed. Carries all three current selections.
    ApplyFilters {
        #[serde(default)]
        age: Option<String>,
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        product: Option<String>,
    },

    Reset,
}

impl HubEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::ApplyFilters { .. } => "apply_filters",
            Self::Reset => "reset",
        }
    }
}
