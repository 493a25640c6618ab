//! Portfolio project selection

pub mod selector;
pub mod truncate;

use crate::profile::Project;
use serde::{Deserialize, Serialize};

pub use selector::ProjectSelector;
pub use truncate::{display_len, truncate_at_word};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedProject {
    pub project: Project,
    /// Opaque service score, compared only for ordering
    pub score: f64,
    /// Rendered description, never longer than the configured ceiling
    pub description: String,
    pub truncated: bool,
    pub rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSelection {
    pub selected: Vec<SelectedProject>,
    pub requested: usize,
    pub available: usize,
    pub insufficient_projects: bool,
    pub summary: Option<String>,
}

impl ProjectSelection {
    pub fn names(&self) -> Vec<&str> {
        self.selected.iter().map(|s| s.project.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
