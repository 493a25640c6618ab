//! Structured requirements derived from a job posting

pub mod extractor;

use serde::{Deserialize, Serialize};

pub use extractor::RequirementExtractor;

/// Requirement set for a single posting. Produced once by the extractor and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    pub title: String,
    pub organization: String,
    pub location: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub responsibilities: Vec<String>,
    /// ISO 639-1 code of the posting language
    pub language: String,
}

impl JobRequirement {
    /// Required skills followed by preferred ones, without repeats
    pub fn all_skills(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.required_skills
            .iter()
            .chain(self.preferred_skills.iter())
            .filter(|s| seen.insert(s.to_lowercase()))
            .cloned()
            .collect()
    }

    pub fn is_required(&self, skill: &str) -> bool {
        self.required_skills
            .iter()
            .any(|s| s.eq_ignore_ascii_case(skill))
    }

    pub fn has_discernible_skills(&self) -> bool {
        !self.required_skills.is_empty()
    }
}
