//! Requirement-to-profile skill matching

pub mod matcher;

use crate::profile::SkillRecord;
use serde::{Deserialize, Serialize};

pub use matcher::SkillMatcher;

/// Outcome for one requirement skill. `skill` is `None` when nothing in the
/// profile satisfies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub requirement: String,
    pub required: bool,
    pub skill: Option<SkillRecord>,
    pub relevance: f64,
    pub justification: String,
}

impl MatchEntry {
    pub fn is_matched(&self) -> bool {
        self.skill.is_some()
    }
}

/// One entry per requirement skill, required skills first, in posting order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub entries: Vec<MatchEntry>,
}

impl SkillMatch {
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.requirement.as_str()).collect()
    }

    pub fn get(&self, requirement: &str) -> Option<&MatchEntry> {
        self.entries
            .iter()
            .find(|e| e.requirement.eq_ignore_ascii_case(requirement))
    }

    /// Matched entries, most relevant first
    pub fn ranked(&self) -> Vec<&MatchEntry> {
        let mut matched: Vec<&MatchEntry> = self.entries.iter().filter(|e| e.is_matched()).collect();
        matched.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        matched
    }

    /// Required skills without a match
    pub fn gaps(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.required && !e.is_matched())
            .map(|e| e.requirement.as_str())
            .collect()
    }

    /// Share of required skills that found a match, 1.0 when none are required
    pub fn coverage(&self) -> f64 {
        let required = self.entries.iter().filter(|e| e.required).count();
        if required == 0 {
            return 1.0;
        }
        let matched = self
            .entries
            .iter()
            .filter(|e| e.required && e.is_matched())
            .count();
        matched as f64 / required as f64
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
