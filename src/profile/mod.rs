//! Candidate profile: identity, skill inventory and portfolio projects

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use loader::ProfileLoader;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub personal_info: PersonalInfo,
    pub skills: Vec<SkillRecord>,
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub urls: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    #[serde(alias = "Male")]
    Male,
    #[serde(alias = "Female")]
    Female,
}

/// Ordered proficiency scale, Novice < Intermediate < Advanced < Expert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    #[serde(alias = "Novice", alias = "beginner")]
    Novice,
    #[serde(alias = "Intermediate")]
    Intermediate,
    #[serde(alias = "Advanced")]
    Advanced,
    #[serde(alias = "Expert")]
    Expert,
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Proficiency::Novice => "Novice",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Advanced => "Advanced",
            Proficiency::Expert => "Expert",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    pub years: f32,
    pub level: Proficiency,
}

impl SkillRecord {
    pub fn new(name: &str, years: f32, level: Proficiency) -> Self {
        Self {
            name: name.to_string(),
            years,
            level,
        }
    }
}

impl fmt::Display for SkillRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} yrs, {})", self.name, self.years, self.level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(alias = "title")]
    pub name: String,
    pub description: String,
    #[serde(default, alias = "technologies")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Project {
    pub fn has_impact(&self) -> bool {
        self.impact
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub details: Vec<String>,
}

/// Normalize a skill or tag name for comparison: lowercase, alphanumerics plus `+` and `#`
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == '+' || *c == '#')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

impl CandidateProfile {
    /// All skill records whose normalized name equals `name`
    pub fn skills_named(&self, name: &str) -> Vec<&SkillRecord> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return Vec::new();
        }
        self.skills
            .iter()
            .filter(|s| normalize_name(&s.name) == wanted)
            .collect()
    }

    /// Achievements from experiences followed by profile-level ones
    pub fn all_achievements(&self) -> Vec<&str> {
        self.experiences
            .iter()
            .flat_map(|e| e.achievements.iter())
            .chain(self.achievements.iter())
            .map(|s| s.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proficiency_ordering() {
        assert!(Proficiency::Novice < Proficiency::Intermediate);
        assert!(Proficiency::Intermediate < Proficiency::Advanced);
        assert!(Proficiency::Advanced < Proficiency::Expert);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Node.js"), "nodejs");
        assert_eq!(normalize_name("  C++ "), "c++");
        assert_eq!(normalize_name("C#"), "c#");
    }

    #[test]
    fn test_skills_named_is_case_insensitive() {
        let profile = CandidateProfile {
            personal_info: PersonalInfo {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
                location: None,
                gender: Gender::Female,
                urls: BTreeMap::new(),
            },
            skills: vec![
                SkillRecord::new("PostgreSQL", 4.0, Proficiency::Advanced),
                SkillRecord::new("Rust", 3.0, Proficiency::Advanced),
            ],
            projects: vec![],
            experiences: vec![],
            education: vec![],
            languages: vec![],
            achievements: vec![],
        };

        assert_eq!(profile.skills_named("postgresql").len(), 1);
        assert!(profile.skills_named("Postgres").is_empty());
        assert!(profile.skills_named("  ").is_empty());
    }
}
