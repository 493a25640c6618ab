//! Semantic reasoning capability behind the three pipeline stages
//!
//! Every judgement that needs language understanding (reading a posting,
//! deciding that "Postgres" and "PostgreSQL" are the same skill, comparing
//! projects) goes through [`SemanticReasoner`]. The production backend talks
//! to a chat-completions service; `KeywordReasoner` answers offline; tests
//! plug in deterministic stubs.

pub mod client;
pub mod keyword;
pub mod prompts;
pub mod service;
pub mod usage;

use crate::error::Result;
use crate::matching::SkillMatch;
use crate::profile::{Project, SkillRecord};
use crate::requirements::JobRequirement;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::{CompletionBackend, HttpBackend, ServiceError};
pub use keyword::KeywordReasoner;
pub use service::LlmReasoner;
pub use usage::{UsageSummary, UsageTracker};

#[async_trait]
pub trait SemanticReasoner: Send + Sync {
    /// Short backend label shown in reports
    fn name(&self) -> &str;

    async fn extract(&self, raw_text: &str) -> Result<ExtractionReply>;

    async fn match_skills(&self, request: &MatchRequest<'_>) -> Result<MatchReply>;

    async fn rank_projects(&self, request: &RankRequest<'_>) -> Result<RankReply>;

    /// Token usage accumulated so far; backends without billing report nothing
    fn usage(&self) -> UsageSummary {
        UsageSummary::default()
    }
}

/// Raw extraction answer. Fields are optional so a missing key can be reported
/// as a schema violation instead of a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionReply {
    pub title: Option<String>,
    pub organization: Option<String>,
    pub location: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub preferred_skills: Option<Vec<String>>,
    pub responsibilities: Option<Vec<String>>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchRequest<'a> {
    /// Requirement skills, required first
    pub requirements: &'a [String],
    pub skills: &'a [SkillRecord],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchReply {
    pub matches: Vec<MatchVerdict>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchVerdict {
    pub requirement: String,
    /// Best profile skill name, `None` when nothing fits
    #[serde(default)]
    pub skill: Option<String>,
    /// Other profile skill names judged equally plausible
    #[serde(default)]
    pub alternatives: Vec<String>,
    pub relevance: f64,
    #[serde(default)]
    pub justification: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankRequest<'a> {
    pub job: &'a JobRequirement,
    pub skill_match: &'a SkillMatch,
    pub projects: &'a [Project],
    pub min_chars: usize,
    pub max_chars: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankReply {
    pub ranking: Vec<RankedProject>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedProject {
    /// Position of the project in the request's project list
    pub index: usize,
    /// Opaque relevance; only its ordering matters
    pub score: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rationale: String,
}
