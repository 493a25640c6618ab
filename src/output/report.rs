//! Report of a tailoring run

use crate::error::PipelineWarning;
use crate::llm::UsageSummary;
use crate::matching::SkillMatch;
use crate::pipeline::TailoringOutcome;
use crate::requirements::JobRequirement;
use crate::selection::ProjectSelection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailoringReport {
    pub summary: RunSummary,
    pub requirement: JobRequirement,
    pub skill_match: SkillMatch,
    pub selection: ProjectSelection,
    pub warnings: Vec<String>,
    pub usage: UsageSummary,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Required skills covered, 0-100
    pub coverage_percentage: u8,
    pub matched: usize,
    pub total_requirements: usize,
    pub gaps: Vec<String>,
    pub verdict: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: SystemTime,
    pub tailor_version: String,
    pub job_source: String,
    pub profile_file: String,
    pub reasoner: String,
    pub processing_time_ms: u64,
    pub documents: Vec<PathBuf>,
}

impl ReportMetadata {
    pub fn new(job_source: String, profile_file: String, processing_time_ms: u64) -> Self {
        Self {
            generated_at: SystemTime::now(),
            tailor_version: env!("CARGO_PKG_VERSION").to_string(),
            job_source,
            profile_file,
            reasoner: String::new(),
            processing_time_ms,
            documents: Vec::new(),
        }
    }
}

fn verdict(coverage: u8, gaps: usize) -> String {
    match coverage {
        90..=100 => "Strong fit: the profile covers the required skills".to_string(),
        70..=89 => format!("Good fit with {} gap(s) worth addressing in the letter", gaps),
        40..=69 => format!("Partial fit: {} required skill(s) missing", gaps),
        _ => "Weak fit: most required skills are missing".to_string(),
    }
}

impl TailoringReport {
    pub fn new(outcome: TailoringOutcome, mut metadata: ReportMetadata) -> Self {
        let coverage = (outcome.skill_match.coverage() * 100.0).round().clamp(0.0, 100.0) as u8;
        let gaps: Vec<String> = outcome
            .skill_match
            .gaps()
            .into_iter()
            .map(str::to_string)
            .collect();

        let summary = RunSummary {
            coverage_percentage: coverage,
            matched: outcome.skill_match.ranked().len(),
            total_requirements: outcome.skill_match.len(),
            verdict: verdict(coverage, gaps.len()),
            gaps,
        };
        metadata.reasoner = outcome.reasoner;

        Self {
            summary,
            requirement: outcome.requirement,
            skill_match: outcome.skill_match,
            selection: outcome.selection,
            warnings: outcome
                .warnings
                .iter()
                .map(PipelineWarning::to_string)
                .collect(),
            usage: outcome.usage,
            metadata,
        }
    }
}
