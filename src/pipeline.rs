//! Extractor, matcher and selector run in sequence over one job offer

use crate::config::Config;
use crate::error::{PipelineWarning, Result, Stage, TailorError};
use crate::llm::{SemanticReasoner, UsageSummary};
use crate::matching::{SkillMatch, SkillMatcher};
use crate::profile::CandidateProfile;
use crate::requirements::{JobRequirement, RequirementExtractor};
use crate::selection::{ProjectSelection, ProjectSelector};
use log::info;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag. Checked before each service call; a call already in
/// flight runs to completion or timeout.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self, stage: Stage) -> Result<()> {
        if self.is_cancelled() {
            Err(TailorError::Cancelled(stage))
        } else {
            Ok(())
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct TailoringOutcome {
    pub requirement: JobRequirement,
    pub skill_match: SkillMatch,
    pub selection: ProjectSelection,
    pub warnings: Vec<PipelineWarning>,
    pub reasoner: String,
    pub usage: UsageSummary,
}

type ProgressFn<'a> = Box<dyn Fn(Stage) + Send + Sync + 'a>;

pub struct Pipeline<'a> {
    reasoner: &'a dyn SemanticReasoner,
    config: &'a Config,
    cancel: CancelFlag,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(reasoner: &'a dyn SemanticReasoner, config: &'a Config) -> Self {
        Self {
            reasoner,
            config,
            cancel: CancelFlag::new(),
            progress: None,
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Called with each stage just before its service call starts
    pub fn with_progress(mut self, progress: impl Fn(Stage) + Send + Sync + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    fn begin(&self, stage: Stage) -> Result<()> {
        self.cancel.check(stage)?;
        if let Some(progress) = &self.progress {
            progress(stage);
        }
        Ok(())
    }

    pub async fn extract(&self, job_text: &str) -> Result<(JobRequirement, Vec<PipelineWarning>)> {
        self.begin(Stage::Extraction)?;
        RequirementExtractor::new(self.reasoner).extract(job_text).await
    }

    pub async fn match_skills(
        &self,
        requirement: &JobRequirement,
        profile: &CandidateProfile,
    ) -> Result<(SkillMatch, Vec<PipelineWarning>)> {
        self.begin(Stage::Matching)?;
        SkillMatcher::new(self.reasoner)
            .match_skills(requirement, profile)
            .await
    }

    pub async fn select_projects(
        &self,
        requirement: &JobRequirement,
        skill_match: &SkillMatch,
        profile: &CandidateProfile,
        k: usize,
    ) -> Result<(ProjectSelection, Vec<PipelineWarning>)> {
        self.begin(Stage::Selection)?;
        ProjectSelector::new(self.reasoner, &self.config.selection)
            .select(requirement, skill_match, &profile.projects, k)
            .await
    }

    /// Full single-pass run. `project_count` overrides the configured count.
    pub async fn run(
        &self,
        job_text: &str,
        profile: &CandidateProfile,
        project_count: Option<usize>,
    ) -> Result<TailoringOutcome> {
        let k = project_count.unwrap_or(self.config.selection.project_count);
        if k < 1 {
            return Err(TailorError::InvalidInput(
                "project count must be at least 1".to_string(),
            ));
        }

        let mut warnings = Vec::new();

        let (requirement, stage_warnings) = self.extract(job_text).await?;
        warnings.extend(stage_warnings);

        let (skill_match, stage_warnings) = self.match_skills(&requirement, profile).await?;
        warnings.extend(stage_warnings);

        let (selection, stage_warnings) = self
            .select_projects(&requirement, &skill_match, profile, k)
            .await?;
        warnings.extend(stage_warnings);

        info!(
            "Pipeline finished with {} warning(s) using {}",
            warnings.len(),
            self.reasoner.name()
        );

        Ok(TailoringOutcome {
            requirement,
            skill_match,
            selection,
            warnings,
            reasoner: self.reasoner.name().to_string(),
            usage: self.reasoner.usage(),
        })
    }
}
