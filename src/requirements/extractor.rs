//! Requirement extraction: raw posting text to a validated `JobRequirement`

use crate::error::{PipelineWarning, Result, Stage, TailorError};
use crate::llm::{ExtractionReply, SemanticReasoner};
use crate::requirements::JobRequirement;
use log::{debug, info};
use std::collections::HashSet;

pub struct RequirementExtractor<'a> {
    reasoner: &'a dyn SemanticReasoner,
}

impl<'a> RequirementExtractor<'a> {
    pub fn new(reasoner: &'a dyn SemanticReasoner) -> Self {
        Self { reasoner }
    }

    /// One structured request to the reasoner, then schema validation of the reply
    pub async fn extract(&self, raw_text: &str) -> Result<(JobRequirement, Vec<PipelineWarning>)> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(TailorError::InvalidInput(
                "job offer text is empty".to_string(),
            ));
        }

        debug!("Extracting requirements from {} characters", text.len());
        let reply = self.reasoner.extract(text).await?;
        let requirement = validate_reply(reply)?;

        info!(
            "Extracted '{}' at '{}': {} required, {} preferred skills",
            requirement.title,
            requirement.organization,
            requirement.required_skills.len(),
            requirement.preferred_skills.len()
        );

        let mut warnings = Vec::new();
        if !requirement.has_discernible_skills() {
            warnings.push(PipelineWarning::NoDiscernibleSkills);
        }
        Ok((requirement, warnings))
    }
}

fn validate_reply(reply: ExtractionReply) -> Result<JobRequirement> {
    let missing = |field: &str| {
        TailorError::schema(
            Stage::Extraction,
            format!("response is missing required field '{}'", field),
        )
    };

    let required_skills = reply.required_skills.ok_or_else(|| missing("required_skills"))?;
    let responsibilities = reply
        .responsibilities
        .ok_or_else(|| missing("responsibilities"))?;

    Ok(JobRequirement {
        title: reply.title.ok_or_else(|| missing("title"))?.trim().to_string(),
        organization: reply.organization.unwrap_or_default().trim().to_string(),
        location: reply.location.unwrap_or_default().trim().to_string(),
        required_skills: clean_list(required_skills),
        preferred_skills: clean_list(
            reply
                .preferred_skills
                .ok_or_else(|| missing("preferred_skills"))?,
        ),
        responsibilities: clean_list(responsibilities),
        language: reply
            .language
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "en".to_string()),
    })
}

/// Trim entries, drop blanks and case-insensitive repeats, keep first-seen order
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}
