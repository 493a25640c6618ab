//! Prompt templates for the three semantic requests
//!
//! Each template states the exact JSON shape expected back; the caller
//! validates the reply against that shape.

use crate::llm::{MatchRequest, RankRequest};
use regex::{Captures, Regex};
use serde_json::json;

/// Shared system prompt, enforces JSON-only output
pub const SYSTEM_PROMPT: &str = "You are an expert recruiter and career advisor. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub extraction: String,
    pub matching: String,
    pub ranking: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            extraction: EXTRACTION_TEMPLATE.to_string(),
            matching: MATCHING_TEMPLATE.to_string(),
            ranking: RANKING_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn render_extraction(&self, job_text: &str) -> String {
        fill(&self.extraction, &[("job", job_text.to_string())])
    }

    pub fn render_matching(&self, request: &MatchRequest<'_>) -> String {
        let skills: Vec<_> = request
            .skills
            .iter()
            .map(|s| json!({ "name": s.name, "years": s.years, "level": s.level }))
            .collect();

        fill(
            &self.matching,
            &[
                ("requirements", to_pretty(&request.requirements)),
                ("skills", to_pretty(&skills)),
            ],
        )
    }

    pub fn render_ranking(&self, request: &RankRequest<'_>) -> String {
        let projects: Vec<_> = request
            .projects
            .iter()
            .enumerate()
            .map(|(index, p)| {
                json!({
                    "index": index,
                    "name": p.name,
                    "description": p.description,
                    "tags": p.tags,
                    "impact": p.impact,
                })
            })
            .collect();

        let matched: Vec<_> = request
            .skill_match
            .ranked()
            .into_iter()
            .map(|entry| {
                json!({
                    "requirement": entry.requirement,
                    "skill": entry.skill.as_ref().map(|s| &s.name),
                    "relevance": entry.relevance,
                })
            })
            .collect();

        let job = request.job;
        fill(
            &self.ranking,
            &[
                ("title", job.title.clone()),
                ("organization", job.organization.clone()),
                ("required", to_pretty(&job.required_skills)),
                ("preferred", to_pretty(&job.preferred_skills)),
                ("responsibilities", to_pretty(&job.responsibilities)),
                ("matches", to_pretty(&matched)),
                ("projects", to_pretty(&projects)),
                ("min_chars", request.min_chars.to_string()),
                ("max_chars", request.max_chars.to_string()),
            ],
        )
    }
}

/// Substitute `{name}` slots in one pass; text coming from the offer or the
/// profile is never scanned for slots itself
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let Ok(slot) = Regex::new(r"\{([a-z_]+)\}") else {
        return template.to_string();
    };
    slot.replace_all(template, |caps: &Captures| {
        values
            .iter()
            .find(|(name, _)| *name == &caps[1])
            .map_or_else(|| caps[0].to_string(), |(_, value)| value.clone())
    })
    .into_owned()
}

fn to_pretty<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}

const EXTRACTION_TEMPLATE: &str = r#"Extract the structured requirements from the job offer below.

<JOB OFFER>
{job}
</JOB OFFER>

Return a JSON object with this EXACT schema (no extra fields):
{
  "title": "string, job title exactly as written, keep inclusive forms such as Développeur(se)",
  "organization": "string, hiring company, empty string if unknown",
  "location": "string, empty string if unknown",
  "required_skills": ["string, concrete skill or technology that is mandatory"],
  "preferred_skills": ["string, nice-to-have skill"],
  "responsibilities": ["string, one short sentence per duty"],
  "language": "string, ISO 639-1 code of the offer language"
}

Rules:
- Every array must be present; use [] when nothing applies.
- One skill per entry, no sentences in skill arrays.
- Keep the posting's wording for skills; do not invent skills that are not stated."#;

const MATCHING_TEMPLATE: &str = r#"Match each job requirement against the candidate's skill inventory.

REQUIREMENTS (in order):
{requirements}

CANDIDATE SKILLS:
{skills}

Return a JSON object with this EXACT schema:
{
  "matches": [
    {
      "requirement": "string, copied verbatim from REQUIREMENTS",
      "skill": "string or null, name copied verbatim from CANDIDATE SKILLS",
      "alternatives": ["other candidate skill names that fit equally well"],
      "relevance": 0.0,
      "justification": "string, one short sentence"
    }
  ]
}

Rules:
- Exactly one entry per requirement.
- Treat synonyms, abbreviations and spelling variants as the same skill (e.g. "Postgres" and "PostgreSQL").
- A closely related skill may match with a lower relevance.
- relevance is a number between 0 and 1.
- Use null for "skill" when no candidate skill fits. Never guess."#;

const RANKING_TEMPLATE: &str = r#"Rank the candidate's projects for this job application.

JOB:
- Title: {title}
- Organization: {organization}
- Required skills: {required}
- Preferred skills: {preferred}
- Responsibilities: {responsibilities}

SKILL MATCHES:
{matches}

PROJECTS:
{projects}

Return a JSON object with this EXACT schema:
{
  "ranking": [
    {
      "index": 0,
      "score": 0.0,
      "description": "string, rewritten project description",
      "rationale": "string, why this project was ranked here against the others"
    }
  ],
  "summary": "string, overall selection reasoning"
}

Selection criteria:
1. Overlap between project tags and the required and preferred skills
2. Relevance of the description to the responsibilities
3. A quantified impact statement, as a tie-breaker only

Rules:
- Rank every project exactly once, best first; "index" refers to PROJECTS.
- Compare projects against each other so scores are consistently calibrated.
- Each description must be between {min_chars} and {max_chars} characters, in the job offer's language."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::SkillMatch;
    use crate::profile::{Proficiency, Project, SkillRecord};
    use crate::requirements::JobRequirement;

    #[test]
    fn test_extraction_rendering() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_extraction("Senior Rust Engineer at Acme");

        assert!(prompt.contains("Senior Rust Engineer at Acme"));
        assert!(prompt.contains("<JOB OFFER>"));
        assert!(prompt.contains("\"required_skills\""));
        assert!(!prompt.contains("{job}"));
    }

    #[test]
    fn test_offer_text_with_slot_names_stays_literal() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_extraction("Use {skills} and {job} templates daily");
        assert!(prompt.contains("Use {skills} and {job} templates daily"));
    }

    #[test]
    fn test_ranking_title_is_not_reexpanded() {
        let templates = PromptTemplates::default();
        let job = JobRequirement {
            title: "Engineer {projects} {max_chars}".to_string(),
            organization: "Acme".to_string(),
            location: String::new(),
            required_skills: vec!["Rust".to_string()],
            preferred_skills: vec![],
            responsibilities: vec!["Own the {matches} pipeline".to_string()],
            language: "en".to_string(),
        };
        let skill_match = SkillMatch { entries: vec![] };
        let projects = vec![Project {
            name: "ledger".to_string(),
            description: "Double-entry ledger".to_string(),
            tags: vec!["rust".to_string()],
            impact: None,
            url: None,
        }];
        let prompt = templates.render_ranking(&RankRequest {
            job: &job,
            skill_match: &skill_match,
            projects: &projects,
            min_chars: 100,
            max_chars: 165,
        });

        assert!(prompt.contains("- Title: Engineer {projects} {max_chars}"));
        assert!(prompt.contains("Own the {matches} pipeline"));
        assert!(prompt.contains("between 100 and 165 characters"));
        assert_eq!(prompt.matches("\"Double-entry ledger\"").count(), 1);
    }

    #[test]
    fn test_matching_rendering_lists_every_skill() {
        let templates = PromptTemplates::default();
        let requirements = vec!["Postgres".to_string()];
        let skills = vec![SkillRecord::new("PostgreSQL", 4.0, Proficiency::Advanced)];
        let prompt = templates.render_matching(&MatchRequest {
            requirements: &requirements,
            skills: &skills,
        });

        assert!(prompt.contains("\"Postgres\""));
        assert!(prompt.contains("\"PostgreSQL\""));
        assert!(prompt.contains("\"advanced\""));
        assert!(!prompt.contains("{skills}"));
    }
}
