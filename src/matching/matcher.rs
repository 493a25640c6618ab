//! Batched skill matching against the candidate profile

use crate::error::{PipelineWarning, Result, Stage, TailorError};
use crate::llm::{MatchRequest, MatchVerdict, SemanticReasoner};
use crate::matching::{MatchEntry, SkillMatch};
use crate::profile::{normalize_name, CandidateProfile, SkillRecord};
use crate::requirements::JobRequirement;
use log::{debug, info};
use std::collections::HashMap;

pub struct SkillMatcher<'a> {
    reasoner: &'a dyn SemanticReasoner,
}

impl<'a> SkillMatcher<'a> {
    pub fn new(reasoner: &'a dyn SemanticReasoner) -> Self {
        Self { reasoner }
    }

    /// Match every requirement skill in one request. The result always has an
    /// entry per requirement; unmatched ones carry no skill.
    pub async fn match_skills(
        &self,
        job: &JobRequirement,
        profile: &CandidateProfile,
    ) -> Result<(SkillMatch, Vec<PipelineWarning>)> {
        let keys = job.all_skills();
        if keys.is_empty() {
            debug!("No requirement skills to match");
            return Ok((SkillMatch::default(), Vec::new()));
        }

        let reply = self
            .reasoner
            .match_skills(&MatchRequest {
                requirements: &keys,
                skills: &profile.skills,
            })
            .await?;

        let mut verdicts: HashMap<String, MatchVerdict> = HashMap::new();
        for verdict in reply.matches {
            if !verdict.relevance.is_finite() || !(0.0..=1.0).contains(&verdict.relevance) {
                return Err(TailorError::schema(
                    Stage::Matching,
                    format!(
                        "relevance {} for '{}' is outside [0, 1]",
                        verdict.relevance, verdict.requirement
                    ),
                ));
            }
            verdicts
                .entry(verdict.requirement.trim().to_lowercase())
                .or_insert(verdict);
        }

        let mut warnings = Vec::new();
        let mut entries = Vec::with_capacity(keys.len());
        for key in &keys {
            let required = job.is_required(key);
            let entry = match verdicts.remove(&key.to_lowercase()) {
                Some(verdict) => resolve(key, required, verdict, profile, &mut warnings),
                None => {
                    debug!("No verdict for '{}', recording as unmatched", key);
                    absent(key, required, "Not assessed by the matcher".to_string())
                }
            };
            entries.push(entry);
        }

        for unknown in verdicts.keys() {
            debug!("Ignoring verdict for unknown requirement '{}'", unknown);
        }

        let skill_match = SkillMatch { entries };
        info!(
            "Matched {}/{} requirement skills, required coverage {:.0}%",
            skill_match.ranked().len(),
            skill_match.len(),
            skill_match.coverage() * 100.0
        );
        Ok((skill_match, warnings))
    }
}

fn absent(requirement: &str, required: bool, justification: String) -> MatchEntry {
    MatchEntry {
        requirement: requirement.to_string(),
        required,
        skill: None,
        relevance: 0.0,
        justification,
    }
}

/// Turn reported names into a profile record. Names the profile does not
/// contain are never guessed at.
fn resolve(
    requirement: &str,
    required: bool,
    verdict: MatchVerdict,
    profile: &CandidateProfile,
    warnings: &mut Vec<PipelineWarning>,
) -> MatchEntry {
    let Some(primary) = verdict.skill.as_deref().filter(|s| !s.trim().is_empty()) else {
        return absent(requirement, required, verdict.justification);
    };

    let mut names = vec![normalize_name(primary)];
    names.extend(verdict.alternatives.iter().map(|a| normalize_name(a)));

    match pick_best(&profile.skills, &names) {
        Some(record) => MatchEntry {
            requirement: requirement.to_string(),
            required,
            skill: Some(record.clone()),
            relevance: verdict.relevance,
            justification: verdict.justification,
        },
        None => {
            warnings.push(PipelineWarning::UnresolvedSkill {
                requirement: requirement.to_string(),
                reported: primary.to_string(),
            });
            absent(
                requirement,
                required,
                format!("Reported skill '{}' is not in the profile", primary),
            )
        }
    }
}

/// Among records named in `names`: most years, then highest level, then profile order
fn pick_best<'p>(skills: &'p [SkillRecord], names: &[String]) -> Option<&'p SkillRecord> {
    skills
        .iter()
        .enumerate()
        .filter(|(_, s)| names.contains(&normalize_name(&s.name)))
        .min_by(|(ia, a), (ib, b)| {
            b.years
                .total_cmp(&a.years)
                .then_with(|| b.level.cmp(&a.level))
                .then_with(|| ia.cmp(ib))
        })
        .map(|(_, s)| s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{PersonalInfo, Proficiency};

    #[test]
    fn test_pick_best_prefers_years_then_level() {
        let skills = vec![
            SkillRecord::new("Python", 2.0, Proficiency::Advanced),
            SkillRecord::new("python", 5.0, Proficiency::Expert),
            SkillRecord::new("Python", 5.0, Proficiency::Advanced),
        ];
        let best = pick_best(&skills, &["python".to_string()]).unwrap();
        assert_eq!(best.years, 5.0);
        assert_eq!(best.level, Proficiency::Expert);
    }

    #[test]
    fn test_pick_best_falls_back_to_profile_order() {
        let skills = vec![
            SkillRecord::new("Postgres", 3.0, Proficiency::Advanced),
            SkillRecord::new("PostgreSQL", 3.0, Proficiency::Advanced),
        ];
        let names = vec!["postgresql".to_string(), "postgres".to_string()];
        assert_eq!(pick_best(&skills, &names).unwrap().name, "Postgres");
    }

    fn verdict(skill: &str, alternatives: &[&str]) -> MatchVerdict {
        MatchVerdict {
            requirement: "Postgres".to_string(),
            skill: Some(skill.to_string()),
            alternatives: alternatives.iter().map(|s| s.to_string()).collect(),
            relevance: 0.8,
            justification: "close variant".to_string(),
        }
    }

    fn profile_with(skills: Vec<SkillRecord>) -> CandidateProfile {
        CandidateProfile {
            personal_info: PersonalInfo {
                name: "Alex Doe".to_string(),
                email: "alex@example.com".to_string(),
                phone: None,
                location: None,
                gender: Default::default(),
                urls: Default::default(),
            },
            skills,
            projects: Vec::new(),
            experiences: Vec::new(),
            education: Vec::new(),
            languages: Vec::new(),
            achievements: Vec::new(),
        }
    }

    #[test]
    fn test_alternative_resolves_without_warning() {
        let profile =
            profile_with(vec![SkillRecord::new("PostgreSQL", 4.0, Proficiency::Advanced)]);
        let mut warnings = Vec::new();

        let entry = resolve(
            "Postgres",
            true,
            verdict("Postgres DB", &["PostgreSQL"]),
            &profile,
            &mut warnings,
        );

        assert_eq!(entry.skill.unwrap().name, "PostgreSQL");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unknown_name_is_warned_and_unmatched() {
        let profile = profile_with(vec![SkillRecord::new("Rust", 4.0, Proficiency::Advanced)]);
        let mut warnings = Vec::new();

        let entry = resolve(
            "Postgres",
            true,
            verdict("Postgres DB", &["MySQL"]),
            &profile,
            &mut warnings,
        );

        assert!(entry.skill.is_none());
        assert_eq!(entry.relevance, 0.0);
        assert_eq!(
            warnings,
            vec![PipelineWarning::UnresolvedSkill {
                requirement: "Postgres".to_string(),
                reported: "Postgres DB".to_string(),
            }]
        );
    }

    #[test]
    fn test_pick_best_none_when_unknown() {
        let skills = vec![SkillRecord::new("Rust", 1.0, Proficiency::Novice)];
        assert!(pick_best(&skills, &["cobol".to_string()]).is_none());
    }
}
