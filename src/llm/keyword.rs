//! Offline rules engine implementing `SemanticReasoner`
//!
//! Deterministic and network-free. Skills are found with an Aho-Corasick
//! scan over a technology vocabulary, names are compared with Jaro-Winkler,
//! projects are scored by tag overlap plus description/responsibility overlap.

use crate::error::{Result, TailorError};
use crate::llm::{
    ExtractionReply, MatchReply, MatchRequest, MatchVerdict, RankReply, RankRequest,
    RankedProject, SemanticReasoner,
};
use crate::profile::normalize_name;
use aho_corasick::{AhoCorasick, MatchKind};
use async_trait::async_trait;
use log::debug;
use std::collections::HashSet;
use strsim::jaro_winkler;

const SIMILARITY_THRESHOLD: f64 = 0.92;
const PREFIX_RELEVANCE: f64 = 0.85;

const VOCABULARY: &[&str] = &[
    // languages
    "rust", "python", "javascript", "typescript", "java", "c++", "c#", "go", "golang",
    "ruby", "php", "swift", "kotlin", "scala", "haskell", "elixir", "sql", "bash",
    // web
    "react", "vue", "angular", "svelte", "html", "css", "tailwind", "node.js", "nodejs",
    "express", "next.js", "django", "flask", "fastapi", "spring", "rails", "graphql",
    "rest", "grpc", "websocket",
    // infrastructure
    "docker", "kubernetes", "aws", "azure", "gcp", "terraform", "ansible", "jenkins",
    "gitlab ci", "github actions", "ci/cd", "linux", "nginx", "microservices", "git",
    // data
    "postgresql", "postgres", "mysql", "mongodb", "redis", "elasticsearch", "sqlite",
    "cassandra", "dynamodb", "kafka", "rabbitmq", "spark", "airflow", "dbt", "snowflake",
    "pandas", "numpy",
    // ml
    "machine learning", "deep learning", "tensorflow", "pytorch", "scikit-learn", "nlp",
    "llm", "computer vision",
    // practice
    "agile", "scrum", "tdd", "devops", "testing", "security",
    // soft
    "leadership", "communication", "teamwork", "mentoring", "project management",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Required,
    Preferred,
    Responsibilities,
    Other,
}

pub struct KeywordReasoner {
    matcher: AhoCorasick,
    vocabulary: Vec<String>,
}

impl KeywordReasoner {
    pub fn new() -> Result<Self> {
        Self::with_vocabulary(Vec::new())
    }

    /// Extend the built-in vocabulary, typically with the profile's skill names
    pub fn with_vocabulary(extra: Vec<String>) -> Result<Self> {
        let mut vocabulary: Vec<String> = VOCABULARY.iter().map(|s| s.to_string()).collect();
        vocabulary.extend(
            extra
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        );
        vocabulary.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        vocabulary.dedup();

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&vocabulary)
            .map_err(|e| {
                TailorError::Configuration(format!("Failed to build skill matcher: {}", e))
            })?;

        Ok(Self {
            matcher,
            vocabulary,
        })
    }

    /// Vocabulary terms in `text`, whole words only, in order of first appearance
    fn find_skills(&self, text: &str) -> Vec<String> {
        let mut found = Vec::new();
        for mat in self.matcher.find_iter(text) {
            let before = text[..mat.start()].chars().next_back();
            let after = text[mat.end()..].chars().next();
            let bounded = |c: Option<char>| c.map_or(true, |c| !c.is_alphanumeric());
            if bounded(before) && bounded(after) {
                found.push(text[mat.start()..mat.end()].to_string());
            }
        }
        found
    }
}

fn section_for(label: &str) -> Option<Section> {
    let lower = label.to_lowercase();
    if ["nice to have", "preferred", "bonus", "plus", "apprécié", "souhaité"]
        .iter()
        .any(|k| lower.contains(k))
    {
        Some(Section::Preferred)
    } else if ["requirement", "required", "must have", "qualification", "profil", "skills", "compétences"]
        .iter()
        .any(|k| lower.contains(k))
    {
        Some(Section::Required)
    } else if ["responsibilit", "you will", "what you'll do", "missions", "duties", "role"]
        .iter()
        .any(|k| lower.contains(k))
    {
        Some(Section::Responsibilities)
    } else {
        None
    }
}

/// Section switch for a heading line, with the part of the line still worth
/// scanning for skills (`Required skills: Rust, Docker` keeps `Rust, Docker`).
///
/// A heading is a `#` line, a short label ending in a colon, or a bare line of
/// at most four words naming a section. Longer prose is never a heading.
fn classify_heading(line: &str) -> Option<(Section, &str)> {
    if let Some(text) = line.strip_prefix('#') {
        let text = text.trim_start_matches('#').trim();
        return Some((section_for(text).unwrap_or(Section::Other), text));
    }

    if let Some((label, rest)) = line.split_once(':') {
        let label = label.trim();
        if label.chars().count() > 60 || label.split_whitespace().count() > 5 {
            return None;
        }
        let rest = rest.trim();
        return match section_for(label) {
            Some(section) => Some((section, rest)),
            None if rest.is_empty() => Some((Section::Other, rest)),
            None => None,
        };
    }

    if line.split_whitespace().count() <= 4
        && !line.ends_with(|c: char| matches!(c, '.' | '!' | '?'))
    {
        return section_for(line).map(|section| (section, line));
    }
    None
}

fn labelled_value(line: &str, labels: &[&str]) -> Option<String> {
    let (label, value) = line.split_once(':')?;
    let label = label.trim().to_lowercase();
    if labels.contains(&label.as_str()) && !value.trim().is_empty() {
        Some(value.trim().to_string())
    } else {
        None
    }
}

fn bullet_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    ["- ", "* ", "• ", "+ "]
        .iter()
        .find_map(|b| trimmed.strip_prefix(b))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn detect_language(text: &str) -> &'static str {
    let lower = format!(" {} ", text.to_lowercase());
    let hits = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count();
    let fr = hits(&[" vous ", " nous ", " et ", " des ", " pour ", " avec "]);
    let es = hits(&[" usted ", " nosotros ", " para ", " con ", " los ", " experiencia "]);
    let en = hits(&[" you ", " we ", " and ", " the ", " with ", " for "]);

    if fr > en && fr >= es {
        "fr"
    } else if es > en && es > fr {
        "es"
    } else {
        "en"
    }
}

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(|w| w.to_lowercase())
        .collect()
}

#[async_trait]
impl SemanticReasoner for KeywordReasoner {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn extract(&self, raw_text: &str) -> Result<ExtractionReply> {
        let mut title = None;
        let mut organization = String::new();
        let mut location = String::new();
        let mut required = Vec::new();
        let mut preferred = Vec::new();
        let mut responsibilities = Vec::new();
        let mut section = Section::Preamble;

        for line in raw_text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(value) = labelled_value(trimmed, &["title", "position", "poste", "job title"]) {
                title = Some(value);
                continue;
            }
            if let Some(value) = labelled_value(trimmed, &["company", "organization", "entreprise", "empresa"]) {
                organization = value;
                continue;
            }
            if let Some(value) = labelled_value(trimmed, &["location", "lieu", "localisation", "ubicación"]) {
                location = value;
                continue;
            }

            if bullet_text(trimmed).is_none() {
                if let Some((next, rest)) = classify_heading(trimmed) {
                    section = next;
                    if title.is_none() && section == Section::Other && trimmed.starts_with('#') {
                        title = Some(rest.to_string());
                        continue;
                    }
                    let skills = self.find_skills(rest);
                    match section {
                        Section::Preferred => preferred.extend(skills),
                        _ => required.extend(skills),
                    }
                    continue;
                }
                if title.is_none() {
                    title = Some(trimmed.trim_start_matches('#').trim().to_string());
                    continue;
                }
            }

            if section == Section::Responsibilities {
                if let Some(item) = bullet_text(trimmed) {
                    responsibilities.push(item.to_string());
                }
            }

            let skills = self.find_skills(trimmed);
            match section {
                Section::Preferred => preferred.extend(skills),
                _ => required.extend(skills),
            }
        }

        // a skill named in both places counts as required
        let required_keys: HashSet<String> = required.iter().map(|s| normalize_name(s)).collect();
        preferred.retain(|s| !required_keys.contains(&normalize_name(s)));

        debug!(
            "Keyword extraction: {} required, {} preferred, {} responsibilities",
            required.len(),
            preferred.len(),
            responsibilities.len()
        );

        Ok(ExtractionReply {
            title: Some(title.unwrap_or_default()),
            organization: Some(organization),
            location: Some(location),
            required_skills: Some(required),
            preferred_skills: Some(preferred),
            responsibilities: Some(responsibilities),
            language: Some(detect_language(raw_text).to_string()),
        })
    }

    async fn match_skills(&self, request: &MatchRequest<'_>) -> Result<MatchReply> {
        let matches = request
            .requirements
            .iter()
            .map(|requirement| {
                let wanted = normalize_name(requirement);
                let mut scored: Vec<(f64, &str)> = request
                    .skills
                    .iter()
                    .filter_map(|skill| {
                        let have = normalize_name(&skill.name);
                        if wanted.is_empty() || have.is_empty() {
                            return None;
                        }
                        let relevance = if have == wanted {
                            1.0
                        } else if (have.starts_with(&wanted) || wanted.starts_with(&have))
                            && have.len().min(wanted.len()) >= 4
                        {
                            PREFIX_RELEVANCE
                        } else {
                            let similarity = jaro_winkler(&have, &wanted);
                            if similarity >= SIMILARITY_THRESHOLD {
                                similarity
                            } else {
                                return None;
                            }
                        };
                        Some((relevance, skill.name.as_str()))
                    })
                    .collect();

                scored.sort_by(|a, b| b.0.total_cmp(&a.0));
                match scored.first() {
                    Some(&(best, name)) => MatchVerdict {
                        requirement: requirement.clone(),
                        skill: Some(name.to_string()),
                        alternatives: scored[1..]
                            .iter()
                            .filter(|(r, _)| (*r - best).abs() < f64::EPSILON)
                            .map(|(_, n)| n.to_string())
                            .collect(),
                        relevance: best,
                        justification: if best >= 1.0 {
                            format!("Profile lists {}", name)
                        } else {
                            format!("{} is a close variant of {}", name, requirement)
                        },
                    },
                    None => MatchVerdict {
                        requirement: requirement.clone(),
                        skill: None,
                        alternatives: Vec::new(),
                        relevance: 0.0,
                        justification: "No comparable skill in profile".to_string(),
                    },
                }
            })
            .collect();

        Ok(MatchReply { matches })
    }

    async fn rank_projects(&self, request: &RankRequest<'_>) -> Result<RankReply> {
        let job = request.job;
        let required: HashSet<String> = job.required_skills.iter().map(|s| normalize_name(s)).collect();
        let preferred: HashSet<String> = job.preferred_skills.iter().map(|s| normalize_name(s)).collect();
        let duty_words: HashSet<String> = job.responsibilities.iter().flat_map(|r| words(r)).collect();
        let skill_weight = (required.len() as f64 + 0.5 * preferred.len() as f64).max(1.0);

        let ranking = request
            .projects
            .iter()
            .enumerate()
            .map(|(index, project)| {
                let mut covered = Vec::new();
                let mut tag_score = 0.0;
                for tag in &project.tags {
                    let key = normalize_name(tag);
                    if required.contains(&key) {
                        tag_score += 1.0;
                        covered.push(tag.clone());
                    } else if preferred.contains(&key) {
                        tag_score += 0.5;
                        covered.push(tag.clone());
                    }
                }

                let description_words = words(&project.description);
                let text_score = if duty_words.is_empty() {
                    0.0
                } else {
                    description_words.intersection(&duty_words).count() as f64
                        / duty_words.len() as f64
                };
                let impact_score = if project.has_impact() { 0.1 } else { 0.0 };
                let score = tag_score / skill_weight + 0.3 * text_score + impact_score;

                let rationale = if covered.is_empty() {
                    "No direct technology overlap with the offer".to_string()
                } else {
                    format!("Covers {}", covered.join(", "))
                };

                RankedProject {
                    index,
                    score,
                    description: project.description.clone(),
                    rationale,
                }
            })
            .collect();

        Ok(RankReply {
            ranking,
            summary: Some("Ranked by technology overlap and responsibility coverage".to_string()),
        })
    }
}

impl std::fmt::Debug for KeywordReasoner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordReasoner")
            .field("vocabulary", &self.vocabulary.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Proficiency, SkillRecord};

    const POSTING: &str = "\
Senior Backend Engineer
Company: Acme Corp
Location: Lyon, France

Requirements:
- 5 years of Rust and PostgreSQL
- Docker in production

Nice to have:
- Kafka
- Rust tooling

Responsibilities:
- Design and build payment APIs
- Mentor the team
";

    #[tokio::test]
    async fn test_extract_sections() {
        let reasoner = KeywordReasoner::new().unwrap();
        let reply = reasoner.extract(POSTING).await.unwrap();

        assert_eq!(reply.title.as_deref(), Some("Senior Backend Engineer"));
        assert_eq!(reply.organization.as_deref(), Some("Acme Corp"));
        assert_eq!(reply.location.as_deref(), Some("Lyon, France"));
        assert_eq!(
            reply.required_skills.unwrap(),
            vec!["Rust", "PostgreSQL", "Docker"]
        );
        assert_eq!(reply.preferred_skills.unwrap(), vec!["Kafka"]);
        assert_eq!(reply.responsibilities.unwrap().len(), 2);
        assert_eq!(reply.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_skills_on_heading_lines_are_kept() {
        let reasoner = KeywordReasoner::new().unwrap();
        let reply = reasoner
            .extract(
                "Backend Engineer\n\
                 Required skills: Rust, Docker, Kubernetes\n\
                 In this role you will use Python and Kafka\n\
                 Nice to have: Terraform\n",
            )
            .await
            .unwrap();

        assert_eq!(reply.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(
            reply.required_skills.unwrap(),
            vec!["Rust", "Docker", "Kubernetes", "Python", "Kafka"]
        );
        assert_eq!(reply.preferred_skills.unwrap(), vec!["Terraform"]);
    }

    #[test]
    fn test_prose_is_not_a_heading() {
        assert!(classify_heading("In this role you will use Python and Kafka").is_none());
        assert!(classify_heading("Note: we deploy Rust services to AWS").is_none());
        assert_eq!(
            classify_heading("Nice to have"),
            Some((Section::Preferred, "Nice to have"))
        );
        assert_eq!(
            classify_heading("## Responsibilities"),
            Some((Section::Responsibilities, "Responsibilities"))
        );
        assert_eq!(
            classify_heading("Must have: Rust"),
            Some((Section::Required, "Rust"))
        );
    }

    #[test]
    fn test_whole_word_matching() {
        let reasoner = KeywordReasoner::new().unwrap();
        // "go" inside "going" and "rust" inside "trusted" must not count
        let found = reasoner.find_skills("We are going to be trusted with Go");
        assert_eq!(found, vec!["Go"]);
    }

    #[tokio::test]
    async fn test_match_variants() {
        let reasoner = KeywordReasoner::new().unwrap();
        let requirements = vec!["Postgres".to_string(), "COBOL".to_string()];
        let skills = vec![
            SkillRecord::new("PostgreSQL", 4.0, Proficiency::Advanced),
            SkillRecord::new("Rust", 3.0, Proficiency::Advanced),
        ];
        let reply = reasoner
            .match_skills(&MatchRequest {
                requirements: &requirements,
                skills: &skills,
            })
            .await
            .unwrap();

        assert_eq!(reply.matches[0].skill.as_deref(), Some("PostgreSQL"));
        assert!(reply.matches[1].skill.is_none());
        assert_eq!(reply.matches[1].relevance, 0.0);
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("Nous recherchons un développeur pour notre équipe et vous"), "fr");
        assert_eq!(detect_language("We are looking for an engineer with Rust"), "en");
    }
}
