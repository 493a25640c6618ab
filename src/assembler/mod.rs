//! Document assembly: pipeline results into CV and cover letter HTML
//!
//! Rendering is a pure function of its inputs; only `write_documents`
//! touches the filesystem.

pub mod dates;
pub mod job_title;
pub mod labels;
pub mod placeholders;
pub mod templates;

use crate::error::Result;
use crate::matching::SkillMatch;
use crate::profile::{normalize_name, CandidateProfile};
use crate::requirements::JobRequirement;
use crate::selection::ProjectSelection;
use chrono::NaiveDate;
use log::{info, warn};
use labels::Labels;
use placeholders::escape_html;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use templates::TemplateSet;

const MAX_LISTED_SKILLS: usize = 20;

/// Borrowed view of everything a template can draw from
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub job: &'a JobRequirement,
    pub skill_match: &'a SkillMatch,
    pub selection: &'a ProjectSelection,
    pub profile: &'a CandidateProfile,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct Documents {
    pub cv_html: String,
    pub cover_letter_html: String,
}

/// Fill one template from the pipeline results
pub fn render(template: &str, ctx: &RenderContext<'_>) -> Result<String> {
    let document = placeholders::replace_placeholders(template, &replacements(ctx))?;

    let leftover = placeholders::unresolved(&document);
    if !leftover.is_empty() {
        warn!("Template placeholders left unresolved: {}", leftover.join(", "));
    }
    Ok(document)
}

pub fn assemble(templates: &TemplateSet, ctx: &RenderContext<'_>) -> Result<Documents> {
    Ok(Documents {
        cv_html: render(&templates.cv, ctx)?,
        cover_letter_html: render(&templates.cover_letter, ctx)?,
    })
}

/// Write both documents under `output_dir`, returning their paths
pub fn write_documents(
    documents: &Documents,
    output_dir: &Path,
    ctx: &RenderContext<'_>,
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(output_dir)?;

    let stem = file_stem(ctx.job, ctx.date);
    let cv_path = output_dir.join(format!("{}_cv.html", stem));
    let letter_path = output_dir.join(format!("{}_cover_letter.html", stem));

    std::fs::write(&cv_path, &documents.cv_html)?;
    std::fs::write(&letter_path, &documents.cover_letter_html)?;
    info!(
        "Wrote {} and {}",
        cv_path.display(),
        letter_path.display()
    );
    Ok((cv_path, letter_path))
}

fn file_stem(job: &JobRequirement, date: NaiveDate) -> String {
    let slug = |s: &str| {
        s.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join("-")
    };

    let parts: Vec<String> = [slug(&job.organization), slug(&job.title)]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    let name = if parts.is_empty() {
        "application".to_string()
    } else {
        parts.join("_")
    };
    format!("{}_{}", name, date.format("%Y%m%d"))
}

/// Matched skills by relevance, then the rest of the profile, capped
fn skill_list(ctx: &RenderContext<'_>) -> Vec<String> {
    let mut seen = HashSet::new();
    ctx.skill_match
        .ranked()
        .into_iter()
        .filter_map(|e| e.skill.as_ref().map(|s| s.name.clone()))
        .chain(ctx.profile.skills.iter().map(|s| s.name.clone()))
        .filter(|name| seen.insert(normalize_name(name)))
        .take(MAX_LISTED_SKILLS)
        .collect()
}

fn achievements(profile: &CandidateProfile, labels: &Labels) -> Vec<String> {
    let listed = profile.all_achievements();
    (0..3)
        .map(|i| {
            listed
                .get(i)
                .copied()
                .unwrap_or(labels.fallback_achievements[i])
                .to_string()
        })
        .collect()
}

fn projects_html(selection: &ProjectSelection) -> String {
    if selection.is_empty() {
        return String::new();
    }
    let items: Vec<String> = selection
        .selected
        .iter()
        .map(|s| {
            let title = match &s.project.url {
                Some(url) => format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(url),
                    escape_html(&s.project.name)
                ),
                None => escape_html(&s.project.name),
            };
            format!(
                "<li><strong>{}</strong>: {}</li>",
                title,
                escape_html(&s.description)
            )
        })
        .collect();
    format!("<ul>\n{}\n</ul>", items.join("\n"))
}

fn experience_html(profile: &CandidateProfile, language: &str) -> String {
    profile
        .experiences
        .iter()
        .map(|e| {
            let bullets: String = e
                .achievements
                .iter()
                .map(|a| format!("<li>{}</li>", escape_html(a)))
                .collect();
            format!(
                "<h3>{} · {}</h3>\n<p class=\"muted\">{}</p>\n<ul>{}</ul>",
                escape_html(&e.role),
                escape_html(&e.company),
                escape_html(&dates::date_range(&e.start_date, &e.end_date, language)),
                bullets
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn education_html(profile: &CandidateProfile) -> String {
    profile
        .education
        .iter()
        .map(|e| {
            format!(
                "<p><strong>{}</strong>, {} <span class=\"muted\">{}</span></p>",
                escape_html(&e.degree),
                escape_html(&e.institution),
                escape_html(&e.duration)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn contact_line(profile: &CandidateProfile) -> String {
    let info = &profile.personal_info;
    let mut parts = vec![escape_html(&info.email)];
    parts.extend(info.phone.iter().map(|p| escape_html(p)));
    parts.extend(info.location.iter().map(|l| escape_html(l)));
    parts.extend(info.urls.values().map(|u| escape_html(u)));
    parts.join(" · ")
}

fn replacements(ctx: &RenderContext<'_>) -> Vec<(String, String)> {
    let language = ctx.job.language.as_str();
    let labels = labels::labels(language);
    let title = job_title::gendered_title(&ctx.job.title, ctx.profile.personal_info.gender);
    let company = if ctx.job.organization.is_empty() {
        labels.company_fallback.to_string()
    } else {
        ctx.job.organization.clone()
    };
    let skills = skill_list(ctx);
    let relevant_skills = skills.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
    let top_matched: Vec<&str> = ctx
        .skill_match
        .ranked()
        .into_iter()
        .take(3)
        .map(|e| e.requirement.as_str())
        .collect();
    let excitement = labels.company_excitement(&company);
    let attraction = labels.role_attraction(&top_matched);
    let opening = labels.opening(
        &format!("<strong>{}</strong>", escape_html(&title)),
        &escape_html(&company),
        &escape_html(&excitement),
        &escape_html(&attraction),
    );

    let mut pairs = vec![
        ("LANG", language.to_string()),
        ("NAME", escape_html(&ctx.profile.personal_info.name)),
        ("CONTACT", contact_line(ctx.profile)),
        ("JOB TITLE", escape_html(&title)),
        ("COMPANY", escape_html(&company)),
        ("LOCATION", escape_html(&ctx.job.location)),
        ("DATE", dates::format_date(ctx.date, language, true)),
        ("SKILLS", escape_html(&skills.join(", "))),
        ("RELEVANT SKILLS", escape_html(&relevant_skills)),
        ("PROJECTS", projects_html(ctx.selection)),
        ("EXPERIENCE", experience_html(ctx.profile, language)),
        ("EDUCATION", education_html(ctx.profile)),
        ("LANGUAGES", escape_html(&ctx.profile.languages.join(", "))),
        ("COMPANY EXCITEMENT", escape_html(&excitement)),
        ("ROLE ATTRACTION", escape_html(&attraction)),
        ("LABEL SKILLS", labels.skills.to_string()),
        ("LABEL EXPERIENCE", labels.experience.to_string()),
        ("LABEL PROJECTS", labels.projects.to_string()),
        ("LABEL EDUCATION", labels.education.to_string()),
        ("LABEL LANGUAGES", labels.languages.to_string()),
        ("LABEL COVER LETTER", labels.cover_letter.to_string()),
        ("LABEL HIGHLIGHTS", labels.highlights.to_string()),
        ("LABEL PROJECTS INTRO", labels.projects_intro.to_string()),
        ("SALUTATION", labels.salutation.to_string()),
        ("LETTER OPENING", opening),
        ("LETTER CLOSING", labels.closing(&escape_html(&relevant_skills))),
        ("SIGN OFF", labels.sign_off.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect::<Vec<_>>();

    for (i, achievement) in achievements(ctx.profile, labels).into_iter().enumerate() {
        pairs.push((format!("ACHIEVEMENT {}", i + 1), escape_html(&achievement)));
    }

    for (i, selected) in ctx.selection.selected.iter().enumerate() {
        pairs.push((
            format!("TITLE OF THE SIDE PROJECT {}", i + 1),
            escape_html(&selected.project.name),
        ));
        pairs.push((
            format!("DESCRIPTION OF THE SIDE PROJECT {}", i + 1),
            escape_html(&selected.description),
        ));
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::MatchEntry;
    use crate::profile::{Gender, PersonalInfo, Proficiency, Project, SkillRecord};
    use crate::selection::SelectedProject;
    use std::collections::BTreeMap;

    fn fixture() -> (JobRequirement, SkillMatch, ProjectSelection, CandidateProfile) {
        let job = JobRequirement {
            title: "Développeur(se) Rust".to_string(),
            organization: "Acme & Co".to_string(),
            location: "Paris".to_string(),
            required_skills: vec!["Rust".to_string()],
            preferred_skills: vec![],
            responsibilities: vec![],
            language: "fr".to_string(),
        };
        let rust = SkillRecord::new("Rust", 4.0, Proficiency::Advanced);
        let skill_match = SkillMatch {
            entries: vec![MatchEntry {
                requirement: "Rust".to_string(),
                required: true,
                skill: Some(rust.clone()),
                relevance: 1.0,
                justification: String::new(),
            }],
        };
        let project = Project {
            name: "Ledger".to_string(),
            description: "Double-entry ledger".to_string(),
            tags: vec!["Rust".to_string()],
            impact: None,
            url: None,
        };
        let selection = ProjectSelection {
            selected: vec![SelectedProject {
                project: project.clone(),
                score: 0.9,
                description: "Double-entry ledger <fast>".to_string(),
                truncated: false,
                rationale: String::new(),
            }],
            requested: 2,
            available: 1,
            insufficient_projects: true,
            summary: None,
        };
        let profile = CandidateProfile {
            personal_info: PersonalInfo {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
                location: None,
                gender: Gender::Female,
                urls: BTreeMap::new(),
            },
            skills: vec![rust, SkillRecord::new("Python", 2.0, Proficiency::Intermediate)],
            projects: vec![project],
            experiences: vec![],
            education: vec![],
            languages: vec![],
            achievements: vec!["Cut latency by 40%".to_string()],
        };
        (job, skill_match, selection, profile)
    }

    #[test]
    fn test_render_fills_and_escapes() {
        let (job, skill_match, selection, profile) = fixture();
        let ctx = RenderContext {
            job: &job,
            skill_match: &skill_match,
            selection: &selection,
            profile: &profile,
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        };

        let out = render(
            "{JOB TITLE}|{COMPANY}|{DATE}|{SKILLS}|{ACHIEVEMENT 1}|{ACHIEVEMENT 2}|{DESCRIPTION OF THE SIDE PROJECT 1}",
            &ctx,
        )
        .unwrap();

        assert_eq!(
            out,
            "Développeuse Rust|Acme &amp; Co|5 Mars 2024|Rust, Python|Cut latency by 40%|\
             Collaboration efficace au sein d&#39;équipes pluridisciplinaires|\
             Double-entry ledger &lt;fast&gt;"
        );
    }

    #[test]
    fn test_default_templates_resolve_fully() {
        let (job, skill_match, selection, profile) = fixture();
        let ctx = RenderContext {
            job: &job,
            skill_match: &skill_match,
            selection: &selection,
            profile: &profile,
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        };

        let docs = assemble(&TemplateSet::default(), &ctx).unwrap();
        assert!(placeholders::unresolved(&docs.cv_html).is_empty());
        assert!(placeholders::unresolved(&docs.cover_letter_html).is_empty());
        assert!(docs.cover_letter_html.contains("Ledger"));
    }

    #[test]
    fn test_french_offer_renders_french_documents() {
        let (job, skill_match, selection, profile) = fixture();
        let ctx = RenderContext {
            job: &job,
            skill_match: &skill_match,
            selection: &selection,
            profile: &profile,
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        };

        let docs = assemble(&TemplateSet::default(), &ctx).unwrap();
        assert!(docs.cv_html.contains("<h2>Compétences</h2>"));
        assert!(docs.cv_html.contains("<h2>Projets</h2>"));
        assert!(!docs.cv_html.contains("<h2>Skills</h2>"));

        let letter = &docs.cover_letter_html;
        assert!(letter.contains("<p>Madame, Monsieur,</p>"));
        assert!(letter.contains(
            "au poste de <strong>Développeuse Rust</strong> chez Acme &amp; Co."
        ));
        assert!(letter.contains("les projets menés chez Acme &amp; Co"));
        assert!(letter.contains("salutations distinguées"));
        assert!(!letter.contains("Dear Hiring Manager"));
        assert!(!letter.contains("Sincerely"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let (mut job, skill_match, selection, profile) = fixture();
        job.language = "de".to_string();
        job.organization.clear();
        let ctx = RenderContext {
            job: &job,
            skill_match: &skill_match,
            selection: &selection,
            profile: &profile,
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        };

        let docs = assemble(&TemplateSet::default(), &ctx).unwrap();
        assert!(docs.cv_html.contains("<h2>Skills</h2>"));
        assert!(docs.cover_letter_html.contains("<p>Dear Hiring Manager,</p>"));
        assert!(docs.cover_letter_html.contains("position at your company."));
    }

    #[test]
    fn test_file_stem() {
        let (job, ..) = fixture();
        let stem = file_stem(&job, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(stem, "acme-co_développeur-se-rust_20240305");
    }
}
