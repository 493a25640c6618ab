//! Profile loading and schema validation

use crate::error::{Result, TailorError};
use crate::profile::{normalize_name, CandidateProfile};
use log::info;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ProfileFormat {
    Yaml,
    Toml,
}

pub struct ProfileLoader;

impl ProfileLoader {
    /// Load and validate a profile document, failing fast with a field-level message
    pub fn load(path: &Path) -> Result<CandidateProfile> {
        let format = Self::detect_format(path)?;

        if !path.exists() {
            return Err(TailorError::Configuration(format!(
                "Profile not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let profile = match format {
            ProfileFormat::Yaml => Self::from_yaml_str(&content),
            ProfileFormat::Toml => Self::from_toml_str(&content),
        }
        .map_err(|e| match e {
            TailorError::Configuration(msg) => {
                TailorError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        info!(
            "Loaded profile for {} ({} skills, {} projects)",
            profile.personal_info.name,
            profile.skills.len(),
            profile.projects.len()
        );
        Ok(profile)
    }

    pub fn from_yaml_str(content: &str) -> Result<CandidateProfile> {
        let profile: CandidateProfile = serde_yaml::from_str(content)
            .map_err(|e| TailorError::Configuration(format!("invalid profile: {}", e)))?;
        Self::validate(profile)
    }

    pub fn from_toml_str(content: &str) -> Result<CandidateProfile> {
        let profile: CandidateProfile = toml::from_str(content)
            .map_err(|e| TailorError::Configuration(format!("invalid profile: {}", e)))?;
        Self::validate(profile)
    }

    fn detect_format(path: &Path) -> Result<ProfileFormat> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .ok_or_else(|| {
                TailorError::Configuration(format!(
                    "Profile has no extension: {}",
                    path.display()
                ))
            })?;

        match extension.as_str() {
            "yaml" | "yml" => Ok(ProfileFormat::Yaml),
            "toml" => Ok(ProfileFormat::Toml),
            other => Err(TailorError::Configuration(format!(
                "Unsupported profile format .{} (use .yaml, .yml or .toml)",
                other
            ))),
        }
    }

    /// Check the invariants serde cannot express; tags are deduplicated in place
    fn validate(mut profile: CandidateProfile) -> Result<CandidateProfile> {
        let mut problems = Vec::new();

        if profile.personal_info.name.trim().is_empty() {
            problems.push("personal_info.name: must not be empty".to_string());
        }
        if profile.personal_info.email.trim().is_empty() {
            problems.push("personal_info.email: must not be empty".to_string());
        }

        for (i, skill) in profile.skills.iter().enumerate() {
            if skill.name.trim().is_empty() {
                problems.push(format!("skills[{}].name: must not be empty", i));
            }
            if !skill.years.is_finite() || skill.years < 0.0 {
                problems.push(format!(
                    "skills[{}].years: must be a number >= 0 (got {})",
                    i, skill.years
                ));
            }
        }

        let mut seen_projects = HashSet::new();
        for (i, project) in profile.projects.iter_mut().enumerate() {
            if project.name.trim().is_empty() {
                problems.push(format!("projects[{}].name: must not be empty", i));
            } else if !seen_projects.insert(normalize_name(&project.name)) {
                problems.push(format!(
                    "projects[{}].name: duplicate project '{}'",
                    i, project.name
                ));
            }
            if project.description.trim().is_empty() {
                problems.push(format!("projects[{}].description: must not be empty", i));
            }

            let mut seen_tags = HashSet::new();
            project
                .tags
                .retain(|t| !t.trim().is_empty() && seen_tags.insert(normalize_name(t)));
        }

        if problems.is_empty() {
            Ok(profile)
        } else {
            Err(TailorError::Configuration(format!(
                "invalid profile: {}",
                problems.join("; ")
            )))
        }
    }
}
