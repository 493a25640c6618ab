//! Error handling for the CV tailoring pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Pipeline stage that talks to the semantic service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Extraction,
    Matching,
    Selection,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extraction => "requirement extraction",
            Stage::Matching => "skill matching",
            Stage::Selection => "project selection",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum TailorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Extraction service error during {stage} after {attempts} attempt(s): {message}")]
    ExtractionService {
        stage: Stage,
        attempts: u32,
        message: String,
    },

    #[error("Schema violation during {stage}: {message}")]
    SchemaViolation { stage: Stage, message: String },

    #[error("Run cancelled before {0}")]
    Cancelled(Stage),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rendering error: {0}")]
    Rendering(String),
}

impl TailorError {
    pub fn schema(stage: Stage, message: impl Into<String>) -> Self {
        TailorError::SchemaViolation {
            stage,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TailorError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for TailorError {
    fn from(err: anyhow::Error) -> Self {
        TailorError::Rendering(err.to_string())
    }
}

/// Non-fatal conditions recorded alongside a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineWarning {
    /// The profile holds fewer projects than were requested
    InsufficientProjects { requested: usize, available: usize },
    /// The posting yielded no required skills
    NoDiscernibleSkills,
    /// The service named a profile skill that the profile does not contain
    UnresolvedSkill { requirement: String, reported: String },
    /// A rendered description ended up shorter than the target window
    DescriptionBelowWindow {
        project: String,
        length: usize,
        minimum: usize,
    },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::InsufficientProjects {
                requested,
                available,
            } => write!(
                f,
                "Only {} project(s) available, {} requested; selecting all of them",
                available, requested
            ),
            PipelineWarning::NoDiscernibleSkills => {
                write!(f, "No required skills could be found in the job offer")
            }
            PipelineWarning::UnresolvedSkill {
                requirement,
                reported,
            } => write!(
                f,
                "Service matched '{}' to unknown profile skill '{}'; recorded as unmatched",
                requirement, reported
            ),
            PipelineWarning::DescriptionBelowWindow {
                project,
                length,
                minimum,
            } => write!(
                f,
                "Description for '{}' is {} characters, below the {} character target",
                project, length, minimum
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_message_names_stage_and_attempts() {
        let err = TailorError::ExtractionService {
            stage: Stage::Extraction,
            attempts: 2,
            message: "request timed out".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("requirement extraction"));
        assert!(text.contains("2 attempt"));
    }

    #[test]
    fn test_warning_display() {
        let warning = PipelineWarning::InsufficientProjects {
            requested: 2,
            available: 1,
        };
        assert!(warning.to_string().contains("Only 1 project"));
    }
}
