//! cv-tailor library

pub mod assembler;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod llm;
pub mod matching;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod requirements;
pub mod selection;

pub use config::{Config, Credentials};
pub use error::{PipelineWarning, Result, Stage, TailorError};
pub use llm::SemanticReasoner;
pub use pipeline::{CancelFlag, Pipeline, TailoringOutcome};
