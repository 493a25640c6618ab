//! Input manager for job offers given inline or as a file

use crate::error::{Result, TailorError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{
    MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Longest argument still considered as a possible file path
const MAX_PATH_ARG_LEN: usize = 512;

#[derive(Debug, Clone, PartialEq)]
pub enum JobSource {
    Inline(String),
    File(PathBuf),
}

impl JobSource {
    /// A short single-line argument naming an existing file is a path; anything else is text
    pub fn resolve(arg: &str) -> Self {
        let trimmed = arg.trim();
        let looks_like_path = !trimmed.is_empty()
            && trimmed.len() <= MAX_PATH_ARG_LEN
            && !trimmed.contains('\n');

        if looks_like_path && Path::new(trimmed).is_file() {
            JobSource::File(PathBuf::from(trimmed))
        } else {
            JobSource::Inline(arg.to_string())
        }
    }

    pub fn describe(&self) -> String {
        match self {
            JobSource::Inline(text) => format!("inline text ({} characters)", text.chars().count()),
            JobSource::File(path) => path.display().to_string(),
        }
    }
}

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn read_job(&mut self, source: &JobSource) -> Result<String> {
        let text = match source {
            JobSource::Inline(text) => text.clone(),
            JobSource::File(path) => self.extract_text(path).await?,
        };

        if text.trim().is_empty() {
            return Err(TailorError::InvalidInput(format!(
                "job offer from {} is empty",
                source.describe()
            )));
        }
        Ok(text)
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(path) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(TailorError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(TailorError::UnsupportedFormat(format!(
                    "{} (expected .txt, .md or .pdf)",
                    path.display()
                )));
            }
        };

        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), text.clone());
        }

        Ok(text)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
