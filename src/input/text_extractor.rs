//! Text extraction from job-offer files

use crate::error::{Result, TailorError};
use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            TailorError::PdfExtraction(format!(
                "Failed to extract text from PDF '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown = fs::read_to_string(path).await?;
        Ok(markdown_to_text(&markdown))
    }
}

/// Flatten markdown to plain lines. List items keep a `- ` marker so
/// bullet structure survives for section detection.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Item) => text.push_str("- "),
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak
            | Event::Rule
            | Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(..))
            | Event::End(Tag::Item)
            | Event::End(Tag::CodeBlock(_)) => text.push('\n'),
            _ => {}
        }
    }

    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
