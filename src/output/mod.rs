//! Run reports for the terminal, JSON consumers and Markdown notes

pub mod formatter;
pub mod report;

pub use formatter::{create_formatter, ConsoleFormatter, JsonFormatter, MarkdownFormatter, OutputFormatter};
pub use report::{ReportMetadata, RunSummary, TailoringReport};
