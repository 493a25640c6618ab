//! Console, JSON and Markdown renderings of a `TailoringReport`

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::TailoringReport;
use colored::{Color, Colorize};

pub trait OutputFormatter {
    fn format_report(&self, report: &TailoringReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub fn create_formatter(format: OutputFormat, use_colors: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors, true)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new(true)),
    }
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self {
            use_colors,
            detailed,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_coverage_badge(&self, coverage: u8) -> String {
        let (badge, color) = match coverage {
            90..=100 => ("EXCELLENT", Color::Green),
            70..=89 => ("GOOD", Color::BrightGreen),
            40..=69 => ("PARTIAL", Color::Yellow),
            _ => ("WEAK", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &TailoringReport) -> Result<String> {
        let mut output = String::new();
        let job = &report.requirement;

        output.push_str(&self.format_header("CV TAILORING REPORT", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms | Reasoner: {}\n",
            chrono::DateTime::<chrono::Utc>::from(report.metadata.generated_at)
                .format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms,
            report.metadata.reasoner
        ));

        output.push_str(&self.format_header("Job Offer", 2));
        output.push_str(&format!("Title: {}\n", self.colorize(&job.title, Color::Cyan)));
        if !job.organization.is_empty() {
            output.push_str(&format!("Organization: {}\n", job.organization));
        }
        if !job.location.is_empty() {
            output.push_str(&format!("Location: {}\n", job.location));
        }
        output.push_str(&format!("Required: {}\n", job.required_skills.join(", ")));
        if !job.preferred_skills.is_empty() {
            output.push_str(&format!("Preferred: {}\n", job.preferred_skills.join(", ")));
        }

        output.push_str(&self.format_header("Skill Match", 2));
        output.push_str(&format!(
            "Required coverage: {}% {}\n",
            report.summary.coverage_percentage,
            self.format_coverage_badge(report.summary.coverage_percentage)
        ));
        output.push_str(&format!(
            "Verdict: {}\n\n",
            self.colorize(&report.summary.verdict, Color::Cyan)
        ));

        for entry in &report.skill_match.entries {
            let marker = if entry.required { "*" } else { " " };
            match &entry.skill {
                Some(skill) => {
                    output.push_str(&format!(
                        "{} {} {} {} ({:.0}%)\n",
                        self.colorize("✓", Color::Green),
                        marker,
                        entry.requirement,
                        self.colorize(&format!("← {}", skill), Color::BrightBlack),
                        entry.relevance * 100.0
                    ));
                    if self.detailed && !entry.justification.is_empty() {
                        output.push_str(&format!("      {}\n", entry.justification));
                    }
                }
                None => output.push_str(&format!(
                    "{} {} {}\n",
                    self.colorize("✗", Color::Red),
                    marker,
                    entry.requirement
                )),
            }
        }

        output.push_str(&self.format_header("Selected Projects", 2));
        if report.selection.is_empty() {
            output.push_str("No projects available in the profile\n");
        }
        for (i, selected) in report.selection.selected.iter().enumerate() {
            output.push_str(&format!(
                "{}. {} (score {:.2})\n   {}\n",
                i + 1,
                self.colorize(&selected.project.name, Color::Cyan),
                selected.score,
                selected.description
            ));
            if self.detailed && !selected.rationale.is_empty() {
                output.push_str(&format!("   Why: {}\n", selected.rationale));
            }
        }

        if !report.warnings.is_empty() {
            output.push_str(&self.format_header("Warnings", 3));
            for warning in &report.warnings {
                output.push_str(&format!("{} {}\n", self.colorize("⚠", Color::Yellow), warning));
            }
        }

        if !report.usage.is_empty() {
            output.push_str(&self.format_header("Service Usage", 3));
            output.push_str(&format!(
                "{} call(s), {} tokens, estimated ${:.4}\n",
                report.usage.calls, report.usage.total_tokens, report.usage.total_cost_usd
            ));
        }

        if !report.metadata.documents.is_empty() {
            output.push_str(&self.format_header("Documents", 3));
            for path in &report.metadata.documents {
                output.push_str(&format!("{}\n", path.display()));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &TailoringReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &TailoringReport) -> Result<String> {
        let mut md = String::new();
        let job = &report.requirement;

        md.push_str(&format!("# Tailoring report: {}\n\n", job.title));
        if !job.organization.is_empty() {
            md.push_str(&format!("**Organization:** {}  \n", job.organization));
        }
        if !job.location.is_empty() {
            md.push_str(&format!("**Location:** {}  \n", job.location));
        }
        md.push_str(&format!(
            "**Required coverage:** {}% ({} of {} requirements matched)\n\n> {}\n\n",
            report.summary.coverage_percentage,
            report.summary.matched,
            report.summary.total_requirements,
            report.summary.verdict
        ));

        md.push_str("## Skill match\n\n| Requirement | Required | Profile skill | Relevance |\n|---|---|---|---|\n");
        for entry in &report.skill_match.entries {
            md.push_str(&format!(
                "| {} | {} | {} | {:.0}% |\n",
                entry.requirement,
                if entry.required { "yes" } else { "no" },
                entry
                    .skill
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                entry.relevance * 100.0
            ));
        }

        if !report.summary.gaps.is_empty() {
            md.push_str("\n### Gaps\n\n");
            for gap in &report.summary.gaps {
                md.push_str(&format!("- {}\n", gap));
            }
        }

        md.push_str("\n## Selected projects\n\n");
        for (i, selected) in report.selection.selected.iter().enumerate() {
            md.push_str(&format!(
                "{}. **{}**: {}\n",
                i + 1,
                selected.project.name,
                selected.description
            ));
            if !selected.rationale.is_empty() {
                md.push_str(&format!("   - _{}_\n", selected.rationale));
            }
        }

        if !report.warnings.is_empty() {
            md.push_str("\n## Warnings\n\n");
            for warning in &report.warnings {
                md.push_str(&format!("- {}\n", warning));
            }
        }

        if self.include_metadata {
            md.push_str(&format!(
                "\n---\n_Reasoner: {} · {} ms · {} service call(s), ${:.4}_\n",
                report.metadata.reasoner,
                report.metadata.processing_time_ms,
                report.usage.calls,
                report.usage.total_cost_usd
            ));
        }

        Ok(md)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}
