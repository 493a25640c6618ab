//! CLI interface for cv-tailor

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cv-tailor")]
#[command(about = "Tailor a CV and cover letter to a job offer")]
#[command(long_about = "Extract the requirements of a job offer, match them against your skill profile, pick the most relevant portfolio projects and render a tailored CV and cover letter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tailor documents to a job offer
    Tailor {
        /// Job offer text, or a path to a .txt, .md or .pdf file
        job: String,

        /// Candidate profile (YAML or TOML)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Directory receiving the rendered documents
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Number of projects to feature
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Report format: console, json, markdown
        #[arg(short, long)]
        format: Option<String>,

        /// Directory holding cv_template.html and cover_letter_template.html
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// Use the offline keyword engine instead of the remote service
        #[arg(long)]
        offline: bool,

        /// Model name sent to the service
        #[arg(short, long)]
        model: Option<String>,

        /// Do not record this run in the application history
        #[arg(long)]
        no_history: bool,
    },

    /// Past applications, one per company and position
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Profile commands
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Check a profile document and list its problems
    Validate {
        /// Profile path, defaults to the configured one
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded applications, newest first
    List {
        /// Only applications to this company
        #[arg(long)]
        company: Option<String>,
    },

    /// Forget one application
    Remove {
        #[arg(long)]
        company: String,

        #[arg(long)]
        position: String,
    },

    /// Forget every application
    Clear,

    /// Print the history file location
    Path,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tailor_arguments() {
        let cli = Cli::parse_from([
            "cv-tailor", "tailor", "job.md", "--profile", "me.yaml", "-n", "3", "--offline",
        ]);
        match cli.command {
            Commands::Tailor {
                job,
                profile,
                count,
                offline,
                ..
            } => {
                assert_eq!(job, "job.md");
                assert_eq!(profile, Some(PathBuf::from("me.yaml")));
                assert_eq!(count, Some(3));
                assert!(offline);
            }
            _ => panic!("expected tailor"),
        }
    }

    #[test]
    fn test_history_arguments() {
        let cli = Cli::parse_from(["cv-tailor", "history", "list", "--company", "Acme"]);
        match cli.command {
            Commands::History {
                action: Some(HistoryAction::List { company }),
            } => assert_eq!(company.as_deref(), Some("Acme")),
            _ => panic!("expected history list"),
        }

        let cli = Cli::parse_from(["cv-tailor", "tailor", "job.txt", "--no-history"]);
        assert!(matches!(cli.command, Commands::Tailor { no_history: true, .. }));
    }

    #[test]
    fn test_profile_extension_check() {
        assert!(validate_file_extension(Path::new("me.YAML"), &["yaml", "yml", "toml"]).is_ok());
        assert!(validate_file_extension(Path::new("me.json"), &["yaml", "yml", "toml"]).is_err());
        assert!(validate_file_extension(Path::new("me"), &["yaml"]).is_err());
    }
}
