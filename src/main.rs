//! cv-tailor: tailor a CV and cover letter to a job offer

use clap::Parser;
use colored::Colorize;
use cv_tailor::assembler::{self, RenderContext, TemplateSet};
use cv_tailor::cli::{self, Cli, Commands, ConfigAction, HistoryAction, ProfileAction};
use cv_tailor::config::{parse_output_format, Config, Credentials, OutputFormat};
use cv_tailor::history::{ApplicationRecord, HistoryStore};
use cv_tailor::input::{InputManager, JobSource};
use cv_tailor::llm::{HttpBackend, KeywordReasoner, LlmReasoner, SemanticReasoner};
use cv_tailor::output::{create_formatter, ReportMetadata, TailoringReport};
use cv_tailor::pipeline::{CancelFlag, Pipeline};
use cv_tailor::profile::loader::ProfileLoader;
use cv_tailor::{Result, Stage, TailorError};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::Path;
use std::process;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Tailor {
            job,
            profile,
            output_dir,
            count,
            format,
            templates,
            offline,
            model,
            no_history,
        } => {
            if let Some(profile) = profile {
                config.paths.profile = profile;
            }
            if let Some(output_dir) = output_dir {
                config.paths.output_dir = output_dir;
            }
            if let Some(templates) = templates {
                config.paths.templates_dir = Some(templates);
            }
            if let Some(model) = model {
                config.service.model = model;
            }
            if let Some(count) = count {
                config.selection.project_count = count;
            }
            if let Some(format) = format {
                config.output.format =
                    parse_output_format(&format).map_err(TailorError::InvalidInput)?;
            }
            config.validate()?;

            tailor(&job, &config, offline, !no_history).await
        }

        Commands::History { action } => {
            let mut store = HistoryStore::open(config.history_path())?;
            match action.unwrap_or(HistoryAction::List { company: None }) {
                HistoryAction::List { company } => {
                    let records = match &company {
                        Some(company) => store.by_company(company),
                        None => store.list(),
                    };
                    print_history(&records, store.total_cost());
                }

                HistoryAction::Remove { company, position } => {
                    if store.remove(&company, &position) {
                        store.save()?;
                        println!("🗑️  Removed {} at {}", position, company);
                    } else {
                        println!("No application for {} at {}", position, company);
                    }
                }

                HistoryAction::Clear => {
                    store.clear();
                    store.save()?;
                    println!("✅ History cleared");
                }

                HistoryAction::Path => {
                    println!("{}", store.path().display());
                }
            }
            Ok(())
        }

        Commands::Profile {
            action: ProfileAction::Validate { path },
        } => {
            let path = path.unwrap_or_else(|| config.paths.profile.clone());
            cli::validate_file_extension(&path, &["yaml", "yml", "toml"])
                .map_err(|e| TailorError::InvalidInput(format!("Profile file: {}", e)))?;

            let profile = ProfileLoader::load(&path)?;
            println!("✅ {} is a valid profile", path.display());
            println!("  • Name: {}", profile.personal_info.name);
            println!("  • Skills: {}", profile.skills.len());
            println!("  • Projects: {}", profile.projects.len());
            println!("  • Experiences: {}", profile.experiences.len());
            Ok(())
        }

        Commands::Config { action } => {
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration ({})\n", config_path.display());
                    let rendered = toml::to_string_pretty(&config).map_err(|e| {
                        TailorError::Configuration(format!("Failed to serialize config: {}", e))
                    })?;
                    println!("{}", rendered);
                }

                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    Config::default().save_to(config_path)?;
                    println!("✅ Configuration reset successfully!");
                }

                Some(ConfigAction::Path) => {
                    println!("{}", config_path.display());
                }
            }
            Ok(())
        }
    }
}

async fn tailor(job_arg: &str, config: &Config, offline: bool, record: bool) -> Result<()> {
    let started = Instant::now();
    let console = config.output.format == OutputFormat::Console;

    // The credential is checked before anything reaches the service
    let credentials = if offline {
        None
    } else {
        Some(Credentials::from_env(config)?)
    };

    let profile = ProfileLoader::load(&config.paths.profile)?;
    let templates = TemplateSet::load(config.paths.templates_dir.as_deref())?;

    let source = JobSource::resolve(job_arg);
    if console {
        println!("💼 Job offer: {}", source.describe());
        println!("👤 Profile: {}", config.paths.profile.display());
    }
    let mut input_manager = InputManager::new();
    let job_text = input_manager.read_job(&source).await?;

    let reasoner: Box<dyn SemanticReasoner> = match credentials {
        Some(credentials) => Box::new(LlmReasoner::new(
            HttpBackend::new(config, &credentials)?,
            config,
        )),
        None => Box::new(KeywordReasoner::with_vocabulary(
            profile.skills.iter().map(|s| s.name.clone()).collect(),
        )?),
    };
    info!("Using {} reasoner", reasoner.name());

    let cancel = CancelFlag::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping before the next stage");
            watcher.cancel();
        }
    });

    let spinner = stage_spinner();
    let progress = spinner.clone();
    let pipeline = Pipeline::new(reasoner.as_ref(), config)
        .with_cancel_flag(cancel)
        .with_progress(move |stage| {
            progress.set_message(match stage {
                Stage::Extraction => "Extracting requirements...",
                Stage::Matching => "Matching skills against the profile...",
                Stage::Selection => "Selecting projects...",
            })
        });
    let run = pipeline.run(&job_text, &profile, None).await;
    spinner.finish_and_clear();
    let outcome = run?;

    let ctx = RenderContext {
        job: &outcome.requirement,
        skill_match: &outcome.skill_match,
        selection: &outcome.selection,
        profile: &profile,
        date: chrono::Local::now().date_naive(),
    };
    let documents = assembler::assemble(&templates, &ctx)?;
    let (cv_path, letter_path) =
        assembler::write_documents(&documents, &config.paths.output_dir, &ctx)?;

    if record {
        let mut store = HistoryStore::open(config.history_path())?;
        let replaced = store.upsert(ApplicationRecord::from_outcome(
            &outcome,
            &source.describe(),
            chrono::Utc::now(),
        ));
        store.save()?;
        if replaced {
            info!("Replaced the earlier history record for this offer");
        }
    }

    let mut metadata = ReportMetadata::new(
        source.describe(),
        config.paths.profile.display().to_string(),
        started.elapsed().as_millis() as u64,
    );
    metadata.documents = vec![cv_path, letter_path];

    let report = TailoringReport::new(outcome, metadata);
    let formatter = create_formatter(config.output.format, config.output.color_output);
    println!("{}", formatter.format_report(&report)?);

    Ok(())
}

fn print_history(records: &[&ApplicationRecord], total_cost: f64) {
    if records.is_empty() {
        println!("No applications recorded yet");
        return;
    }

    println!("📋 {} application(s)\n", records.len());
    for record in records {
        println!(
            "  {} {} at {} ({})",
            record.applied_at.format("%Y-%m-%d"),
            record.position.bold(),
            record.company,
            if record.location.is_empty() { "-" } else { record.location.as_str() }
        );
        println!(
            "    match {:.0}% · matched: {} · missing: {} · ${:.4}",
            record.matching_rate,
            record.matched_skills.join(", "),
            record.unmatched_skills.join(", "),
            record.cost_usd
        );
    }
    println!("\n💰 Total cost: ${:.4}", total_cost);
}

fn stage_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
