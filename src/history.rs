//! Application history kept as a JSON file
//!
//! One record per (company, position). Tailoring the same offer again
//! replaces the earlier record instead of adding a second one.

use crate::error::{Result, TailorError};
use crate::pipeline::TailoringOutcome;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub company: String,
    pub position: String,
    /// Required-skill coverage, 0 to 100
    pub matching_rate: f64,
    pub matched_skills: Vec<String>,
    pub unmatched_skills: Vec<String>,
    pub location: String,
    pub job_source: String,
    pub cost_usd: f64,
    pub applied_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn from_outcome(
        outcome: &TailoringOutcome,
        job_source: &str,
        applied_at: DateTime<Utc>,
    ) -> Self {
        let entries = &outcome.skill_match.entries;
        Self {
            company: outcome.requirement.organization.clone(),
            position: outcome.requirement.title.clone(),
            matching_rate: (outcome.skill_match.coverage() * 100.0).round(),
            matched_skills: entries
                .iter()
                .filter(|e| e.is_matched())
                .map(|e| e.requirement.clone())
                .collect(),
            unmatched_skills: entries
                .iter()
                .filter(|e| !e.is_matched())
                .map(|e| e.requirement.clone())
                .collect(),
            location: outcome.requirement.location.clone(),
            job_source: job_source.to_string(),
            cost_usd: outcome.usage.total_cost_usd,
            applied_at,
        }
    }

    fn same_application(&self, company: &str, position: &str) -> bool {
        same_text(&self.company, company) && same_text(&self.position, position)
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    applications: Vec<ApplicationRecord>,
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    records: Vec<ApplicationRecord>,
}

impl HistoryStore {
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-tailor")
            .join("history.json")
    }

    /// Read the store at `path`; a missing file is an empty history
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            debug!("No history at {}, starting empty", path.display());
            return Ok(Self {
                path,
                records: Vec::new(),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let file: HistoryFile = serde_json::from_str(&content).map_err(|e| {
            TailorError::Configuration(format!(
                "Failed to parse history {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self {
            path,
            records: file.applications,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert `record`, replacing any record for the same company and
    /// position. Returns true when an earlier record was replaced.
    pub fn upsert(&mut self, record: ApplicationRecord) -> bool {
        match self
            .records
            .iter()
            .position(|r| r.same_application(&record.company, &record.position))
        {
            Some(index) => {
                self.records[index] = record;
                true
            }
            None => {
                self.records.push(record);
                false
            }
        }
    }

    /// Newest first
    pub fn list(&self) -> Vec<&ApplicationRecord> {
        let mut records: Vec<&ApplicationRecord> = self.records.iter().collect();
        records.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        records
    }

    pub fn by_company(&self, company: &str) -> Vec<&ApplicationRecord> {
        self.list()
            .into_iter()
            .filter(|r| same_text(&r.company, company))
            .collect()
    }

    pub fn remove(&mut self, company: &str, position: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| !r.same_application(company, position));
        self.records.len() != before
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn total_cost(&self) -> f64 {
        self.records.iter().map(|r| r.cost_usd).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = HistoryFile {
            applications: self.records.clone(),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        info!(
            "Saved {} application(s) to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn record(company: &str, position: &str, rate: f64, day: u32) -> ApplicationRecord {
        ApplicationRecord {
            company: company.to_string(),
            position: position.to_string(),
            matching_rate: rate,
            matched_skills: vec!["Rust".to_string()],
            unmatched_skills: vec!["Kafka".to_string()],
            location: "Lyon".to_string(),
            job_source: "offer.txt".to_string(),
            cost_usd: 0.02,
            applied_at: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("history.json")).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.total_cost(), 0.0);
    }

    #[test]
    fn test_same_company_and_position_overwrites() {
        let dir = tempdir().unwrap();
        let mut store = HistoryStore::open(dir.path().join("history.json")).unwrap();

        assert!(!store.upsert(record("Acme", "Backend Engineer", 60.0, 1)));
        assert!(!store.upsert(record("Acme", "Data Engineer", 40.0, 2)));
        assert!(store.upsert(record(" acme ", "backend engineer", 80.0, 3)));

        assert_eq!(store.len(), 2);
        let backend = store
            .list()
            .into_iter()
            .find(|r| r.position.contains("ackend"))
            .cloned()
            .unwrap();
        assert_eq!(backend.matching_rate, 80.0);
    }

    #[test]
    fn test_saved_history_lists_newest_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let mut store = HistoryStore::open(&path).unwrap();
        store.upsert(record("Acme", "Backend Engineer", 60.0, 1));
        store.upsert(record("Globex", "Platform Engineer", 75.0, 4));
        store.upsert(record("Initech", "SRE", 50.0, 2));
        store.save().unwrap();

        let reopened = HistoryStore::open(&path).unwrap();
        let companies: Vec<&str> = reopened.list().iter().map(|r| r.company.as_str()).collect();
        assert_eq!(companies, vec!["Globex", "Initech", "Acme"]);
        assert!((reopened.total_cost() - 0.06).abs() < 1e-9);
        assert_eq!(reopened.by_company("ACME").len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let dir = tempdir().unwrap();
        let mut store = HistoryStore::open(dir.path().join("history.json")).unwrap();
        store.upsert(record("Acme", "Backend Engineer", 60.0, 1));
        store.upsert(record("Globex", "Platform Engineer", 75.0, 4));

        assert!(store.remove("acme", "Backend Engineer"));
        assert!(!store.remove("acme", "Backend Engineer"));
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").unwrap();

        let err = HistoryStore::open(&path).unwrap_err();
        assert!(matches!(err, TailorError::Configuration(_)));
    }
}
