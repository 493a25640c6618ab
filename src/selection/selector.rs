//! Comparative project ranking and length-constrained rendering

use crate::config::SelectionConfig;
use crate::error::{PipelineWarning, Result, Stage, TailorError};
use crate::llm::{RankRequest, RankedProject, SemanticReasoner};
use crate::matching::SkillMatch;
use crate::profile::Project;
use crate::requirements::JobRequirement;
use crate::selection::truncate::{display_len, truncate_at_word};
use crate::selection::{ProjectSelection, SelectedProject};
use log::{debug, info, warn};
use std::collections::HashSet;

pub struct ProjectSelector<'a> {
    reasoner: &'a dyn SemanticReasoner,
    settings: &'a SelectionConfig,
}

impl<'a> ProjectSelector<'a> {
    pub fn new(reasoner: &'a dyn SemanticReasoner, settings: &'a SelectionConfig) -> Self {
        Self { reasoner, settings }
    }

    pub async fn select(
        &self,
        job: &JobRequirement,
        skill_match: &SkillMatch,
        projects: &[Project],
        k: usize,
    ) -> Result<(ProjectSelection, Vec<PipelineWarning>)> {
        if k < 1 {
            return Err(TailorError::InvalidInput(
                "project count must be at least 1".to_string(),
            ));
        }

        let available = projects.len();
        let mut warnings = Vec::new();
        if k > available {
            warn!("{} project(s) requested but only {} available", k, available);
            warnings.push(PipelineWarning::InsufficientProjects {
                requested: k,
                available,
            });
        }

        if projects.is_empty() {
            return Ok((
                ProjectSelection {
                    selected: Vec::new(),
                    requested: k,
                    available,
                    insufficient_projects: true,
                    summary: None,
                },
                warnings,
            ));
        }

        let reply = self
            .reasoner
            .rank_projects(&RankRequest {
                job,
                skill_match,
                projects,
                min_chars: self.settings.min_description_chars,
                max_chars: self.settings.max_description_chars,
            })
            .await?;

        let take = k.min(available);
        let summary = reply.summary.filter(|s| !s.trim().is_empty());
        let ranking = order_ranking(reply.ranking, projects, take)?;

        let selected: Vec<SelectedProject> = ranking
            .into_iter()
            .take(take)
            .map(|ranked| self.render(&projects[ranked.index], ranked, &mut warnings))
            .collect();

        info!(
            "Selected {} of {} project(s): {}",
            selected.len(),
            available,
            selected
                .iter()
                .map(|s| s.project.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok((
            ProjectSelection {
                selected,
                requested: k,
                available,
                insufficient_projects: k > available,
                summary,
            },
            warnings,
        ))
    }

    fn render(
        &self,
        project: &Project,
        ranked: RankedProject,
        warnings: &mut Vec<PipelineWarning>,
    ) -> SelectedProject {
        let source = if ranked.description.trim().is_empty() {
            project.description.as_str()
        } else {
            ranked.description.as_str()
        };

        let fitted = truncate_at_word(
            source,
            self.settings.max_description_chars,
            &self.settings.ellipsis,
        );
        if fitted.truncated {
            debug!(
                "Truncated description of '{}' from {} characters",
                project.name,
                display_len(source)
            );
        }

        let length = display_len(&fitted.text);
        if length < self.settings.min_description_chars {
            warnings.push(PipelineWarning::DescriptionBelowWindow {
                project: project.name.clone(),
                length,
                minimum: self.settings.min_description_chars,
            });
        }

        SelectedProject {
            project: project.clone(),
            score: ranked.score,
            description: fitted.text,
            truncated: fitted.truncated,
            rationale: ranked.rationale.trim().to_string(),
        }
    }
}

/// Validate the ranking and order it: score descending, then projects with a
/// quantified impact, then the order the service returned
fn order_ranking(
    ranking: Vec<RankedProject>,
    projects: &[Project],
    needed: usize,
) -> Result<Vec<RankedProject>> {
    let mut seen = HashSet::new();
    for ranked in &ranking {
        if ranked.index >= projects.len() {
            return Err(TailorError::schema(
                Stage::Selection,
                format!(
                    "project index {} is out of range (0..{})",
                    ranked.index,
                    projects.len()
                ),
            ));
        }
        if !seen.insert(ranked.index) {
            return Err(TailorError::schema(
                Stage::Selection,
                format!("project index {} is ranked twice", ranked.index),
            ));
        }
        if !ranked.score.is_finite() {
            return Err(TailorError::schema(
                Stage::Selection,
                format!("score for project {} is not a finite number", ranked.index),
            ));
        }
    }
    if ranking.len() < needed {
        return Err(TailorError::schema(
            Stage::Selection,
            format!(
                "ranking has {} entries, at least {} needed",
                ranking.len(),
                needed
            ),
        ));
    }

    let mut ranking = ranking;
    // stable sort keeps the service's order among full ties
    ranking.sort_by(|a, b| {
        b.score.total_cmp(&a.score).then_with(|| {
            projects[b.index]
                .has_impact()
                .cmp(&projects[a.index].has_impact())
        })
    });
    Ok(ranking)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str, impact: Option<&str>) -> Project {
        Project {
            name: name.to_string(),
            description: format!("{} description", name),
            tags: vec![],
            impact: impact.map(|s| s.to_string()),
            url: None,
        }
    }

    fn ranked(index: usize, score: f64) -> RankedProject {
        RankedProject {
            index,
            score,
            description: String::new(),
            rationale: String::new(),
        }
    }

    #[test]
    fn test_order_by_score_then_impact_then_returned_order() {
        let projects = vec![
            project("a", None),
            project("b", Some("2x faster")),
            project("c", None),
            project("d", None),
        ];
        let ordered = order_ranking(
            vec![ranked(2, 0.5), ranked(0, 0.5), ranked(1, 0.5), ranked(3, 0.9)],
            &projects,
            2,
        )
        .unwrap();

        let indexes: Vec<usize> = ordered.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let projects = vec![project("a", None), project("b", None)];
        let err = order_ranking(vec![ranked(0, 1.0), ranked(0, 0.5)], &projects, 2).unwrap_err();
        assert!(matches!(
            err,
            TailorError::SchemaViolation {
                stage: Stage::Selection,
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_and_short_rankings_rejected() {
        let projects = vec![project("a", None), project("b", None)];
        assert!(order_ranking(vec![ranked(5, 1.0)], &projects, 1).is_err());
        assert!(order_ranking(vec![ranked(0, 1.0)], &projects, 2).is_err());
        assert!(order_ranking(vec![ranked(0, f64::NAN), ranked(1, 0.1)], &projects, 2).is_err());
    }
}
