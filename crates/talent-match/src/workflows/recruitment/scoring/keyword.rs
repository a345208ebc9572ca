use std::collections::BTreeSet;

use async_trait::async_trait;

use super::{MatchScorer, ScoringError};
use crate::workflows::recruitment::domain::{Candidate, Job};

/// Scores the share of job-description keywords that appear in the résumé text.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordOverlapScorer;

impl KeywordOverlapScorer {
    pub fn new() -> Self {
        Self
    }

    /// Percentage of distinct description words longer than two characters found in the résumé,
    /// rounded to two decimals.
    pub fn overlap(&self, resume_text: &str, description: &str) -> f64 {
        let keywords: BTreeSet<String> = description
            .split_whitespace()
            .filter(|word| word.chars().count() > 2)
            .map(str::to_lowercase)
            .collect();

        if keywords.is_empty() {
            return 0.0;
        }

        let resume = resume_text.to_lowercase();
        let hits = keywords
            .iter()
            .filter(|keyword| resume.contains(keyword.as_str()))
            .count();

        let ratio = (hits as f64 / keywords.len() as f64).min(1.0);
        (ratio * 100.0 * 100.0).round() / 100.0
    }
}

#[async_trait]
impl MatchScorer for KeywordOverlapScorer {
    async fn score(&self, candidate: &Candidate, job: &Job) -> Result<f64, ScoringError> {
        Ok(self.overlap(&candidate.resume_text, &job.description))
    }
}
