use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use super::domain::{CandidateDraft, JobPosting};
use super::error::RecruitmentError;

const MIN_TITLE_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 20;
const MIN_RESUME_CHARS: usize = 50;
const MAX_NAME_CHARS: usize = 100;

/// Raw job creation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl JobRequest {
    pub fn validate(self) -> Result<JobPosting, RecruitmentError> {
        let title = self.title.trim();
        let description = self.description.trim();

        if title.is_empty() || description.is_empty() {
            return Err(RecruitmentError::invalid_argument(
                "both title and description are required",
            ));
        }
        if title.chars().count() < MIN_TITLE_CHARS {
            return Err(RecruitmentError::invalid_argument(format!(
                "job title must be at least {MIN_TITLE_CHARS} characters"
            )));
        }
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(RecruitmentError::invalid_argument(format!(
                "job description must be at least {MIN_DESCRIPTION_CHARS} characters"
            )));
        }

        Ok(JobPosting {
            title: title.to_string(),
            description: description.to_string(),
        })
    }
}

/// Plain-text résumé submission. Explicit name and e-mail win over extracted values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeSubmission {
    pub resume_text: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ResumeSubmission {
    pub fn into_draft(self) -> Result<CandidateDraft, RecruitmentError> {
        let resume_text = self.resume_text.trim();
        if resume_text.chars().count() < MIN_RESUME_CHARS {
            return Err(RecruitmentError::invalid_argument(
                "could not extract meaningful text from resume",
            ));
        }

        let name = non_blank(self.name).or_else(|| extract_name(resume_text));
        let email = non_blank(self.email).or_else(|| extract_email(resume_text));

        Ok(CandidateDraft {
            name,
            email,
            resume_text: resume_text.to_string(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// First non-empty line, when it is short enough to plausibly be a name.
pub fn extract_name(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .filter(|line| line.chars().count() < MAX_NAME_CHARS)
        .map(str::to_string)
}

pub fn extract_email(text: &str) -> Option<String> {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("email pattern compiles"))
        .find(text)
        .map(|found| found.as_str().to_string())
}
