use crate::infra::InMemoryOutbox;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use talent_match::error::AppError;
use talent_match::workflows::recruitment::{
    Candidate, CandidateId, FanOutMode, InMemoryRecruitmentStore, Job, JobId, JobRequest,
    KeywordOverlapScorer, MatchScorer, RecruitmentError, RecruitmentService, ResumeSubmission,
    Score, ServiceSettings, TopMatches,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of ranked candidates to print per job
    #[arg(long, default_value_t = 5)]
    pub(crate) limit: i64,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Plain-text résumé file
    #[arg(long)]
    pub(crate) resume: PathBuf,
    /// Plain-text job description file
    #[arg(long)]
    pub(crate) description: PathBuf,
}

const DEMO_JOBS: [(&str, &str); 2] = [
    (
        "Backend Engineer",
        "rust tokio postgres kubernetes observability",
    ),
    (
        "Data Analyst",
        "python sql dashboards statistics forecasting",
    ),
];

const DEMO_RESUMES: [&str; 3] = [
    "Ferris Crab\nferris@example.com\nSix years building rust services on tokio, tuning postgres, and running kubernetes clusters.",
    "Pandas Bear\npandas@example.com\nAnalyst fluent in python and sql who builds dashboards and statistics reports for finance.",
    "Gopher Blue\ngopher@example.com\nGo developer with postgres experience, some python scripting, and kubernetes operations.",
];

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let outbox = InMemoryOutbox::new("talent@example.com");
    let service = RecruitmentService::new(
        Arc::new(InMemoryRecruitmentStore::new()),
        Arc::new(KeywordOverlapScorer::new()),
        Arc::new(outbox.clone()),
        ServiceSettings {
            fan_out_mode: FanOutMode::Inline,
            ..ServiceSettings::default()
        },
    );

    println!("Talent matching demo");
    for resume in DEMO_RESUMES {
        let ingested = service
            .ingest_candidate(ResumeSubmission {
                resume_text: resume.to_string(),
                ..ResumeSubmission::default()
            })
            .await?;
        println!(
            "- Registered candidate {} ({})",
            ingested.candidate.candidate_id,
            ingested.candidate.name.as_deref().unwrap_or("unnamed")
        );
    }

    let mut job_ids = Vec::new();
    for (title, description) in DEMO_JOBS {
        let posted = service
            .post_job(JobRequest {
                title: title.to_string(),
                description: description.to_string(),
            })
            .await?;
        if let Some(report) = posted.fan_out {
            println!(
                "- Posted job {} '{}': {} pairs scheduled, {} scored, {} already present, {} failed",
                posted.job.job_id,
                posted.job.title,
                report.scheduled,
                report.scored,
                report.already_present,
                report.failed
            );
        }
        job_ids.push(posted.job.job_id);
    }

    if let Some(&backend) = job_ids.first() {
        triage_top_candidate(&service, backend).await?;
    }

    for job_id in job_ids {
        let top = service.top_matches(job_id, args.limit)?;
        render_top_matches(&top);
        let stats = service.stats(job_id)?;
        println!(
            "  Totals: {} applications | {} shortlisted | {} pending | {} rejected",
            stats.total_applications, stats.shortlisted, stats.pending, stats.rejected
        );
    }

    let messages = outbox.messages();
    if messages.is_empty() {
        println!("\nOutbox: empty");
    } else {
        println!("\nOutbox:");
        for message in messages {
            println!("  - {} -> {} | {}", message.from, message.to, message.subject);
            for line in message.body.lines() {
                println!("      {line}");
            }
        }
    }

    Ok(())
}

async fn triage_top_candidate(
    service: &RecruitmentService<InMemoryRecruitmentStore>,
    job_id: JobId,
) -> Result<(), RecruitmentError> {
    let ranked = service.top_matches(job_id, 3)?;
    let mut ranked = ranked.top_matches.into_iter();

    println!("\nTriage for job {job_id}");
    if let Some(best) = ranked.next() {
        let receipt = service
            .shortlist(best.candidate_id, job_id, best.score.points(), true)
            .await?;
        println!(
            "- Shortlisted candidate {} at {} (notification: {})",
            best.candidate_id,
            best.score,
            if receipt.notification.was_sent() { "sent" } else { "not sent" }
        );
    }
    if let Some(worst) = ranked.last() {
        service
            .reject(worst.candidate_id, job_id, worst.score.points())
            .await?;
        println!("- Rejected candidate {} at {}", worst.candidate_id, worst.score);
    }
    Ok(())
}

fn render_top_matches(top: &TopMatches) {
    println!(
        "\nTop matches for job {} '{}' ({} candidates)",
        top.job_id, top.job_title, top.total_candidates
    );
    for view in &top.top_matches {
        println!(
            "  - candidate {} {:<12} score {} [{}] {}",
            view.candidate_id,
            view.name.as_deref().unwrap_or("unnamed"),
            view.score,
            view.tier.label(),
            view.status.label()
        );
    }
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let resume_text = std::fs::read_to_string(&args.resume)?;
    let description = std::fs::read_to_string(&args.description)?;

    let candidate = Candidate {
        candidate_id: CandidateId(0),
        name: None,
        email: None,
        resume_text,
    };
    let job = Job {
        job_id: JobId(0),
        title: String::new(),
        description,
    };

    let raw = KeywordOverlapScorer::new()
        .score(&candidate, &job)
        .await
        .map_err(RecruitmentError::from)?;
    let score = Score::try_from(raw).map_err(RecruitmentError::from)?;
    println!("score {} [{}]", score, score.tier().label());
    Ok(())
}
