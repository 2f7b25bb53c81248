use crate::infra::{build_engine, InMemoryEvaluationRepository};
use chrono::{Duration, Utc};
use clap::{Args, ValueEnum};
use cyberassess::assessment::{
    write_recommendations_csv, AnswerSource, EvaluationEngine, EvaluationId, EvaluationInput,
    EvaluationRecord, EvaluationReport, EvaluationService, EvaluationSubmission, QuizSummaryView,
    ADVANCED_QUIZ_ID, INITIAL_QUIZ_ID,
};
use cyberassess::config::AppConfig;
use cyberassess::error::AppError;
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Quiz id the answers belong to
    #[arg(long, default_value = INITIAL_QUIZ_ID)]
    pub(crate) quiz: String,
    /// Path to the stored answers document (JSON, possibly double-encoded). Use '-' for stdin.
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Score persisted alongside the answers, if any
    #[arg(long)]
    pub(crate) stored_score: Option<i32>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Additional quiz definitions (JSON array) to load before scoring
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct QuizzesArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub(crate) json: bool,
    /// Additional quiz definitions (JSON array) to include in the listing
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print how each answer was resolved
    #[arg(long)]
    pub(crate) show_answers: bool,
    /// Skip the legacy percentage correction walkthrough
    #[arg(long)]
    pub(crate) skip_legacy: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        quiz,
        answers,
        stored_score,
        format,
        catalog,
    } = args;

    let config = AppConfig::load()?;
    let engine = build_engine(&config, catalog.as_deref())?;
    let answers = read_answers(&answers)?;
    let report = engine.evaluate(&EvaluationInput {
        quiz_id: quiz,
        answers,
        stored_score,
    })?;

    match format {
        OutputFormat::Text => render_report(&report, true),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => write_recommendations_csv(&report, std::io::stdout().lock())?,
    }

    Ok(())
}

pub(crate) fn run_quizzes(args: QuizzesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = build_engine(&config, args.catalog.as_deref())?;
    let quizzes: Vec<QuizSummaryView> = engine
        .catalog()
        .quizzes()
        .iter()
        .map(QuizSummaryView::from)
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&quizzes)?);
        return Ok(());
    }

    println!("Available quizzes");
    for quiz in &quizzes {
        println!(
            "- {} ({:?}): {} | {} questions | max {} points",
            quiz.id, quiz.kind, quiz.title, quiz.questions, quiz.max_score
        );
        println!("  Categories: {}", quiz.categories.join(", "));
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        show_answers,
        skip_legacy,
    } = args;

    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let engine = Arc::new(EvaluationEngine::standard());
    let service = EvaluationService::new(repository.clone(), engine);

    println!("Cybersecurity maturity assessment demo");

    println!("\n1. Initial questionnaire stored with positional keys and gaps");
    let submitted = service.submit(EvaluationSubmission {
        quiz_id: INITIAL_QUIZ_ID.to_string(),
        answers: demo_initial_answers(),
        profile: Some("demo-profile".to_string()),
    })?;
    render_report(&submitted, show_answers);

    println!("\n2. Advanced questionnaire stored as a double-encoded JSON string");
    let advanced = service.submit(EvaluationSubmission {
        quiz_id: ADVANCED_QUIZ_ID.to_string(),
        answers: demo_advanced_answers(),
        profile: Some("demo-profile".to_string()),
    })?;
    render_report(&advanced, show_answers);

    if !skip_legacy {
        println!("\n3. Legacy record saved with a percentage instead of raw points");
        let created_at = Utc::now() - Duration::days(400);
        repository.seed(EvaluationRecord {
            id: EvaluationId("eval-legacy".to_string()),
            quiz_id: INITIAL_QUIZ_ID.to_string(),
            score: Some(82),
            answers: demo_initial_answers(),
            created_at,
            completed_at: Some(created_at + Duration::minutes(9)),
            profile: Some("demo-profile".to_string()),
        });
        let legacy = service.report(&EvaluationId("eval-legacy".to_string()))?;
        println!(
            "  Stored score {:?} exceeds the raw maximum {}; reclassified with {} points",
            legacy.score.stored_score, legacy.max_score, legacy.score.score
        );
        render_report(&legacy, false);
    }

    let recent = service.recent(Some("demo-profile"), 5)?;
    match serde_json::to_string_pretty(&recent) {
        Ok(json) => println!("\nRecent evaluations for demo-profile:\n{}", json),
        Err(err) => println!("\nRecent evaluations unavailable: {}", err),
    }

    Ok(())
}

pub(crate) fn read_answers(path: &Path) -> Result<Value, AppError> {
    let mut raw = String::new();
    if path.as_os_str() == "-" {
        std::io::stdin().read_to_string(&mut raw)?;
    } else {
        raw = std::fs::read_to_string(path)?;
    }
    // Stored answers are text; the normalizer decodes (and tolerates) it.
    Ok(Value::String(raw))
}

pub(crate) fn render_report(report: &EvaluationReport, show_answers: bool) {
    match &report.evaluation_id {
        Some(id) => println!("Evaluation {} | {}", id, report.quiz_title),
        None => println!("{}", report.quiz_title),
    }
    println!(
        "- Score: {} / {} ({}%)",
        report.total_score, report.max_score, report.percentage
    );
    if report.score.legacy_percentage {
        println!(
            "- Stored score {:?} treated as a legacy percentage",
            report.score.stored_score
        );
    }
    println!(
        "- Maturity level {}: {}",
        report.maturity.level_number, report.maturity.level
    );
    println!("  {}", report.maturity.description);

    println!("Categories:");
    for category in &report.categories {
        println!(
            "  - {}: {}/{} ({:.0}%)",
            category.name,
            category.score,
            category.max_score,
            category.percentage()
        );
    }

    if !report.weakest_categories.is_empty() {
        println!("Focus areas: {}", report.weakest_categories.join(", "));
    }

    println!("Recommendations:");
    for recommendation in report
        .recommendations
        .iter()
        .filter(|recommendation| report.weakest_categories.contains(&recommendation.category))
    {
        println!(
            "  - [{}] {} ({}/{}, {}): {}",
            recommendation.category,
            recommendation.question_id,
            recommendation.score,
            recommendation.max_score,
            recommendation.selected_option_label,
            recommendation.recommendation_text
        );
    }

    if show_answers {
        println!("Answers:");
        for answer in report.answers.iter() {
            let source = match &answer.source {
                AnswerSource::Direct => "answered".to_string(),
                AnswerSource::Legacy { key } => format!("legacy key {key}"),
                AnswerSource::Copied { from } => format!("copied from {from}"),
                AnswerSource::Averaged => "filled with the mean".to_string(),
                AnswerSource::Default => "filled with the default".to_string(),
            };
            println!("  - {} = {} ({})", answer.question_id, answer.value, source);
        }
    }
}

fn demo_initial_answers() -> Value {
    json!({
        "q1": 3, "q2": 2, "q3": "2",
        "q4": 3, "q5": 1, "q6": null,
        "q7": 2, "q8": 1, "q9": 2,
        "q10": 1, "q11": 1, "q12": 0,
        "q13": 1, "q14": 2
    })
}

fn demo_advanced_answers() -> Value {
    let inner = json!({
        "gobierno-1": 3, "gobierno-2": 2, "gobierno-3": 2, "gobierno-4": 1,
        "riesgos-1": 1, "riesgos-2": 1, "riesgos-3": 0,
        "red-1": 3, "red-2": 3, "red-3": 2, "red-4": 2,
        "continuidad-1": 1, "continuidad-2": 1,
        "formacion-1": 0, "formacion-2": 1, "formacion-3": 1,
        "cumplimiento-1": 2, "cumplimiento-2": 2, "cumplimiento-3": 1
    });
    Value::String(inner.to_string())
}
