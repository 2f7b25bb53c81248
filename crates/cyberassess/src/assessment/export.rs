use std::io::Write;

use serde::Serialize;

use super::engine::EvaluationReport;
use super::recommendations::RecommendationBand;

#[derive(Debug, Serialize)]
struct RecommendationRow<'a> {
    #[serde(rename = "Question")]
    question_id: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Score")]
    score: i32,
    #[serde(rename = "Max Score")]
    max_score: i32,
    #[serde(rename = "Selected Option")]
    selected_option: &'a str,
    #[serde(rename = "Band")]
    band: RecommendationBand,
    #[serde(rename = "Recommendation")]
    recommendation: &'a str,
}

/// Writes one CSV row per question recommendation, headers included.
pub fn write_recommendations_csv<W: Write>(
    report: &EvaluationReport,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for recommendation in &report.recommendations {
        csv_writer.serialize(RecommendationRow {
            question_id: &recommendation.question_id,
            category: &recommendation.category,
            score: recommendation.score,
            max_score: recommendation.max_score,
            selected_option: &recommendation.selected_option_label,
            band: recommendation.band,
            recommendation: &recommendation.recommendation_text,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::engine::{EvaluationEngine, EvaluationInput};
    use crate::assessment::quiz::INITIAL_QUIZ_ID;
    use serde_json::json;

    #[test]
    fn csv_contains_header_and_one_row_per_question() {
        let report = EvaluationEngine::standard()
            .evaluate(&EvaluationInput {
                quiz_id: INITIAL_QUIZ_ID.to_string(),
                answers: json!({ "politicas-1": 0 }),
                stored_score: None,
            })
            .expect("report builds");

        let mut buffer = Vec::new();
        write_recommendations_csv(&report, &mut buffer).expect("csv written");
        let output = String::from_utf8(buffer).expect("utf8");
        let mut lines = output.lines();

        assert_eq!(
            lines.next(),
            Some("Question,Category,Score,Max Score,Selected Option,Band,Recommendation")
        );
        let first = lines.next().expect("first row");
        assert!(first.starts_with("politicas-1,Políticas de Seguridad,0,3,No implementado,critical,"));
        assert_eq!(output.lines().count(), 16);
    }
}
