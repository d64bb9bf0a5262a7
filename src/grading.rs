//! Rubric-based scoring of generated documentation against a reference.

use crate::agent::GenerationAgent;
use crate::error::{DocgenError, Result};
use crate::prompt::grading_request;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One evaluation of generated documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeReport {
    pub accuracy: u8,
    pub clarity: u8,
    pub closeness: u8,
    pub technical_accuracy: u8,
    pub readability: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl GradeReport {
    /// Metric labels paired with their scores, in rubric order.
    pub fn scores(&self) -> [(&'static str, u8); 5] {
        [
            ("Accuracy", self.accuracy),
            ("Clarity", self.clarity),
            ("Closeness", self.closeness),
            ("Technical Accuracy", self.technical_accuracy),
            ("Language and Readability", self.readability),
        ]
    }

    pub fn average(&self) -> f32 {
        let total: u32 = self.scores().iter().map(|(_, s)| u32::from(*s)).sum();
        total as f32 / 5.0
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::from("## Documentation Evaluation\n\n| Metric | Score |\n|---|---|\n");
        for (label, score) in self.scores() {
            let _ = writeln!(out, "| {label} | {score}/5 |");
        }
        let _ = writeln!(out, "| **Average** | {:.1}/5 |", self.average());

        for (heading, items) in [
            ("Strengths", &self.strengths),
            ("Weaknesses", &self.weaknesses),
            ("Suggestions", &self.suggestions),
        ] {
            let _ = write!(out, "\n### {heading}\n\n");
            if items.is_empty() {
                out.push_str("- None noted\n");
            }
            for item in items {
                let _ = writeln!(out, "- {item}");
            }
        }
        out
    }

    fn validate(self) -> Result<Self> {
        for (label, score) in self.scores() {
            if !(1..=5).contains(&score) {
                return Err(DocgenError::grading(format!(
                    "{label} score {score} is outside 1-5"
                )));
            }
        }
        Ok(self)
    }
}

/// Parses the grader's answer. The JSON object may be surrounded by prose
/// or a code fence.
pub fn parse_report(response: &str) -> Result<GradeReport> {
    let start = response.find('{');
    let end = response.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => return Err(DocgenError::grading("response contains no JSON object")),
    };

    let report: GradeReport = serde_json::from_str(json)
        .map_err(|e| DocgenError::grading(format!("malformed report: {e}")))?;
    report.validate()
}

/// Asks `agent` to grade `generated` against `original`.
pub async fn grade(
    original: &str,
    generated: &str,
    agent: &dyn GenerationAgent,
) -> Result<GradeReport> {
    info!("Grading generated documentation");
    let response = agent
        .generate(&grading_request(original, generated))
        .await?;
    parse_report(&response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    const REPORT: &str = r#"{
        "accuracy": 4, "clarity": 5, "closeness": 3, "technical_accuracy": 4, "readability": 5,
        "strengths": ["Clear structure"], "weaknesses": ["Misses the CLI"], "suggestions": []
    }"#;

    struct Canned(&'static str);

    #[async_trait]
    impl GenerationAgent for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_parses_fenced_json() {
        let response = format!("Here is my evaluation:\n```json\n{REPORT}\n```\nThanks.");
        let report = parse_report(&response).unwrap();

        assert_eq!(report.accuracy, 4);
        assert_eq!(report.closeness, 3);
        assert_eq!(report.strengths, vec!["Clear structure"]);
        assert!(report.suggestions.is_empty());
        assert!((report.average() - 4.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_out_of_range_scores() {
        let response = REPORT.replace("\"clarity\": 5", "\"clarity\": 7");
        let err = parse_report(&response).unwrap_err();
        assert!(err.to_string().contains("Clarity score 7"), "{err}");

        let response = REPORT.replace("\"accuracy\": 4", "\"accuracy\": 0");
        assert!(parse_report(&response).is_err());
    }

    #[test]
    fn test_rejects_missing_json() {
        assert!(matches!(
            parse_report("I cannot grade this."),
            Err(DocgenError::Grading { .. })
        ));
        assert!(parse_report(r#"{"accuracy": 3}"#).is_err());
    }

    #[test]
    fn test_markdown_lists_every_metric() {
        let report = parse_report(REPORT).unwrap();
        let md = report.to_markdown();

        assert!(md.contains("| Technical Accuracy | 4/5 |"));
        assert!(md.contains("| **Average** | 4.2/5 |"));
        assert!(md.contains("- Misses the CLI"));
        assert!(md.contains("### Suggestions\n\n- None noted\n"));
    }

    struct Unreachable;

    #[async_trait]
    impl GenerationAgent for Unreachable {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(DocgenError::generation("HTTP 401: invalid key sk-secret"))
        }
    }

    #[tokio::test]
    async fn test_agent_failures_keep_the_generic_user_message() {
        let err = grade("original", "generated", &Unreachable).await.unwrap_err();
        assert!(matches!(err, DocgenError::Generation { .. }));
        assert!(!err.user_message().contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_grade_uses_agent_response() {
        let report = grade("original", "generated", &Canned(REPORT)).await.unwrap();
        assert_eq!(report.readability, 5);
    }
}
