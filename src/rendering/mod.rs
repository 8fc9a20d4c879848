//! Output rendering for the CLI.
//!
//! Everything here returns strings; printing is left to the command
//! handlers.

use crate::classifier::ClassificationOutcome;
use crate::models::{CANCER_LABEL, ClassificationResult, NewsItem};
use crate::{Error, Result};
use chrono::{Local, TimeZone};
use serde::Serialize;
use std::fmt::Write as _;

/// Display format for timestamps.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Formats an epoch-millisecond timestamp in local time.
///
/// Returns an empty string for timestamps outside chrono's range.
#[must_use]
pub fn format_timestamp(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format(DISPLAY_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Rounds a `[0, 1]` score to a whole percentage.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent(score: f32) -> u8 {
    if score.is_nan() {
        return 0;
    }
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Formats a score as a percentage, e.g. `0.73` as `"73%"`.
#[must_use]
pub fn format_percent(score: f32) -> String {
    format!("{}%", percent(score))
}

/// Likelihood of cancer, in percent, implied by a predicted label.
///
/// A `"Cancer"` prediction reports its own confidence; any other label
/// reports the complement.
#[must_use]
pub fn cancer_likelihood(label: &str, score: f32) -> u8 {
    let confidence = percent(score);
    if label == CANCER_LABEL {
        confidence
    } else {
        100 - confidence
    }
}

#[derive(Serialize)]
struct CandidateView<'a> {
    label: &'a str,
    score: f32,
}

#[derive(Serialize)]
struct OutcomeView<'a> {
    image_uri: &'a str,
    label: Option<&'a str>,
    score: Option<f32>,
    cancer_likelihood: Option<u8>,
    inference_time_ms: u64,
    candidates: Vec<CandidateView<'a>>,
}

#[derive(Serialize)]
struct ResultView<'a> {
    #[serde(flatten)]
    result: &'a ClassificationResult,
    recorded_at: String,
    cancer_likelihood: u8,
}

impl<'a> From<&'a ClassificationResult> for ResultView<'a> {
    fn from(result: &'a ClassificationResult) -> Self {
        Self {
            result,
            recorded_at: format_timestamp(result.timestamp),
            cancer_likelihood: cancer_likelihood(&result.label, result.score),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::OperationFailed {
        operation: "serialize_output".to_string(),
        cause: e.to_string(),
    })
}

/// Renders a classification outcome.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_outcome(outcome: &ClassificationOutcome, format: OutputFormat) -> Result<String> {
    let top = outcome.top();
    if format == OutputFormat::Json {
        let view = OutcomeView {
            image_uri: &outcome.image_uri,
            label: top.map(|c| c.label.as_str()),
            score: top.map(|c| c.score),
            cancer_likelihood: top.map(|c| cancer_likelihood(&c.label, c.score)),
            inference_time_ms: outcome.classifications.inference_time_ms,
            candidates: outcome
                .classifications
                .categories
                .iter()
                .map(|c| CandidateView {
                    label: &c.label,
                    score: c.score,
                })
                .collect(),
        };
        return to_json(&view);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Image:             {}", outcome.image_uri);
    match top {
        Some(category) => {
            let _ = writeln!(out, "Result:            {}", category.label);
            let _ = writeln!(out, "Confidence:        {}", format_percent(category.score));
            let _ = writeln!(
                out,
                "Cancer likelihood: {}%",
                cancer_likelihood(&category.label, category.score)
            );
        },
        None => {
            let _ = writeln!(out, "Result:            no category above the threshold");
        },
    }
    let _ = writeln!(
        out,
        "Inference time:    {} ms",
        outcome.classifications.inference_time_ms
    );
    if outcome.classifications.categories.len() > 1 {
        let _ = writeln!(out, "Candidates:");
        for category in &outcome.classifications.categories {
            let _ = writeln!(out, "  {:<16} {:>4}", category.label, format_percent(category.score));
        }
    }
    Ok(out)
}

/// Renders the history list.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_history(results: &[ClassificationResult], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        let views: Vec<ResultView<'_>> = results.iter().map(ResultView::from).collect();
        return to_json(&views);
    }

    if results.is_empty() {
        return Ok("No saved results.\n".to_string());
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<19} {:<12} {:>6}  IMAGE",
        "ID", "RECORDED", "LABEL", "SCORE"
    );
    let _ = writeln!(out, "{}", "-".repeat(80));
    for result in results {
        let id = result.id.map(|id| id.to_string()).unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<6} {:<19} {:<12} {:>6}  {}",
            id,
            format_timestamp(result.timestamp),
            result.label,
            format_percent(result.score),
            result.image_uri
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Total: {} results", results.len());
    Ok(out)
}

/// Renders a single stored result.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_result(result: &ClassificationResult, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(&ResultView::from(result));
    }

    let mut out = String::new();
    if let Some(id) = result.id {
        let _ = writeln!(out, "ID:                {id}");
    }
    let _ = writeln!(out, "Recorded:          {}", format_timestamp(result.timestamp));
    let _ = writeln!(out, "Image:             {}", result.image_uri);
    let _ = writeln!(out, "Result:            {}", result.label);
    let _ = writeln!(out, "Confidence:        {}", format_percent(result.score));
    let _ = writeln!(
        out,
        "Cancer likelihood: {}%",
        cancer_likelihood(&result.label, result.score)
    );
    Ok(out)
}

/// Renders the news list.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_news(items: &[NewsItem], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(items);
    }

    if items.is_empty() {
        return Ok("No health news available.\n".to_string());
    }

    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}", i + 1, item.title);
        if let Some(url) = &item.url {
            let _ = writeln!(out, "    {url}");
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Classifications, ResultId};
    use test_case::test_case;

    #[test_case(0.73, "73%" ; "typical")]
    #[test_case(0.0, "0%" ; "zero")]
    #[test_case(1.0, "100%" ; "one")]
    #[test_case(0.125, "13%" ; "rounds half up")]
    #[test_case(f32::NAN, "0%" ; "nan")]
    fn test_format_percent(score: f32, expected: &str) {
        assert_eq!(format_percent(score), expected);
    }

    #[test_case("Cancer", 0.73, 73 ; "cancer reports confidence")]
    #[test_case("Non Cancer", 0.73, 27 ; "other label reports complement")]
    #[test_case("Non Cancer", 1.0, 0 ; "certain negative")]
    fn test_cancer_likelihood(label: &str, score: f32, expected: u8) {
        assert_eq!(cancer_likelihood(label, score), expected);
    }

    #[test]
    fn test_format_timestamp_matches_local_time() {
        let ms = 1_700_000_000_000;
        let expected = Local
            .timestamp_millis_opt(ms)
            .unwrap()
            .format(DISPLAY_TIME_FORMAT)
            .to_string();
        assert_eq!(format_timestamp(ms), expected);
        assert_eq!(format_timestamp(ms).len(), 19);
    }

    fn outcome() -> ClassificationOutcome {
        ClassificationOutcome {
            image_uri: "skin.jpg".to_string(),
            classifications: Classifications {
                categories: vec![
                    Category {
                        index: 0,
                        label: "Cancer".to_string(),
                        score: 0.73,
                    },
                    Category {
                        index: 1,
                        label: "Non Cancer".to_string(),
                        score: 0.27,
                    },
                ],
                inference_time_ms: 12,
            },
        }
    }

    #[test]
    fn test_render_outcome_table() {
        let text = render_outcome(&outcome(), OutputFormat::Table).unwrap();
        assert!(text.contains("Result:            Cancer"));
        assert!(text.contains("Confidence:        73%"));
        assert!(text.contains("Cancer likelihood: 73%"));
        assert!(text.contains("12 ms"));
    }

    #[test]
    fn test_render_outcome_json() {
        let text = render_outcome(&outcome(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["label"], "Cancer");
        assert_eq!(value["cancer_likelihood"], 73);
        assert_eq!(value["candidates"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_render_history() {
        let result = ClassificationResult::new(1_700_000_000_000, "a.jpg", "Non Cancer", 0.9)
            .unwrap()
            .with_id(ResultId::new(4));

        let table = render_history(std::slice::from_ref(&result), OutputFormat::Table).unwrap();
        assert!(table.contains("Non Cancer"));
        assert!(table.contains("90%"));
        assert!(table.contains("Total: 1 results"));

        let json = render_history(&[result], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["id"], 4);
        assert_eq!(value[0]["cancer_likelihood"], 10);

        assert_eq!(
            render_history(&[], OutputFormat::Table).unwrap(),
            "No saved results.\n"
        );
    }

    #[test]
    fn test_render_news() {
        let items = vec![NewsItem {
            title: "Screening saves lives".to_string(),
            image_url: "https://img.example/a.png".to_string(),
            url: Some("https://news.example/a".to_string()),
        }];
        let text = render_news(&items, OutputFormat::Table).unwrap();
        assert!(text.starts_with(" 1. Screening saves lives"));
        assert!(text.contains("https://news.example/a"));
        assert_eq!(
            render_news(&[], OutputFormat::Table).unwrap(),
            "No health news available.\n"
        );
    }
}
