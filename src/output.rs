//! Result types produced by the submission pipeline.
//!
//! The upstream service decides the shape of a summary; the client treats
//! each section as opaque, ordered, and immutable once received.

use serde::{Deserialize, Serialize};

/// One titled group of summary points.
///
/// Wire shape: `{"id": number, "title": string, "points": [string]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySection {
    /// Unique, stable ordering key.
    pub id: i64,
    pub title: String,
    pub points: Vec<String>,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub summary: Vec<SummarySection>,
    /// Opaque handle for fetching the generated PDF later.
    pub pdf_reference: String,
}

/// Success body of the upstream `POST /summarize/`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SummarizeResponse {
    pub summary: Vec<SummarySection>,
    pub pdf_url: String,
}

impl From<SummarizeResponse> for SubmissionResult {
    fn from(r: SummarizeResponse) -> Self {
        Self {
            summary: r.summary,
            pdf_reference: r.pdf_url,
        }
    }
}

/// Error body used by both the upstream and the proxy: `{"error": string}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Pull the `error` string out of an arbitrary JSON body, if there is one.
pub(crate) fn error_field(body: &serde_json::Value) -> Option<String> {
    body.get("error")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summarize_response_maps_pdf_url() {
        let body = json!({
            "summary": [{"id": 1, "title": "A", "points": ["x"]}],
            "pdf_url": "f.pdf"
        });
        let r: SummarizeResponse = serde_json::from_value(body).unwrap();
        let result = SubmissionResult::from(r);
        assert_eq!(result.pdf_reference, "f.pdf");
        assert_eq!(
            result.summary,
            vec![SummarySection {
                id: 1,
                title: "A".into(),
                points: vec!["x".into()]
            }]
        );
    }

    #[test]
    fn error_field_only_reads_strings() {
        assert_eq!(error_field(&json!({"error": "bad file"})), Some("bad file".into()));
        assert_eq!(error_field(&json!({"error": 42})), None);
        assert_eq!(error_field(&json!({"detail": "x"})), None);
        assert_eq!(error_field(&json!([1, 2])), None);
    }
}
