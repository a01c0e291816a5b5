use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

use super::points::Points;

/// Reads a string field the service may send as `null`.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Score and feedback for one graded item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Name of the graded item.
    #[tabled(rename = "Test")]
    pub name:           String,
    /// Points awarded by the service.
    #[tabled(rename = "Points")]
    pub points_awarded: Points,
    /// Explanation written by the service.
    #[serde(default, deserialize_with = "null_as_empty")]
    #[tabled(skip)]
    pub feedback:       String,
}

/// A remark about a specific part of the submitted code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeFeedbackItem {
    /// What was observed.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub feedback:       String,
    /// What to do about it.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recommendation: String,
}

/// Feedback on the submission as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeFeedback {
    /// Remarks on specific code.
    #[serde(default)]
    pub code:    Vec<CodeFeedbackItem>,
    /// Free-form closing remarks.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub general: String,
}

/// What the grading service returns for a dispatch.
///
/// The service is trusted: test names are not checked against the
/// dispatched configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResponse {
    /// Per-item results, in the order the service reported them.
    pub tests:                  Vec<TestResult>,
    /// Sum of the awarded points.
    #[serde(default)]
    pub total_points_awarded:   Points,
    /// Sum of the available points.
    #[serde(default)]
    pub total_points_possible:  Points,
    /// Code-level and general feedback.
    #[serde(default)]
    pub specific_code_feedback: CodeFeedback,
}

impl GradingResponse {
    /// Maps each reported test name to its awarded points, in the order the
    /// service reported them. A repeated name keeps its first position and
    /// its last value.
    pub fn points_awarded(&self) -> IndexMap<String, Points> {
        self.tests
            .iter()
            .map(|test| (test.name.clone(), test.points_awarded))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_payload() {
        let body = r#"{
            "tests": [{"name": "test1", "pointsAwarded": 10, "feedback": "Good job"}],
            "totalPointsAwarded": 10,
            "totalPointsPossible": 10,
            "specificCodeFeedback": {
                "code": [{"feedback": "Good code", "recommendation": "Keep it up"}],
                "general": "Overall good work"
            }
        }"#;

        let response: GradingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.tests[0].points_awarded, Points(10.0));
        assert_eq!(response.specific_code_feedback.code[0].recommendation, "Keep it up");
        assert_eq!(response.points_awarded().get("test1"), Some(&Points(10.0)));
    }

    #[test]
    fn optional_sections_default_to_empty() {
        let response: GradingResponse =
            serde_json::from_str(r#"{"tests": [{"name": "t", "pointsAwarded": 0}]}"#).unwrap();
        assert_eq!(response.total_points_possible, Points(0.0));
        assert!(response.specific_code_feedback.code.is_empty());
        assert_eq!(response.tests[0].feedback, "");
    }

    #[test]
    fn null_text_fields_read_as_empty() {
        let body = r#"{
            "tests": [{"name": "t", "pointsAwarded": 3, "feedback": null}],
            "specificCodeFeedback": {
                "code": [{"feedback": null, "recommendation": null}],
                "general": null
            }
        }"#;

        let response: GradingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.tests[0].feedback, "");
        assert_eq!(response.points_awarded().get("t"), Some(&Points(3.0)));
        assert_eq!(response.specific_code_feedback.code[0].recommendation, "");
        assert_eq!(response.specific_code_feedback.general, "");
    }

    #[test]
    fn awarded_points_keep_service_order() {
        let response: GradingResponse = serde_json::from_str(
            r#"{"tests": [
                {"name": "zeta", "pointsAwarded": 1},
                {"name": "alpha", "pointsAwarded": 2},
                {"name": "zeta", "pointsAwarded": 3}
            ]}"#,
        )
        .unwrap();

        let awarded = response.points_awarded();
        let names: Vec<&str> = awarded.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(awarded.get("zeta"), Some(&Points(3.0)));
    }
}
