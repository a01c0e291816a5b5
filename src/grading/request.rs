use anyhow::Result;
use serde::Serialize;

use super::{autograding::AutogradingConfig, outputs::TestOutputs};
use crate::identity::Identity;

/// Body posted to the grading service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingRequest {
    /// Source of the student's program.
    pub student_code:       String,
    /// Source of the pytest file grading it.
    pub pytest_code:        String,
    /// The (possibly filtered) autograding document, as a JSON string.
    pub autograding_config: String,
    /// Captured outputs, unkeyed, in recording order.
    pub terminal_outputs:   Vec<String>,
    /// Assignment slug, when the identity could be resolved.
    pub slug:               Option<String>,
    /// GitHub login, when the identity could be resolved.
    #[serde(rename = "gitHubUserName")]
    pub github_user_name:   Option<String>,
}

impl GradingRequest {
    /// Assembles the request body.
    pub fn new(
        student_code: impl Into<String>,
        pytest_code: impl Into<String>,
        config: &AutogradingConfig,
        outputs: &TestOutputs,
        identity: Option<&Identity>,
    ) -> Result<Self> {
        Ok(Self {
            student_code:       student_code.into(),
            pytest_code:        pytest_code.into(),
            autograding_config: config.to_json_string()?,
            terminal_outputs:   outputs.values().map(str::to_owned).collect(),
            slug:               identity.map(|id| id.slug().to_owned()),
            github_user_name:   identity.map(|id| id.username().to_owned()),
        })
    }
}
