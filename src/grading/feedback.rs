//! Console rendering of a grading response.

use itertools::Itertools;
use tabled::{Table, settings::Style};

use super::response::GradingResponse;

/// Renders the full feedback report.
///
/// Sections appear in a fixed order (per-test results, totals, code-specific
/// feedback, general feedback) and every list is rendered in full, in the
/// order the service returned it.
pub fn render_feedback(response: &GradingResponse) -> String {
    let tests = response
        .tests
        .iter()
        .map(|test| {
            format!(
                "Test Name: {}\nPoints Awarded: {}\nFeedback: {}\n",
                test.name, test.points_awarded, test.feedback
            )
        })
        .join("\n");

    let code = response
        .specific_code_feedback
        .code
        .iter()
        .map(|item| format!("{}\nRecommendation: {}\n", item.feedback, item.recommendation))
        .join("\n");

    format!(
        "\nTest Results:\n{tests}\nTotal Points Awarded: {}\nTotal Points Possible: {}\n\nSpecific \
         Code Feedback:\n{code}\nGeneral Feedback:\n{}",
        response.total_points_awarded,
        response.total_points_possible,
        response.specific_code_feedback.general
    )
}

/// Renders the awarded points as a table, one row per test.
pub fn points_table(response: &GradingResponse) -> String {
    Table::new(&response.tests).with(Style::modern()).to_string()
}
