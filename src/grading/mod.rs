#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Everything between captured program output and the student-facing
//! verdict: the autograding document, the request and response of the
//! grading service, feedback rendering and the per-item assertion.

/// The GitHub Classroom autograding document
pub mod autograding;
/// Posting to the grading service
pub mod dispatch;
/// Rendering the service's response for the console
pub mod feedback;
/// Single-item assertion harness
pub mod harness;
/// Captured outputs per test
pub mod outputs;
/// Point values
pub mod points;
/// Request body sent to the grading service
pub mod request;
/// Response body returned by the grading service
pub mod response;

pub use autograding::{AutogradingConfig, TestDescriptor};
pub use dispatch::{DispatchOutcome, Dispatcher, dispatch};
pub use feedback::{points_table, render_feedback};
pub use harness::{Harness, TestFailure, assert_test};
pub use outputs::TestOutputs;
pub use points::Points;
pub use request::GradingRequest;
pub use response::{CodeFeedback, CodeFeedbackItem, GradingResponse, TestResult};
