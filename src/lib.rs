//! # autograde
//!
//! Client side of a classroom autograding pipeline. It runs a student's
//! program against fixed input, sends the captured output to a remote grading
//! service together with the student's identity, and turns the verdict into
//! console feedback or a pass/fail assertion.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Process-wide settings
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Locally stored GitHub token lookup
pub mod credential;
/// For all things related to grading
pub mod grading;
/// Student identity from token and directory name
pub mod identity;
/// Console diagnostics and `.env` loading
pub mod logging;
/// Connectivity probe
pub mod probe;
/// Subprocess helpers
pub mod process;
/// Runs student programs
pub mod runner;

/// Python bindings, for use from per-assignment pytest files
#[cfg(feature = "python")]
pub mod python;

pub use config::Settings;
pub use credential::{Credential, CredentialProvider, PlatformCredentials};
pub use identity::{Identity, IdentityResolver};
pub use probe::{Connectivity, TcpProbe, probe};
pub use runner::{ProgramRunner, run_program};
