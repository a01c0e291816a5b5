//! One-shot assertion for a single graded item.

use std::path::PathBuf;

use thiserror::Error;

use super::{autograding::AutogradingConfig, dispatch::DispatchOutcome, points::Points};
use crate::{
    config::Settings,
    probe::{Connectivity, TcpProbe},
};

/// Why a graded item did not pass.
#[derive(Debug, Error)]
pub enum TestFailure {
    /// Online: the service awarded a different number of points than
    /// configured. Displays as the feedback text.
    #[error("{feedback}")]
    PointsMismatch {
        /// Item the points were looked up under.
        key:      String,
        /// Points configured for the item.
        expected: Points,
        /// Points the service awarded.
        awarded:  Points,
        /// Rendered feedback, shown to the student.
        feedback: String,
    },
    /// Offline: the program output did not contain the expected marker.
    /// Displays as the marker.
    #[error("{marker}")]
    MissingOfflineFeedback {
        /// Text the output was expected to contain.
        marker: String,
    },
    /// Offline: no output was captured for the test at all.
    #[error("No output was captured for `{0}`.")]
    MissingOutput(String),
    /// The setup step failed before anything could be checked.
    #[error("Test setup failed: {0:#}")]
    Setup(anyhow::Error),
    /// The autograding document could not be loaded.
    #[error("{0:#}")]
    Config(anyhow::Error),
}

/// Checks one graded item against the autograding document.
pub struct Harness {
    /// Location of the autograding document.
    config_path:  PathBuf,
    /// Chooses between the points check and the offline marker check.
    connectivity: Box<dyn Connectivity>,
}

impl Harness {
    /// Creates a harness reading the document and probe address from
    /// `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self {
            config_path:  settings.autograding_config_path().to_path_buf(),
            connectivity: Box::new(TcpProbe::from_settings(settings)),
        }
    }

    /// Replaces the connectivity check.
    pub fn with_connectivity(mut self, connectivity: impl Connectivity + 'static) -> Self {
        self.connectivity = Box::new(connectivity);
        self
    }

    /// Runs `setup` for `test_name` and checks its outcome.
    ///
    /// Online, the points awarded under `point_key` must equal the points
    /// configured for it (zero when unconfigured). Offline, the trimmed
    /// output of `test_name` must contain `offline_marker`.
    pub fn assert_test<F>(
        &self,
        test_name: &str,
        point_key: &str,
        offline_marker: &str,
        setup: F,
    ) -> Result<(), TestFailure>
    where
        F: FnOnce(&str) -> anyhow::Result<DispatchOutcome>,
    {
        let outcome = setup(test_name).map_err(TestFailure::Setup)?;
        let config = AutogradingConfig::load(&self.config_path).map_err(TestFailure::Config)?;
        let expected = config.points_for(point_key);

        if self.connectivity.is_online() {
            let awarded = outcome
                .points_awarded
                .get(point_key)
                .copied()
                .unwrap_or_default();
            if awarded != expected {
                return Err(TestFailure::PointsMismatch {
                    key: point_key.to_string(),
                    expected,
                    awarded,
                    feedback: outcome.feedback,
                });
            }
        } else {
            let output = outcome
                .outputs
                .get(test_name)
                .ok_or_else(|| TestFailure::MissingOutput(test_name.to_string()))?;
            if !output.trim().contains(offline_marker) {
                return Err(TestFailure::MissingOfflineFeedback {
                    marker: offline_marker.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Checks one graded item with settings read from the environment.
pub fn assert_test<F>(
    test_name: &str,
    point_key: &str,
    offline_marker: &str,
    setup: F,
) -> Result<(), TestFailure>
where
    F: FnOnce(&str) -> anyhow::Result<DispatchOutcome>,
{
    Harness::new(&Settings::from_env()).assert_test(test_name, point_key, offline_marker, setup)
}
