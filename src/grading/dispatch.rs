//! Sends captured outputs to the grading service and collects its verdict.

use std::path::PathBuf;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use reqwest::blocking::Client;

use super::{
    autograding::AutogradingConfig, feedback::render_feedback, outputs::TestOutputs,
    points::Points, request::GradingRequest, response::GradingResponse,
};
use crate::{
    config::Settings,
    constants::OFFLINE_ADVISORY,
    credential::{CredentialProvider, PlatformCredentials},
    identity::IdentityResolver,
    probe::{Connectivity, TcpProbe},
};

/// Everything a dispatch produced.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    /// The outputs that were sent, unchanged.
    pub outputs:        TestOutputs,
    /// Points the service awarded, by test name, in the service's order.
    pub points_awarded: IndexMap<String, Points>,
    /// Rendered feedback; empty when offline.
    pub feedback:       String,
    /// The parsed service response.
    pub response:       GradingResponse,
}

/// Posts grading requests on behalf of the current student.
pub struct Dispatcher {
    /// Endpoints and paths.
    settings:     Settings,
    /// Client shared with the identity resolver.
    client:       Client,
    /// Where the bearer token comes from.
    credentials:  Box<dyn CredentialProvider>,
    /// Decides whether feedback is rendered.
    connectivity: Box<dyn Connectivity>,
    /// Directory the slug is derived from; the current directory when unset.
    working_dir:  Option<PathBuf>,
}

impl Dispatcher {
    /// Creates a dispatcher using the platform credential store and the TCP
    /// connectivity probe.
    pub fn new(settings: Settings) -> Result<Self> {
        let client = settings.http_client()?;
        Ok(Self {
            credentials: Box::new(PlatformCredentials::for_current_platform(&settings)),
            connectivity: Box::new(TcpProbe::from_settings(&settings)),
            client,
            settings,
            working_dir: None,
        })
    }

    /// Replaces the credential source.
    pub fn with_credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.credentials = Box::new(credentials);
        self
    }

    /// Replaces the connectivity check.
    pub fn with_connectivity(mut self, connectivity: impl Connectivity + 'static) -> Self {
        self.connectivity = Box::new(connectivity);
        self
    }

    /// Derives the slug from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Returns the settings this dispatcher was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sends `outputs` and the sources to the grading service.
    ///
    /// When `test_name` is given, only the autograding items whose run
    /// command mentions `/{test_name}.py` are sent. Transport failures and
    /// error statuses are returned as errors; identity problems are not.
    pub fn dispatch(
        &self,
        test_name: Option<&str>,
        outputs: TestOutputs,
        student_code: &str,
        pytest_code: &str,
        config: &AutogradingConfig,
    ) -> Result<DispatchOutcome> {
        let credential = self.credentials.credential();
        let identity = credential.as_ref().and_then(|credential| {
            let resolver = IdentityResolver::new(self.client.clone(), self.settings.identity_url());
            match &self.working_dir {
                Some(dir) => resolver.resolve_in(Some(credential), dir),
                None => resolver.resolve(Some(credential)),
            }
        });

        let config = match test_name {
            Some(name) => {
                tracing::info!("Running test: {name}");
                config.filtered_for(name)
            }
            None => config.clone(),
        };

        let request =
            GradingRequest::new(student_code, pytest_code, &config, &outputs, identity.as_ref())?;

        let url = self.settings.grading_url();
        let mut builder = self.client.post(url).json(&request);
        if let Some(credential) = &credential {
            builder = builder.bearer_auth(credential.expose());
        }

        let response: GradingResponse = builder
            .send()
            .with_context(|| format!("Could not reach the grading service at {url}"))?
            .error_for_status()
            .context("The grading service rejected the request")?
            .json()
            .context("Could not parse the grading service response")?;

        let points_awarded = response.points_awarded();
        let feedback = if self.connectivity.is_online() {
            if response.tests.is_empty() {
                String::new()
            } else {
                render_feedback(&response)
            }
        } else {
            tracing::warn!("{OFFLINE_ADVISORY}");
            String::new()
        };

        Ok(DispatchOutcome {
            outputs,
            points_awarded,
            feedback,
            response,
        })
    }
}

/// Dispatches with settings read from the environment.
pub fn dispatch(
    test_name: Option<&str>,
    outputs: TestOutputs,
    student_code: &str,
    pytest_code: &str,
    config: &AutogradingConfig,
) -> Result<DispatchOutcome> {
    Dispatcher::new(Settings::from_env())?.dispatch(
        test_name,
        outputs,
        student_code,
        pytest_code,
        config,
    )
}
