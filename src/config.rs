#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Process-wide settings, read once at startup and passed down explicitly.

use std::{ffi::OsString, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use bon::Builder;
use reqwest::blocking::Client;

use crate::constants::{
    AUTOGRADING_CONFIG_PATH, DEFAULT_GRADING_URL, DEFAULT_INTERPRETER, GITHUB_USER_URL,
    GRADING_URL_ENV, IDENTITY_URL_ENV, INTERPRETER_ENV, PROBE_ADDR, PROBE_ADDR_ENV,
    PROBE_TIMEOUT, RUN_TIMEOUT_ENV, TOKEN_ENV_VAR, USER_AGENT,
};

/// Endpoints, paths and timeouts used by every other component.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct Settings {
    /// Grading service endpoint the payload is posted to.
    #[builder(default = DEFAULT_GRADING_URL.to_string())]
    grading_url:             String,
    /// Endpoint returning the profile of the token's owner.
    #[builder(default = GITHUB_USER_URL.to_string())]
    identity_url:            String,
    /// Address dialed by the connectivity probe.
    #[builder(default = PROBE_ADDR.to_string())]
    probe_addr:              String,
    /// How long the connectivity probe waits.
    #[builder(default = PROBE_TIMEOUT)]
    probe_timeout:           Duration,
    /// Path of the autograding document.
    #[builder(into, default = PathBuf::from(AUTOGRADING_CONFIG_PATH))]
    autograding_config_path: PathBuf,
    /// Interpreter used to run student programs.
    #[builder(into, default = OsString::from(DEFAULT_INTERPRETER))]
    interpreter:             OsString,
    /// Environment variable the token is read from on Linux.
    #[builder(default = TOKEN_ENV_VAR.to_string())]
    token_env_var:           String,
    /// Optional deadline for student program runs.
    run_timeout:             Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps an environment variable name
    /// to its value.
    ///
    /// A grading URL that is set but empty is kept as-is; only an unset
    /// variable falls back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        Self::builder()
            .grading_url(lookup(GRADING_URL_ENV).unwrap_or_else(|| DEFAULT_GRADING_URL.into()))
            .identity_url(non_empty(IDENTITY_URL_ENV).unwrap_or_else(|| GITHUB_USER_URL.into()))
            .probe_addr(non_empty(PROBE_ADDR_ENV).unwrap_or_else(|| PROBE_ADDR.into()))
            .interpreter(non_empty(INTERPRETER_ENV).unwrap_or_else(|| DEFAULT_INTERPRETER.into()))
            .maybe_run_timeout(read_timeout_secs(lookup(RUN_TIMEOUT_ENV)))
            .build()
    }

    /// Returns the grading service endpoint.
    pub fn grading_url(&self) -> &str {
        &self.grading_url
    }

    /// Returns the identity endpoint.
    pub fn identity_url(&self) -> &str {
        &self.identity_url
    }

    /// Returns the address dialed by the connectivity probe.
    pub fn probe_addr(&self) -> &str {
        &self.probe_addr
    }

    /// Returns the connectivity probe timeout.
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Returns the path of the autograding document.
    pub fn autograding_config_path(&self) -> &std::path::Path {
        &self.autograding_config_path
    }

    /// Returns the interpreter used for student programs.
    pub fn interpreter(&self) -> &std::ffi::OsStr {
        &self.interpreter
    }

    /// Returns the variable the Linux credential provider reads.
    pub fn token_env_var(&self) -> &str {
        &self.token_env_var
    }

    /// Returns the deadline for student program runs, if any.
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout
    }

    /// Builds the blocking HTTP client shared by the identity resolver and the
    /// dispatcher.
    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            // Avoid macOS dynamic store lookups that fail in sandboxed environments.
            .no_proxy()
            .build()
            .context("Failed to construct shared HTTP client")
    }
}

/// Parses a number of seconds into a `Duration`; anything unparseable means no
/// deadline.
fn read_timeout_secs(value: Option<String>) -> Option<Duration> {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
