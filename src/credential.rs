#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Retrieval of the locally stored GitHub token.
//!
//! Each platform keeps the token somewhere different, so lookup is hidden
//! behind [`CredentialProvider`] and the variant is picked once, at startup,
//! from the running OS. Failures never propagate: a provider that cannot
//! find a token simply returns `None` and grading proceeds anonymously.

use std::{ffi::OsString, fmt};

use crate::{
    config::Settings,
    constants::CREDENTIAL_HOST,
    process::{StdinSource, run_blocking},
};

/// An opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token, for building auth headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Source of a credential for the current process.
pub trait CredentialProvider {
    /// Looks the credential up; `None` when it is absent or the lookup failed.
    fn credential(&self) -> Option<Credential>;
}

impl CredentialProvider for Option<Credential> {
    fn credential(&self) -> Option<Credential> {
        self.clone()
    }
}

/// One lookup strategy per supported operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCredentials {
    /// Linux: read an environment variable.
    EnvVar {
        /// Name of the variable.
        var: String,
    },
    /// macOS: query the login keychain with `security`.
    Keychain {
        /// Server the internet password is stored for.
        server: String,
    },
    /// Windows: ask Git's credential helper, which reads the
    /// `git:https://github.com` entry of the Windows Credential Manager.
    GitCredentialHelper {
        /// Host the credential is stored for.
        host: String,
    },
    /// Anything else: no token can be found.
    Unsupported {
        /// Name of the operating system.
        os: String,
    },
}

impl PlatformCredentials {
    /// Picks the provider for the OS this process is running on.
    pub fn for_current_platform(settings: &Settings) -> Self {
        Self::for_os(std::env::consts::OS, settings)
    }

    /// Picks the provider for `os`, named as in [`std::env::consts::OS`].
    pub fn for_os(os: &str, settings: &Settings) -> Self {
        match os {
            "linux" => Self::EnvVar {
                var: settings.token_env_var().to_string(),
            },
            "macos" => Self::Keychain {
                server: CREDENTIAL_HOST.to_string(),
            },
            "windows" => Self::GitCredentialHelper {
                host: CREDENTIAL_HOST.to_string(),
            },
            other => Self::Unsupported {
                os: other.to_string(),
            },
        }
    }
}

impl CredentialProvider for PlatformCredentials {
    fn credential(&self) -> Option<Credential> {
        match self {
            Self::EnvVar { var } => std::env::var(var)
                .ok()
                .filter(|token| !token.is_empty())
                .map(Credential::new),
            Self::Keychain { server } => keychain_lookup(server),
            Self::GitCredentialHelper { host } => git_credential_lookup(host),
            Self::Unsupported { os } => {
                tracing::warn!("Unsupported operating system: {os}");
                None
            }
        }
    }
}

/// Runs `security find-internet-password -s <server> -g` and parses the
/// password it prints on stderr.
fn keychain_lookup(server: &str) -> Option<Credential> {
    let args: [OsString; 4] = ["find-internet-password", "-s", server, "-g"].map(OsString::from);
    match run_blocking("security", &args, StdinSource::Null, &[], None) {
        Ok(out) if out.status.success() => parse_keychain_password(&out.stderr_lossy()),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("GitHub token not detected: {e:#}");
            None
        }
    }
}

/// Runs `git credential fill` for `https://<host>` and parses the password
/// from its output.
fn git_credential_lookup(host: &str) -> Option<Credential> {
    let request = format!("protocol=https\nhost={host}\n\n");
    let args: [OsString; 2] = ["credential".into(), "fill".into()];
    // Never fall back to an interactive prompt.
    let env: [(OsString, OsString); 1] = [("GIT_TERMINAL_PROMPT".into(), "0".into())];
    match run_blocking("git", &args, StdinSource::Bytes(request.into_bytes()), &env, None) {
        Ok(out) if out.status.success() => parse_credential_fill(&out.stdout_lossy()),
        Ok(out) => {
            tracing::warn!("GitHub token not detected: {}", out.stderr_lossy().trim());
            None
        }
        Err(e) => {
            tracing::warn!("GitHub token not detected: {e:#}");
            None
        }
    }
}

/// Extracts the token from `security -g` output.
///
/// The first line starting with `password:` wins; its value is the text
/// between the first pair of double quotes.
pub fn parse_keychain_password(output: &str) -> Option<Credential> {
    output
        .lines()
        .find(|line| line.starts_with("password:"))
        .and_then(|line| line.split('"').nth(1))
        .map(Credential::new)
}

/// Extracts the token from `git credential fill` output (`key=value` lines).
pub fn parse_credential_fill(output: &str) -> Option<Credential> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("password="))
        .filter(|token| !token.is_empty())
        .map(Credential::new)
}
