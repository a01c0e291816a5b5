#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Resolves who is being graded: the GitHub login behind the token, and the
//! assignment slug taken from the repository directory name.
//!
//! GitHub Classroom names student repositories `{slug}-{login}`, sometimes
//! with a numeric suffix, so the slug is whatever precedes `-{login}`.

use std::path::Path;

use anyhow::Result;
use reqwest::{blocking::Client, header::AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::{config::Settings, credential::Credential};

/// A resolved username together with the slug derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// GitHub login of the token's owner.
    username: String,
    /// Assignment identifier derived from the directory name.
    slug:     String,
}

impl Identity {
    /// Creates an identity from its parts.
    pub fn new(username: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            slug:     slug.into(),
        }
    }

    /// Returns the GitHub login.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the assignment slug.
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

/// The subset of the identity endpoint's response we care about.
#[derive(Debug, Deserialize)]
struct UserProfile {
    /// Account login; absent on malformed responses.
    login: Option<String>,
}

/// Derives the slug from a directory name.
///
/// Returns `None` when `username` does not occur in `dir_name` at all.
/// Otherwise everything before the first `-{username}` is the slug (or the
/// whole name, if the username occurs without a leading dash).
pub fn derive_slug(dir_name: &str, username: &str) -> Option<String> {
    if !dir_name.contains(username) {
        return None;
    }

    let marker = format!("-{username}");
    let slug = dir_name
        .split_once(marker.as_str())
        .map_or(dir_name, |(head, _)| head);
    Some(slug.to_string())
}

/// Looks up the owner of a token and matches it against a directory name.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    /// Client used to call the identity endpoint.
    client: Client,
    /// Identity endpoint.
    url:    String,
}

impl IdentityResolver {
    /// Creates a resolver calling `url` with `client`.
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Creates a resolver for the identity endpoint in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(settings.http_client()?, settings.identity_url()))
    }

    /// Asks the identity endpoint who owns `credential`.
    ///
    /// Every failure is reported and turned into `None`.
    pub fn username(&self, credential: &Credential) -> Option<String> {
        let response = match self
            .client
            .get(&self.url)
            .header(AUTHORIZATION, format!("token {}", credential.expose()))
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Error verifying GitHub token: {e}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                "Unable to verify GitHub token: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            );
            return None;
        }

        match response.json::<UserProfile>() {
            Ok(profile) => profile.login.filter(|login| !login.is_empty()),
            Err(e) => {
                tracing::warn!("Error verifying GitHub token: {e}");
                None
            }
        }
    }

    /// Resolves the identity using the current working directory's name.
    pub fn resolve(&self, credential: Option<&Credential>) -> Option<Identity> {
        let credential = credential?;
        match std::env::current_dir() {
            Ok(dir) => self.resolve_in(Some(credential), &dir),
            Err(e) => {
                tracing::warn!("Could not read the current directory: {e}");
                None
            }
        }
    }

    /// Resolves the identity using the base name of `dir`.
    ///
    /// A username that cannot be found in the directory name is dropped along
    /// with the slug.
    pub fn resolve_in(&self, credential: Option<&Credential>, dir: &Path) -> Option<Identity> {
        let username = self.username(credential?)?;
        let dir_name = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match derive_slug(&dir_name, &username) {
            Some(slug) => Some(Identity::new(username, slug)),
            None => {
                tracing::warn!("Unable to detect slug in {dir_name}.");
                None
            }
        }
    }
}
