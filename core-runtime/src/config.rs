//! Configuration resolution for CLI invocations.
//!
//! Credentials come from explicit flags first and fall back to environment
//! variables, matching how CI pipelines inject secrets. Pull-request builds
//! are detected from the CI environment so that upload jobs on forks can be
//! skipped instead of failing.

/// Environment fallback for the storage account name.
pub const USERNAME_ENV: &str = "WHEELHOUSE_UPLOADER_USERNAME";

/// Environment fallback for the storage secret key.
pub const SECRET_ENV: &str = "WHEELHOUSE_UPLOADER_SECRET";

/// Resolved storage credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

/// Outcome of credential resolution.
///
/// A missing username is a hard failure: there is nothing to authenticate
/// as. A missing secret is a soft skip: CI forks do not receive secret
/// variables, and their builds must not fail because of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialOutcome {
    Ready(Credentials),
    MissingUsername,
    MissingSecret,
}

/// Resolve credentials from explicit values, falling back to the process
/// environment.
pub fn resolve_credentials(
    username: Option<String>,
    secret: Option<String>,
) -> CredentialOutcome {
    resolve_credentials_from(username, secret, |name| std::env::var(name).ok())
}

/// Resolve credentials with an explicit environment lookup.
pub fn resolve_credentials_from(
    username: Option<String>,
    secret: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> CredentialOutcome {
    let username = username
        .filter(|v| !v.is_empty())
        .or_else(|| env(USERNAME_ENV).filter(|v| !v.is_empty()));
    let secret = secret
        .filter(|v| !v.is_empty())
        .or_else(|| env(SECRET_ENV).filter(|v| !v.is_empty()));

    match (username, secret) {
        (Some(username), Some(secret)) => {
            CredentialOutcome::Ready(Credentials { username, secret })
        }
        (None, _) => CredentialOutcome::MissingUsername,
        (_, None) => CredentialOutcome::MissingSecret,
    }
}

/// Detect a pull-request CI build from the process environment.
///
/// Returns the variable announcing it, for logging.
pub fn pull_request_build() -> Option<String> {
    pull_request_build_from(|name| std::env::var(name).ok())
}

/// Detect a pull-request CI build with an explicit environment lookup.
pub fn pull_request_build_from(env: impl Fn(&str) -> Option<String>) -> Option<String> {
    if let Some(value) = env("TRAVIS_PULL_REQUEST") {
        if !value.is_empty() && value != "false" {
            return Some(format!("TRAVIS_PULL_REQUEST={value}"));
        }
    }
    if let Some(value) = env("APPVEYOR_PULL_REQUEST_NUMBER") {
        if !value.is_empty() {
            return Some(format!("APPVEYOR_PULL_REQUEST_NUMBER={value}"));
        }
    }
    if let Some(value) = env("GITHUB_HEAD_REF") {
        if !value.is_empty() {
            return Some(format!("GITHUB_HEAD_REF={value}"));
        }
    }
    None
}
