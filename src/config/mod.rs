use crate::error::{CloudtailError, Result};
use crate::source::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file names looked up in the working directory, in order
pub const SETTINGS_FILE_NAMES: [&str; 2] = [".cloudtail.toml", ".cloudtail.json"];

/// Environment variable consulted when the settings carry no token
pub const ACCESS_TOKEN_ENV: &str = "CLOUDTAIL_ACCESS_TOKEN";

/// Which credentials the access token belongs to
///
/// Only changes the wording of authorization errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialScope {
    /// Credentials created for this project
    Local,
    /// The user's global credentials
    #[default]
    Shared,
}

impl CredentialScope {
    pub fn is_local(self) -> bool {
        self == CredentialScope::Local
    }
}

/// Options controlling how logs are fetched and printed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailOptions {
    /// Print whole entries as JSON
    #[serde(default)]
    pub json: bool,

    /// Keep polling until interrupted
    #[serde(default)]
    pub watch: bool,

    /// Delay between polls in watch mode
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Hide the timestamp column
    #[serde(default)]
    pub simplified: bool,

    /// How many poll intervals each watch fetch reaches back
    #[serde(default = "default_overlap_intervals")]
    pub overlap_intervals: u32,
}

/// Settings of the project whose logs are read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Cloud project id
    #[serde(default)]
    pub project_id: String,

    /// Scope of the credentials behind `access_token`
    #[serde(default)]
    pub credentials: CredentialScope,

    /// OAuth access token; falls back to `CLOUDTAIL_ACCESS_TOKEN`
    #[serde(default)]
    pub access_token: Option<String>,

    /// entries:list endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Timeout for one request (in seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Defaults for the tail command
    #[serde(default)]
    pub tail: TailOptions,
}

// Default value functions for serde
fn default_poll_interval_ms() -> u64 {
    6000
}

fn default_overlap_intervals() -> u32 {
    10
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            json: false,
            watch: false,
            poll_interval_ms: default_poll_interval_ms(),
            simplified: false,
            overlap_intervals: default_overlap_intervals(),
        }
    }
}

impl TailOptions {
    /// Poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(CloudtailError::ConfigValidationError(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }

        if self.overlap_intervals == 0 {
            return Err(CloudtailError::ConfigValidationError(
                "overlap_intervals must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl ProjectSettings {
    /// Settings for `project_id` with every other field defaulted
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            credentials: CredentialScope::default(),
            access_token: None,
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
            tail: TailOptions::default(),
        }
    }

    /// Load and validate settings from a file (supports TOML and JSON)
    pub fn from_file(path: &Path) -> Result<ProjectSettings> {
        let settings = Self::read(path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse a settings file without validating it
    ///
    /// Lets callers apply overrides before [`ProjectSettings::validate`].
    pub fn read(path: &Path) -> Result<ProjectSettings> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CloudtailError::ConfigError(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let mut settings = match extension {
            "toml" => Self::parse_toml(&contents)?,
            "json" => Self::parse_json(&contents)?,
            _ => {
                return Err(CloudtailError::InvalidConfig(format!(
                    "Unsupported file format: {}. Use .toml or .json",
                    extension
                )))
            }
        };

        settings.expand_env_vars();

        tracing::debug!(
            "Loaded settings for project {} from {}",
            settings.project_id,
            path.display()
        );

        Ok(settings)
    }

    /// Find the first settings file present in `dir`
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        SETTINGS_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    fn parse_toml(contents: &str) -> Result<ProjectSettings> {
        toml::from_str(contents)
            .map_err(|e| CloudtailError::InvalidConfig(format!("Failed to parse TOML: {}", e)))
    }

    fn parse_json(contents: &str) -> Result<ProjectSettings> {
        serde_json::from_str(contents)
            .map_err(|e| CloudtailError::InvalidConfig(format!("Failed to parse JSON: {}", e)))
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(CloudtailError::MissingConfigField("project_id".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(CloudtailError::ConfigValidationError(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }

        if let Some(rest) = self.endpoint.strip_prefix("http://") {
            // A bearer token must not travel in the clear to a remote host.
            let host = rest.split(['/', ':']).next().unwrap_or("");
            if !matches!(host, "localhost" | "127.0.0.1") {
                return Err(CloudtailError::ConfigValidationError(format!(
                    "Refusing to send credentials over insecure HTTP to {}. Use HTTPS.",
                    self.endpoint
                )));
            }
        } else if !self.endpoint.starts_with("https://") {
            return Err(CloudtailError::ConfigValidationError(format!(
                "Invalid endpoint: {}. Must be an http(s) URL",
                self.endpoint
            )));
        }

        self.tail.validate()
    }

    /// Resource name used to scope log reads
    pub fn project_ref(&self) -> String {
        format!("projects/{}", self.project_id)
    }

    /// The access token from the settings or the environment
    pub fn resolve_access_token(&self) -> Result<String> {
        self.access_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok().filter(|t| !t.is_empty()))
            .ok_or_else(|| {
                CloudtailError::MissingConfigField(format!(
                    "access_token (or set {})",
                    ACCESS_TOKEN_ENV
                ))
            })
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Expand environment variables in string fields
    fn expand_env_vars(&mut self) {
        self.project_id = expand_env_in_string(&self.project_id);
        self.endpoint = expand_env_in_string(&self.endpoint);
        if let Some(ref token) = self.access_token {
            self.access_token = Some(expand_env_in_string(token));
        }
    }
}

/// Expand `$VAR` and `${VAR}` references; unknown variables are kept as written
fn expand_env_in_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('$') {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match std::env::var(name) {
            Ok(value) if !name.is_empty() => result.push_str(&value),
            _ => result.push_str(&rest[pos..pos + 1 + consumed]),
        }
        rest = &after[consumed..];
    }

    result.push_str(rest);
    result
}
