use colored::*;
use thiserror::Error;

/// Shown for a 401 when the credentials belong to this project
const UNAUTHENTICATED_LOCAL: &str =
    "Error: Local client credentials unauthenticated. Check scopes/authorization.";

/// Shown for a 401 with the shared (global) credentials
const UNAUTHENTICATED: &str = "Error: Unauthenticated request: Please try again.";

/// Shown for a 403 when the credentials belong to this project
const PERMISSION_DENIED_LOCAL: &str = "Error: Permission denied. Be sure that you have:\n\
     - Added the necessary scopes needed for the API.\n\
     - Enabled the Cloud Logging API.\n\
     - Enabled required APIs for the project.";

/// Shown for a 403 with the shared (global) credentials
const PERMISSION_DENIED: &str =
    "Error: Permission denied. Enable the Cloud Logging API for this project and try again.";

/// Main error type for cloudtail
#[derive(Debug, Error)]
pub enum CloudtailError {
    // Upstream status errors
    #[error("{}", unauthenticated_message(.local))]
    Unauthenticated { local: bool },

    #[error("{}", permission_denied_message(.local))]
    PermissionDenied { local: bool },

    #[error("({status}) Error: {message}")]
    Transport { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("Missing required configuration field: {0}")]
    MissingConfigField(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    // IO errors (automatically converted from std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("{0}")]
    Other(String),
}

impl CloudtailError {
    /// Map a non-success status from the log source onto the error taxonomy
    pub fn from_status(status: u16, status_text: &str, local: bool) -> Self {
        match status {
            401 => CloudtailError::Unauthenticated { local },
            403 => CloudtailError::PermissionDenied { local },
            _ => CloudtailError::Transport {
                status,
                message: status_text.to_string(),
            },
        }
    }
}

fn unauthenticated_message(local: &bool) -> &'static str {
    if *local {
        UNAUTHENTICATED_LOCAL
    } else {
        UNAUTHENTICATED
    }
}

fn permission_denied_message(local: &bool) -> &'static str {
    if *local {
        PERMISSION_DENIED_LOCAL
    } else {
        PERMISSION_DENIED
    }
}

/// Single-line rendering of an error, as shown to the user
pub fn error_line(err: &CloudtailError) -> String {
    format!("{} {}", "✗".red().bold(), err)
}

/// Result type alias for cloudtail operations
pub type Result<T> = std::result::Result<T, CloudtailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_401_maps_to_unauthenticated() {
        let err = CloudtailError::from_status(401, "Unauthorized", true);
        assert!(matches!(err, CloudtailError::Unauthenticated { local: true }));
        assert_eq!(err.to_string(), UNAUTHENTICATED_LOCAL);

        let err = CloudtailError::from_status(401, "Unauthorized", false);
        assert_eq!(err.to_string(), UNAUTHENTICATED);
    }

    #[test]
    fn test_status_403_local_and_shared_messages_differ() {
        let local = CloudtailError::from_status(403, "Forbidden", true);
        let shared = CloudtailError::from_status(403, "Forbidden", false);
        assert!(matches!(local, CloudtailError::PermissionDenied { local: true }));
        assert_eq!(local.to_string(), PERMISSION_DENIED_LOCAL);
        assert_eq!(shared.to_string(), PERMISSION_DENIED);
        assert_ne!(local.to_string(), shared.to_string());
    }

    #[test]
    fn test_error_line_carries_message() {
        colored::control::set_override(false);
        let err = CloudtailError::from_status(500, "Internal Server Error", false);
        assert_eq!(error_line(&err), "✗ (500) Error: Internal Server Error");

        let line = error_line(&CloudtailError::PermissionDenied { local: true });
        assert!(line.starts_with("✗ Error:"));
    }

    #[test]
    fn test_other_status_keeps_code_and_message() {
        let err = CloudtailError::from_status(503, "Service Unavailable", true);
        assert_eq!(err.to_string(), "(503) Error: Service Unavailable");
    }
}
