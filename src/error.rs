use std::process::ExitStatus;

/// Errors raised while syncing an image with the registry.
///
/// Every variant is fatal for the run. A tag that does not exist in the
/// registry is not an error and is reported as `Ok(None)` by lookups.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("`{command}` failed with {status}{}", format_stderr(.stderr))]
    ExternalCommand {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to stdin of `{command}`: {source}")]
    Stdin {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected output from `{command}`: {source}")]
    InvalidResponse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Tag '{tag}' was not found in repository '{repository}'")]
    PrimaryTagMissing { repository: String, tag: String },
}

pub type Result<T> = std::result::Result<T, Error>;

fn format_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}
