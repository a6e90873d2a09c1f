// Error taxonomy for the uploader. Every failure is terminal for the
// invocation: library functions return `Result<T, AttachError>` and the
// binary turns the error into a message on stderr and an exit code.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AttachError>;

#[derive(Debug, Error)]
pub enum AttachError {
    /// Missing or malformed token or API base URL.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Conflicting or missing command line arguments.
    #[error("invalid arguments: {0}")]
    Argument(String),

    #[error("file not found or unreadable: {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The API rejected the bearer token (401) or denied access (403).
    #[error("iLab rejected the request with HTTP {status}: {body}")]
    Auth { status: u16, body: String },

    #[error("no service request named '{name}' in core {core_id}")]
    NotFound { name: String, core_id: String },

    #[error(
        "{} service requests named '{name}' in core {core_id} (ids: {})",
        ids.len(),
        join_ids(ids)
    )]
    AmbiguousRequest {
        name: String,
        core_id: String,
        ids: Vec<u64>,
    },

    /// Connection failure, timeout or other transport problem.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("iLab API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected response from iLab API: {0}")]
    InvalidResponse(String),
}

impl AttachError {
    /// Process exit code for this error. Usage errors share clap's code.
    pub fn exit_code(&self) -> u8 {
        match self {
            AttachError::Argument(_) => 2,
            _ => 1,
        }
    }

    /// Operator-facing advice for errors with a well known cause.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AttachError::Auth { status: 401, .. } => {
                Some("the API bearer token in ILAB_API_TOKEN is probably wrong or expired")
            }
            AttachError::Auth { status: 403, .. } => {
                Some("the token is valid but has no access to this service request or core")
            }
            AttachError::Configuration(_) => {
                Some("export ILAB_API_TOKEN with your iLab API bearer token")
            }
            _ => None,
        }
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
