use thiserror::Error;

/// Errors that can occur when building an UpdateChecker or querying a release source.
#[derive(Error, Debug)]
pub enum UpdateCheckError {
    /// Error making HTTP request to GitHub API.
    #[error("Failed to fetch releases from GitHub: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Error parsing JSON response.
    #[error("Failed to parse GitHub API response: {0}")]
    JsonError(#[from] serde_json::Error),

    /// GitHub API returned an error status.
    #[error("GitHub API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Invalid project owner.
    #[error("Invalid project owner: '{0}'")]
    InvalidOwner(String),

    /// Invalid project name.
    #[error("Invalid project name: '{0}'")]
    InvalidRepoName(String),

    /// Invalid base URL.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Result type alias for UpdateChecker operations.
pub type Result<T> = std::result::Result<T, UpdateCheckError>;

/// Errors produced when a release tag cannot be read as a version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseVersionError {
    /// Nothing left to parse once the `v` prefix is removed.
    #[error("Empty version string")]
    Empty,

    /// A segment is not an integer.
    #[error("Invalid version segment {position}: '{segment}'")]
    InvalidSegment { position: usize, segment: String },

    /// A segment is a negative integer.
    #[error("Negative version segment {position}: '{segment}'")]
    NegativeSegment { position: usize, segment: String },
}
