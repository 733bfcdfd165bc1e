//! Error types for MediCare Core

use thiserror::Error;

/// Notice shown in the chat log when a chat request fails
pub const CHAT_ERROR_NOTICE: &str = "Error: Unable to connect. Please ensure backend is running.";

/// Notice shown in the blocking popup when an analysis or search fails
pub const BACKEND_ERROR_NOTICE: &str = "Error connecting to backend";

/// Errors raised while talking to the MediCare backend or staging a request
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file: {0}")]
    InvalidFile(String),
}

impl ApiError {
    /// Bounded, user-facing message for this error.
    ///
    /// Transport and decode details stay in the logs; only file validation
    /// problems are specific enough to be worth showing verbatim.
    pub fn user_notice(&self) -> String {
        match self {
            ApiError::InvalidFile(reason) => format!("Cannot use this file: {}", reason),
            ApiError::Io(_) => "Cannot read the selected file.".to_string(),
            _ => BACKEND_ERROR_NOTICE.to_string(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Unsupported language: {0}")]
    UnknownLanguage(String),

    #[error("Invalid max_results: {0}")]
    InvalidMaxResults(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for backend calls
pub type Result<T> = std::result::Result<T, ApiError>;
