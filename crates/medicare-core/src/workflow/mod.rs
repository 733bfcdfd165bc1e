//! The four independent workflows: chat, text analysis, image analysis and research.
//!
//! Every workflow follows the same two-phase shape. Phase one (`submit`,
//! `analyze`, `search`) runs synchronously, validates input, applies any
//! optimistic update and returns the request to issue, or `None` when the
//! action is a no-op. Phase two (`resolve`) applies the backend outcome.

pub mod chat;
pub mod image;
pub mod research;
pub mod text;

pub use chat::{ChatWorkflow, GREETING};
pub use image::{ImageAnalysisWorkflow, UploadedImage, MAX_IMAGE_BYTES};
pub use research::ResearchWorkflow;
pub use text::TextAnalysisWorkflow;

use crate::error::ApiError;

/// Blocking, user-visible message raised by a failed analysis or search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn from_error(err: &ApiError) -> Self {
        Self::new(err.user_notice())
    }
}

/// Empty or whitespace-only input never triggers a request
pub(crate) fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}
