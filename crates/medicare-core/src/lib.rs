pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod preview;
pub mod state;
pub mod workflow;

// Re-export main types for convenience
pub use client::{Backend, HttpBackend};
pub use config::{Config, Language, Overrides, Settings};
pub use error::{ApiError, ConfigError};
pub use lifecycle::{RequestLifecycle, Status};
pub use models::{
    AnalysisResult, ChatReply, ChatRequest, ImageAnalysis, ImageUpload, ResearchEntry,
    ResearchRequest, ResearchResult, TextAnalysisRequest,
};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use state::{ChatMessage, ChatRole, Feature, Navigation, Page, Theme};
pub use workflow::{
    ChatWorkflow, ImageAnalysisWorkflow, Notice, ResearchWorkflow, TextAnalysisWorkflow,
};
