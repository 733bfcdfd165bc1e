//! Request and response bodies exchanged with the MediCare backend
//!
//! Response types are deliberately lenient: every field the backend may omit
//! (or send as `null`) is optional, and the accessors hand out empty values
//! instead of failing.

use serde::{Deserialize, Serialize};

use crate::config::Language;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnalysisRequest {
    pub text: String,
    pub context: String,
    pub language: Language,
}

/// Structured analysis returned by the text and image endpoints
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_findings: Option<Vec<String>>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
    #[serde(default)]
    pub next_steps: Option<Vec<String>>,
    #[serde(default)]
    pub disclaimer: Option<String>,
}

impl AnalysisResult {
    pub fn summary(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }

    pub fn key_findings(&self) -> &[String] {
        self.key_findings.as_deref().unwrap_or_default()
    }

    pub fn recommendations(&self) -> &[String] {
        self.recommendations.as_deref().unwrap_or_default()
    }

    pub fn next_steps(&self) -> &[String] {
        self.next_steps.as_deref().unwrap_or_default()
    }

    pub fn disclaimer(&self) -> &str {
        self.disclaimer.as_deref().unwrap_or_default()
    }
}

/// Image payload sent as multipart form data
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub language: Language,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageAnalysis {
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchRequest {
    pub query: String,
    pub max_results: u32,
    pub language: Language,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResearchEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResearchResult {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<ResearchEntry>>,
}

impl ResearchResult {
    pub fn summary(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }

    pub fn results(&self) -> &[ResearchEntry] {
        self.results.as_deref().unwrap_or_default()
    }
}
