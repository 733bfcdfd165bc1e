use tracing::{info, warn};

use super::{is_blank, Notice};
use crate::client::Backend;
use crate::config::Language;
use crate::error::Result;
use crate::lifecycle::{RequestLifecycle, Status};
use crate::models::{AnalysisResult, TextAnalysisRequest};

/// Free-text analysis of records, symptoms or test results
#[derive(Debug, Clone)]
pub struct TextAnalysisWorkflow {
    pub input: String,
    lifecycle: RequestLifecycle<AnalysisResult>,
    language: Language,
}

impl TextAnalysisWorkflow {
    pub fn new(language: Language) -> Self {
        Self {
            input: String::new(),
            lifecycle: RequestLifecycle::new("text-analysis"),
            language,
        }
    }

    pub fn status(&self) -> Status {
        self.lifecycle.status()
    }

    pub fn is_pending(&self) -> bool {
        self.lifecycle.is_pending()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.lifecycle.result()
    }

    /// Phase one. Clears the previous result; the input is kept so a failed
    /// analysis can be retried as is.
    pub fn analyze(&mut self) -> Option<TextAnalysisRequest> {
        if is_blank(&self.input) || !self.lifecycle.begin() {
            return None;
        }

        info!("Analyzing text ({} chars)", self.input.chars().count());
        Some(TextAnalysisRequest {
            text: self.input.clone(),
            context: String::new(),
            language: self.language,
        })
    }

    /// Phase two. A failure leaves no result and returns the notice to show.
    pub fn resolve(&mut self, outcome: Result<AnalysisResult>) -> Option<Notice> {
        if !self.lifecycle.is_pending() {
            warn!("text-analysis: result arrived with no request outstanding, dropped");
            return None;
        }

        match outcome {
            Ok(result) => {
                self.lifecycle.succeed(result);
                None
            }
            Err(err) => {
                warn!("text analysis failed: {}", err);
                self.lifecycle.fail();
                self.lifecycle.reset();
                Some(Notice::from_error(&err))
            }
        }
    }

    pub async fn run(&mut self, backend: &dyn Backend) -> Option<Notice> {
        let request = self.analyze()?;
        let outcome = backend.analyze_text(request).await;
        self.resolve(outcome)
    }
}
