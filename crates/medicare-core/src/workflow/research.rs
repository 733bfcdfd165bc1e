use tracing::{info, warn};

use super::{is_blank, Notice};
use crate::client::Backend;
use crate::config::Language;
use crate::error::Result;
use crate::lifecycle::{RequestLifecycle, Status};
use crate::models::{ResearchRequest, ResearchResult};

/// Search of trusted medical sources
#[derive(Debug, Clone)]
pub struct ResearchWorkflow {
    pub input: String,
    lifecycle: RequestLifecycle<ResearchResult>,
    language: Language,
    max_results: u32,
}

impl ResearchWorkflow {
    pub fn new(language: Language, max_results: u32) -> Self {
        Self {
            input: String::new(),
            lifecycle: RequestLifecycle::new("research"),
            language,
            max_results,
        }
    }

    pub fn status(&self) -> Status {
        self.lifecycle.status()
    }

    pub fn is_pending(&self) -> bool {
        self.lifecycle.is_pending()
    }

    pub fn result(&self) -> Option<&ResearchResult> {
        self.lifecycle.result()
    }

    pub fn search(&mut self) -> Option<ResearchRequest> {
        if is_blank(&self.input) || !self.lifecycle.begin() {
            return None;
        }

        info!("Searching research sources for {:?}", self.input);
        Some(ResearchRequest {
            query: self.input.clone(),
            max_results: self.max_results,
            language: self.language,
        })
    }

    pub fn resolve(&mut self, outcome: Result<ResearchResult>) -> Option<Notice> {
        if !self.lifecycle.is_pending() {
            warn!("research: result arrived with no request outstanding, dropped");
            return None;
        }

        match outcome {
            Ok(result) => {
                info!("Research returned {} sources", result.results().len());
                self.lifecycle.succeed(result);
                None
            }
            Err(err) => {
                warn!("research search failed: {}", err);
                self.lifecycle.fail();
                self.lifecycle.reset();
                Some(Notice::from_error(&err))
            }
        }
    }

    pub async fn run(&mut self, backend: &dyn Backend) -> Option<Notice> {
        let request = self.search()?;
        let outcome = backend.research(request).await;
        self.resolve(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockBackend;
    use crate::error::ApiError;
    use crate::models::ResearchEntry;
    use pretty_assertions::assert_eq;

    fn entry(title: &str, url: &str) -> ResearchEntry {
        ResearchEntry {
            title: title.to_string(),
            content: format!("About {}", title),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_blank_query_is_noop() {
        let mut research = ResearchWorkflow::new(Language::En, 5);
        assert!(research.search().is_none());
        assert_eq!(research.status(), Status::Idle);
    }

    #[test]
    fn test_request_carries_cap() {
        let mut research = ResearchWorkflow::new(Language::Fr, 5);
        research.input = "paludisme".to_string();
        let request = research.search().unwrap();
        assert_eq!(request.max_results, 5);
        assert_eq!(request.language, Language::Fr);
        assert!(research.search().is_none());
    }

    #[tokio::test]
    async fn test_diabetes_scenario() {
        let mut backend = MockBackend::new();
        backend
            .expect_research()
            .withf(|req| req.query == "diabetes treatment" && req.max_results == 5)
            .times(1)
            .returning(|_| {
                Ok(ResearchResult {
                    summary: Some("Lifestyle change and metformin.".to_string()),
                    results: Some(vec![
                        entry("ADA Standards of Care", "https://diabetesjournals.org"),
                        entry("WHO Diabetes", "https://who.int/diabetes"),
                    ]),
                })
            });

        let mut research = ResearchWorkflow::new(Language::En, 5);
        research.input = "diabetes treatment".to_string();
        assert_eq!(research.run(&backend).await, None);

        let result = research.result().unwrap();
        let titles: Vec<&str> = result.results().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["ADA Standards of Care", "WHO Diabetes"]);
        assert_eq!(result.results()[1].url, "https://who.int/diabetes");
    }

    #[tokio::test]
    async fn test_failure_notice() {
        let mut backend = MockBackend::new();
        backend.expect_research().times(1).returning(|_| {
            Err(ApiError::Status {
                status: 503,
                body: String::new(),
            })
        });

        let mut research = ResearchWorkflow::new(Language::En, 5);
        research.input = "malaria".to_string();
        assert!(research.run(&backend).await.is_some());
        assert_eq!(research.status(), Status::Idle);
        assert_eq!(research.input, "malaria");
    }
}
