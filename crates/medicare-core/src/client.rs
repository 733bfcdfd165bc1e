use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::models::{
    AnalysisResult, ChatReply, ChatRequest, ImageAnalysis, ImageUpload, ResearchRequest,
    ResearchResult, TextAnalysisRequest,
};

/// The four one-shot endpoints of the MediCare backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatReply>;

    async fn analyze_text(&self, request: TextAnalysisRequest) -> Result<AnalysisResult>;

    async fn analyze_image(&self, upload: ImageUpload) -> Result<ImageAnalysis>;

    async fn research(&self, request: ResearchRequest) -> Result<ResearchResult>;
}

/// HTTP implementation talking to a fixed backend origin
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("{} answered {}", endpoint, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        debug!("{} answered {} ({} bytes)", endpoint, status, body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn chat(&self, request: ChatRequest) -> Result<ChatReply> {
        let url = self.endpoint("chat");
        let response = self.client.post(&url).json(&request).send().await?;
        Self::decode(&url, response).await
    }

    async fn analyze_text(&self, request: TextAnalysisRequest) -> Result<AnalysisResult> {
        let url = self.endpoint("analyze-text");
        let response = self.client.post(&url).json(&request).send().await?;
        Self::decode(&url, response).await
    }

    async fn analyze_image(&self, upload: ImageUpload) -> Result<ImageAnalysis> {
        let url = self.endpoint("analyze-image");

        let file = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime)?;
        let form = Form::new()
            .part("file", file)
            .text("language", upload.language.as_str());

        let response = self.client.post(&url).multipart(form).send().await?;
        Self::decode(&url, response).await
    }

    async fn research(&self, request: ResearchRequest) -> Result<ResearchResult> {
        let url = self.endpoint("research");
        let response = self.client.post(&url).json(&request).send().await?;
        Self::decode(&url, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one request with a canned response; yields the raw request.
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let reply = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let headers = text[..header_end].to_lowercase();
        if headers.contains("transfer-encoding: chunked") {
            return text.ends_with("0\r\n\r\n");
        }
        let content_length = headers
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn request_body(raw: &str) -> &str {
        raw.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_chat_posts_json() {
        let (url, server) = serve_once("200 OK", r#"{"response":"Fever is often caused by infection."}"#).await;
        let backend = HttpBackend::new(&url);

        let reply = backend
            .chat(ChatRequest {
                message: "What causes fever?".to_string(),
                language: Language::En,
            })
            .await
            .unwrap();
        assert_eq!(reply.response, "Fever is often caused by infection.");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/chat HTTP/1.1"));
        let body: serde_json::Value = serde_json::from_str(request_body(&raw)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "message": "What causes fever?", "language": "en" })
        );
    }

    #[tokio::test]
    async fn test_research_posts_query_and_cap() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"summary":"s","results":[{"title":"t","content":"c","url":"https://who.int"}]}"#,
        )
        .await;
        let backend = HttpBackend::new(&url);

        let result = backend
            .research(ResearchRequest {
                query: "diabetes treatment".to_string(),
                max_results: 5,
                language: Language::En,
            })
            .await
            .unwrap();
        assert_eq!(result.results().len(), 1);
        assert_eq!(result.results()[0].url, "https://who.int");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/research HTTP/1.1"));
        let body: serde_json::Value = serde_json::from_str(request_body(&raw)).unwrap();
        assert_eq!(body["max_results"], 5);
        assert_eq!(body["query"], "diabetes treatment");
    }

    #[tokio::test]
    async fn test_image_is_sent_as_multipart() {
        let (url, server) = serve_once("200 OK", r#"{"extracted_text":"WBC 11.2"}"#).await;
        let backend = HttpBackend::new(&url);

        let result = backend
            .analyze_image(ImageUpload {
                file_name: "labs.png".to_string(),
                mime: "image/png".to_string(),
                bytes: vec![0x89, b'P', b'N', b'G'],
                language: Language::En,
            })
            .await
            .unwrap();
        assert_eq!(result.extracted_text.as_deref(), Some("WBC 11.2"));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/analyze-image HTTP/1.1"));
        assert!(raw.to_lowercase().contains("content-type: multipart/form-data"));
        assert!(raw.contains(r#"name="file"; filename="labs.png""#));
        assert!(raw.contains(r#"name="language""#));
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"detail":"boom"}"#).await;
        let backend = HttpBackend::new(&url);

        let err = backend
            .analyze_text(TextAnalysisRequest {
                text: "cough".to_string(),
                context: String::new(),
                language: Language::En,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unparseable_body_is_decode_error() {
        let (url, server) = serve_once("200 OK", "<html>gateway</html>").await;
        let backend = HttpBackend::new(&url);

        let err = backend
            .chat(ChatRequest {
                message: "hi".to_string(),
                language: Language::En,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(&format!("http://{}", addr));
        let err = backend
            .chat(ChatRequest {
                message: "hi".to_string(),
                language: Language::En,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(backend.endpoint("chat"), "http://localhost:8000/api/chat");
    }
}
