use std::path::Path;
use tracing::{info, warn};

use super::Notice;
use crate::client::Backend;
use crate::config::Language;
use crate::error::{ApiError, Result};
use crate::lifecycle::{RequestLifecycle, Status};
use crate::models::{ImageAnalysis, ImageUpload};
use crate::preview::{PreviewHandle, PreviewRegistry};

/// Largest upload accepted (PNG, JPG, JPEG up to 10MB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// The currently selected image and its preview
#[derive(Debug)]
pub struct UploadedImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub preview: PreviewHandle,
}

/// Image analysis (OCR plus structured findings)
#[derive(Debug)]
pub struct ImageAnalysisWorkflow {
    /// Path being typed in the file prompt
    pub path_input: String,
    selected: Option<UploadedImage>,
    lifecycle: RequestLifecycle<ImageAnalysis>,
    language: Language,
    previews: PreviewRegistry,
}

impl ImageAnalysisWorkflow {
    pub fn new(language: Language, previews: PreviewRegistry) -> Self {
        Self {
            path_input: String::new(),
            selected: None,
            lifecycle: RequestLifecycle::new("image-analysis"),
            language,
            previews,
        }
    }

    pub fn status(&self) -> Status {
        self.lifecycle.status()
    }

    pub fn is_pending(&self) -> bool {
        self.lifecycle.is_pending()
    }

    pub fn result(&self) -> Option<&ImageAnalysis> {
        self.lifecycle.result()
    }

    pub fn selected(&self) -> Option<&UploadedImage> {
        self.selected.as_ref()
    }

    /// Read `path` from disk and select it
    pub fn select_file(&mut self, path: &Path) -> Result<()> {
        self.ensure_not_pending()?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::InvalidFile("no file name".to_string()))?;

        let size = std::fs::metadata(path)?.len();
        if size > MAX_IMAGE_BYTES as u64 {
            return Err(too_large(size as usize));
        }

        let bytes = std::fs::read(path)?;
        self.select_bytes(&file_name, bytes)
    }

    /// Select an in-memory image, replacing the current one.
    ///
    /// The previous preview is released and any result from the previous
    /// image is discarded. Rejected files leave the selection untouched.
    pub fn select_bytes(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        self.ensure_not_pending()?;

        let mime = mime_guess::from_path(file_name)
            .first()
            .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
            .ok_or_else(|| ApiError::InvalidFile(format!("{} is not an image", file_name)))?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(too_large(bytes.len()));
        }

        let mime = mime.essence_str().to_string();
        let preview = self.previews.acquire(file_name, &mime, bytes.len());
        info!("Selected image {} ({} bytes)", file_name, bytes.len());

        // Dropping the old selection releases its preview
        self.selected = Some(UploadedImage {
            file_name: file_name.to_string(),
            mime,
            bytes,
            preview,
        });
        self.lifecycle.reset();
        Ok(())
    }

    /// Select the file named by `path_input`; clears the prompt on success
    pub fn select_from_input(&mut self) -> Option<Notice> {
        let path = self.path_input.trim().to_string();
        if path.is_empty() {
            return None;
        }
        match self.select_file(Path::new(&path)) {
            Ok(()) => {
                self.path_input.clear();
                None
            }
            Err(err) => {
                warn!("Could not select {}: {}", path, err);
                Some(Notice::from_error(&err))
            }
        }
    }

    /// Phase one; no-op without a selected image or while pending
    pub fn analyze(&mut self) -> Option<ImageUpload> {
        let image = self.selected.as_ref()?;
        if !self.lifecycle.begin() {
            return None;
        }

        info!("Analyzing image {}", image.file_name);
        Some(ImageUpload {
            file_name: image.file_name.clone(),
            mime: image.mime.clone(),
            bytes: image.bytes.clone(),
            language: self.language,
        })
    }

    pub fn resolve(&mut self, outcome: Result<ImageAnalysis>) -> Option<Notice> {
        if !self.lifecycle.is_pending() {
            warn!("image-analysis: result arrived with no request outstanding, dropped");
            return None;
        }

        match outcome {
            Ok(result) => {
                self.lifecycle.succeed(result);
                None
            }
            Err(err) => {
                warn!("image analysis failed: {}", err);
                self.lifecycle.fail();
                self.lifecycle.reset();
                Some(Notice::from_error(&err))
            }
        }
    }

    pub async fn run(&mut self, backend: &dyn Backend) -> Option<Notice> {
        let upload = self.analyze()?;
        let outcome = backend.analyze_image(upload).await;
        self.resolve(outcome)
    }

    fn ensure_not_pending(&self) -> Result<()> {
        if self.is_pending() {
            return Err(ApiError::InvalidFile(
                "an analysis is already in progress".to_string(),
            ));
        }
        Ok(())
    }
}

fn too_large(size: usize) -> ApiError {
    ApiError::InvalidFile(format!(
        "{} bytes exceeds the {} MB limit",
        size,
        MAX_IMAGE_BYTES / (1024 * 1024)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockBackend;
    use crate::models::AnalysisResult;
    use pretty_assertions::assert_eq;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn workflow() -> (ImageAnalysisWorkflow, PreviewRegistry) {
        let registry = PreviewRegistry::new();
        (ImageAnalysisWorkflow::new(Language::En, registry.clone()), registry)
    }

    #[test]
    fn test_analyze_without_file_is_noop() {
        let (mut image, _) = workflow();
        assert!(image.analyze().is_none());
        assert_eq!(image.status(), Status::Idle);
    }

    #[test]
    fn test_second_selection_releases_first_preview() {
        let (mut image, registry) = workflow();
        image.select_bytes("first.png", PNG.to_vec()).unwrap();
        let first_id = image.selected().unwrap().preview.id();

        image.select_bytes("second.jpg", PNG.to_vec()).unwrap();
        let selected = image.selected().unwrap();
        assert_eq!(selected.file_name, "second.jpg");
        assert_eq!(selected.mime, "image/jpeg");
        assert!(!registry.is_live(first_id));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_selection_discards_stale_result() {
        let (mut image, _) = workflow();
        image.select_bytes("first.png", PNG.to_vec()).unwrap();
        image.analyze().unwrap();
        image.resolve(Ok(ImageAnalysis {
            extracted_text: Some("old".to_string()),
            analysis: None,
        }));
        assert!(image.result().is_some());

        image.select_bytes("second.png", PNG.to_vec()).unwrap();
        assert!(image.result().is_none());
        assert_eq!(image.status(), Status::Idle);
    }

    #[test]
    fn test_non_image_rejected_and_selection_kept() {
        let (mut image, registry) = workflow();
        image.select_bytes("scan.png", PNG.to_vec()).unwrap();

        let err = image.select_bytes("notes.txt", b"hello".to_vec()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidFile(_)));
        assert_eq!(image.selected().unwrap().file_name, "scan.png");
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_oversized_image_rejected() {
        let (mut image, _) = workflow();
        let err = image
            .select_bytes("huge.png", vec![0u8; MAX_IMAGE_BYTES + 1])
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidFile(_)));
        assert!(image.selected().is_none());
    }

    #[test]
    fn test_selection_refused_while_pending() {
        let (mut image, _) = workflow();
        image.select_bytes("scan.png", PNG.to_vec()).unwrap();
        image.analyze().unwrap();

        assert!(image.select_bytes("other.png", PNG.to_vec()).is_err());
        assert!(image.analyze().is_none());
        assert_eq!(image.status(), Status::Pending);
        assert_eq!(image.selected().unwrap().file_name, "scan.png");
    }

    #[test]
    fn test_select_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labs.png");
        std::fs::write(&path, PNG).unwrap();

        let (mut image, _) = workflow();
        image.path_input = path.display().to_string();
        assert_eq!(image.select_from_input(), None);
        assert!(image.path_input.is_empty());
        assert_eq!(image.selected().unwrap().bytes, PNG);
    }

    #[test]
    fn test_missing_file_gives_notice() {
        let dir = tempfile::tempdir().unwrap();
        let (mut image, _) = workflow();
        image.path_input = dir.path().join("absent.png").display().to_string();

        let notice = image.select_from_input().unwrap();
        assert_eq!(notice.message, "Cannot read the selected file.");
        assert!(!image.path_input.is_empty());
    }

    #[test]
    fn test_dropping_workflow_releases_preview() {
        let (mut image, registry) = workflow();
        image.select_bytes("scan.png", PNG.to_vec()).unwrap();
        drop(image);
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_and_result() {
        let mut backend = MockBackend::new();
        backend
            .expect_analyze_image()
            .withf(|upload| upload.file_name == "labs.png" && upload.mime == "image/png")
            .times(1)
            .returning(|_| {
                Ok(ImageAnalysis {
                    extracted_text: Some("Hb 10.2 g/dL".to_string()),
                    analysis: Some(AnalysisResult {
                        summary: Some("Mild anaemia".to_string()),
                        ..AnalysisResult::default()
                    }),
                })
            });

        let (mut image, _) = workflow();
        image.select_bytes("labs.png", PNG.to_vec()).unwrap();
        assert_eq!(image.run(&backend).await, None);

        let result = image.result().unwrap();
        assert_eq!(result.extracted_text.as_deref(), Some("Hb 10.2 g/dL"));
        assert_eq!(result.analysis.as_ref().unwrap().summary(), "Mild anaemia");
        assert!(result.analysis.as_ref().unwrap().recommendations().is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_selected_file() {
        let mut backend = MockBackend::new();
        backend.expect_analyze_image().times(1).returning(|_| {
            Err(ApiError::Status {
                status: 400,
                body: "Invalid file type".to_string(),
            })
        });

        let (mut image, _) = workflow();
        image.select_bytes("labs.png", PNG.to_vec()).unwrap();
        assert!(image.run(&backend).await.is_some());
        assert_eq!(image.status(), Status::Idle);
        assert!(image.selected().is_some());
    }
}
