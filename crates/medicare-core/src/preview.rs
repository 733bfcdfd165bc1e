//! Preview handles for selected images
//!
//! A handle stays registered for as long as it is alive. Dropping it (because
//! the image was replaced or the page was left) releases it, so the live count
//! tells whether any preview leaked.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<u64>>>,
    next_id: Arc<AtomicU64>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, file_name: &str, mime: &str, size: usize) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.live.lock().insert(id);
        PreviewHandle {
            id,
            url: format!("preview://{}/{}", id, file_name),
            summary: format!("{} · {} · {}", file_name, mime, format_size(size)),
            live: Arc::clone(&self.live),
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    pub fn is_live(&self, handle_id: u64) -> bool {
        self.live.lock().contains(&handle_id)
    }
}

#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    url: String,
    summary: String,
    live: Arc<Mutex<HashSet<u64>>>,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One-line description shown in place of the image
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.lock().remove(&self.id);
    }
}

fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_releases_handle() {
        let registry = PreviewRegistry::new();
        let handle = registry.acquire("xray.png", "image/png", 2048);
        let id = handle.id();
        assert!(registry.is_live(id));
        assert_eq!(registry.live_count(), 1);

        drop(handle);
        assert!(!registry.is_live(id));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_handles_are_distinct() {
        let registry = PreviewRegistry::new();
        let a = registry.acquire("a.png", "image/png", 1);
        let b = registry.acquire("a.png", "image/png", 1);
        assert_ne!(a.id(), b.id());
        assert_ne!(a.url(), b.url());
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn test_summary_formats_size() {
        let registry = PreviewRegistry::new();
        let handle = registry.acquire("scan.jpg", "image/jpeg", 3 * 1024 * 1024);
        assert_eq!(handle.summary(), "scan.jpg · image/jpeg · 3.0 MB");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
    }
}
