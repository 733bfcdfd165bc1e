//! UI-agnostic application state types
//!
//! Theme and navigation are the only state shared across pages. They live in
//! one place (the application root) and are handed to views by reference.

use serde::{Deserialize, Serialize};
use tracing::info;

pub const APP_NAME: &str = "MediCare AI";

pub const TAGLINE: &str = "Your AI-powered medical assistant for Cameroon";

pub const DISCLAIMER: &str = "This is an AI assistant for informational purposes only. Always consult qualified healthcare professionals.";

/// A chat message in the AI conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Theme {
    dark: bool,
}

impl Theme {
    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn toggle(&mut self) {
        self.dark = !self.dark;
        info!("Theme switched to {}", if self.dark { "dark" } else { "light" });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Home,
    Chat,
    TextAnalysis,
    ImageAnalysis,
    Research,
}

/// Home page tile describing one workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub page: Page,
    pub title: &'static str,
    pub description: &'static str,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::Chat,
        Page::TextAnalysis,
        Page::ImageAnalysis,
        Page::Research,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Chat => "chat",
            Page::TextAnalysis => "text-analysis",
            Page::ImageAnalysis => "image-analysis",
            Page::Research => "research",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Chat => "Chat",
            Page::TextAnalysis => "Text Analysis",
            Page::ImageAnalysis => "Image Analysis",
            Page::Research => "Research",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.id() == id)
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Home page tile for this workflow (Home itself has none)
    pub fn feature(&self) -> Option<Feature> {
        let (title, description) = match self {
            Page::Home => return None,
            Page::Chat => ("AI-Powered Chat", "Interactive health conversation"),
            Page::TextAnalysis => ("Medical Text Analysis", "Insights from patient records"),
            Page::ImageAnalysis => ("Analyze Medical Images", "AI-based image interpretation"),
            Page::Research => ("Medical Research Search", "Search trusted medical sources"),
        };
        Some(Feature {
            page: *self,
            title,
            description,
        })
    }

    pub fn features() -> Vec<Feature> {
        Self::ALL.iter().filter_map(|page| page.feature()).collect()
    }
}

/// Current page selector; no history stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigation {
    current: Page,
}

impl Navigation {
    pub fn current(&self) -> Page {
        self.current
    }

    /// Select `page`. Returns true when the page actually changed.
    pub fn set_page(&mut self, page: Page) -> bool {
        if self.current == page {
            return false;
        }
        info!("Navigating {} -> {}", self.current.id(), page.id());
        self.current = page;
        true
    }
}
