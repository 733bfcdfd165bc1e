use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use medicare_core::error::Result as ApiResult;
use medicare_core::{
    AnalysisResult, Backend, ChatReply, ChatWorkflow, ImageAnalysis, ImageAnalysisWorkflow,
    Navigation, Notice, Page, PreviewRegistry, ResearchResult, ResearchWorkflow, Settings,
    TextAnalysisWorkflow, Theme,
};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Result of one backend call, tagged with the page instance that issued it
#[derive(Debug)]
pub struct Completion {
    pub mount: u64,
    pub outcome: Outcome,
}

#[derive(Debug)]
pub enum Outcome {
    Chat(ApiResult<ChatReply>),
    Text(ApiResult<AnalysisResult>),
    Image(ApiResult<ImageAnalysis>),
    Research(ApiResult<ResearchResult>),
}

/// The mounted page and the state it owns
#[derive(Debug)]
pub enum PageState {
    Home { selected: usize },
    Chat(ChatWorkflow),
    TextAnalysis(TextAnalysisWorkflow),
    ImageAnalysis(ImageAnalysisWorkflow),
    Research(ResearchWorkflow),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Shared across every page
    pub theme: Theme,
    pub navigation: Navigation,

    // Mounted page; replaced (and its state dropped) on navigation
    pub page: PageState,
    pub mount: u64,

    // Input cursor (char index into the current page's input)
    pub cursor: usize,

    // Scrolling of the page body
    pub scroll: u16,
    pub max_scroll: u16,
    pub follow_bottom: bool,

    // Blocking notice popup
    pub notice: Option<Notice>,

    // Animation state
    pub animation_frame: u8,

    pub settings: Settings,
    backend: Arc<dyn Backend>,
    events: UnboundedSender<AppEvent>,
    previews: PreviewRegistry,
}

impl App {
    pub fn new(
        settings: Settings,
        backend: Arc<dyn Backend>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            theme: Theme::default(),
            navigation: Navigation::default(),
            page: PageState::Home { selected: 0 },
            mount: 0,
            cursor: 0,
            scroll: 0,
            max_scroll: 0,
            follow_bottom: false,
            notice: None,
            animation_frame: 0,
            settings,
            backend,
            events,
            previews: PreviewRegistry::new(),
        }
    }

    pub fn current_page(&self) -> Page {
        self.navigation.current()
    }

    #[cfg(test)]
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Switch pages. Selecting the current page changes nothing; any other
    /// page is mounted fresh and the previous page's state is dropped.
    pub fn navigate(&mut self, page: Page) {
        if !self.navigation.set_page(page) {
            return;
        }

        self.mount += 1;
        self.page = match page {
            Page::Home => PageState::Home { selected: 0 },
            Page::Chat => PageState::Chat(ChatWorkflow::new(self.settings.language)),
            Page::TextAnalysis => {
                PageState::TextAnalysis(TextAnalysisWorkflow::new(self.settings.language))
            }
            Page::ImageAnalysis => PageState::ImageAnalysis(ImageAnalysisWorkflow::new(
                self.settings.language,
                self.previews.clone(),
            )),
            Page::Research => PageState::Research(ResearchWorkflow::new(
                self.settings.language,
                self.settings.max_results,
            )),
        };

        self.input_mode = InputMode::Normal;
        self.cursor = 0;
        self.scroll = 0;
        self.max_scroll = 0;
        self.follow_bottom = page == Page::Chat;
    }

    pub fn toggle_theme(&mut self) {
        self.theme.toggle();
    }

    /// Text input of the mounted page, if it has one
    pub fn input(&self) -> Option<&String> {
        match &self.page {
            PageState::Home { .. } => None,
            PageState::Chat(chat) => Some(&chat.input),
            PageState::TextAnalysis(text) => Some(&text.input),
            PageState::ImageAnalysis(image) => Some(&image.path_input),
            PageState::Research(research) => Some(&research.input),
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut String> {
        match &mut self.page {
            PageState::Home { .. } => None,
            PageState::Chat(chat) => Some(&mut chat.input),
            PageState::TextAnalysis(text) => Some(&mut text.input),
            PageState::ImageAnalysis(image) => Some(&mut image.path_input),
            PageState::Research(research) => Some(&mut research.input),
        }
    }

    pub fn is_pending(&self) -> bool {
        match &self.page {
            PageState::Home { .. } => false,
            PageState::Chat(chat) => chat.is_pending(),
            PageState::TextAnalysis(text) => text.is_pending(),
            PageState::ImageAnalysis(image) => image.is_pending(),
            PageState::Research(research) => research.is_pending(),
        }
    }

    /// Trigger the mounted page's action (send, analyze, search).
    /// No-op when the page refuses the submission.
    pub fn submit(&mut self) {
        let backend = Arc::clone(&self.backend);
        match &mut self.page {
            PageState::Home { .. } => {}
            PageState::Chat(chat) => {
                if let Some(request) = chat.submit() {
                    self.follow_bottom = true;
                    self.spawn(async move { Outcome::Chat(backend.chat(request).await) });
                }
            }
            PageState::TextAnalysis(text) => {
                if let Some(request) = text.analyze() {
                    self.spawn(async move { Outcome::Text(backend.analyze_text(request).await) });
                }
            }
            PageState::ImageAnalysis(image) => {
                if let Some(upload) = image.analyze() {
                    self.spawn(async move { Outcome::Image(backend.analyze_image(upload).await) });
                }
            }
            PageState::Research(research) => {
                if let Some(request) = research.search() {
                    self.spawn(async move { Outcome::Research(backend.research(request).await) });
                }
            }
        }
        self.clamp_cursor();
    }

    /// Use the typed path as the selected image
    pub fn select_image_from_input(&mut self) {
        if let PageState::ImageAnalysis(image) = &mut self.page {
            if let Some(notice) = image.select_from_input() {
                self.notice = Some(notice);
            } else if image.path_input.is_empty() {
                self.input_mode = InputMode::Normal;
                self.scroll = 0;
            }
        }
        self.clamp_cursor();
    }

    /// Apply a finished request to the page that issued it
    pub fn complete(&mut self, completion: Completion) {
        if completion.mount != self.mount {
            debug!(
                "Discarding completion for unmounted page (mount {}, current {})",
                completion.mount, self.mount
            );
            return;
        }

        let notice = match (&mut self.page, completion.outcome) {
            (PageState::Chat(chat), Outcome::Chat(outcome)) => {
                chat.resolve(outcome);
                self.follow_bottom = true;
                None
            }
            (PageState::TextAnalysis(text), Outcome::Text(outcome)) => text.resolve(outcome),
            (PageState::ImageAnalysis(image), Outcome::Image(outcome)) => image.resolve(outcome),
            (PageState::Research(research), Outcome::Research(outcome)) => {
                research.resolve(outcome)
            }
            (_, outcome) => {
                debug!("Completion does not match mounted page: {:?}", outcome);
                None
            }
        };

        if let Some(notice) = notice {
            info!("Showing notice: {}", notice.message);
            self.notice = Some(notice);
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Home tiles
    pub fn home_nav(&mut self, delta: isize) {
        if let PageState::Home { selected } = &mut self.page {
            let count = Page::features().len() as isize;
            *selected = (*selected as isize + delta).rem_euclid(count) as usize;
        }
    }

    pub fn open_selected_tile(&mut self) {
        if let PageState::Home { selected } = self.page {
            if let Some(feature) = Page::features().get(selected) {
                self.navigate(feature.page);
            }
        }
    }

    // Scrolling
    pub fn scroll_down(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn input_char_count(&self) -> usize {
        self.input().map(|input| input.chars().count()).unwrap_or(0)
    }

    pub fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.input_char_count());
    }

    fn spawn<F>(&self, request: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let events = self.events.clone();
        let mount = self.mount;
        tokio::spawn(async move {
            let outcome = request.await;
            // Receiver gone means the app is shutting down
            let _ = events.send(AppEvent::Completed(Completion { mount, outcome }));
        });
    }
}
