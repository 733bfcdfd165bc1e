use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use medicare_core::Page;

use crate::app::{App, InputMode, PageState};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Completed(completion) => app.complete(completion),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // The notice popup blocks everything until dismissed
    if app.notice.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_notice();
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Page switching
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            app.navigate(Page::ALL[idx]);
        }
        KeyCode::Tab => app.navigate(app.current_page().next()),
        KeyCode::BackTab => app.navigate(app.current_page().previous()),

        KeyCode::Char('t') => app.toggle_theme(),

        KeyCode::Char('i') => {
            if app.input().is_some() {
                app.input_mode = InputMode::Editing;
                app.cursor = app.input_char_count();
            }
        }

        KeyCode::Char('a') => {
            if matches!(
                app.page,
                PageState::TextAnalysis(_) | PageState::ImageAnalysis(_)
            ) {
                app.submit();
            }
        }

        KeyCode::Char('j') | KeyCode::Down => {
            if matches!(app.page, PageState::Home { .. }) {
                app.home_nav(1);
            } else {
                app.scroll_down(1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if matches!(app.page, PageState::Home { .. }) {
                app.home_nav(-1);
            } else {
                app.scroll_up(1);
            }
        }
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::PageUp => app.scroll_up(10),

        KeyCode::Enter => {
            if matches!(app.page, PageState::Home { .. }) {
                app.open_selected_tile();
            } else if app.input().is_some() {
                app.input_mode = InputMode::Editing;
                app.cursor = app.input_char_count();
            }
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.submit();
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => match app.page {
            PageState::TextAnalysis(_) => insert_char(app, '\n'),
            PageState::ImageAnalysis(_) => app.select_image_from_input(),
            _ => app.submit(),
        },
        KeyCode::Backspace => {
            let cursor = app.cursor;
            if cursor > 0 {
                if let Some(input) = app.input_mut() {
                    let byte_pos = char_to_byte_index(input, cursor - 1);
                    input.remove(byte_pos);
                    app.cursor -= 1;
                }
            }
        }
        KeyCode::Delete => {
            let cursor = app.cursor;
            if cursor < app.input_char_count() {
                if let Some(input) = app.input_mut() {
                    let byte_pos = char_to_byte_index(input, cursor);
                    input.remove(byte_pos);
                }
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            app.cursor = (app.cursor + 1).min(app.input_char_count());
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input_char_count();
        }
        KeyCode::Char(c) => insert_char(app, c),
        _ => {}
    }
}

fn insert_char(app: &mut App, c: char) {
    let cursor = app.cursor;
    if let Some(input) = app.input_mut() {
        let byte_pos = char_to_byte_index(input, cursor);
        input.insert(byte_pos, c);
        app.cursor += 1;
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{next_completion, test_app};

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn ctrl(app: &mut App, c: char) {
        handle_event(
            app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)),
        );
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        let s = "fièvre";
        assert_eq!(char_to_byte_index(s, 3), 4);
        assert_eq!(char_to_byte_index(s, 10), s.len());
    }

    #[tokio::test]
    async fn test_number_keys_select_pages() {
        let (mut app, _, _rx) = test_app(false);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_page(), Page::TextAnalysis);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.current_page(), Page::Home);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.current_page(), Page::Research);
    }

    #[tokio::test]
    async fn test_typing_and_sending_chat() {
        let (mut app, backend, mut rx) = test_app(false);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('i'));
        type_str(&mut app, "fièvre?");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input().unwrap(), "fièvr?");

        press(&mut app, KeyCode::Enter);
        let completion = next_completion(&mut rx).await;
        handle_event(&mut app, AppEvent::Completed(completion));
        assert_eq!(backend.calls(), 1);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn test_enter_inserts_newline_in_text_analysis() {
        let (mut app, backend, _rx) = test_app(false);
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('i'));
        type_str(&mut app, "cough");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "fever");
        assert_eq!(app.input().unwrap(), "cough\nfever");
        assert_eq!(backend.calls(), 0);

        ctrl(&mut app, 's');
        assert!(app.is_pending());
    }

    #[tokio::test]
    async fn test_notice_blocks_keys_until_dismissed() {
        let (mut app, _, mut rx) = test_app(true);
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char('i'));
        type_str(&mut app, "malaria");
        press(&mut app, KeyCode::Enter);
        let completion = next_completion(&mut rx).await;
        handle_event(&mut app, AppEvent::Completed(completion));
        assert!(app.notice.is_some());

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.input().unwrap(), "malaria");
        press(&mut app, KeyCode::Esc);
        assert!(app.notice.is_none());
        assert_eq!(app.current_page(), Page::Research);
    }

    #[tokio::test]
    async fn test_image_path_selection_then_analyze() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xray.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let (mut app, backend, mut rx) = test_app(false);
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('i'));
        type_str(&mut app, &path.to_string_lossy());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.previews().live_count(), 1);

        press(&mut app, KeyCode::Char('a'));
        let completion = next_completion(&mut rx).await;
        handle_event(&mut app, AppEvent::Completed(completion));
        assert_eq!(backend.calls(), 1);
        match &app.page {
            PageState::ImageAnalysis(image) => {
                assert_eq!(
                    image.result().and_then(|r| r.extracted_text.as_deref()),
                    Some("WBC 11.2")
                );
            }
            other => panic!("expected image page, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_image_path_raises_notice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        let (mut app, _, _rx) = test_app(false);
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('i'));
        type_str(&mut app, &path.to_string_lossy());
        press(&mut app, KeyCode::Enter);
        assert!(app.notice.is_some());
        assert_eq!(app.previews().live_count(), 0);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_while_editing() {
        let (mut app, _, _rx) = test_app(false);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('i'));
        ctrl(&mut app, 'c');
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_theme_key_ignored_while_editing() {
        let (mut app, _, _rx) = test_app(false);
        press(&mut app, KeyCode::Char('t'));
        assert!(app.theme.is_dark());
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Char('t'));
        assert!(app.theme.is_dark());
        assert_eq!(app.input().unwrap(), "t");
    }
}
