use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use medicare_core::state::{APP_NAME, DISCLAIMER, TAGLINE};
use medicare_core::{AnalysisResult, ChatRole, Page};

use crate::app::{App, InputMode, PageState};
use crate::theme::Palette;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}

/// Rows a set of lines occupies once wrapped to `width` columns
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    rows.min(u16::MAX as usize) as u16
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let palette = Palette::for_theme(&app.theme);
    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base()), area);

    // Main layout: header, nav bar, body, footer
    let [header_area, nav_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, &palette, frame, header_area);
    render_nav_bar(app, &palette, frame, nav_area);

    match app.current_page() {
        Page::Home => render_home(app, &palette, frame, body_area),
        Page::Chat => render_chat(app, &palette, frame, body_area),
        Page::TextAnalysis => render_text_analysis(app, &palette, frame, body_area),
        Page::ImageAnalysis => render_image_analysis(app, &palette, frame, body_area),
        Page::Research => render_research(app, &palette, frame, body_area),
    }

    render_footer(app, &palette, frame, footer_area);

    if app.notice.is_some() {
        render_notice(app, &palette, frame, area);
    }
}

fn render_header(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", APP_NAME), palette.heading()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            palette.muted(),
        ),
        Span::raw("  "),
        Span::styled(
            if app.theme.is_dark() { "dark" } else { "light" },
            palette.muted(),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(palette.panel_bg));
    frame.render_widget(header, area);
}

fn render_nav_bar(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let titles = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, page)| format!("{} {}", i + 1, page.label()));

    let tabs = Tabs::new(titles)
        .select(app.current_page().index())
        .style(palette.muted())
        .highlight_style(palette.highlight())
        .divider("|");

    frame.render_widget(tabs, area);
}

fn render_footer(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(palette.accent).fg(palette.bg),
        InputMode::Editing => Style::default().bg(palette.assistant).fg(palette.bg),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    let key_style = Style::default().bg(palette.border).fg(palette.fg);
    let label_style = palette.muted();

    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    match (&app.page, app.input_mode) {
        (_, InputMode::Editing) => {
            match app.page {
                PageState::TextAnalysis(_) => {
                    hints.extend(hint("Enter", "newline"));
                    hints.extend(hint("Ctrl+S", "analyze"));
                }
                PageState::ImageAnalysis(_) => hints.extend(hint("Enter", "select file")),
                PageState::Research(_) => hints.extend(hint("Enter", "search")),
                _ => hints.extend(hint("Enter", "send")),
            }
            hints.extend(hint("Esc", "stop typing"));
        }
        (PageState::Home { .. }, InputMode::Normal) => {
            hints.extend(hint("j/k", "select"));
            hints.extend(hint("Enter", "open"));
        }
        (page, InputMode::Normal) => {
            hints.extend(hint("i", "edit"));
            if matches!(page, PageState::TextAnalysis(_) | PageState::ImageAnalysis(_)) {
                hints.extend(hint("a", "analyze"));
            }
            hints.extend(hint("j/k", "scroll"));
        }
    }
    if app.input_mode == InputMode::Normal {
        hints.extend(hint("1-5", "page"));
        hints.extend(hint("t", "theme"));
        hints.extend(hint("q", "quit"));
    }

    let footer_content = Line::from(
        vec![Span::styled(mode_text, mode_style), Span::raw(" ")]
            .into_iter()
            .chain(hints)
            .collect::<Vec<_>>(),
    );

    frame.render_widget(
        Paragraph::new(footer_content).style(Style::default().bg(palette.panel_bg)),
        area,
    );
}

fn render_home(app: &mut App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let selected = match app.page {
        PageState::Home { selected } => selected,
        _ => 0,
    };

    let [intro_area, tiles_area, disclaimer_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let intro = Paragraph::new(vec![
        Line::default(),
        Line::from(Span::styled(APP_NAME, palette.heading())),
        Line::from(Span::styled(TAGLINE, palette.muted())),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(intro, intro_area);

    let items: Vec<ListItem> = Page::features()
        .iter()
        .map(|feature| {
            ListItem::new(vec![
                Line::from(Span::styled(feature.title, Style::default().bold())),
                Line::from(Span::styled(feature.description, palette.muted())),
                Line::default(),
            ])
        })
        .collect();

    let tiles = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(true))
                .title(" Features "),
        )
        .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(tiles, tiles_area, &mut state);

    let disclaimer = Paragraph::new(DISCLAIMER)
        .style(palette.muted().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(disclaimer, disclaimer_area);
}

fn pending_line(app: &App, palette: &Palette, label: &str) -> Line<'static> {
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat((app.animation_frame as usize) + 1);
    Line::from(Span::styled(
        format!("{}{}", label, dots),
        palette.muted().add_modifier(Modifier::ITALIC),
    ))
}

fn render_chat(app: &mut App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let [history_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    let mut lines: Vec<Line> = Vec::new();
    if let PageState::Chat(chat) = &app.page {
        for msg in chat.messages() {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(palette.user).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(msg.content.clone()));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default()
                            .fg(palette.assistant)
                            .add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
            }
            lines.push(Line::default());
        }

        if chat.is_pending() {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default()
                    .fg(palette.assistant)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(pending_line(app, palette, "Thinking"));
        }
    }

    render_scrolled(app, palette, frame, history_area, lines, " AI-Powered Chat ");
    render_single_line_input(app, palette, frame, input_area, " Ask a medical question ");
}

fn render_text_analysis(app: &mut App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let [input_area, result_area] =
        Layout::vertical([Constraint::Length(8), Constraint::Min(0)]).areas(area);

    let mut lines: Vec<Line> = Vec::new();
    if let PageState::TextAnalysis(text) = &app.page {
        if text.is_pending() {
            lines.push(pending_line(app, palette, "Analyzing"));
        } else if let Some(result) = text.result() {
            push_analysis(&mut lines, palette, result, true);
        } else {
            lines.push(Line::from(Span::styled(
                "Results appear here once the text is analyzed.",
                palette.muted(),
            )));
        }
    }

    render_multi_line_input(app, palette, frame, input_area, " Enter Medical Text ");
    render_scrolled(app, palette, frame, result_area, lines, " Analysis Results ");
}

fn render_image_analysis(app: &mut App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let [selection_area, input_area, result_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let mut selection: Vec<Line> = Vec::new();
    let mut lines: Vec<Line> = Vec::new();
    if let PageState::ImageAnalysis(image) = &app.page {
        match image.selected() {
            Some(uploaded) => {
                selection.push(Line::from(Span::styled(
                    uploaded.preview.summary().to_string(),
                    Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
                )));
                selection.push(Line::from(Span::styled(
                    uploaded.preview.url().to_string(),
                    palette.muted(),
                )));
            }
            None => {
                selection.push(Line::from("No image selected"));
                selection.push(Line::from(Span::styled(
                    "PNG, JPG, JPEG up to 10MB",
                    palette.muted(),
                )));
            }
        }

        if image.is_pending() {
            lines.push(pending_line(app, palette, "Analyzing"));
        } else if let Some(result) = image.result() {
            lines.push(Line::from(Span::styled("Extracted Text", palette.heading())));
            if let Some(extracted) = &result.extracted_text {
                for line in extracted.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            lines.push(Line::default());
            let analysis = result.analysis.clone().unwrap_or_default();
            push_analysis(&mut lines, palette, &analysis, false);
        }
    }

    let preview = Paragraph::new(selection).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border(false))
            .title(" Selected Image "),
    );
    frame.render_widget(preview, selection_area);

    render_single_line_input(app, palette, frame, input_area, " Image path ");
    render_scrolled(app, palette, frame, result_area, lines, " Analysis Results ");
}

fn render_research(app: &mut App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let [input_area, result_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let mut lines: Vec<Line> = Vec::new();
    if let PageState::Research(research) = &app.page {
        if research.is_pending() {
            lines.push(pending_line(app, palette, "Searching"));
        } else if let Some(result) = research.result() {
            lines.push(Line::from(Span::styled("Summary", palette.heading())));
            lines.push(Line::from(result.summary().to_string()));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("Sources", palette.heading())));
            lines.push(Line::default());

            // One card per source, in the order received
            for entry in result.results() {
                lines.push(Line::from(vec![
                    Span::styled("▌ ", Style::default().fg(palette.accent)),
                    Span::styled(entry.title.clone(), Style::default().bold()),
                ]));
                lines.push(Line::from(vec![
                    Span::styled("▌ ", Style::default().fg(palette.accent)),
                    Span::raw(entry.content.clone()),
                ]));
                lines.push(Line::from(vec![
                    Span::styled("▌ ", Style::default().fg(palette.accent)),
                    Span::styled(
                        format!("Read more → {}", entry.url),
                        Style::default().fg(palette.link),
                    ),
                ]));
                lines.push(Line::default());
            }
        }
    }

    render_single_line_input(
        app,
        palette,
        frame,
        input_area,
        " Search Medical Information ",
    );
    render_scrolled(app, palette, frame, result_area, lines, " Medical Research ");
}

/// Summary, list sections and disclaimer of an analysis. Section headings
/// are always shown; missing or empty lists render no items.
fn push_analysis(
    lines: &mut Vec<Line<'static>>,
    palette: &Palette,
    result: &AnalysisResult,
    with_next_steps: bool,
) {
    lines.push(Line::from(Span::styled("Summary", palette.heading())));
    lines.push(Line::from(result.summary().to_string()));
    lines.push(Line::default());

    let mut sections = vec![
        ("Key Findings", result.key_findings()),
        ("Recommendations", result.recommendations()),
    ];
    if with_next_steps {
        sections.push(("Next Steps", result.next_steps()));
    }

    for (heading, items) in sections {
        lines.push(Line::from(Span::styled(heading, palette.heading())));
        for item in items {
            lines.push(Line::from(format!("• {}", item)));
        }
        lines.push(Line::default());
    }

    if !result.disclaimer().is_empty() {
        lines.push(Line::from(Span::styled(
            result.disclaimer().to_string(),
            palette.muted().add_modifier(Modifier::ITALIC),
        )));
    }
}

/// Bordered, wrapped and scrollable page body. Updates the app's scroll bounds.
fn render_scrolled(
    app: &mut App,
    palette: &Palette,
    frame: &mut Frame,
    area: Rect,
    lines: Vec<Line<'static>>,
    title: &str,
) {
    let inner_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);

    let total = wrapped_height(&lines, inner_width);
    app.max_scroll = total.saturating_sub(inner_height);
    if app.follow_bottom {
        app.scroll = app.max_scroll;
    } else {
        app.scroll = app.scroll.min(app.max_scroll);
    }

    let focused = app.input_mode == InputMode::Normal;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(focused))
        .title(title.to_string());

    let body = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    frame.render_widget(body, area);
}

fn input_block<'a>(app: &App, palette: &Palette, title: &'a str) -> Block<'a> {
    let editing = app.input_mode == InputMode::Editing;
    let border = if app.is_pending() {
        palette.muted()
    } else {
        palette.border(editing)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn render_single_line_input(
    app: &App,
    palette: &Palette,
    frame: &mut Frame,
    area: Rect,
    title: &str,
) {
    let input = app.input().map(String::as_str).unwrap_or_default();

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input.chars().skip(scroll_offset).take(inner_width).collect();

    let paragraph = Paragraph::new(visible_text)
        .style(Style::default().fg(palette.user))
        .block(input_block(app, palette, title));
    frame.render_widget(paragraph, area);

    if app.input_mode == InputMode::Editing && app.notice.is_none() {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_multi_line_input(
    app: &App,
    palette: &Palette,
    frame: &mut Frame,
    area: Rect,
    title: &str,
) {
    let input = app.input().map(String::as_str).unwrap_or_default();

    // Cursor row and column from the text before it
    let before: String = input.chars().take(app.cursor).collect();
    let row = before.matches('\n').count() as u16;
    let col = before
        .rsplit('\n')
        .next()
        .map(|last| last.chars().count())
        .unwrap_or(0) as u16;

    let inner_height = area.height.saturating_sub(2);
    let scroll = row.saturating_sub(inner_height.saturating_sub(1));

    let paragraph = Paragraph::new(input.to_string())
        .style(Style::default().fg(palette.user))
        .block(input_block(app, palette, title))
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);

    if app.input_mode == InputMode::Editing && app.notice.is_none() {
        let max_x = area.width.saturating_sub(2);
        frame.set_cursor_position((
            area.x + 1 + col.min(max_x.saturating_sub(1)),
            area.y + 1 + row - scroll,
        ));
    }
}

fn render_notice(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let Some(notice) = &app.notice else {
        return;
    };

    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height);
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.assistant))
        .style(palette.base())
        .title(" Notice ");

    let text = vec![
        Line::from(notice.message.clone()),
        Line::default(),
        Line::from(Span::styled("Press Enter or Esc to dismiss", palette.muted())),
    ];

    let popup = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}
