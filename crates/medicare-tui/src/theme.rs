use medicare_core::Theme;
use ratatui::style::{Color, Modifier, Style};

/// Colors derived from the shared theme. Built per frame, never stored.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub border_focus: Color,
    pub user: Color,
    pub assistant: Color,
    pub panel_bg: Color,
    pub link: Color,
}

impl Palette {
    pub fn for_theme(theme: &Theme) -> Self {
        if theme.is_dark() {
            Self {
                bg: Color::Rgb(19, 78, 74),
                fg: Color::Rgb(243, 244, 246),
                muted: Color::Rgb(156, 163, 175),
                accent: Color::Rgb(45, 212, 191),
                border: Color::Rgb(17, 94, 89),
                border_focus: Color::Rgb(34, 211, 238),
                user: Color::Rgb(94, 234, 212),
                assistant: Color::Rgb(253, 224, 71),
                panel_bg: Color::Rgb(17, 60, 58),
                link: Color::Rgb(196, 181, 253),
            }
        } else {
            Self {
                bg: Color::Rgb(249, 250, 251),
                fg: Color::Rgb(17, 24, 39),
                muted: Color::Rgb(107, 114, 128),
                accent: Color::Rgb(20, 184, 166),
                border: Color::Rgb(209, 213, 219),
                border_focus: Color::Rgb(8, 145, 178),
                user: Color::Rgb(13, 148, 136),
                assistant: Color::Rgb(37, 99, 235),
                panel_bg: Color::Rgb(240, 253, 250),
                link: Color::Rgb(124, 58, 237),
            }
        }
    }

    pub fn base(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.border_focus } else { self.border })
    }

    pub fn heading(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .bg(self.accent)
            .fg(self.bg)
            .add_modifier(Modifier::BOLD)
    }
}
