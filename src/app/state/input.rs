use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;
use std::ops::{Deref, DerefMut};
use tui_textarea::{CursorMove, TextArea};

/// `TextArea` with the `Clone`/`Debug`/`PartialEq` the state tree needs.
#[derive(Default)]
pub struct AppTextArea<'a>(pub TextArea<'a>);

impl<'a> AppTextArea<'a> {
    /// The palette's query field.
    #[must_use]
    pub fn single_line(placeholder: &str) -> Self {
        let mut area = TextArea::default();
        area.set_cursor_line_style(Style::default());
        area.set_placeholder_text(placeholder);
        area.set_placeholder_style(Style::default().add_modifier(Modifier::DIM));
        Self(area)
    }

    /// The multi-line FetchXML editor.
    #[must_use]
    pub fn editor() -> Self {
        let mut area = TextArea::default();
        area.set_cursor_line_style(Style::default());
        area.set_placeholder_text("<fetch top=\"20\"><entity name=\"account\">...</entity></fetch>");
        area.set_placeholder_style(Style::default().add_modifier(Modifier::DIM));
        Self(area)
    }

    /// All lines joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.0.lines().join("\n")
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.lines().iter().all(|l| l.is_empty())
    }

    /// Replaces the content, keeping placeholder and styles.
    pub fn set_text(&mut self, text: &str) {
        self.0.select_all();
        self.0.cut();
        self.0.insert_str(text);
    }
}

impl Clone for AppTextArea<'_> {
    fn clone(&self) -> Self {
        let mut area = TextArea::new(self.0.lines().to_vec());
        area.set_cursor_line_style(self.0.cursor_line_style());
        area.set_placeholder_text(self.0.placeholder_text());
        area.set_placeholder_style(self.0.placeholder_style().unwrap_or_default());
        let (row, col) = self.0.cursor();
        area.move_cursor(CursorMove::Jump(row as u16, col as u16));
        Self(area)
    }
}

impl std::fmt::Debug for AppTextArea<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppTextArea")
            .field("lines", &self.0.lines())
            .field("cursor", &self.0.cursor())
            .finish()
    }
}

impl PartialEq for AppTextArea<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.lines() == other.0.lines() && self.0.cursor() == other.0.cursor()
    }
}

impl<'a> Deref for AppTextArea<'a> {
    type Target = TextArea<'a>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for AppTextArea<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Widget for &AppTextArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self.0, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_text_replaces_content() {
        let mut area = AppTextArea::single_line("Search commands...");
        area.insert_str("old");
        area.set_text("account");
        assert_eq!(area.text(), "account");
        assert_eq!(area.placeholder_text(), "Search commands...");

        let copy = area.clone();
        assert_eq!(copy, area);
        assert_eq!(copy.placeholder_text(), "Search commands...");
    }

    #[test]
    fn test_blank_detection() {
        let mut area = AppTextArea::editor();
        assert!(area.is_blank());
        area.insert_newline();
        assert!(area.is_blank());
        area.insert_char('<');
        assert!(!area.is_blank());
    }
}
