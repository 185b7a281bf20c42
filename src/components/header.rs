use crate::theme::Theme;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

const SEP_RIGHT: &str = "\u{e0b0}";

/// Status bar of the host page: environment and current record.
pub struct Header<'a> {
    pub theme: &'a Theme,
    pub origin: &'a str,
    pub context_text: String,
    pub terminal_width: u16,
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let logo_bg = self.theme.header_logo.bg.unwrap_or(Color::Reset);
        let origin_bg = self.theme.header_item.bg.unwrap_or(Color::Reset);
        let context_bg = self.theme.header_active.bg.unwrap_or(Color::Reset);
        let base_bg = self.theme.header.bg.unwrap_or(Color::Reset);

        let sep_logo_origin = Style::default().fg(logo_bg).bg(origin_bg);
        let sep_origin_context = Style::default().fg(origin_bg).bg(context_bg);
        let sep_context_base = Style::default().fg(context_bg).bg(base_bg);

        let spans = vec![
            Span::styled(" ◎ SPOTLIGHT ", self.theme.header_logo),
            Span::styled(SEP_RIGHT, sep_logo_origin),
            Span::styled(format!(" {} ", self.origin), self.theme.header_item),
            Span::styled(SEP_RIGHT, sep_origin_context),
            Span::styled(format!(" {} ", self.context_text), self.theme.header_active),
            Span::styled(SEP_RIGHT, sep_context_base),
            Span::styled(" ".repeat(self.terminal_width as usize), self.theme.header),
        ];

        Paragraph::new(Line::from(spans))
            .style(self.theme.header)
            .render(area, buf);
    }
}
