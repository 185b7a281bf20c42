use super::header::Header;
use crate::app::state::{AppState, OPEN_TIP};
use crate::domain::models::PageContext;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

/// Describes the page the user is on, e.g. `account 1f0c…` or `no record`.
#[must_use]
pub fn context_text(context: &PageContext) -> String {
    match (&context.entity, &context.record_id) {
        (Some(entity), Some(id)) => format!("{entity} {id}"),
        (Some(entity), None) => format!("{entity} list"),
        _ => "no record".to_string(),
    }
}

/// Stand-in for the host page: what the palette sent it, newest last.
pub struct HostScreen<'a> {
    pub theme: &'a Theme,
    pub app_state: &'a AppState<'a>,
}

impl Widget for HostScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(0),    // Page traffic
                Constraint::Length(1), // Key hints
            ])
            .split(area);

        Header {
            theme: self.theme,
            origin: &self.app_state.origin,
            context_text: context_text(&self.app_state.context),
            terminal_width: area.width,
        }
        .render(chunks[0], buf);

        let block = Block::default()
            .title(" Page messages ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border);
        let inner = block.inner(chunks[1]);
        block.render(chunks[1], buf);

        let lines: Vec<Line> = if self.app_state.host_log.is_empty() {
            vec![Line::from(Span::styled(OPEN_TIP, self.theme.tip))]
        } else {
            let skip = self
                .app_state
                .host_log
                .len()
                .saturating_sub(inner.height as usize);
            self.app_state
                .host_log
                .iter()
                .skip(skip)
                .map(|entry| Line::from(Span::styled(entry.as_str(), self.theme.list_item)))
                .collect()
        };
        Paragraph::new(lines).render(inner, buf);

        let hints = Line::from(vec![
            Span::styled(" Ctrl+Shift+P ", self.theme.header_logo),
            Span::styled(" palette ", self.theme.dimmed),
            Span::styled(" Ctrl+P ", self.theme.header_logo),
            Span::styled(" quick open ", self.theme.dimmed),
            Span::styled(" q ", self.theme.header_logo),
            Span::styled(" quit ", self.theme.dimmed),
        ]);
        if chunks[2].height > 0 {
            buf.set_line(chunks[2].x, chunks[2].y, &hints, chunks[2].width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_text() {
        let mut context = PageContext::default();
        assert_eq!(context_text(&context), "no record");
        context.entity = Some("account".to_string());
        assert_eq!(context_text(&context), "account list");
        context.record_id = Some("42".to_string());
        assert_eq!(context_text(&context), "account 42");
    }
}
