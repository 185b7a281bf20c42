use crate::domain::models::InfoPanel;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Row, Table, Widget},
};

/// Key/value table of the info display steps.
pub struct InfoPanelView<'a> {
    pub theme: &'a Theme,
    pub panel: Option<&'a InfoPanel>,
}

impl Widget for InfoPanelView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let Some(panel) = self.panel else {
            return;
        };

        let title = Line::from(Span::styled(format!(" {} ", panel.title), self.theme.header_item));
        buf.set_line(area.x, area.y, &title, area.width);
        let body = Rect {
            y: area.y + 1,
            height: area.height - 1,
            ..area
        };

        if panel.rows.is_empty() {
            let message = panel.empty_message.as_deref().unwrap_or("Nothing to show.");
            let line = Line::from(Span::styled(format!("  {message}"), self.theme.dimmed));
            buf.set_line(body.x, body.y, &line, body.width);
            return;
        }

        let rows: Vec<Row> = panel
            .rows
            .iter()
            .map(|row| {
                // Pretty-printed JSON values are shown on one line.
                let value = row.value.split_whitespace().collect::<Vec<_>>().join(" ");
                Row::new(vec![
                    Cell::from(Span::styled(format!(" {}", row.key), self.theme.info_key)),
                    Cell::from(Span::styled(value, self.theme.info_value)),
                ])
            })
            .collect();

        Table::new(rows, [Constraint::Percentage(35), Constraint::Percentage(65)]).render(body, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::InfoRow;

    fn rendered(panel: &InfoPanel) -> String {
        let area = Rect::new(0, 0, 50, 6);
        let mut buf = Buffer::empty(area);
        InfoPanelView {
            theme: &Theme::default(),
            panel: Some(panel),
        }
        .render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_rows_are_listed() {
        let panel = InfoPanel {
            title: "Record".to_string(),
            rows: vec![InfoRow::new("Entity", "account")],
            empty_message: None,
        };
        let text = rendered(&panel);
        assert!(text.contains("Record"));
        assert!(text.contains("Entity"));
        assert!(text.contains("account"));
    }

    #[test]
    fn test_empty_message() {
        let panel = InfoPanel {
            title: "Roles".to_string(),
            rows: vec![],
            empty_message: Some("No security roles found".to_string()),
        };
        assert!(rendered(&panel).contains("No security roles found"));
    }
}
