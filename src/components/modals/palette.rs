use super::favorites_bar::FavoritesBar;
use super::helpers::{contains, draw_drop_shadow, truncate, upper_centered_rect};
use super::info_panel::InfoPanelView;
use crate::app::state::{AppState, FetchFocus, PaletteState, Step};
use crate::app::view::{self, ViewItem};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Widget},
};

pub const MODAL_WIDTH_PERCENT: u16 = 70;
pub const MODAL_HEIGHT: u16 = 22;
const EDITOR_HEIGHT: u16 = 8;
const PILL_SEPARATOR: &str = " › ";

/// Geometry of the palette modal. Rendering and mouse hit-testing both use
/// it, so a click lands on the row that was drawn there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteLayout {
    pub modal: Rect,
    pub header: Rect,
    pub chips: Rect,
    pub status: Rect,
    pub editor: Rect,
    pub separator: Rect,
    pub list: Rect,
}

impl PaletteLayout {
    #[must_use]
    pub fn new(area: Rect, step: Step, show_chips: bool) -> Self {
        let modal = upper_centered_rect(MODAL_WIDTH_PERCENT, MODAL_HEIGHT, area);
        let inner = Block::default().borders(Borders::ALL).inner(modal);
        let editor_height = if step == Step::FetchXml { EDITOR_HEIGHT } else { 0 };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                     // Pills + query
                Constraint::Length(u16::from(show_chips)), // Favorites
                Constraint::Length(1),                     // Tip / progress
                Constraint::Length(editor_height),         // FetchXML editor
                Constraint::Length(1),                     // Separator
                Constraint::Min(0),                        // Results
            ])
            .split(inner);

        Self {
            modal,
            header: rows[0],
            chips: rows[1],
            status: rows[2],
            editor: rows[3],
            separator: rows[4],
            list: rows[5],
        }
    }

    #[must_use]
    pub fn for_state(area: Rect, state: &AppState, palette: &PaletteState) -> Self {
        let show_chips = !view::favorite_chips(state, palette).is_empty();
        Self::new(area, palette.step, show_chips)
    }

    /// Index of the first visible row, keeping `selected` on screen.
    #[must_use]
    pub fn list_offset(&self, selected: usize) -> usize {
        selected.saturating_sub(usize::from(self.list.height).saturating_sub(1))
    }

    /// The item index drawn at a screen position, if any.
    #[must_use]
    pub fn row_at(&self, selected: usize, column: u16, row: u16) -> Option<usize> {
        contains(self.list, column, row)
            .then(|| self.list_offset(selected) + usize::from(row - self.list.y))
    }
}

pub struct PaletteModal<'a> {
    pub theme: &'a Theme,
    pub app_state: &'a AppState<'a>,
    pub palette: &'a PaletteState<'a>,
}

impl Widget for PaletteModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = PaletteLayout::for_state(area, self.app_state, self.palette);
        if layout.modal.width == 0 || layout.modal.height == 0 {
            return;
        }

        draw_drop_shadow(buf, layout.modal, area);
        Clear.render(layout.modal, buf);

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(" SPOTLIGHT ", self.theme.header_logo),
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border_focus);
        block.render(layout.modal, buf);
        if layout.header.height == 0 {
            return;
        }

        self.render_header(layout.header, buf);

        let chips = view::favorite_chips(self.app_state, self.palette);
        FavoritesBar {
            theme: self.theme,
            chips: &chips,
        }
        .render(layout.chips, buf);

        self.render_status(layout.status, buf);

        if self.palette.step == Step::FetchXml {
            self.render_editor(layout.editor, buf);
        }

        if layout.separator.height > 0 {
            let separator = "─".repeat(layout.separator.width as usize);
            buf.set_string(layout.separator.x, layout.separator.y, separator, self.theme.border);
        }

        if self.palette.step.is_info() {
            InfoPanelView {
                theme: self.theme,
                panel: self.palette.info.as_ref(),
            }
            .render(layout.list, buf);
        } else {
            let items = view::items(self.app_state, self.palette);
            self.render_list(&layout, &items, buf);
        }
    }
}

impl PaletteModal<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(" › ", self.theme.query_prompt)];
        for pill in &self.palette.pills {
            spans.push(Span::styled(format!(" {pill} "), self.theme.pill));
            spans.push(Span::styled(PILL_SEPARATOR, self.theme.dimmed));
        }
        let line = Line::from(spans);
        let used = u16::try_from(line.width()).unwrap_or(u16::MAX).min(area.width);
        buf.set_line(area.x, area.y, &line, area.width);

        let rest = Rect {
            x: area.x + used,
            width: area.width - used,
            ..area
        };
        if rest.width == 0 {
            return;
        }
        match self.palette.step {
            step if step.has_query() => Widget::render(&self.palette.query, rest, buf),
            Step::FetchXml => {
                let hint = "Ctrl+Enter run · Tab switch focus";
                buf.set_string(rest.x, rest.y, truncate(hint, rest.width as usize), self.theme.dimmed);
            }
            _ => {
                let hint = "Backspace to go back";
                buf.set_string(rest.x, rest.y, truncate(hint, rest.width as usize), self.theme.dimmed);
            }
        }
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let (text, style) = match (&self.palette.progress, &self.palette.tip) {
            (Some(progress), _) => (progress.as_str(), self.theme.progress),
            (None, Some(tip)) => (tip.as_str(), self.theme.tip),
            (None, None) => return,
        };
        let text = truncate(&format!(" {text}"), area.width as usize);
        buf.set_string(area.x, area.y, text, style);
    }

    fn render_editor(&self, area: Rect, buf: &mut Buffer) {
        let focused = self.palette.fetch_focus == FetchFocus::Editor;
        let block = Block::default()
            .title(" FetchXML ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if focused {
                self.theme.border_focus
            } else {
                self.theme.border
            });
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width > 0 && inner.height > 0 {
            Widget::render(&self.palette.fetch_editor, inner, buf);
        }
    }

    fn render_list(&self, layout: &PaletteLayout, items: &[ViewItem], buf: &mut Buffer) {
        let area = layout.list;
        if area.height == 0 {
            return;
        }

        if items.is_empty() {
            if self.palette.progress.is_none() && !self.palette.query.is_blank() {
                let line = Line::from(Span::styled("  No results.", self.theme.dimmed));
                buf.set_line(area.x, area.y, &line, area.width);
            }
            return;
        }

        // In the FetchXML step the cursor only shows once the results have focus.
        let show_cursor = self.palette.step != Step::FetchXml
            || self.palette.fetch_focus == FetchFocus::Results;
        let offset = layout.list_offset(self.palette.selected);

        for (row, (i, item)) in items
            .iter()
            .enumerate()
            .skip(offset)
            .take(area.height as usize)
            .enumerate()
        {
            let selected = show_cursor && i == self.palette.selected;
            let style = if selected {
                self.theme.list_selected
            } else {
                self.theme.list_item
            };
            let prefix = if selected { "> " } else { "  " };

            let mut spans = vec![
                Span::styled(prefix, style),
                Span::styled(format!("{} ", item.icon), style),
                Span::styled(item.label.clone(), style),
            ];
            if item.favorite {
                spans.push(Span::styled(" ★", self.theme.favorite));
            }
            if let Some(detail) = &item.detail {
                spans.push(Span::styled(format!("  {detail}"), self.theme.list_detail));
            }

            let y = area.y + row as u16;
            if selected {
                buf.set_style(Rect::new(area.x, y, area.width, 1), style);
            }
            buf.set_line(area.x, y, &Line::from(spans), area.width);
        }
    }
}
