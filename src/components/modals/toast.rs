use super::helpers::truncate;
use crate::app::state::Toast;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Clear, Widget},
};

const MAX_WIDTH: u16 = 60;

/// One-line notification in the bottom-right corner.
pub struct ToastView<'a> {
    pub theme: &'a Theme,
    pub toast: &'a Toast,
}

impl Widget for ToastView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 2 {
            return;
        }
        let max = MAX_WIDTH.min(area.width - 2);
        let text = truncate(&format!(" {} ", self.toast.message), max as usize);
        let width = text.chars().count() as u16;
        let toast_area = Rect::new(
            area.right() - width - 1,
            area.bottom() - 2,
            width,
            1,
        );
        Clear.render(toast_area, buf);
        buf.set_string(toast_area.x, toast_area.y, text, self.theme.status_info);
    }
}
