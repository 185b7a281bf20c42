use super::helpers::truncate;
use crate::app::view::FavoriteChip;
use crate::theme::{parse_hex, Theme};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

const CHIP_TITLE_WIDTH: usize = 14;
const CHIP_GAP: u16 = 1;

fn chip_label(chip: &FavoriteChip) -> (String, String) {
    (
        format!(" {} ", chip.icon),
        format!("{} ", truncate(&chip.title, CHIP_TITLE_WIDTH)),
    )
}

/// Screen area of each chip that fits in `area`, left to right.
#[must_use]
pub fn chip_areas(area: Rect, chips: &[FavoriteChip]) -> Vec<Rect> {
    let mut x = area.x;
    let mut areas = Vec::new();
    for chip in chips {
        let (icon, title) = chip_label(chip);
        let width = (icon.chars().count() + title.chars().count()) as u16;
        if x + width > area.right() {
            break;
        }
        areas.push(Rect::new(x, area.y, width, 1));
        x += width + CHIP_GAP;
    }
    areas
}

pub struct FavoritesBar<'a> {
    pub theme: &'a Theme,
    pub chips: &'a [FavoriteChip],
}

impl Widget for FavoritesBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        for (chip, chip_area) in self.chips.iter().zip(chip_areas(area, self.chips)) {
            let mut style = self.theme.chip;
            if let Some(bg) = chip.bg_color.as_deref().and_then(parse_hex) {
                style = style.bg(bg);
            }
            let icon_style = chip
                .icon_color
                .as_deref()
                .and_then(parse_hex)
                .map_or(style, |fg| style.fg(fg));

            let (icon, title) = chip_label(chip);
            let line = Line::from(vec![
                Span::styled(icon, icon_style),
                Span::styled(title, style),
            ]);
            buf.set_line(chip_area.x, chip_area.y, &line, chip_area.width);
        }
    }
}
