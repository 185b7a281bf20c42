use super::palette::Palette;
use ratatui::style::Color;

/// Light scheme close to the host application's own chrome.
pub const FLUENT: Palette = Palette {
    base: Color::Rgb(250, 249, 248),
    crust: Color::Rgb(255, 255, 255),
    text: Color::Rgb(50, 49, 48),
    subtext0: Color::Rgb(96, 94, 92),
    surface0: Color::Rgb(237, 235, 233),
    surface1: Color::Rgb(225, 223, 221),
    surface2: Color::Rgb(200, 198, 196),
    overlay0: Color::Rgb(161, 159, 157),
    blue: Color::Rgb(0, 120, 212),
    teal: Color::Rgb(3, 131, 135),
    green: Color::Rgb(16, 124, 16),
    yellow: Color::Rgb(196, 140, 0),
    red: Color::Rgb(209, 52, 56),
    mauve: Color::Rgb(135, 100, 184),
};
