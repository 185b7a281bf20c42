use ratatui::style::{Modifier, Style};
use serde::{Deserialize, Serialize};

pub mod fluent;
pub mod nord;
pub mod palette;

pub use palette::{dim_color, parse_hex, Palette};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub border: Style,
    pub border_focus: Style,

    pub header_logo: Style,
    pub header_item: Style,
    pub header_active: Style,
    pub header: Style,

    pub pill: Style,
    pub query_prompt: Style,
    pub tip: Style,
    pub progress: Style,

    pub list_item: Style,
    pub list_selected: Style,
    pub list_detail: Style,
    pub favorite: Style,
    pub chip: Style,

    pub info_key: Style,
    pub info_value: Style,

    pub status_info: Style,
    pub status_error: Style,
    pub dimmed: Style,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    #[default]
    Nord,
    Fluent,
}

impl PaletteType {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PaletteType::Nord => "Nord",
            PaletteType::Fluent => "Fluent (Light)",
        }
    }
}

impl Theme {
    #[must_use]
    pub fn from_palette_type(t: PaletteType) -> Self {
        match t {
            PaletteType::Nord => Self::from_palette(&nord::NORD),
            PaletteType::Fluent => Self::from_palette(&fluent::FLUENT),
        }
    }

    #[must_use]
    pub fn from_palette(p: &Palette) -> Self {
        Self {
            border: Style::default().fg(p.surface2),
            border_focus: Style::default().fg(p.blue),

            header_logo: Style::default()
                .bg(p.blue)
                .fg(p.crust)
                .add_modifier(Modifier::BOLD),
            header_item: Style::default().bg(p.surface0).fg(p.text),
            header_active: Style::default()
                .bg(p.green)
                .fg(p.crust)
                .add_modifier(Modifier::BOLD),
            header: Style::default().bg(p.base).fg(p.text),

            pill: Style::default()
                .bg(dim_color(p.blue, 0.45))
                .fg(p.text)
                .add_modifier(Modifier::BOLD),
            query_prompt: Style::default().fg(p.blue).add_modifier(Modifier::BOLD),
            tip: Style::default().fg(p.teal).add_modifier(Modifier::ITALIC),
            progress: Style::default().fg(p.yellow),

            list_item: Style::default().fg(p.text),
            list_selected: Style::default()
                .bg(p.blue)
                .fg(p.crust)
                .add_modifier(Modifier::BOLD),
            list_detail: Style::default().fg(p.subtext0).add_modifier(Modifier::DIM),
            favorite: Style::default().fg(p.yellow).add_modifier(Modifier::BOLD),
            chip: Style::default().bg(p.surface1).fg(p.text),

            info_key: Style::default().fg(p.mauve).add_modifier(Modifier::BOLD),
            info_value: Style::default().fg(p.text),

            status_info: Style::default()
                .bg(p.blue)
                .fg(p.crust)
                .add_modifier(Modifier::BOLD),
            status_error: Style::default()
                .bg(p.red)
                .fg(p.crust)
                .add_modifier(Modifier::BOLD),
            dimmed: Style::default().fg(p.overlay0).add_modifier(Modifier::DIM),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_palette_type(PaletteType::default())
    }
}
