use super::action::Action;
use super::keymap::KeyMap;
use crate::domain::catalog::palette_commands;
use crate::domain::favorites::Favorites;
use crate::domain::models::{PageContext, PaletteCommand};
use crate::theme::{PaletteType, Theme};
use std::collections::VecDeque;
use std::sync::Arc;

pub mod input;
pub mod palette;

// Re-exports
pub use input::AppTextArea;
pub use palette::{FetchFocus, PaletteState, Pending, Step, Ticket, ENTITY_TIP, OPEN_TIP};

/// Ticks a toast stays visible (250ms each).
pub const TOAST_TICKS: u16 = 12;
const HOST_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub result_limit: usize,
    pub min_user_query: usize,
    pub min_record_query: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            result_limit: 20,
            min_user_query: 2,
            min_record_query: 3,
        }
    }
}

/// Transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub ticks_left: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState<'a> {
    // --- Lifecycle ---
    pub should_quit: bool,
    /// Dispatched once when the run loop starts.
    pub launch: Option<Action>,
    pub show_open_tip: bool,

    // --- Environment ---
    pub origin: String,
    pub context: PageContext,
    pub limits: Limits,

    // --- Catalog & Favorites ---
    pub commands: Vec<PaletteCommand>,
    pub favorites: Favorites,

    // --- Palette session (None while closed) ---
    pub palette: Option<PaletteState<'a>>,
    pub next_ticket: u64,

    // --- Feedback ---
    pub toast: Option<Toast>,
    /// Messages the host page received, newest last.
    pub host_log: VecDeque<String>,

    // --- Animation ---
    pub frame_count: u64,

    // --- Config ---
    pub keymap: Arc<KeyMap>,
    pub palette_type: PaletteType,
    pub theme: Theme,
}

impl AppState<'_> {
    #[must_use]
    pub fn new(origin: impl Into<String>, context: PageContext, favorites: Favorites) -> Self {
        Self {
            origin: origin.into(),
            context,
            favorites,
            ..Default::default()
        }
    }

    pub fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            ticks_left: TOAST_TICKS,
        });
    }

    pub fn record_host_traffic(&mut self, line: String) {
        if self.host_log.len() == HOST_LOG_CAPACITY {
            self.host_log.pop_front();
        }
        self.host_log.push_back(line);
    }

    pub fn set_theme(&mut self, palette_type: PaletteType) {
        self.palette_type = palette_type;
        self.theme = Theme::from_palette_type(palette_type);
    }
}

impl Default for AppState<'_> {
    fn default() -> Self {
        Self {
            should_quit: false,
            launch: None,
            show_open_tip: true,
            origin: String::new(),
            context: PageContext::default(),
            limits: Limits::default(),
            commands: palette_commands(),
            favorites: Favorites::default(),
            palette: None,
            next_ticket: 0,
            toast: None,
            host_log: VecDeque::new(),
            frame_count: 0,
            keymap: Arc::new(KeyMap::default()),
            palette_type: PaletteType::Nord,
            theme: Theme::from_palette_type(PaletteType::Nord),
        }
    }
}
