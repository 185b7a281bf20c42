use crate::app::command::Command;
use crate::app::state::Ticket;
use crate::domain::models::{EntityInfo, InfoPanel, RecordRef};
use crate::domain::protocol::{InboundMessage, WireMessage};
use crossterm::event::KeyEvent;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum UpdateResult {
    Handled(Option<Command>),
    NotHandled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // --- System / Terminal ---
    Tick,
    Resize(u16, u16),
    Quit,

    // --- Palette Lifecycle ---
    OpenPalette { command: Option<String> }, // Ctrl+Shift+P, optionally straight into a command
    QuickOpen,                               // Ctrl+P, opens or re-enters quick open
    ClosePalette,                            // Esc

    // --- Input ---
    QueryInput(KeyEvent),       // Keystroke for the query field
    FetchEditorInput(KeyEvent), // Keystroke for the FetchXML editor
    ToggleFetchFocus,           // Tab in the FetchXML step
    RunFetchXml,                // Ctrl+Enter / F5

    // --- Navigation ---
    SelectNext,
    SelectPrev,
    SelectIndex(usize),
    ActivateIndex(usize), // Click on a list row
    Activate,             // Enter
    Back,                 // Backspace on empty input

    // --- Favorites ---
    ToggleFavorite,
    MoveFavorite(isize),
    CycleFavoriteColor,
    ActivateFavorite(usize),

    // --- Async Results ---
    MetadataLoaded {
        ticket: Ticket,
        result: Result<Arc<Vec<EntityInfo>>, String>,
    },
    RecordsLoaded {
        ticket: Ticket,
        result: Result<Vec<RecordRef>, String>,
    },
    FetchXmlLoaded {
        ticket: Ticket,
        entity: EntityInfo,
        result: Result<Vec<RecordRef>, String>,
    },
    InfoLoaded {
        ticket: Ticket,
        result: Result<InfoPanel, String>,
    },
    BackgroundMessage(InboundMessage), // Reply delivered through the bridge
    PageTraffic(WireMessage),          // Something was posted to the host page
    ErrorOccurred(String),
}
