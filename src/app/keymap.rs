use super::action::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Key bindings. The host map applies while the palette is closed, the
/// palette map while it is open; unbound keys go to the focused text field.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMap {
    pub host: HashMap<KeyEvent, Action>,
    pub palette: HashMap<KeyEvent, Action>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut host = HashMap::new();
        let mut palette = HashMap::new();
        let ctrl_shift = KeyModifiers::CONTROL | KeyModifiers::SHIFT;

        // --- Host screen ---
        host.insert(key(KeyCode::Char('q')), Action::Quit);
        for c in ['p', 'P'] {
            host.insert(with(KeyCode::Char(c), ctrl_shift), Action::OpenPalette { command: None });
        }
        host.insert(with(KeyCode::Char('p'), KeyModifiers::CONTROL), Action::QuickOpen);

        // --- Palette ---
        for c in ['p', 'P'] {
            palette.insert(with(KeyCode::Char(c), ctrl_shift), Action::OpenPalette { command: None });
        }
        palette.insert(key(KeyCode::Esc), Action::ClosePalette);
        palette.insert(key(KeyCode::Down), Action::SelectNext);
        palette.insert(key(KeyCode::Up), Action::SelectPrev);
        palette.insert(key(KeyCode::Enter), Action::Activate);
        palette.insert(with(KeyCode::Char('p'), KeyModifiers::CONTROL), Action::QuickOpen);
        palette.insert(with(KeyCode::Char('f'), KeyModifiers::CONTROL), Action::ToggleFavorite);
        palette.insert(with(KeyCode::Char('b'), KeyModifiers::CONTROL), Action::CycleFavoriteColor);
        palette.insert(with(KeyCode::Left, KeyModifiers::CONTROL), Action::MoveFavorite(-1));
        palette.insert(with(KeyCode::Right, KeyModifiers::CONTROL), Action::MoveFavorite(1));
        for (i, c) in ('1'..='8').enumerate() {
            palette.insert(with(KeyCode::Char(c), KeyModifiers::ALT), Action::ActivateFavorite(i));
        }
        palette.insert(key(KeyCode::Tab), Action::ToggleFetchFocus);
        palette.insert(key(KeyCode::F(5)), Action::RunFetchXml);
        palette.insert(with(KeyCode::Enter, KeyModifiers::CONTROL), Action::RunFetchXml);

        Self { host, palette }
    }
}

impl KeyMap {
    pub fn host_action(&self, event: KeyEvent) -> Option<Action> {
        self.host.get(&normalize(event)).cloned()
    }

    pub fn palette_action(&self, event: KeyEvent) -> Option<Action> {
        self.palette.get(&normalize(event)).cloned()
    }
}

/// Lookup key: code and modifiers only.
fn normalize(event: KeyEvent) -> KeyEvent {
    KeyEvent::new(event.code, event.modifiers)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}

fn with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}
