use crate::app::{
    action::Action,
    state::{AppState, FetchFocus, PaletteState, Step},
    view,
};
use crate::components::modals::{chip_areas, helpers::contains, PaletteLayout};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Rect, Size};

pub fn map_event_to_action(
    event: Event,
    app_state: &AppState<'_>,
    terminal_size: Size,
) -> Option<Action> {
    match event {
        Event::Key(key) => {
            if key.kind == KeyEventKind::Release {
                return None;
            }
            map_key(key, app_state)
        }
        Event::Mouse(mouse) => {
            let area = Rect::new(0, 0, terminal_size.width, terminal_size.height);
            map_mouse(mouse, app_state, area)
        }
        Event::Resize(w, h) => Some(Action::Resize(w, h)),
        _ => None,
    }
}

fn map_key(key: KeyEvent, app_state: &AppState<'_>) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    let Some(palette) = &app_state.palette else {
        return app_state.keymap.host_action(key);
    };

    match palette.step {
        Step::FetchXml if palette.fetch_focus == FetchFocus::Editor => Some(fetch_editor_key(key)),
        step if step.is_info() && key.code == KeyCode::Backspace => Some(Action::Back),
        _ => app_state
            .keymap
            .palette_action(key)
            .or(Some(Action::QueryInput(key))),
    }
}

/// The FetchXML editor takes every key except the few that leave it.
fn fetch_editor_key(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Action::ClosePalette,
        KeyCode::Enter if ctrl => Action::RunFetchXml,
        KeyCode::F(5) => Action::RunFetchXml,
        KeyCode::Tab => Action::ToggleFetchFocus,
        _ => Action::FetchEditorInput(key),
    }
}

fn map_mouse(mouse: MouseEvent, app_state: &AppState<'_>, area: Rect) -> Option<Action> {
    let palette = app_state.palette.as_ref()?;
    let layout = PaletteLayout::for_state(area, app_state, palette);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if !contains(layout.modal, mouse.column, mouse.row) {
                return Some(Action::ClosePalette);
            }
            if let Some(idx) = chip_at(app_state, palette, &layout, mouse.column, mouse.row) {
                return Some(Action::ActivateFavorite(idx));
            }
            layout
                .row_at(palette.selected, mouse.column, mouse.row)
                .map(Action::ActivateIndex)
        }
        MouseEventKind::ScrollUp => Some(Action::SelectPrev),
        MouseEventKind::ScrollDown => Some(Action::SelectNext),
        MouseEventKind::Moved => {
            let idx = layout.row_at(palette.selected, mouse.column, mouse.row)?;
            (idx != palette.selected).then_some(Action::SelectIndex(idx))
        }
        _ => None,
    }
}

fn chip_at(
    app_state: &AppState<'_>,
    palette: &PaletteState<'_>,
    layout: &PaletteLayout,
    column: u16,
    row: u16,
) -> Option<usize> {
    if !contains(layout.chips, column, row) {
        return None;
    }
    let chips = view::favorite_chips(app_state, palette);
    chip_areas(layout.chips, &chips)
        .iter()
        .position(|chip| contains(*chip, column, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::favorites::Favorites;
    use crate::domain::models::FavCommand;

    const SIZE: Size = Size {
        width: 100,
        height: 40,
    };

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn open_state<'a>() -> AppState<'a> {
        let mut state = AppState::default();
        state.palette = Some(PaletteState::new(None));
        state
    }

    #[test]
    fn test_host_keys() {
        let state = AppState::default();
        let ctrl_shift_p = Event::Key(KeyEvent::new(
            KeyCode::Char('P'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ));
        assert_eq!(
            map_event_to_action(ctrl_shift_p, &state, SIZE),
            Some(Action::OpenPalette { command: None })
        );
        assert_eq!(map_event_to_action(key(KeyCode::Char('q')), &state, SIZE), Some(Action::Quit));
        assert_eq!(map_event_to_action(key(KeyCode::Char('x')), &state, SIZE), None);
    }

    #[test]
    fn test_palette_keys_fall_through_to_query() {
        let state = open_state();
        assert_eq!(map_event_to_action(key(KeyCode::Esc), &state, SIZE), Some(Action::ClosePalette));
        assert_eq!(map_event_to_action(key(KeyCode::Enter), &state, SIZE), Some(Action::Activate));
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(
            map_event_to_action(Event::Key(q), &state, SIZE),
            Some(Action::QueryInput(q))
        );
    }

    #[test]
    fn test_fetch_editor_owns_enter() {
        let mut state = open_state();
        if let Some(palette) = state.palette.as_mut() {
            palette.push_step("FetchXML", Step::FetchXml);
        }
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(
            map_event_to_action(Event::Key(enter), &state, SIZE),
            Some(Action::FetchEditorInput(enter))
        );
        let ctrl_enter = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL));
        assert_eq!(map_event_to_action(ctrl_enter, &state, SIZE), Some(Action::RunFetchXml));
        assert_eq!(map_event_to_action(key(KeyCode::Tab), &state, SIZE), Some(Action::ToggleFetchFocus));
    }

    #[test]
    fn test_clicks() {
        let state = open_state();
        let palette = state.palette.as_ref().unwrap();
        let layout = PaletteLayout::for_state(Rect::new(0, 0, 100, 40), &state, palette);

        assert_eq!(
            map_event_to_action(click(layout.list.x + 2, layout.list.y + 1), &state, SIZE),
            Some(Action::ActivateIndex(1))
        );
        assert_eq!(map_event_to_action(click(0, 39), &state, SIZE), Some(Action::ClosePalette));
        assert_eq!(
            map_event_to_action(click(layout.header.x + 1, layout.header.y), &state, SIZE),
            None
        );
    }

    #[test]
    fn test_chip_click_activates_favorite() {
        let mut state = open_state();
        state.favorites = Favorites::new(vec![FavCommand::new("myRoles"), FavCommand::new("godMode")]);
        let palette = state.palette.as_ref().unwrap();
        let layout = PaletteLayout::for_state(Rect::new(0, 0, 100, 40), &state, palette);
        assert_eq!(layout.chips.height, 1);

        let chips = view::favorite_chips(&state, palette);
        let second = chip_areas(layout.chips, &chips)[1];
        assert_eq!(
            map_event_to_action(click(second.x, second.y), &state, SIZE),
            Some(Action::ActivateFavorite(1))
        );
    }
}
