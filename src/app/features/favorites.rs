use super::palette::execute_command;
use crate::app::{
    action::{Action, UpdateResult},
    command::Command,
    state::{AppState, Step},
    view::selected_command,
};
use crate::domain::favorites::{ToggleOutcome, MAX_FAVORITES};

pub fn update(state: &mut AppState, action: &Action) -> UpdateResult {
    match action {
        Action::ToggleFavorite => UpdateResult::Handled(toggle(state)),
        Action::MoveFavorite(delta) => UpdateResult::Handled(move_selected(state, *delta)),
        Action::CycleFavoriteColor => {
            let id = selected(state);
            let changed = id.and_then(|id| state.favorites.cycle_color(&id));
            UpdateResult::Handled(changed.map(|_| save(state)))
        }
        Action::ActivateFavorite(index) => UpdateResult::Handled(activate(state, *index)),
        _ => UpdateResult::NotHandled,
    }
}

fn selected(state: &AppState) -> Option<String> {
    selected_command(state, state.palette.as_ref()?)
}

fn save(state: &AppState) -> Command {
    Command::SaveFavorites(state.favorites.clone())
}

fn toggle(state: &mut AppState) -> Option<Command> {
    let id = selected(state)?;
    match state.favorites.toggle(&id) {
        ToggleOutcome::Full => {
            state.show_toast(format!("You can pin up to {MAX_FAVORITES} favorites"));
            None
        }
        ToggleOutcome::Added | ToggleOutcome::Removed => Some(save(state)),
    }
}

fn move_selected(state: &mut AppState, delta: isize) -> Option<Command> {
    let id = selected(state)?;
    let from = state.favorites.position(&id)?;
    let to = from.checked_add_signed(delta)?;
    state.favorites.move_item(from, to).then(|| save(state))
}

fn activate(state: &mut AppState, index: usize) -> Option<Command> {
    if state.palette.as_ref()?.step != Step::Commands {
        return None;
    }
    let id = state.favorites.get(index)?.id.clone();
    execute_command(state, &id)
}
