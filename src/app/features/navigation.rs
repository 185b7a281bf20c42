use super::{fetchxml, finish, impersonation, palette::execute_command, records};
use crate::app::{
    action::{Action, UpdateResult},
    command::Command,
    state::AppState,
    view::{self, ItemTarget},
};
use crate::domain::protocol::OutboundMessage;

pub fn update(state: &mut AppState, action: &Action) -> UpdateResult {
    match action {
        Action::SelectNext => {
            move_selection(state, 1);
            UpdateResult::Handled(None)
        }
        Action::SelectPrev => {
            move_selection(state, -1);
            UpdateResult::Handled(None)
        }
        Action::SelectIndex(idx) => {
            select(state, *idx);
            UpdateResult::Handled(None)
        }
        Action::ActivateIndex(idx) => {
            if select(state, *idx) {
                UpdateResult::Handled(activate(state))
            } else {
                UpdateResult::Handled(None)
            }
        }
        Action::Activate => UpdateResult::Handled(activate(state)),
        _ => UpdateResult::NotHandled,
    }
}

fn item_count(state: &AppState) -> usize {
    state
        .palette
        .as_ref()
        .map_or(0, |palette| view::items(state, palette).len())
}

/// Moves the cursor, clamped to the list.
fn move_selection(state: &mut AppState, delta: isize) {
    let count = item_count(state);
    if let Some(palette) = state.palette.as_mut() {
        let last = count.saturating_sub(1);
        palette.selected = palette
            .selected
            .saturating_add_signed(delta)
            .min(last);
    }
}

fn select(state: &mut AppState, idx: usize) -> bool {
    let count = item_count(state);
    match state.palette.as_mut() {
        Some(palette) if idx < count => {
            palette.selected = idx;
            true
        }
        _ => false,
    }
}

/// Enter: acts on the row under the cursor. A GUID typed in the record step
/// is accepted as-is when no row is selectable.
fn activate(state: &mut AppState) -> Option<Command> {
    let palette = state.palette.as_ref()?;
    let Some(item) = view::items(state, palette).into_iter().nth(palette.selected) else {
        let id = records::typed_guid(state)?;
        return records::open_record(state, &id);
    };
    match item.target {
        ItemTarget::Command(id) => execute_command(state, &id),
        ItemTarget::Entity(entity) => records::pick_entity(state, entity),
        ItemTarget::Record(record) => records::open_record(state, &record.id),
        ItemTarget::EntityList(entity) => finish(
            state,
            OutboundMessage::OpenList {
                entity: entity.logical_name,
            },
        ),
        ItemTarget::User(user) => impersonation::pick_user(state, user),
        ItemTarget::FetchRecord(record) => fetchxml::open_result(state, record),
    }
}
