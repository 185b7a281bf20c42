use super::{
    action::{Action, UpdateResult},
    command::Command,
    features,
    state::AppState,
};

type Feature = fn(&mut AppState, &Action) -> UpdateResult;

/// Feature reducers, asked in order until one claims the action.
const FEATURES: [Feature; 8] = [
    features::ui::update,
    features::palette::update,
    features::navigation::update,
    features::records::update,
    features::impersonation::update,
    features::fetchxml::update,
    features::info::update,
    features::favorites::update,
];

pub fn update(state: &mut AppState, action: Action) -> Option<Command> {
    for feature in FEATURES {
        if let UpdateResult::Handled(command) = feature(state, &action) {
            return command;
        }
    }
    tracing::debug!(?action, "unhandled action");
    None
}
