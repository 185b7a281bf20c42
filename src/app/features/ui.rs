use crate::app::{
    action::{Action, UpdateResult},
    state::AppState,
};
use crate::domain::protocol::WireMessage;

pub fn update(state: &mut AppState, action: &Action) -> UpdateResult {
    match action {
        Action::Tick => {
            state.frame_count = state.frame_count.wrapping_add(1);
            if let Some(toast) = state.toast.as_mut() {
                toast.ticks_left = toast.ticks_left.saturating_sub(1);
                if toast.ticks_left == 0 {
                    state.toast = None;
                }
            }
            UpdateResult::Handled(None)
        }
        Action::Resize(_, _) => UpdateResult::Handled(None),
        Action::Quit => {
            state.should_quit = true;
            UpdateResult::Handled(None)
        }
        Action::PageTraffic(message) => {
            state.record_host_traffic(describe(message));
            UpdateResult::Handled(None)
        }
        Action::ErrorOccurred(message) => {
            state.show_toast(message.clone());
            UpdateResult::Handled(None)
        }
        _ => UpdateResult::NotHandled,
    }
}

/// One log line for the host screen.
fn describe(message: &WireMessage) -> String {
    let mut line = format!("{} [{}]", message.kind, message.category);
    if let Some(content) = &message.content {
        line.push(' ');
        line.push_str(&content.to_string());
    }
    line
}
