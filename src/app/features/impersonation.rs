use super::finish;
use crate::app::{
    action::{Action, UpdateResult},
    command::Command,
    state::{AppState, Step},
};
use crate::domain::models::UserInfo;
use crate::domain::protocol::{ImpersonationResponse, InboundMessage, OutboundMessage};

pub const NO_PERMISSION: &str = "You do not have impersonation permissions";

pub fn update(state: &mut AppState, action: &Action) -> UpdateResult {
    match action {
        Action::BackgroundMessage(message) => {
            UpdateResult::Handled(background_message(state, message.clone()))
        }
        _ => UpdateResult::NotHandled,
    }
}

/// Enters user search and asks the background whether impersonation is
/// allowed at all (an empty search).
pub fn enter(state: &mut AppState) -> Option<Command> {
    let palette = state.palette.as_mut()?;
    palette.push_step("Impersonate", Step::ImpersonateSearch);
    palette.checking_impersonation = true;
    palette.progress = Some("Checking permissions...".to_string());
    Some(Command::Send(OutboundMessage::SearchUsers {
        user_name: String::new(),
    }))
}

pub fn query_changed(state: &mut AppState) -> Option<Command> {
    let min_len = state.limits.min_user_query;
    let palette = state.palette.as_mut()?;
    let text = palette.query_text();
    palette.users.clear();
    if text.chars().count() >= min_len {
        palette.progress = Some("Loading...".to_string());
        Some(Command::SearchUsers { user_name: text })
    } else {
        palette.progress = None;
        Some(Command::CancelSearches)
    }
}

fn background_message(state: &mut AppState, message: InboundMessage) -> Option<Command> {
    let Some(palette) = state.palette.as_mut() else {
        tracing::debug!("no open palette; dropping background reply");
        return None;
    };
    if palette.step != Step::ImpersonateSearch {
        tracing::debug!(step = ?palette.step, "background reply not expected in this step");
        return None;
    }

    let (response, is_results) = match message {
        InboundMessage::UserSearchResults(response) => (response, true),
        InboundMessage::ImpersonationStatus(response) => (response, false),
    };
    let ImpersonationResponse {
        users,
        impersonate_request,
        user_name,
    } = response;

    if !impersonate_request.can_impersonate {
        return deny(state);
    }
    if !is_results {
        palette.checking_impersonation = false;
        palette.progress = None;
        return None;
    }
    if let Some(echo) = user_name {
        if echo != palette.query_text() {
            tracing::debug!(echo = %echo, "discarding user search for an older query");
            return None;
        }
    }
    palette.checking_impersonation = false;
    palette.progress = None;
    palette.users = users;
    palette.selected = 0;
    None
}

fn deny(state: &mut AppState) -> Option<Command> {
    state.show_toast(NO_PERMISSION);
    let palette = state.palette.as_mut()?;
    palette.pills.pop();
    palette.return_to_commands();
    Some(Command::CancelSearches)
}

pub fn pick_user(state: &mut AppState, user: UserInfo) -> Option<Command> {
    let url = format!("{}/", state.origin.trim_end_matches('/'));
    finish(state, OutboundMessage::Impersonate { user, url })
}
