use super::{fetchxml, finish, impersonation, info, records};
use crate::app::{
    action::{Action, UpdateResult},
    command::Command,
    state::{AppState, PaletteState, Step, ENTITY_TIP, OPEN_TIP},
};
use crate::domain::catalog::{find_command, CommandKind};
use crate::domain::protocol::OutboundMessage;
use crossterm::event::{KeyCode, KeyEvent};

pub const QUICK_OPEN_COMMAND: &str = "openRecordSpotlight";

pub fn update(state: &mut AppState, action: &Action) -> UpdateResult {
    match action {
        Action::OpenPalette { command } => UpdateResult::Handled(open(state, command.as_deref())),
        Action::QuickOpen => UpdateResult::Handled(quick_open(state)),
        Action::ClosePalette => UpdateResult::Handled(close(state)),
        Action::Back => UpdateResult::Handled(back(state)),
        Action::QueryInput(key) => UpdateResult::Handled(query_input(state, *key)),
        _ => UpdateResult::NotHandled,
    }
}

fn open(state: &mut AppState, command: Option<&str>) -> Option<Command> {
    if state.palette.is_some() {
        // Never a second palette.
        return command.and_then(|id| restart_with(state, id));
    }
    let tip = state.show_open_tip.then(|| OPEN_TIP.to_string());
    state.show_open_tip = false;
    state.palette = Some(PaletteState::new(tip));
    tracing::debug!(command = ?command, "palette opened");

    let mut commands = vec![Command::OpenSession];
    commands.extend(command.and_then(|id| execute_command(state, id)));
    Some(Command::Batch(commands))
}

/// Resets the open session to the command list and runs `id` in it.
fn restart_with(state: &mut AppState, id: &str) -> Option<Command> {
    state.palette.as_mut()?.reset_to_commands();
    let mut commands = vec![Command::CancelSearches];
    commands.extend(execute_command(state, id));
    Some(Command::Batch(commands))
}

fn quick_open(state: &mut AppState) -> Option<Command> {
    if state.palette.is_some() {
        restart_with(state, QUICK_OPEN_COMMAND)
    } else {
        open(state, Some(QUICK_OPEN_COMMAND))
    }
}

fn close(state: &mut AppState) -> Option<Command> {
    state.palette.take().map(|_| {
        tracing::debug!("palette closed");
        Command::CloseSession
    })
}

/// Pops one pill. From the record step this returns to entity search with
/// the loaded metadata kept; every other step returns to the command list.
pub fn back(state: &mut AppState) -> Option<Command> {
    let ticket = state.issue_ticket();
    let palette = state.palette.as_mut()?;
    match palette.step {
        Step::Commands => None,
        Step::OpenRecordId => {
            palette.pills.pop();
            palette.selected_entity = None;
            palette.records.clear();
            palette.enter_step(Step::OpenRecordEntity);
            palette.tip = Some(ENTITY_TIP.to_string());
            if palette.metadata.is_empty() {
                palette.pending.metadata = Some(ticket);
                palette.progress = Some("Loading metadata...".to_string());
                return Some(Command::Batch(vec![
                    Command::CancelSearches,
                    Command::LoadMetadata {
                        ticket,
                        force: false,
                    },
                ]));
            }
            Some(Command::CancelSearches)
        }
        _ => {
            palette.pills.pop();
            palette.return_to_commands();
            Some(Command::CancelSearches)
        }
    }
}

fn query_input(state: &mut AppState, key: KeyEvent) -> Option<Command> {
    let palette = state.palette.as_mut()?;
    if !palette.step.has_query() {
        return None;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => return None,
        KeyCode::Backspace if palette.query.is_blank() => return back(state),
        _ => {}
    }

    let before = palette.query.text();
    palette.query.input(key);
    if palette.query.lines().len() > 1 {
        let flat = palette.query.lines().concat();
        palette.query.set_text(&flat);
    }
    if palette.query.text() == before {
        return None;
    }
    palette.selected = 0;
    match palette.step {
        Step::OpenRecordId => records::query_changed(state),
        Step::ImpersonateSearch => impersonation::query_changed(state),
        _ => None,
    }
}

/// Runs catalog command `id` inside the open palette.
pub fn execute_command(state: &mut AppState, id: &str) -> Option<Command> {
    let Some(command) = find_command(&state.commands, id).cloned() else {
        tracing::warn!(id, "unknown command");
        return None;
    };
    tracing::debug!(id, "executing command");
    match CommandKind::from_id(id) {
        CommandKind::QuickOpen => records::enter_entity_step(state, "Open", Step::OpenRecordEntity),
        CommandKind::OpenList => records::enter_entity_step(state, "List", Step::OpenListEntity),
        CommandKind::NewRecord => records::enter_entity_step(state, "New", Step::NewRecordEntity),
        CommandKind::RefreshMetadata => records::refresh_metadata(state),
        CommandKind::FetchXml => fetchxml::enter(state),
        CommandKind::RecordDetails => info::enter_record_details(state),
        CommandKind::MyRoles => info::enter_roles(state),
        CommandKind::EntityMetadata => info::enter_entity_metadata(state),
        CommandKind::EnvironmentDetails => info::enter_environment(state),
        CommandKind::Impersonate => impersonation::enter(state),
        CommandKind::ResetImpersonation => finish(state, OutboundMessage::ResetImpersonation),
        CommandKind::Plain => finish(
            state,
            OutboundMessage::Command {
                id: command.id,
                category: command.category,
            },
        ),
    }
}
