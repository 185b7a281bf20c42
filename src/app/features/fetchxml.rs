use super::{finish, palette::back};
use crate::app::{
    action::{Action, UpdateResult},
    command::Command,
    state::{AppState, FetchFocus, Step, Ticket},
};
use crate::domain::models::{EntityInfo, RecordRef};
use crate::domain::protocol::OutboundMessage;
use crate::domain::query::fetch_xml_entity;
use crossterm::event::{KeyCode, KeyEvent};

pub fn update(state: &mut AppState, action: &Action) -> UpdateResult {
    match action {
        Action::FetchEditorInput(key) => UpdateResult::Handled(editor_input(state, *key)),
        Action::ToggleFetchFocus => {
            if let Some(palette) = state.palette.as_mut().filter(|p| p.step == Step::FetchXml) {
                palette.fetch_focus = match palette.fetch_focus {
                    FetchFocus::Editor if !palette.fetch_results.is_empty() => FetchFocus::Results,
                    _ => FetchFocus::Editor,
                };
            }
            UpdateResult::Handled(None)
        }
        Action::RunFetchXml => UpdateResult::Handled(run(state)),
        Action::FetchXmlLoaded {
            ticket,
            entity,
            result,
        } => UpdateResult::Handled(loaded(state, *ticket, entity.clone(), result.clone())),
        _ => UpdateResult::NotHandled,
    }
}

pub fn enter(state: &mut AppState) -> Option<Command> {
    let palette = state.palette.as_mut()?;
    palette.push_step("FetchXML", Step::FetchXml);
    palette.fetch_focus = FetchFocus::Editor;
    palette.fetch_results.clear();
    palette.fetch_entity = None;
    None
}

fn editor_input(state: &mut AppState, key: KeyEvent) -> Option<Command> {
    let palette = state.palette.as_mut()?;
    if palette.step != Step::FetchXml {
        return None;
    }
    if key.code == KeyCode::Backspace && palette.fetch_editor.text().is_empty() {
        return back(state);
    }
    palette.fetch_focus = FetchFocus::Editor;
    palette.fetch_editor.input(key);
    None
}

fn run(state: &mut AppState) -> Option<Command> {
    let ticket = state.issue_ticket();
    let palette = state.palette.as_mut()?;
    if palette.step != Step::FetchXml {
        return None;
    }
    let xml = palette.fetch_editor.text();
    let entity_name = if xml.trim().is_empty() {
        Err("Enter a FetchXML query first")
    } else {
        fetch_xml_entity(&xml).ok_or("FetchXML needs an <entity name=\"...\"> element")
    };
    match entity_name {
        Ok(entity_name) => {
            palette.pending.fetch = Some(ticket);
            palette.progress = Some("Running query...".to_string());
            Some(Command::RunFetchXml {
                ticket,
                xml,
                entity_name,
            })
        }
        Err(message) => {
            state.show_toast(message);
            None
        }
    }
}

fn loaded(
    state: &mut AppState,
    ticket: Ticket,
    entity: EntityInfo,
    result: Result<Vec<RecordRef>, String>,
) -> Option<Command> {
    let palette = state.palette.as_mut()?;
    if palette.pending.fetch != Some(ticket) {
        tracing::debug!(ticket = ticket.0, "discarding stale FetchXML results");
        return None;
    }
    palette.pending.fetch = None;
    palette.progress = None;
    palette.selected = 0;
    match result {
        Ok(records) => {
            palette.fetch_focus = if records.is_empty() {
                FetchFocus::Editor
            } else {
                FetchFocus::Results
            };
            palette.fetch_results = records;
            palette.fetch_entity = Some(entity);
        }
        Err(err) => {
            tracing::warn!(error = %err, "FetchXML query failed");
            palette.fetch_results.clear();
            palette.fetch_focus = FetchFocus::Editor;
        }
    }
    None
}

pub fn open_result(state: &mut AppState, record: RecordRef) -> Option<Command> {
    let entity = state
        .palette
        .as_ref()?
        .fetch_entity
        .as_ref()?
        .logical_name
        .clone();
    finish(
        state,
        OutboundMessage::OpenRecord {
            entity,
            id: record.id,
        },
    )
}
