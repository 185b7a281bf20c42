use super::finish;
use crate::app::{
    action::{Action, UpdateResult},
    command::Command,
    state::{AppState, Step, Ticket, ENTITY_TIP},
};
use crate::domain::models::{EntityInfo, RecordRef};
use crate::domain::protocol::OutboundMessage;
use crate::domain::query::{is_guid, normalize_guid};
use std::sync::Arc;

pub fn update(state: &mut AppState, action: &Action) -> UpdateResult {
    match action {
        Action::MetadataLoaded { ticket, result } => {
            UpdateResult::Handled(metadata_loaded(state, *ticket, result.clone()))
        }
        Action::RecordsLoaded { ticket, result } => {
            UpdateResult::Handled(records_loaded(state, *ticket, result.clone()))
        }
        _ => UpdateResult::NotHandled,
    }
}

/// Enters one of the entity search steps and asks for the metadata list.
pub fn enter_entity_step(state: &mut AppState, pill: &str, step: Step) -> Option<Command> {
    let ticket = state.issue_ticket();
    let palette = state.palette.as_mut()?;
    palette.push_step(pill, step);
    palette.tip = Some(ENTITY_TIP.to_string());
    palette.pending.metadata = Some(ticket);
    palette.progress = Some("Loading metadata...".to_string());
    Some(Command::LoadMetadata {
        ticket,
        force: false,
    })
}

pub fn refresh_metadata(state: &mut AppState) -> Option<Command> {
    let ticket = state.issue_ticket();
    let palette = state.palette.as_mut()?;
    palette.pending.metadata = Some(ticket);
    palette.progress = Some("Refreshing metadata...".to_string());
    Some(Command::LoadMetadata {
        ticket,
        force: true,
    })
}

fn metadata_loaded(
    state: &mut AppState,
    ticket: Ticket,
    result: Result<Arc<Vec<EntityInfo>>, String>,
) -> Option<Command> {
    let palette = state.palette.as_mut()?;
    if palette.pending.metadata != Some(ticket) {
        tracing::debug!(ticket = ticket.0, "discarding stale metadata result");
        return None;
    }
    palette.pending.metadata = None;
    palette.progress = None;
    let refreshed = palette.step == Step::Commands;

    let toast = match result {
        Ok(entities) => {
            let count = entities.len();
            palette.metadata = entities;
            palette.selected = 0;
            refreshed.then(|| format!("Entity metadata refreshed ({count} entities)"))
        }
        Err(err) => {
            tracing::warn!(error = %err, "entity metadata unavailable");
            refreshed.then(|| format!("Could not refresh entity metadata: {err}"))
        }
    };
    if let Some(message) = toast {
        state.show_toast(message);
    }
    None
}

/// Picking an entity either moves on to record search or finishes the flow.
pub fn pick_entity(state: &mut AppState, entity: EntityInfo) -> Option<Command> {
    let palette = state.palette.as_mut()?;
    let step = palette.step;
    match step {
        Step::OpenRecordEntity => {
            palette.push_step(entity.display_name.clone(), Step::OpenRecordId);
            palette.selected_entity = Some(entity);
            palette.records.clear();
            palette.tip = None;
            None
        }
        Step::OpenListEntity => finish(
            state,
            OutboundMessage::OpenList {
                entity: entity.logical_name,
            },
        ),
        Step::NewRecordEntity => finish(
            state,
            OutboundMessage::NewRecord {
                entity: entity.logical_name,
            },
        ),
        _ => None,
    }
}

/// Record step query handling: GUIDs resolve locally, long enough text is
/// searched after a pause, anything shorter clears the list.
pub fn query_changed(state: &mut AppState) -> Option<Command> {
    let ticket = state.issue_ticket();
    let min_len = state.limits.min_record_query;
    let palette = state.palette.as_mut()?;
    let entity = palette.selected_entity.clone()?;
    let text = palette.query_text();

    if is_guid(&text) {
        palette.records = vec![RecordRef::direct(&normalize_guid(&text))];
        palette.pending.records = None;
        palette.progress = None;
        return Some(Command::CancelSearches);
    }
    if text.chars().count() >= min_len {
        palette.pending.records = Some(ticket);
        palette.progress = Some("Searching...".to_string());
        return Some(Command::SearchRecords {
            ticket,
            entity,
            text,
        });
    }
    palette.records.clear();
    palette.pending.records = None;
    palette.progress = None;
    Some(Command::CancelSearches)
}

fn records_loaded(
    state: &mut AppState,
    ticket: Ticket,
    result: Result<Vec<RecordRef>, String>,
) -> Option<Command> {
    let palette = state.palette.as_mut()?;
    if palette.pending.records != Some(ticket) {
        tracing::debug!(ticket = ticket.0, "discarding stale record results");
        return None;
    }
    palette.pending.records = None;
    palette.progress = None;
    palette.selected = 0;
    match result {
        Ok(records) => palette.records = records,
        Err(err) => {
            tracing::warn!(error = %err, "record search failed");
            palette.records.clear();
        }
    }
    None
}

pub fn open_record(state: &mut AppState, id: &str) -> Option<Command> {
    let entity = state
        .palette
        .as_ref()?
        .selected_entity
        .as_ref()?
        .logical_name
        .clone();
    finish(
        state,
        OutboundMessage::OpenRecord {
            entity,
            id: id.to_string(),
        },
    )
}

/// GUID typed in the record step, normalized.
#[must_use]
pub fn typed_guid(state: &AppState) -> Option<String> {
    let palette = state.palette.as_ref()?;
    if palette.step != Step::OpenRecordId {
        return None;
    }
    let text = palette.query_text();
    is_guid(&text).then(|| normalize_guid(&text))
}
