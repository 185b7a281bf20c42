//! Read-only info steps: record details, security roles, entity metadata
//! and environment details.

use crate::app::{
    action::{Action, UpdateResult},
    command::Command,
    state::{AppState, Step, Ticket},
};
use crate::domain::models::{EntityInfo, InfoPanel, InfoRow, RoleInfo};
use serde_json::{Map, Value};

pub fn update(state: &mut AppState, action: &Action) -> UpdateResult {
    match action {
        Action::InfoLoaded { ticket, result } => {
            UpdateResult::Handled(loaded(state, *ticket, result.clone()))
        }
        _ => UpdateResult::NotHandled,
    }
}

pub fn enter_record_details(state: &mut AppState) -> Option<Command> {
    let (Some(entity), Some(id)) = (state.context.entity.clone(), state.context.record_id.clone())
    else {
        state.show_toast("No record context");
        return None;
    };
    let ticket = state.issue_ticket();
    let palette = state.palette.as_mut()?;
    palette.push_step("Details", Step::EntityInfoDisplay);
    palette.info = Some(InfoPanel {
        title: "Record Details".to_string(),
        rows: vec![InfoRow::new("Entity", &entity), InfoRow::new("Id", &id)],
        empty_message: None,
    });
    palette.pending.info = Some(ticket);
    palette.progress = Some("Loading details...".to_string());
    Some(Command::LoadRecordDetails { ticket, entity, id })
}

pub fn enter_roles(state: &mut AppState) -> Option<Command> {
    let ticket = begin(state, "Roles", "Loading roles...")?;
    Some(Command::LoadRoles { ticket })
}

pub fn enter_entity_metadata(state: &mut AppState) -> Option<Command> {
    let Some(entity) = state.context.entity.clone() else {
        state.show_toast("No entity context");
        return None;
    };
    let ticket = begin(state, "Metadata", "Loading metadata...")?;
    Some(Command::LoadEntityMetadata { ticket, entity })
}

pub fn enter_environment(state: &mut AppState) -> Option<Command> {
    let app_id = state.context.app_id.clone();
    let ticket = begin(state, "Environment", "Loading details...")?;
    Some(Command::LoadEnvironment { ticket, app_id })
}

fn begin(state: &mut AppState, pill: &str, progress: &str) -> Option<Ticket> {
    let ticket = state.issue_ticket();
    let palette = state.palette.as_mut()?;
    palette.push_step(pill, Step::EnvironmentInfoDisplay);
    palette.info = None;
    palette.pending.info = Some(ticket);
    palette.progress = Some(progress.to_string());
    Some(ticket)
}

fn loaded(state: &mut AppState, ticket: Ticket, result: Result<InfoPanel, String>) -> Option<Command> {
    let palette = state.palette.as_mut()?;
    if palette.pending.info != Some(ticket) {
        tracing::debug!(ticket = ticket.0, "discarding stale info result");
        return None;
    }
    palette.pending.info = None;
    palette.progress = None;
    match result {
        Ok(panel) => palette.info = Some(panel),
        Err(err) => {
            tracing::warn!(error = %err, "info lookup failed");
            palette
                .info
                .get_or_insert_with(InfoPanel::default)
                .empty_message = Some("Details are unavailable".to_string());
        }
    }
    None
}

#[must_use]
pub fn record_panel(entity: &EntityInfo, id: &str, name: Option<String>) -> InfoPanel {
    InfoPanel {
        title: "Record Details".to_string(),
        rows: vec![
            InfoRow::new("Entity", &entity.logical_name),
            InfoRow::new("Display name", &entity.display_name),
            InfoRow::new("Id", id),
            InfoRow::new(
                "Primary name",
                name.unwrap_or_else(|| "(no name)".to_string()),
            ),
        ],
        empty_message: None,
    }
}

#[must_use]
pub fn roles_panel(mut roles: Vec<RoleInfo>) -> InfoPanel {
    roles.sort_by(|a, b| a.name.cmp(&b.name));
    InfoPanel {
        title: "My Security Roles".to_string(),
        empty_message: roles
            .is_empty()
            .then(|| "No security roles found".to_string()),
        rows: roles
            .into_iter()
            .map(|r| InfoRow::new(r.name, r.roleid))
            .collect(),
    }
}

#[must_use]
pub fn metadata_panel(entity: &str, metadata: &Map<String, Value>) -> InfoPanel {
    InfoPanel::from_json_object(&format!("Entity Metadata: {entity}"), metadata)
}

#[must_use]
pub fn environment_panel(details: &Map<String, Value>, app_id: Option<&str>) -> InfoPanel {
    let mut panel = InfoPanel::from_json_object("Environment Details", details);
    if let Some(app_id) = app_id {
        panel.rows.push(InfoRow::new("AppId", app_id));
    }
    panel
}
