use super::info::{environment_panel, metadata_panel, record_panel, roles_panel};
use crate::app::{action::Action, command::Command, persistence, session::PaletteSession};
use crate::domain::host::HostApi;
use crate::domain::models::{EntityInfo, InfoPanel};
use crate::domain::protocol::{OutboundMessage, PageRequest, PageResponse};
use crate::infrastructure::bridge::{BackgroundPort, Bridge, PageChannel};
use crate::infrastructure::metadata_cache::EntityMetadataCache;
use crate::infrastructure::storage::KeyValueStore;
use crate::infrastructure::web_api::project_records;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Timing and size knobs of the effect interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    pub result_limit: usize,
    pub user_search_debounce: Duration,
    pub record_search_debounce: Duration,
    pub page_request_timeout: Duration,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            result_limit: 20,
            user_search_debounce: Duration::from_millis(100),
            record_search_debounce: Duration::from_millis(250),
            page_request_timeout: Duration::from_secs(10),
        }
    }
}

/// Everything commands run against.
#[derive(Clone)]
pub struct Services {
    pub host: Arc<dyn HostApi>,
    pub background: Arc<dyn BackgroundPort>,
    pub bridge: Bridge,
    pub page: PageChannel,
    pub metadata: Arc<EntityMetadataCache>,
    pub store: Arc<dyn KeyValueStore>,
    pub tuning: Tuning,
}

pub fn handle_command(
    command: Command,
    services: &Services,
    session: &mut Option<PaletteSession>,
    tx: mpsc::Sender<Action>,
) -> Result<()> {
    match command {
        Command::OpenSession => {
            *session = Some(PaletteSession::open(
                &services.bridge,
                tx,
                services.tuning.user_search_debounce,
                services.tuning.record_search_debounce,
            ));
        }
        Command::CloseSession => {
            session.take();
        }
        Command::Send(message) => {
            let background = Arc::clone(&services.background);
            tokio::spawn(async move { send(background.as_ref(), &message, &tx).await });
        }
        Command::LoadMetadata { ticket, force } => {
            let metadata = Arc::clone(&services.metadata);
            tokio::spawn(async move {
                let result = metadata.load(force).await.map_err(|e| e.to_string());
                let _ = tx.send(Action::MetadataLoaded { ticket, result }).await;
            });
        }
        Command::SearchRecords {
            ticket,
            entity,
            text,
        } => {
            let Some(session) = session.as_mut() else {
                tracing::debug!("record search without an open palette");
                return Ok(());
            };
            let host = Arc::clone(&services.host);
            let limit = services.tuning.result_limit;
            session.record_search.schedule(async move {
                let result = host
                    .search_records(&entity, &text, limit)
                    .await
                    .map_err(|e| e.to_string());
                let _ = tx.send(Action::RecordsLoaded { ticket, result }).await;
            });
        }
        Command::SearchUsers { user_name } => {
            let Some(session) = session.as_mut() else {
                tracing::debug!("user search without an open palette");
                return Ok(());
            };
            let background = Arc::clone(&services.background);
            session.user_search.schedule(async move {
                let message = OutboundMessage::SearchUsers { user_name };
                send(background.as_ref(), &message, &tx).await;
            });
        }
        Command::CancelSearches => {
            if let Some(session) = session.as_mut() {
                session.cancel_searches();
            }
        }
        Command::RunFetchXml {
            ticket,
            xml,
            entity_name,
        } => {
            let host = Arc::clone(&services.host);
            let metadata = Arc::clone(&services.metadata);
            tokio::spawn(async move {
                let entity = resolve_entity(&metadata, &entity_name).await;
                let result = host
                    .execute_fetch_xml(&entity, &xml)
                    .await
                    .map(|rows| project_records(&entity, &rows))
                    .map_err(|e| e.to_string());
                let _ = tx
                    .send(Action::FetchXmlLoaded {
                        ticket,
                        entity,
                        result,
                    })
                    .await;
            });
        }
        Command::LoadRecordDetails { ticket, entity, id } => {
            let host = Arc::clone(&services.host);
            let metadata = Arc::clone(&services.metadata);
            tokio::spawn(async move {
                let entity = resolve_entity(&metadata, &entity).await;
                let result = host
                    .record_name(&entity, &id)
                    .await
                    .map(|name| record_panel(&entity, &id, name))
                    .map_err(|e| e.to_string());
                let _ = tx.send(Action::InfoLoaded { ticket, result }).await;
            });
        }
        Command::LoadRoles { ticket } => {
            let page = services.page.clone();
            let timeout = services.tuning.page_request_timeout;
            tokio::spawn(async move {
                let result = page
                    .request(PageRequest::MyRoles, timeout)
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|response| match response {
                        PageResponse::MyRoles(roles) => Ok(roles_panel(roles)),
                        other => Err(format!("unexpected page response {other:?}")),
                    });
                let _ = tx.send(Action::InfoLoaded { ticket, result }).await;
            });
        }
        Command::LoadEntityMetadata { ticket, entity } => {
            let page = services.page.clone();
            let timeout = services.tuning.page_request_timeout;
            tokio::spawn(async move {
                let request = PageRequest::EntityMetadata(entity.clone());
                let result = page
                    .request(request, timeout)
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|response| match response {
                        PageResponse::EntityMetadata(map) => Ok(metadata_panel(&entity, &map)),
                        other => Err(format!("unexpected page response {other:?}")),
                    });
                let _ = tx.send(Action::InfoLoaded { ticket, result }).await;
            });
        }
        Command::LoadEnvironment { ticket, app_id } => {
            let host = Arc::clone(&services.host);
            tokio::spawn(async move {
                let result: Result<InfoPanel, String> = host
                    .organization_details()
                    .await
                    .map(|details| environment_panel(&details, app_id.as_deref()))
                    .map_err(|e| e.to_string());
                let _ = tx.send(Action::InfoLoaded { ticket, result }).await;
            });
        }
        Command::SaveFavorites(favorites) => {
            if let Err(e) = persistence::save_favorites(services.store.as_ref(), &favorites) {
                tracing::warn!(error = %e, "could not save favorites");
                let _ = tx.try_send(Action::ErrorOccurred(format!("Could not save favorites: {e}")));
            }
        }
        Command::Batch(commands) => {
            for command in commands {
                handle_command(command, services, session, tx.clone())?;
            }
        }
    }
    Ok(())
}

async fn send(background: &dyn BackgroundPort, message: &OutboundMessage, tx: &mpsc::Sender<Action>) {
    let wire = message.to_wire();
    tracing::info!(kind = %wire.kind, category = %wire.category, "sending to background");
    if let Err(e) = background.send(wire).await {
        tracing::warn!(error = %e, "background rejected message");
        let _ = tx.send(Action::ErrorOccurred(e.to_string())).await;
    }
}

/// The cached definition of `logical_name`, or a best guess when the
/// metadata list is unavailable or does not know it.
async fn resolve_entity(metadata: &EntityMetadataCache, logical_name: &str) -> EntityInfo {
    match metadata.load(false).await {
        Ok(entities) => entities
            .iter()
            .find(|e| e.logical_name == logical_name)
            .cloned()
            .unwrap_or_else(|| EntityInfo::guessed(logical_name)),
        Err(e) => {
            tracing::debug!(error = %e, "metadata unavailable; guessing entity definition");
            EntityInfo::guessed(logical_name)
        }
    }
}
