//! In-process stand-in for the privileged in-page script: answers role and
//! entity metadata requests posted on the page channel.

use super::bridge::PageChannel;
use crate::domain::host::HostApi;
use crate::domain::protocol::{PageEnvelope, PageRequest, PageResponse, PAGE_TYPE};
use serde_json::Map;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub struct PageScript {
    host: Arc<dyn HostApi>,
    channel: PageChannel,
    client_url: String,
}

impl PageScript {
    pub fn new(host: Arc<dyn HostApi>, channel: PageChannel, client_url: impl Into<String>) -> Self {
        Self {
            host,
            channel,
            client_url: client_url.into(),
        }
    }

    /// Listens until the channel closes.
    pub fn spawn(self) -> JoinHandle<()> {
        let mut receiver = self.channel.subscribe();
        let script = Arc::new(self);
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(envelope) => {
                        if let Some(request) = script.accept(&envelope) {
                            let script = Arc::clone(&script);
                            tokio::spawn(async move { script.answer(request).await });
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "page script lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn accept(&self, envelope: &PageEnvelope) -> Option<PageRequest> {
        if envelope.message.bare_kind() == PAGE_TYPE {
            return None;
        }
        if !self.channel.trust().accepts(envelope) {
            tracing::debug!(origin = %envelope.origin, "page script ignoring untrusted message");
            return None;
        }
        PageRequest::from_wire(&envelope.message)
    }

    async fn answer(&self, request: PageRequest) {
        let response = match &request {
            PageRequest::MyRoles => match self.host.my_roles().await {
                Ok(roles) => PageResponse::MyRoles(roles),
                Err(err) => {
                    tracing::warn!(error = %err, "could not load security roles");
                    PageResponse::MyRoles(Vec::new())
                }
            },
            PageRequest::EntityMetadata(entity) => match self.host.entity_metadata(entity).await {
                Ok(metadata) => PageResponse::EntityMetadata(metadata),
                Err(err) => {
                    tracing::warn!(entity = %entity, error = %err, "could not load entity metadata");
                    PageResponse::EntityMetadata(Map::new())
                }
            },
        };
        self.channel.post(PageEnvelope {
            origin: self.channel.origin().to_string(),
            client_url: Some(self.client_url.clone()),
            message: response.to_wire(),
        });
    }
}
