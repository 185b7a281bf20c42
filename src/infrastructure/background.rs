//! In-process stand-in for the extension's background process.
//!
//! Impersonation messages are handled here. Everything else is forwarded to
//! the page, where the host application executes it.

use super::bridge::{BackgroundPort, Bridge, PageChannel};
use super::storage::{impersonation_key, write_json, ImpersonationRecord, KeyValueStore};
use crate::domain::host::HostApi;
use crate::domain::protocol::{
    ImpersonateRequest, ImpersonationResponse, InboundMessage, WireMessage, CATEGORY_IMPERSONATION,
    PAGE_TYPE,
};
use crate::error::BridgeError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub struct BackgroundService {
    host: Arc<dyn HostApi>,
    store: Arc<dyn KeyValueStore>,
    bridge: Bridge,
    page: PageChannel,
    result_limit: usize,
}

impl BackgroundService {
    pub fn new(
        host: Arc<dyn HostApi>,
        store: Arc<dyn KeyValueStore>,
        bridge: Bridge,
        page: PageChannel,
        result_limit: usize,
    ) -> Self {
        Self {
            host,
            store,
            bridge,
            page,
            result_limit,
        }
    }

    fn environment_url(&self) -> String {
        format!("{}/", self.host.origin())
    }

    async fn search_users(&self, message: &WireMessage) -> Result<(), BridgeError> {
        let user_name = message
            .content
            .as_ref()
            .and_then(|c| c.get("userName"))
            .and_then(Value::as_str)
            .ok_or_else(|| BridgeError::Malformed {
                kind: message.kind.clone(),
                reason: "missing userName".to_string(),
            })?
            .to_string();

        let mut impersonate_request = ImpersonateRequest {
            is_active: false,
            url: self.environment_url(),
            can_impersonate: true,
        };
        let reply = match self.host.search_users(&user_name, self.result_limit).await {
            Ok(users) => InboundMessage::UserSearchResults(ImpersonationResponse {
                users,
                impersonate_request,
                user_name: Some(user_name),
            }),
            Err(err) if err.is_forbidden() => {
                tracing::info!(error = %err, "user search refused; impersonation not permitted");
                impersonate_request.can_impersonate = false;
                InboundMessage::ImpersonationStatus(ImpersonationResponse {
                    users: Vec::new(),
                    impersonate_request,
                    user_name: Some(user_name),
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "user search failed");
                InboundMessage::UserSearchResults(ImpersonationResponse {
                    users: Vec::new(),
                    impersonate_request,
                    user_name: Some(user_name),
                })
            }
        };
        self.bridge.deliver(&reply.to_wire());
        Ok(())
    }

    fn start_impersonation(&self, message: &WireMessage) -> Result<(), BridgeError> {
        let malformed = |reason: String| BridgeError::Malformed {
            kind: message.kind.clone(),
            reason,
        };
        let content = message
            .content
            .clone()
            .ok_or_else(|| malformed("missing content".to_string()))?;
        let response: ImpersonationResponse =
            serde_json::from_value(content).map_err(|e| malformed(e.to_string()))?;

        let request = &response.impersonate_request;
        let [user] = response.users.as_slice() else {
            return Err(BridgeError::Rejected(format!(
                "impersonation needs exactly one user, got {}",
                response.users.len()
            )));
        };
        if !request.can_impersonate {
            return Err(BridgeError::Rejected("impersonation not permitted".to_string()));
        }

        let record = ImpersonationRecord {
            is_active: request.is_active,
            user_id: user.user_id.clone(),
            user_name: user.user_name.clone(),
            user_full_name: user.full_name.clone(),
        };
        write_json(self.store.as_ref(), &impersonation_key(&self.host.origin()), &record)
            .map_err(|e| BridgeError::Rejected(e.to_string()))?;
        tracing::info!(user = %user.user_name, active = request.is_active, "impersonation updated");
        self.page.post_message(message.clone());
        Ok(())
    }

    fn reset_impersonation(&self, message: WireMessage) -> Result<(), BridgeError> {
        self.store
            .remove(&impersonation_key(&self.host.origin()))
            .map_err(|e| BridgeError::Rejected(e.to_string()))?;
        tracing::info!("impersonation reset");
        self.page.post_message(message);
        Ok(())
    }
}

#[async_trait]
impl BackgroundPort for BackgroundService {
    async fn send(&self, message: WireMessage) -> Result<(), BridgeError> {
        tracing::debug!(kind = %message.kind, category = %message.category, "background received");
        let kind = message.bare_kind().to_string();
        match (kind.as_str(), message.category.as_str()) {
            ("search", CATEGORY_IMPERSONATION) => self.search_users(&message).await,
            (PAGE_TYPE, CATEGORY_IMPERSONATION) => self.start_impersonation(&message),
            ("reset", CATEGORY_IMPERSONATION) => self.reset_impersonation(message),
            _ => {
                self.page.post_message(message);
                Ok(())
            }
        }
    }
}
