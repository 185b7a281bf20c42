//! Message plumbing between the palette and its two collaborators.
//!
//! * [`BackgroundPort`] carries outbound messages to the background process.
//!   Replies come back asynchronously through [`Bridge::deliver`].
//! * [`PageChannel`] is the same-page broadcast shared with the in-page
//!   script. Every envelope is checked against a [`TrustBoundary`] before it
//!   is acted on.

use crate::domain::protocol::{
    InboundMessage, PageEnvelope, PageRequest, PageResponse, WireMessage,
};
use crate::error::BridgeError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Fire-and-forget channel to the background process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackgroundPort: Send + Sync {
    async fn send(&self, message: WireMessage) -> Result<(), BridgeError>;
}

type Listener = Box<dyn Fn(InboundMessage) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<u64, Listener>,
}

/// Dispatches background replies to the listeners of open palettes.
#[derive(Clone, Default)]
pub struct Bridge {
    registry: Arc<Mutex<Registry>>,
}

impl Bridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` until the returned handle is dropped.
    #[must_use]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(InboundMessage) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, Box::new(listener));
        Subscription {
            id,
            registry: Arc::clone(&self.registry),
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }

    /// Parses a raw reply and hands it to every listener. Returns how many
    /// listeners received it; malformed or unknown messages reach none.
    pub fn deliver(&self, message: &WireMessage) -> usize {
        let inbound = match InboundMessage::from_wire(message) {
            Ok(inbound) => inbound,
            Err(err) => {
                tracing::debug!(kind = %message.kind, category = %message.category, error = %err, "dropping background message");
                return 0;
            }
        };
        let registry = self.registry.lock();
        for listener in registry.listeners.values() {
            listener(inbound.clone());
        }
        registry.listeners.len()
    }
}

/// Live listener registration. Dropping it deregisters the listener.
pub struct Subscription {
    id: u64,
    registry: Arc<Mutex<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.lock().listeners.remove(&self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Origin and frame check applied to page envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustBoundary {
    page_origin: String,
    org_unique_name: Option<String>,
}

impl TrustBoundary {
    pub fn new(page_origin: impl Into<String>, org_unique_name: Option<String>) -> Self {
        Self {
            page_origin: page_origin.into(),
            org_unique_name,
        }
    }

    /// Accepts envelopes from the page's own origin (or the origin the
    /// `.mcas.ms` proxy fronts). An attached client URL, with a trailing org
    /// unique name removed, must start with the envelope origin.
    #[must_use]
    pub fn accepts(&self, envelope: &PageEnvelope) -> bool {
        let origin = envelope.origin.as_str();
        let same_origin =
            self.page_origin == origin || self.page_origin == format!("{origin}.mcas.ms");
        if !same_origin {
            return false;
        }
        match &envelope.client_url {
            None => true,
            Some(client_url) => {
                let cleaned = self
                    .org_unique_name
                    .as_deref()
                    .and_then(|org| client_url.strip_suffix(org))
                    .map_or(client_url.as_str(), |rest| rest.trim_end_matches('/'));
                cleaned.starts_with(origin)
            }
        }
    }
}

const PAGE_CHANNEL_CAPACITY: usize = 64;

/// Same-page broadcast between the palette and the in-page script.
#[derive(Clone)]
pub struct PageChannel {
    origin: String,
    trust: TrustBoundary,
    sender: broadcast::Sender<PageEnvelope>,
}

impl PageChannel {
    #[must_use]
    pub fn new(trust: TrustBoundary) -> Self {
        let (sender, _) = broadcast::channel(PAGE_CHANNEL_CAPACITY);
        Self {
            origin: trust.page_origin.clone(),
            trust,
            sender,
        }
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[must_use]
    pub fn trust(&self) -> &TrustBoundary {
        &self.trust
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PageEnvelope> {
        self.sender.subscribe()
    }

    /// Posts an envelope. Having no receivers is not an error.
    pub fn post(&self, envelope: PageEnvelope) {
        let _ = self.sender.send(envelope);
    }

    /// Posts a message stamped with this page's origin.
    pub fn post_message(&self, message: WireMessage) {
        self.post(PageEnvelope {
            origin: self.origin.clone(),
            client_url: None,
            message,
        });
    }

    /// Sends `request` and waits for the first trusted reply of the matching
    /// type. Unrelated traffic is skipped.
    pub async fn request(
        &self,
        request: PageRequest,
        timeout: Duration,
    ) -> Result<PageResponse, BridgeError> {
        let mut receiver = self.subscribe();
        self.post_message(request.to_wire());

        let wait = async {
            loop {
                match receiver.recv().await {
                    Ok(envelope) => {
                        if !self.trust.accepts(&envelope) {
                            tracing::debug!(origin = %envelope.origin, "ignoring untrusted page message");
                            continue;
                        }
                        match PageResponse::from_wire(&request, &envelope.message) {
                            Ok(Some(response)) => return Ok(response),
                            Ok(None) => {}
                            Err(err) => return Err(err),
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "page channel lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(BridgeError::Closed(request.request_type().to_string()));
                    }
                }
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| BridgeError::Timeout(request.request_type().to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RoleInfo;
    use crate::domain::protocol::{ImpersonateRequest, ImpersonationResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ORIGIN: &str = "https://org.crm.dynamics.com";

    fn envelope(origin: &str, client_url: Option<&str>) -> PageEnvelope {
        PageEnvelope {
            origin: origin.to_string(),
            client_url: client_url.map(str::to_string),
            message: WireMessage::new("myRolesRequest", "myRolesRequest"),
        }
    }

    fn search_results() -> WireMessage {
        InboundMessage::UserSearchResults(ImpersonationResponse {
            users: vec![],
            impersonate_request: ImpersonateRequest {
                is_active: false,
                url: format!("{ORIGIN}/"),
                can_impersonate: true,
            },
            user_name: None,
        })
        .to_wire()
    }

    #[test]
    fn test_subscription_drop_deregisters() {
        let bridge = Bridge::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let subscription = bridge.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(bridge.listener_count(), 1);
        assert_eq!(bridge.deliver(&search_results()), 1);

        drop(subscription);
        assert_eq!(bridge.listener_count(), 0);
        assert_eq!(bridge.deliver(&search_results()), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_malformed_messages_are_dropped() {
        let bridge = Bridge::new();
        let _subscription = bridge.subscribe(|_| panic!("must not be called"));
        assert_eq!(bridge.deliver(&WireMessage::new("Page", "Unknown")), 0);
    }

    #[test]
    fn test_trust_boundary() {
        let trust = TrustBoundary::new(ORIGIN, Some("org1".to_string()));
        assert!(trust.accepts(&envelope(ORIGIN, None)));
        assert!(!trust.accepts(&envelope("https://evil.example", None)));
        assert!(trust.accepts(&envelope(ORIGIN, Some("https://org.crm.dynamics.com/org1"))));
        assert!(trust.accepts(&envelope(
            ORIGIN,
            Some("https://org.crm.dynamics.com/main.aspx?appid=1")
        )));
        assert!(!trust.accepts(&envelope(ORIGIN, Some("https://other.crm.dynamics.com/org1"))));

        let proxied = TrustBoundary::new(format!("{ORIGIN}.mcas.ms"), None);
        assert!(proxied.accepts(&envelope(ORIGIN, None)));
    }

    #[tokio::test]
    async fn test_request_matches_reply_type() {
        let channel = PageChannel::new(TrustBoundary::new(ORIGIN, None));
        let mut page = channel.subscribe();
        let responder = channel.clone();
        tokio::spawn(async move {
            while let Ok(envelope) = page.recv().await {
                if PageRequest::from_wire(&envelope.message).is_some() {
                    // Unrelated and untrusted traffic first.
                    responder.post_message(WireMessage::new("entityMetadataResponse", ""));
                    responder.post(PageEnvelope {
                        origin: "https://evil.example".to_string(),
                        client_url: None,
                        message: PageResponse::MyRoles(vec![]).to_wire(),
                    });
                    let roles = vec![RoleInfo {
                        name: "Basic User".to_string(),
                        roleid: "r1".to_string(),
                    }];
                    responder.post_message(PageResponse::MyRoles(roles).to_wire());
                    break;
                }
            }
        });

        let response = channel
            .request(PageRequest::MyRoles, Duration::from_secs(5))
            .await
            .unwrap();
        match response {
            PageResponse::MyRoles(roles) => assert_eq!(roles[0].name, "Basic User"),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_times_out() {
        let channel = PageChannel::new(TrustBoundary::new(ORIGIN, None));
        let result = channel
            .request(PageRequest::EntityMetadata("account".to_string()), Duration::from_millis(500))
            .await;
        assert_eq!(
            result,
            Err(BridgeError::Timeout("entityMetadataRequest".to_string()))
        );
    }
}
