//! Wire protocol between the palette, the background process and the in-page
//! script.
//!
//! Every message travels as `{type, category, content?}`. Outbound `type`
//! values carry the `sp:` namespace; inbound ones are accepted with or
//! without it. Inside the crate messages are typed enums, and the wire shape
//! only appears at the bridge.

use super::models::{RoleInfo, UserInfo};
use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const MSG_PREFIX: &str = "sp:";

pub const CATEGORY_NAVIGATION: &str = "Navigation";
pub const CATEGORY_IMPERSONATION: &str = "Impersonation";
pub const CATEGORY_USER_SEARCH: &str = "Impersonation-UserSearch";

/// Type used by messages that already went through the page; never executed
/// again by the in-page script.
pub const PAGE_TYPE: &str = "Page";

#[must_use]
pub fn prefixed(kind: &str) -> String {
    format!("{MSG_PREFIX}{kind}")
}

#[must_use]
pub fn strip_prefix(kind: &str) -> &str {
    kind.strip_prefix(MSG_PREFIX).unwrap_or(kind)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

impl WireMessage {
    pub fn new(kind: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            category: category.into(),
            content: None,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: Value) -> Self {
        self.content = Some(content);
        self
    }

    /// The `type` without the namespace prefix.
    #[must_use]
    pub fn bare_kind(&self) -> &str {
        strip_prefix(&self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpersonateRequest {
    pub is_active: bool,
    pub url: String,
    pub can_impersonate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpersonationResponse {
    #[serde(default)]
    pub users: Vec<UserInfo>,
    pub impersonate_request: ImpersonateRequest,
    /// Echo of the searched name, when the background provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// Everything the palette sends to the background process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// A catalog command with no palette-side behavior.
    Command { id: String, category: String },
    OpenRecord { entity: String, id: String },
    NewRecord { entity: String },
    OpenList { entity: String },
    SearchUsers { user_name: String },
    Impersonate { user: UserInfo, url: String },
    ResetImpersonation,
}

impl OutboundMessage {
    #[must_use]
    pub fn to_wire(&self) -> WireMessage {
        match self {
            OutboundMessage::Command { id, category } => WireMessage::new(prefixed(id), category.clone()),
            OutboundMessage::OpenRecord { entity, id } => {
                WireMessage::new(prefixed("openRecordQuick"), CATEGORY_NAVIGATION)
                    .with_content(json!({ "entity": entity, "id": id }))
            }
            OutboundMessage::NewRecord { entity } => {
                WireMessage::new(prefixed("newRecord"), CATEGORY_NAVIGATION).with_content(json!(entity))
            }
            OutboundMessage::OpenList { entity } => {
                WireMessage::new(prefixed("openEntityList"), CATEGORY_NAVIGATION)
                    .with_content(json!(entity))
            }
            OutboundMessage::SearchUsers { user_name } => {
                WireMessage::new(prefixed("search"), CATEGORY_IMPERSONATION)
                    .with_content(json!({ "userName": user_name }))
            }
            OutboundMessage::Impersonate { user, url } => {
                let content = ImpersonationResponse {
                    users: vec![user.clone()],
                    impersonate_request: ImpersonateRequest {
                        is_active: true,
                        url: url.clone(),
                        can_impersonate: true,
                    },
                    user_name: None,
                };
                WireMessage::new(prefixed(PAGE_TYPE), CATEGORY_IMPERSONATION)
                    .with_content(serde_json::to_value(content).unwrap_or(Value::Null))
            }
            OutboundMessage::ResetImpersonation => {
                WireMessage::new(prefixed("reset"), CATEGORY_IMPERSONATION)
            }
        }
    }

    /// Terminal messages end the palette session; searches do not.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OutboundMessage::SearchUsers { .. })
    }
}

/// Background responses the palette reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    UserSearchResults(ImpersonationResponse),
    ImpersonationStatus(ImpersonationResponse),
}

impl InboundMessage {
    pub fn from_wire(message: &WireMessage) -> Result<Self, BridgeError> {
        if message.bare_kind() != PAGE_TYPE {
            return Err(malformed(&message.kind, "not a page response"));
        }
        let parse = || -> Result<ImpersonationResponse, BridgeError> {
            let content = message
                .content
                .clone()
                .ok_or_else(|| malformed(&message.category, "missing content"))?;
            serde_json::from_value(content).map_err(|e| malformed(&message.category, &e.to_string()))
        };
        match message.category.as_str() {
            CATEGORY_USER_SEARCH => Ok(InboundMessage::UserSearchResults(parse()?)),
            CATEGORY_IMPERSONATION => Ok(InboundMessage::ImpersonationStatus(parse()?)),
            other => Err(malformed(other, "unknown category")),
        }
    }

    #[must_use]
    pub fn to_wire(&self) -> WireMessage {
        let (category, body) = match self {
            InboundMessage::UserSearchResults(r) => (CATEGORY_USER_SEARCH, r),
            InboundMessage::ImpersonationStatus(r) => (CATEGORY_IMPERSONATION, r),
        };
        WireMessage::new(PAGE_TYPE, category)
            .with_content(serde_json::to_value(body).unwrap_or(Value::Null))
    }
}

/// Requests the palette makes of the in-page script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    MyRoles,
    EntityMetadata(String),
}

impl PageRequest {
    #[must_use]
    pub fn request_type(&self) -> &'static str {
        match self {
            PageRequest::MyRoles => "myRolesRequest",
            PageRequest::EntityMetadata(_) => "entityMetadataRequest",
        }
    }

    /// The `type` of the reply a one-shot listener waits for.
    #[must_use]
    pub fn response_type(&self) -> &'static str {
        match self {
            PageRequest::MyRoles => "myRolesResponse",
            PageRequest::EntityMetadata(_) => "entityMetadataResponse",
        }
    }

    #[must_use]
    pub fn to_wire(&self) -> WireMessage {
        let kind = self.request_type();
        let message = WireMessage::new(kind, kind);
        match self {
            PageRequest::MyRoles => message,
            PageRequest::EntityMetadata(entity) => message.with_content(json!(entity)),
        }
    }

    #[must_use]
    pub fn from_wire(message: &WireMessage) -> Option<Self> {
        match message.bare_kind() {
            "myRolesRequest" => Some(PageRequest::MyRoles),
            "entityMetadataRequest" => message
                .content
                .as_ref()
                .and_then(Value::as_str)
                .map(|e| PageRequest::EntityMetadata(e.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageResponse {
    MyRoles(Vec<RoleInfo>),
    EntityMetadata(Map<String, Value>),
}

impl PageResponse {
    #[must_use]
    pub fn to_wire(&self) -> WireMessage {
        match self {
            PageResponse::MyRoles(roles) => WireMessage::new("myRolesResponse", "")
                .with_content(serde_json::to_value(roles).unwrap_or(Value::Null)),
            PageResponse::EntityMetadata(meta) => {
                WireMessage::new("entityMetadataResponse", "").with_content(Value::Object(meta.clone()))
            }
        }
    }

    /// Decodes the reply to `request`. Returns `Ok(None)` for messages of
    /// another type, which a listener must skip rather than fail on.
    pub fn from_wire(request: &PageRequest, message: &WireMessage) -> Result<Option<Self>, BridgeError> {
        if message.bare_kind() != request.response_type() {
            return Ok(None);
        }
        let content = message.content.clone().unwrap_or(Value::Null);
        let response = match request {
            PageRequest::MyRoles => {
                let roles: Vec<RoleInfo> = serde_json::from_value(content)
                    .map_err(|e| malformed(request.response_type(), &e.to_string()))?;
                PageResponse::MyRoles(roles)
            }
            PageRequest::EntityMetadata(_) => match content {
                Value::Object(map) => PageResponse::EntityMetadata(map),
                _ => return Err(malformed(request.response_type(), "expected an object")),
            },
        };
        Ok(Some(response))
    }
}

/// A page message together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEnvelope {
    pub origin: String,
    /// Client URL resolved by the in-page script, when it attached one.
    pub client_url: Option<String>,
    pub message: WireMessage,
}

fn malformed(kind: &str, reason: &str) -> BridgeError {
    BridgeError::Malformed {
        kind: kind.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserInfo {
        UserInfo {
            user_id: "u1".to_string(),
            user_name: "jane@contoso.com".to_string(),
            full_name: "Jane Doe".to_string(),
        }
    }

    #[test]
    fn test_open_record_wire_shape() {
        let wire = OutboundMessage::OpenRecord {
            entity: "account".to_string(),
            id: "00000000-0000-0000-0000-000000000001".to_string(),
        }
        .to_wire();
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "sp:openRecordQuick",
                "category": "Navigation",
                "content": {"entity": "account", "id": "00000000-0000-0000-0000-000000000001"}
            })
        );
    }

    #[test]
    fn test_plain_command_has_no_content() {
        let wire = OutboundMessage::Command {
            id: "openAdmin".to_string(),
            category: "Navigation".to_string(),
        }
        .to_wire();
        let text = serde_json::to_string(&wire).unwrap();
        assert_eq!(text, r#"{"type":"sp:openAdmin","category":"Navigation"}"#);
    }

    #[test]
    fn test_impersonate_message() {
        let wire = OutboundMessage::Impersonate {
            user: user(),
            url: "https://org.crm.dynamics.com/".to_string(),
        }
        .to_wire();
        assert_eq!(wire.kind, "sp:Page");
        assert_eq!(wire.category, "Impersonation");
        let content = wire.content.unwrap();
        assert_eq!(content["impersonateRequest"]["isActive"], true);
        assert_eq!(content["impersonateRequest"]["canImpersonate"], true);
        assert_eq!(content["users"][0]["userName"], "jane@contoso.com");
    }

    #[test]
    fn test_search_is_not_terminal() {
        let search = OutboundMessage::SearchUsers {
            user_name: "ja".to_string(),
        };
        assert!(!search.is_terminal());
        assert!(OutboundMessage::ResetImpersonation.is_terminal());
        assert_eq!(search.to_wire().content.unwrap()["userName"], "ja");
    }

    #[test]
    fn test_inbound_parse_accepts_prefixed_and_bare() {
        let response = InboundMessage::UserSearchResults(ImpersonationResponse {
            users: vec![user()],
            impersonate_request: ImpersonateRequest {
                is_active: false,
                url: "https://org/".to_string(),
                can_impersonate: true,
            },
            user_name: Some("ja".to_string()),
        });
        let mut wire = response.to_wire();
        assert_eq!(InboundMessage::from_wire(&wire).unwrap(), response);
        wire.kind = prefixed(PAGE_TYPE);
        assert_eq!(InboundMessage::from_wire(&wire).unwrap(), response);
    }

    #[test]
    fn test_inbound_parse_rejects_unknown() {
        let wire = WireMessage::new("Page", "Forms");
        assert!(InboundMessage::from_wire(&wire).is_err());
        let wire = WireMessage::new("search", "Impersonation");
        assert!(InboundMessage::from_wire(&wire).is_err());
        let wire = WireMessage::new("Page", "Impersonation");
        assert!(matches!(
            InboundMessage::from_wire(&wire),
            Err(BridgeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_page_request_round_trip() {
        let request = PageRequest::EntityMetadata("account".to_string());
        assert_eq!(PageRequest::from_wire(&request.to_wire()), Some(request));
        assert_eq!(
            PageRequest::from_wire(&PageRequest::MyRoles.to_wire()),
            Some(PageRequest::MyRoles)
        );
        assert_eq!(PageRequest::from_wire(&WireMessage::new("Page", "")), None);
    }

    #[test]
    fn test_page_response_matching() {
        let roles = PageResponse::MyRoles(vec![RoleInfo {
            name: "System Administrator".to_string(),
            roleid: "r1".to_string(),
        }]);
        let wire = roles.to_wire();
        assert_eq!(
            PageResponse::from_wire(&PageRequest::MyRoles, &wire).unwrap(),
            Some(roles)
        );
        // A reply of another type is skipped, not an error.
        let other = PageRequest::EntityMetadata("account".to_string());
        assert_eq!(PageResponse::from_wire(&other, &wire).unwrap(), None);

        let bad = WireMessage::new("entityMetadataResponse", "").with_content(json!([1, 2]));
        assert!(PageResponse::from_wire(&other, &bad).is_err());
    }
}
