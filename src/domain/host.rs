use super::models::{EntityInfo, RecordRef, RoleInfo, UserInfo};
use crate::error::HostError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Remote lookups against the host environment's data API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Origin of the environment, e.g. `https://org.crm.dynamics.com`.
    fn origin(&self) -> String;

    /// All entity definitions, unsorted.
    async fn entity_definitions(&self) -> Result<Vec<EntityInfo>, HostError>;

    /// Records whose primary name contains `text`, at most `limit`.
    async fn search_records(
        &self,
        entity: &EntityInfo,
        text: &str,
        limit: usize,
    ) -> Result<Vec<RecordRef>, HostError>;

    /// Primary name of one record, if it exists.
    async fn record_name(&self, entity: &EntityInfo, id: &str) -> Result<Option<String>, HostError>;

    /// Raw rows returned by a FetchXML query.
    async fn execute_fetch_xml(&self, entity: &EntityInfo, fetch_xml: &str) -> Result<Vec<Value>, HostError>;

    /// Users whose name or domain name contains `text`.
    async fn search_users(&self, text: &str, limit: usize) -> Result<Vec<UserInfo>, HostError>;

    async fn my_roles(&self) -> Result<Vec<RoleInfo>, HostError>;

    async fn entity_metadata(&self, logical_name: &str) -> Result<Map<String, Value>, HostError>;

    async fn organization_details(&self) -> Result<Map<String, Value>, HostError>;
}
