//! `HostApi` over the environment's OData Web API.

use super::storage::{impersonation_key, read_json, ImpersonationRecord, KeyValueStore};
use crate::domain::host::HostApi;
use crate::domain::models::{EntityInfo, RecordRef, RoleInfo, UserInfo};
use crate::domain::query::escape_odata_literal;
use crate::error::HostError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ENTITY_DEFINITION_FIELDS: &str =
    "DisplayName,LogicalName,PrimaryIdAttribute,PrimaryNameAttribute,LogicalCollectionName";

pub struct WebApiClient {
    http: reqwest::Client,
    origin: String,
    base: Url,
    token: Option<String>,
    store: Arc<dyn KeyValueStore>,
}

impl WebApiClient {
    pub fn new(
        origin: &str,
        api_version: &str,
        token: Option<String>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, HostError> {
        let base = Url::parse(&format!("{origin}/api/data/v{api_version}/"))
            .map_err(|e| HostError::InvalidRequest(format!("bad environment url {origin}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("OData-MaxVersion", HeaderValue::from_static("4.0"));
        headers.insert("OData-Version", HeaderValue::from_static("4.0"));
        headers.insert(
            "Prefer",
            HeaderValue::from_static("odata.include-annotations=\"OData.Community.Display.V1.FormattedValue\""),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            origin: origin.to_string(),
            base,
            token,
            store,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, HostError> {
        self.base
            .join(path)
            .map_err(|e| HostError::InvalidRequest(format!("bad path {path}: {e}")))
    }

    pub fn entity_definitions_url(&self) -> Result<Url, HostError> {
        let mut url = self.endpoint("EntityDefinitions")?;
        url.query_pairs_mut().append_pair("$select", ENTITY_DEFINITION_FIELDS);
        Ok(url)
    }

    pub fn record_search_url(&self, entity: &EntityInfo, text: &str, limit: usize) -> Result<Url, HostError> {
        let mut url = self.endpoint(&entity.logical_collection_name)?;
        url.query_pairs_mut()
            .append_pair(
                "$select",
                &format!("{},{}", entity.primary_id_attribute, entity.primary_name_attribute),
            )
            .append_pair(
                "$filter",
                &format!(
                    "contains({},'{}')",
                    entity.primary_name_attribute,
                    escape_odata_literal(text)
                ),
            )
            .append_pair("$top", &limit.to_string());
        Ok(url)
    }

    pub fn record_url(&self, entity: &EntityInfo, id: &str) -> Result<Url, HostError> {
        let mut url = self.endpoint(&format!("{}({id})", entity.logical_collection_name))?;
        url.query_pairs_mut()
            .append_pair("$select", &entity.primary_name_attribute);
        Ok(url)
    }

    pub fn fetch_xml_url(&self, entity: &EntityInfo, fetch_xml: &str) -> Result<Url, HostError> {
        let mut url = self.endpoint(&entity.logical_collection_name)?;
        url.query_pairs_mut().append_pair("fetchXml", fetch_xml);
        Ok(url)
    }

    pub fn user_search_url(&self, text: &str, limit: usize) -> Result<Url, HostError> {
        let mut url = self.endpoint("systemusers")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("$select", "systemuserid,domainname,fullname");
            if !text.is_empty() {
                let literal = escape_odata_literal(text);
                query.append_pair(
                    "$filter",
                    &format!("contains(fullname,'{literal}') or contains(domainname,'{literal}')"),
                );
            }
            query.append_pair("$orderby", "fullname").append_pair("$top", &limit.to_string());
        }
        Ok(url)
    }

    pub fn user_roles_url(&self, user_id: &str) -> Result<Url, HostError> {
        let mut url = self.endpoint(&format!("systemusers({user_id})/systemuserroles_association"))?;
        url.query_pairs_mut().append_pair("$select", "name,roleid");
        Ok(url)
    }

    pub fn entity_metadata_url(&self, logical_name: &str) -> Result<Url, HostError> {
        self.endpoint(&format!(
            "EntityDefinitions(LogicalName='{}')",
            escape_odata_literal(logical_name)
        ))
    }

    pub fn organization_url(&self) -> Result<Url, HostError> {
        self.endpoint("RetrieveCurrentOrganization(AccessType='Default')")
    }

    fn caller_object_id(&self) -> Option<String> {
        match read_json::<ImpersonationRecord>(self.store.as_ref(), &impersonation_key(&self.origin)) {
            Ok(Some(record)) if record.is_active => Some(record.user_id),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable impersonation state");
                None
            }
        }
    }

    async fn get_json(&self, url: Url) -> Result<Value, HostError> {
        let mut request = self.http.get(url.clone());
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(caller) = self.caller_object_id() {
            request = request.header("CallerObjectId", caller);
        }

        tracing::debug!(%url, "GET");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "web api request failed");
            return Err(HostError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json::<Value>().await?)
    }

    async fn get_rows(&self, url: Url) -> Result<Vec<Value>, HostError> {
        let body = self.get_json(url).await?;
        rows(body)
    }
}

#[async_trait]
impl HostApi for WebApiClient {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    async fn entity_definitions(&self) -> Result<Vec<EntityInfo>, HostError> {
        let rows = self.get_rows(self.entity_definitions_url()?).await?;
        Ok(rows.iter().filter_map(project_entity_definition).collect())
    }

    async fn search_records(
        &self,
        entity: &EntityInfo,
        text: &str,
        limit: usize,
    ) -> Result<Vec<RecordRef>, HostError> {
        let rows = self.get_rows(self.record_search_url(entity, text, limit)?).await?;
        Ok(project_records(entity, &rows))
    }

    async fn record_name(&self, entity: &EntityInfo, id: &str) -> Result<Option<String>, HostError> {
        let body = self.get_json(self.record_url(entity, id)?).await?;
        Ok(body
            .get(&entity.primary_name_attribute)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn execute_fetch_xml(&self, entity: &EntityInfo, fetch_xml: &str) -> Result<Vec<Value>, HostError> {
        self.get_rows(self.fetch_xml_url(entity, fetch_xml)?).await
    }

    async fn search_users(&self, text: &str, limit: usize) -> Result<Vec<UserInfo>, HostError> {
        let rows = self.get_rows(self.user_search_url(text, limit)?).await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(UserInfo {
                    user_id: row.get("systemuserid")?.as_str()?.to_string(),
                    user_name: string_field(row, "domainname"),
                    full_name: string_field(row, "fullname"),
                })
            })
            .collect())
    }

    async fn my_roles(&self) -> Result<Vec<RoleInfo>, HostError> {
        let who = self.get_json(self.endpoint("WhoAmI")?).await?;
        let user_id = who
            .get("UserId")
            .and_then(Value::as_str)
            .ok_or_else(|| HostError::Decode("WhoAmI response has no UserId".to_string()))?
            .to_string();
        let rows = self.get_rows(self.user_roles_url(&user_id)?).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| HostError::Decode(e.to_string())))
            .collect()
    }

    async fn entity_metadata(&self, logical_name: &str) -> Result<Map<String, Value>, HostError> {
        match self.get_json(self.entity_metadata_url(logical_name)?).await? {
            Value::Object(map) => Ok(map),
            other => Err(HostError::Decode(format!("expected an object, got {other}"))),
        }
    }

    async fn organization_details(&self) -> Result<Map<String, Value>, HostError> {
        let body = self.get_json(self.organization_url()?).await?;
        match body.get("Detail") {
            Some(Value::Object(detail)) => Ok(detail.clone()),
            _ => Ok(Map::new()),
        }
    }
}

fn rows(body: Value) -> Result<Vec<Value>, HostError> {
    match body {
        Value::Object(mut map) => match map.remove("value") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err(HostError::Decode("response has no value array".to_string())),
        },
        _ => Err(HostError::Decode("response is not an object".to_string())),
    }
}

fn string_field(row: &Value, field: &str) -> String {
    row.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// `EntityDefinitions` row to `EntityInfo`; the display name falls back to
/// the logical name when the entity has no localized label.
fn project_entity_definition(row: &Value) -> Option<EntityInfo> {
    let logical_name = row.get("LogicalName")?.as_str()?.to_string();
    let display_name = row
        .pointer("/DisplayName/UserLocalizedLabel/Label")
        .and_then(Value::as_str)
        .filter(|label| !label.is_empty())
        .unwrap_or(&logical_name)
        .to_string();
    Some(EntityInfo {
        display_name,
        primary_id_attribute: string_field(row, "PrimaryIdAttribute"),
        primary_name_attribute: string_field(row, "PrimaryNameAttribute"),
        logical_collection_name: string_field(row, "LogicalCollectionName"),
        logical_name,
    })
}

/// Projects raw rows onto id/name pairs. Rows without an id are dropped; a
/// missing name shows the id.
#[must_use]
pub fn project_records(entity: &EntityInfo, rows: &[Value]) -> Vec<RecordRef> {
    rows.iter()
        .filter_map(|row| {
            let id = row.get(&entity.primary_id_attribute)?.as_str()?.to_string();
            let name = row
                .get(&entity.primary_name_attribute)
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty())
                .map_or_else(|| id.clone(), str::to_string);
            Some(RecordRef { id, name })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::{write_json, MemoryStore};
    use serde_json::json;

    const ORIGIN: &str = "https://org.crm.dynamics.com";

    fn client(store: Arc<MemoryStore>) -> WebApiClient {
        WebApiClient::new(ORIGIN, "9.1", None, store).unwrap()
    }

    fn account() -> EntityInfo {
        EntityInfo {
            logical_name: "account".to_string(),
            display_name: "Account".to_string(),
            primary_id_attribute: "accountid".to_string(),
            primary_name_attribute: "name".to_string(),
            logical_collection_name: "accounts".to_string(),
        }
    }

    fn pair(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_record_search_url() {
        let api = client(Arc::new(MemoryStore::new()));
        let url = api.record_search_url(&account(), "O'Brien & Co", 20).unwrap();
        assert_eq!(url.path(), "/api/data/v9.1/accounts");
        assert_eq!(pair(&url, "$select").as_deref(), Some("accountid,name"));
        assert_eq!(
            pair(&url, "$filter").as_deref(),
            Some("contains(name,'O''Brien & Co')")
        );
        assert_eq!(pair(&url, "$top").as_deref(), Some("20"));
    }

    #[test]
    fn test_entity_definitions_url() {
        let api = client(Arc::new(MemoryStore::new()));
        let url = api.entity_definitions_url().unwrap();
        assert_eq!(url.path(), "/api/data/v9.1/EntityDefinitions");
        assert_eq!(pair(&url, "$select").as_deref(), Some(ENTITY_DEFINITION_FIELDS));
    }

    #[test]
    fn test_fetch_xml_url_encodes_query() {
        let api = client(Arc::new(MemoryStore::new()));
        let xml = r#"<fetch><entity name="account"/></fetch>"#;
        let url = api.fetch_xml_url(&account(), xml).unwrap();
        assert_eq!(pair(&url, "fetchXml").as_deref(), Some(xml));
        assert!(!url.as_str().contains('<'));
    }

    #[test]
    fn test_user_search_url_without_text_has_no_filter() {
        let api = client(Arc::new(MemoryStore::new()));
        let url = api.user_search_url("", 20).unwrap();
        assert_eq!(pair(&url, "$filter"), None);
        let url = api.user_search_url("jan", 5).unwrap();
        assert_eq!(
            pair(&url, "$filter").as_deref(),
            Some("contains(fullname,'jan') or contains(domainname,'jan')")
        );
        assert_eq!(pair(&url, "$top").as_deref(), Some("5"));
    }

    #[test]
    fn test_caller_object_id_follows_stored_state() {
        let store = Arc::new(MemoryStore::new());
        let api = client(store.clone());
        assert_eq!(api.caller_object_id(), None);

        let mut record = ImpersonationRecord {
            is_active: true,
            user_id: "u1".to_string(),
            user_name: "jane@contoso.com".to_string(),
            user_full_name: "Jane Doe".to_string(),
        };
        write_json(store.as_ref(), &impersonation_key(ORIGIN), &record).unwrap();
        assert_eq!(api.caller_object_id().as_deref(), Some("u1"));

        record.is_active = false;
        write_json(store.as_ref(), &impersonation_key(ORIGIN), &record).unwrap();
        assert_eq!(api.caller_object_id(), None);
    }

    #[test]
    fn test_entity_definition_projection() {
        let row = json!({
            "LogicalName": "msdyn_plan",
            "DisplayName": {"UserLocalizedLabel": null},
            "PrimaryIdAttribute": "msdyn_planid",
            "PrimaryNameAttribute": "msdyn_name",
            "LogicalCollectionName": "msdyn_plans"
        });
        let info = project_entity_definition(&row).unwrap();
        assert_eq!(info.display_name, "msdyn_plan");
        assert_eq!(info.logical_collection_name, "msdyn_plans");

        let labeled = json!({
            "LogicalName": "account",
            "DisplayName": {"UserLocalizedLabel": {"Label": "Account"}}
        });
        assert_eq!(project_entity_definition(&labeled).unwrap().display_name, "Account");
        assert!(project_entity_definition(&json!({"DisplayName": {}})).is_none());
    }

    #[test]
    fn test_project_records() {
        let rows = vec![
            json!({"accountid": "1", "name": "Contoso"}),
            json!({"accountid": "2", "name": null}),
            json!({"name": "orphan"}),
        ];
        let records = project_records(&account(), &rows);
        assert_eq!(
            records,
            vec![
                RecordRef { id: "1".to_string(), name: "Contoso".to_string() },
                RecordRef { id: "2".to_string(), name: "2".to_string() },
            ]
        );
    }

    #[test]
    fn test_rows_requires_value_array() {
        assert_eq!(rows(json!({"value": [1]})).unwrap().len(), 1);
        assert!(matches!(rows(json!({"error": {}})), Err(HostError::Decode(_))));
    }
}
