//! Pure helpers for the remote lookups: id detection and query text handling.

use regex::Regex;
use std::sync::OnceLock;

fn guid_regex() -> &'static Regex {
    static GUID: OnceLock<Regex> = OnceLock::new();
    GUID.get_or_init(|| {
        Regex::new(r"^\{?[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\}?$")
            .expect("static pattern compiles")
    })
}

fn fetch_entity_regex() -> &'static Regex {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    ENTITY.get_or_init(|| {
        Regex::new(r#"<entity\s+name=['"]([^'"]*)['"]"#)
            .expect("static pattern compiles")
    })
}

/// True for an 8-4-4-4-12 hex id, with or without braces.
#[must_use]
pub fn is_guid(text: &str) -> bool {
    guid_regex().is_match(text)
}

/// Strips braces. Callers check `is_guid` first.
#[must_use]
pub fn normalize_guid(text: &str) -> String {
    text.trim_matches(|c| c == '{' || c == '}').to_string()
}

/// Logical name of the root `<entity name="...">` of a FetchXML query.
#[must_use]
pub fn fetch_xml_entity(xml: &str) -> Option<String> {
    fetch_entity_regex()
        .captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Escapes a value for use inside a single-quoted OData string literal.
#[must_use]
pub fn escape_odata_literal(value: &str) -> String {
    value.replace('\'', "''")
}
