pub mod background;
pub mod bridge;
pub mod metadata_cache;
pub mod page_script;
pub mod storage;
pub mod web_api;
