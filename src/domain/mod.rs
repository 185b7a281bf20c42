pub mod catalog;
pub mod favorites;
pub mod host;
pub mod matcher;
pub mod models;
pub mod protocol;
pub mod query;
