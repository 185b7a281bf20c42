//! Command line and config file settings.
//!
//! Values come from `~/.config/spotlight/config.toml` first; flags and their
//! environment variables override them.

use crate::app::features::handler::Tuning;
use crate::app::persistence::get_config_dir;
use crate::app::state::Limits;
use crate::domain::models::PageContext;
use crate::error::ConfigError;
use crate::theme::PaletteType;
use clap::Parser;
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "spotlight")]
#[command(about = "Command palette for Dynamics 365 environments")]
#[command(version)]
pub struct Cli {
    /// Environment url, e.g. https://contoso.crm.dynamics.com
    #[arg(long, env = "SPOTLIGHT_ORG_URL")]
    pub org: Option<String>,

    /// Bearer token for the Web API
    #[arg(long, env = "SPOTLIGHT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Logical name of the entity the page shows
    #[arg(long)]
    pub entity: Option<String>,

    /// Id of the record the page shows
    #[arg(long)]
    pub record_id: Option<String>,

    /// Open the palette straight into a command id
    #[arg(long)]
    pub command: Option<String>,

    /// Config file to read instead of the default one
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub org_url: Option<String>,
    pub org_unique_name: Option<String>,
    pub api_version: String,
    pub app_id: Option<String>,
    pub result_limit: usize,
    pub user_search_debounce_ms: u64,
    pub record_search_debounce_ms: u64,
    pub min_user_query: usize,
    pub min_record_query: usize,
    pub page_request_timeout_ms: u64,
    pub theme: PaletteType,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            org_url: None,
            org_unique_name: None,
            api_version: "9.1".to_string(),
            app_id: None,
            result_limit: 20,
            user_search_debounce_ms: 100,
            record_search_debounce_ms: 250,
            min_user_query: 2,
            min_record_query: 3,
            page_request_timeout_ms: 10_000,
            theme: PaletteType::default(),
        }
    }
}

impl FileConfig {
    /// Reads `path`. A missing file is only an error when `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Everything `main` needs to wire the application.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub origin: String,
    pub org_unique_name: Option<String>,
    pub api_version: String,
    pub token: Option<String>,
    pub context: PageContext,
    pub command: Option<String>,
    pub theme: PaletteType,
    pub tuning: Tuning,
    pub limits: Limits,
}

impl Settings {
    pub fn load(cli: Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path, true)?,
            None => match get_config_dir() {
                Some(dir) => FileConfig::load(&dir.join(CONFIG_FILE), false)?,
                None => FileConfig::default(),
            },
        };
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let raw = cli.org.or(file.org_url).ok_or(ConfigError::MissingOrg)?;
        let origin = normalize_origin(&raw)?;

        Ok(Self {
            origin,
            org_unique_name: file.org_unique_name,
            api_version: file.api_version,
            token: cli.token,
            context: PageContext {
                entity: cli.entity,
                record_id: cli.record_id,
                app_id: file.app_id,
            },
            command: cli.command,
            theme: file.theme,
            tuning: Tuning {
                result_limit: file.result_limit,
                user_search_debounce: Duration::from_millis(file.user_search_debounce_ms),
                record_search_debounce: Duration::from_millis(file.record_search_debounce_ms),
                page_request_timeout: Duration::from_millis(file.page_request_timeout_ms),
            },
            limits: Limits {
                result_limit: file.result_limit,
                min_user_query: file.min_user_query,
                min_record_query: file.min_record_query,
            },
        })
    }
}

/// `scheme://host[:port]` of an environment url, without path or slash.
pub fn normalize_origin(raw: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidOrg(raw.to_string());
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url.origin().ascii_serialization())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli(org: Option<&str>) -> Cli {
        Cli {
            org: org.map(str::to_string),
            ..Cli::default()
        }
    }

    #[test]
    fn test_normalize_origin() {
        assert_eq!(
            normalize_origin("https://contoso.crm.dynamics.com/main.aspx?appid=1").unwrap(),
            "https://contoso.crm.dynamics.com"
        );
        assert_eq!(
            normalize_origin(" http://localhost:5555/ ").unwrap(),
            "http://localhost:5555"
        );
        assert!(matches!(
            normalize_origin("contoso.crm.dynamics.com"),
            Err(ConfigError::InvalidOrg(_))
        ));
        assert!(normalize_origin("ftp://contoso.example").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            org_url: Some("https://file.crm.dynamics.com".to_string()),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(cli(Some("https://flag.crm.dynamics.com/")), file).unwrap();
        assert_eq!(settings.origin, "https://flag.crm.dynamics.com");
        assert_eq!(settings.api_version, "9.1");
        assert_eq!(settings.tuning, Tuning::default());
        assert_eq!(settings.limits, Limits::default());
    }

    #[test]
    fn test_missing_org() {
        let result = Settings::resolve(cli(None), FileConfig::default());
        assert!(matches!(result, Err(ConfigError::MissingOrg)));
    }

    #[test]
    fn test_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
org_url = "https://contoso.crm4.dynamics.com"
result_limit = 5
min_record_query = 4
user_search_debounce_ms = 50
theme = "fluent"
"#
        )
        .unwrap();

        let config = FileConfig::load(file.path(), true).unwrap();
        let settings = Settings::resolve(cli(None), config).unwrap();
        assert_eq!(settings.origin, "https://contoso.crm4.dynamics.com");
        assert_eq!(settings.tuning.result_limit, 5);
        assert_eq!(settings.tuning.user_search_debounce, Duration::from_millis(50));
        assert_eq!(settings.tuning.record_search_debounce, Duration::from_millis(250));
        assert_eq!(settings.limits.min_record_query, 4);
        assert_eq!(settings.theme, PaletteType::Fluent);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(FileConfig::load(&path, false).unwrap(), FileConfig::default());
        assert!(matches!(
            FileConfig::load(&path, true),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "result_limit = \"many\"").unwrap();
        assert!(matches!(
            FileConfig::load(file.path(), true),
            Err(ConfigError::Parse { .. })
        ));
    }
}
