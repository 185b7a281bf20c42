//! The static command catalog bundled with the binary.

use super::models::PaletteCommand;
use std::sync::OnceLock;

const CATALOG_JSON: &str = include_str!("../../resources/commands.json");

/// Catalog entries that exist for other surfaces and never show in the palette.
const HIDDEN_COMMANDS: &[&str] = &["startImpersonationButton"];

static CATALOG: OnceLock<Vec<PaletteCommand>> = OnceLock::new();

/// What selecting a command does to the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    QuickOpen,
    OpenList,
    NewRecord,
    FetchXml,
    RecordDetails,
    MyRoles,
    EntityMetadata,
    EnvironmentDetails,
    Impersonate,
    ResetImpersonation,
    RefreshMetadata,
    /// Dispatched as-is to the background; the palette closes.
    Plain,
}

impl CommandKind {
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id {
            "openRecordSpotlight" => CommandKind::QuickOpen,
            "openList" => CommandKind::OpenList,
            "newRecord" => CommandKind::NewRecord,
            "runFetchXmlSpotlight" => CommandKind::FetchXml,
            "entityInfoSpotlight" => CommandKind::RecordDetails,
            "myRoles" => CommandKind::MyRoles,
            "entityMetadata" => CommandKind::EntityMetadata,
            "environmentDetails" => CommandKind::EnvironmentDetails,
            "impersonateUserSpotlight" => CommandKind::Impersonate,
            "impersonationResetSpotlight" => CommandKind::ResetImpersonation,
            "refreshEntityMetadata" => CommandKind::RefreshMetadata,
            _ => CommandKind::Plain,
        }
    }
}

/// The full catalog, parsed once.
pub fn all_commands() -> &'static [PaletteCommand] {
    CATALOG.get_or_init(|| match serde_json::from_str::<Vec<PaletteCommand>>(CATALOG_JSON) {
        Ok(commands) => commands,
        Err(err) => {
            tracing::error!(error = %err, "bundled command catalog is invalid");
            Vec::new()
        }
    })
}

/// Catalog entries the palette lists.
#[must_use]
pub fn palette_commands() -> Vec<PaletteCommand> {
    all_commands()
        .iter()
        .filter(|c| !HIDDEN_COMMANDS.contains(&c.id.as_str()))
        .cloned()
        .collect()
}

#[must_use]
pub fn find_command<'a>(commands: &'a [PaletteCommand], id: &str) -> Option<&'a PaletteCommand> {
    commands.iter().find(|c| c.id == id)
}

/// Single-glyph icon for a command: catalog override, then per-command, then
/// per-category, then a generic chevron.
#[must_use]
pub fn icon_for(command: &PaletteCommand) -> &str {
    if let Some(icon) = command.icon.as_deref() {
        return icon;
    }
    let by_id = match command.id.as_str() {
        "openRecordSpotlight" => Some("⇱"),
        "impersonateUserSpotlight" => Some("◎"),
        "impersonationResetSpotlight" => Some("⊘"),
        "openAdmin" | "openMakePowerApps" | "manageAppUsers" | "manageUsers" => Some("↗"),
        "entityInfoSpotlight" => Some("ℹ"),
        "reloadData" => Some("↻"),
        "autoReload" => Some("⟳"),
        "runFetchXmlSpotlight" => Some("⌘"),
        _ => None,
    };
    if let Some(icon) = by_id {
        return icon;
    }
    match command.category.as_str() {
        "Navigation" => "↗",
        "Forms" => "▤",
        "Grid" => "▦",
        "Settings" => "⚙",
        "Impersonation" => "☺",
        "myRoles" | "allUserRoles" => "♟",
        "quickFindFields" => "⌕",
        "sendToFXB" => "⌘",
        "" => "◆",
        _ => "›",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_parses_with_unique_ids() {
        let all = all_commands();
        assert!(!all.is_empty());
        let ids: HashSet<&str> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn test_hidden_commands_are_filtered() {
        let commands = palette_commands();
        assert!(find_command(&commands, "startImpersonationButton").is_none());
        assert!(find_command(&commands, "openRecordSpotlight").is_some());
        assert_eq!(commands.len(), all_commands().len() - HIDDEN_COMMANDS.len());
    }

    #[test]
    fn test_every_special_command_is_in_catalog() {
        let commands = palette_commands();
        for id in [
            "openRecordSpotlight",
            "openList",
            "newRecord",
            "runFetchXmlSpotlight",
            "entityInfoSpotlight",
            "myRoles",
            "entityMetadata",
            "environmentDetails",
            "impersonateUserSpotlight",
            "impersonationResetSpotlight",
            "refreshEntityMetadata",
        ] {
            assert!(find_command(&commands, id).is_some(), "{id} missing");
            assert_ne!(CommandKind::from_id(id), CommandKind::Plain);
        }
        assert_eq!(CommandKind::from_id("openAdmin"), CommandKind::Plain);
    }

    #[test]
    fn test_icon_fallbacks() {
        let mut cmd = PaletteCommand {
            id: "somethingNew".to_string(),
            category: "Grid".to_string(),
            title: "Something".to_string(),
            icon: None,
        };
        assert_eq!(icon_for(&cmd), "▦");
        cmd.category = "Unknown".to_string();
        assert_eq!(icon_for(&cmd), "›");
        cmd.icon = Some("★".to_string());
        assert_eq!(icon_for(&cmd), "★");
    }
}
