//! Turns palette state into the rows the UI draws.
//!
//! The reducer uses the same rows to resolve Enter and clicks, so what is
//! drawn and what is activated can never disagree.

use crate::app::state::{AppState, PaletteState, Step};
use crate::domain::catalog::{find_command, icon_for};
use crate::domain::matcher::{filter_commands, filter_entities};
use crate::domain::models::{EntityInfo, RecordRef, UserInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum ItemTarget {
    Command(String),
    Entity(EntityInfo),
    Record(RecordRef),
    EntityList(EntityInfo),
    User(UserInfo),
    FetchRecord(RecordRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewItem {
    pub label: String,
    pub detail: Option<String>,
    pub icon: String,
    pub favorite: bool,
    pub target: ItemTarget,
}

impl ViewItem {
    fn new(label: impl Into<String>, icon: &str, target: ItemTarget) -> Self {
        Self {
            label: label.into(),
            detail: None,
            icon: icon.to_string(),
            favorite: false,
            target,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// One chip of the favorites row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteChip {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub bg_color: Option<String>,
    pub icon_color: Option<String>,
}

/// Rows for the current step.
#[must_use]
pub fn items(state: &AppState, palette: &PaletteState) -> Vec<ViewItem> {
    let query = palette.query_text();
    let limit = state.limits.result_limit;
    match palette.step {
        Step::Commands => command_items(state, &query),
        Step::OpenRecordEntity | Step::OpenListEntity | Step::NewRecordEntity => {
            entity_items(state, palette, &query)
        }
        Step::OpenRecordId => {
            let mut items: Vec<ViewItem> = palette
                .records
                .iter()
                .take(limit)
                .map(|r| ViewItem::new(&r.name, "▸", ItemTarget::Record(r.clone())).with_detail(&r.id))
                .collect();
            if let Some(entity) = &palette.selected_entity {
                items.push(ViewItem::new(
                    format!("Open {} list", entity.display_name),
                    "▦",
                    ItemTarget::EntityList(entity.clone()),
                ));
            }
            items
        }
        Step::ImpersonateSearch => palette
            .users
            .iter()
            .take(limit)
            .map(|u| {
                ViewItem::new(
                    format!("{} ({})", u.full_name, u.user_name),
                    "☺",
                    ItemTarget::User(u.clone()),
                )
            })
            .collect(),
        Step::FetchXml => palette
            .fetch_results
            .iter()
            .take(limit)
            .map(|r| ViewItem::new(&r.name, "▸", ItemTarget::FetchRecord(r.clone())).with_detail(&r.id))
            .collect(),
        Step::EntityInfoDisplay | Step::EnvironmentInfoDisplay => Vec::new(),
    }
}

fn command_items(state: &AppState, query: &str) -> Vec<ViewItem> {
    let matches = filter_commands(&state.commands, query);
    let take = if query.is_empty() {
        matches.len()
    } else {
        state.limits.result_limit
    };
    matches
        .into_iter()
        .take(take)
        .map(|c| {
            let mut item = ViewItem::new(&c.title, icon_for(c), ItemTarget::Command(c.id.clone()))
                .with_detail(&c.category);
            item.favorite = state.favorites.contains(&c.id);
            item
        })
        .collect()
}

fn entity_items(state: &AppState, palette: &PaletteState, query: &str) -> Vec<ViewItem> {
    let mut entities = filter_entities(&palette.metadata, query);
    if query.is_empty() {
        if let Some(current) = state.context.entity.as_deref() {
            if let Some(pos) = entities.iter().position(|e| e.logical_name == current) {
                let pinned = entities.remove(pos);
                entities.insert(0, pinned);
            }
        }
    }

    let mut items: Vec<ViewItem> = entities
        .into_iter()
        .take(state.limits.result_limit)
        .map(|e| ViewItem::new(&e.display_name, "◆", ItemTarget::Entity(e.clone())).with_detail(&e.logical_name))
        .collect();

    let known = palette
        .metadata
        .iter()
        .any(|e| e.logical_name.eq_ignore_ascii_case(query));
    if !query.is_empty() && !known {
        items.push(
            ViewItem::new(
                format!("Use \"{query}\""),
                "✎",
                ItemTarget::Entity(EntityInfo::guessed(query)),
            )
            .with_detail("typed entity name"),
        );
    }
    items
}

/// The favorites row; only the empty command list shows it.
#[must_use]
pub fn favorite_chips(state: &AppState, palette: &PaletteState) -> Vec<FavoriteChip> {
    if palette.step != Step::Commands || !palette.query.is_blank() {
        return Vec::new();
    }
    state
        .favorites
        .items()
        .iter()
        .filter_map(|fav| {
            let command = find_command(&state.commands, &fav.id)?;
            Some(FavoriteChip {
                id: fav.id.clone(),
                title: command.title.clone(),
                icon: icon_for(command).to_string(),
                bg_color: fav.bg_color.clone(),
                icon_color: fav.icon_color.clone(),
            })
        })
        .collect()
}

/// The command id under the cursor, in the command list.
#[must_use]
pub fn selected_command(state: &AppState, palette: &PaletteState) -> Option<String> {
    if palette.step != Step::Commands {
        return None;
    }
    match items(state, palette).into_iter().nth(palette.selected)?.target {
        ItemTarget::Command(id) => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::favorites::Favorites;
    use crate::domain::models::FavCommand;
    use std::sync::Arc;

    fn entity(logical: &str, display: &str) -> EntityInfo {
        EntityInfo {
            display_name: display.to_string(),
            ..EntityInfo::guessed(logical)
        }
    }

    fn entity_palette<'a>(query: &str) -> PaletteState<'a> {
        let mut palette = PaletteState::new(None);
        palette.push_step("Open", Step::OpenRecordEntity);
        palette.metadata = Arc::new(vec![
            entity("account", "Account"),
            entity("contact", "Contact"),
            entity("incident", "Case"),
        ]);
        palette.query.insert_str(query);
        palette
    }

    #[test]
    fn test_empty_command_list_is_uncapped() {
        let mut state = AppState::default();
        state.limits.result_limit = 3;
        let palette = PaletteState::new(None);
        assert_eq!(items(&state, &palette).len(), state.commands.len());

        let mut palette = PaletteState::new(None);
        palette.query.insert_str("o");
        assert!(items(&state, &palette).len() <= 3);
    }

    #[test]
    fn test_favorite_marker_only_on_commands() {
        let mut state = AppState::default();
        state.favorites = Favorites::new(vec![FavCommand::new("openRecordSpotlight")]);
        let palette = PaletteState::new(None);
        let rows = items(&state, &palette);
        assert!(rows[0].favorite);
        assert_eq!(rows[0].target, ItemTarget::Command("openRecordSpotlight".to_string()));
        assert_eq!(favorite_chips(&state, &palette).len(), 1);

        let entity_step = entity_palette("");
        assert!(items(&state, &entity_step).iter().all(|i| !i.favorite));
        assert!(favorite_chips(&state, &entity_step).is_empty());
    }

    #[test]
    fn test_context_entity_is_pinned() {
        let mut state = AppState::default();
        state.context.entity = Some("incident".to_string());
        let rows = items(&state, &entity_palette(""));
        assert_eq!(rows[0].label, "Case");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_typed_fallback() {
        let state = AppState::default();
        let rows = items(&state, &entity_palette("new_widget"));
        let last = rows.last().unwrap();
        assert_eq!(last.target, ItemTarget::Entity(EntityInfo::guessed("new_widget")));

        let rows = items(&state, &entity_palette("ACCOUNT"));
        assert!(rows
            .iter()
            .all(|r| !matches!(&r.target, ItemTarget::Entity(e) if e.logical_name == "ACCOUNT")));
    }

    #[test]
    fn test_record_rows_end_with_list_link() {
        let state = AppState::default();
        let mut palette = PaletteState::new(None);
        palette.selected_entity = Some(entity("account", "Account"));
        palette.push_step("Account", Step::OpenRecordId);
        palette.records = vec![RecordRef {
            id: "1".to_string(),
            name: "Contoso".to_string(),
        }];
        let rows = items(&state, &palette);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].label, "Open Account list");
    }
}
