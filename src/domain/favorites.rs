use super::models::FavCommand;

pub const MAX_FAVORITES: usize = 8;

/// Background/icon color pairs a favorite can cycle through.
pub const COLOR_PRESETS: [(&str, &str); 6] = [
    ("#f3e8fc", "#a631af"),
    ("#e8f1fc", "#1959a8"),
    ("#e8fce8", "#1a7a1f"),
    ("#fff4e5", "#c47a07"),
    ("#fde8f3", "#c01b77"),
    ("#f0f0f0", "#555555"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Already at `MAX_FAVORITES`; nothing changed.
    Full,
}

/// Ordered list of pinned command ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Favorites {
    items: Vec<FavCommand>,
}

impl Favorites {
    #[must_use]
    pub fn new(mut items: Vec<FavCommand>) -> Self {
        let mut seen = std::collections::HashSet::new();
        items.retain(|f| seen.insert(f.id.clone()));
        items.truncate(MAX_FAVORITES);
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[FavCommand] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|f| f.id == id)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FavCommand> {
        self.items.get(index)
    }

    pub fn toggle(&mut self, id: &str) -> ToggleOutcome {
        if let Some(idx) = self.position(id) {
            self.items.remove(idx);
            ToggleOutcome::Removed
        } else if self.items.len() >= MAX_FAVORITES {
            ToggleOutcome::Full
        } else {
            self.items.push(FavCommand::new(id));
            ToggleOutcome::Added
        }
    }

    /// Moves the favorite to the next color preset and returns its index.
    pub fn cycle_color(&mut self, id: &str) -> Option<usize> {
        let fav = self.items.iter_mut().find(|f| f.id == id)?;
        let current = fav
            .bg_color
            .as_deref()
            .and_then(|bg| COLOR_PRESETS.iter().position(|(b, _)| *b == bg));
        let next = current.map_or(0, |i| (i + 1) % COLOR_PRESETS.len());
        let (bg, icon) = COLOR_PRESETS[next];
        fav.bg_color = Some(bg.to_string());
        fav.icon_color = Some(icon.to_string());
        Some(next)
    }

    /// Drag-and-drop reorder: removes the item at `from` and inserts it at `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() || from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_bound() {
        let mut favs = Favorites::default();
        for i in 0..MAX_FAVORITES {
            assert_eq!(favs.toggle(&format!("cmd{i}")), ToggleOutcome::Added);
        }
        assert_eq!(favs.toggle("overflow"), ToggleOutcome::Full);
        assert_eq!(favs.len(), MAX_FAVORITES);
        assert_eq!(favs.toggle("cmd3"), ToggleOutcome::Removed);
        assert!(!favs.contains("cmd3"));
        assert_eq!(favs.toggle("overflow"), ToggleOutcome::Added);
        assert_eq!(favs.items().last().unwrap().id, "overflow");
    }

    #[test]
    fn test_new_dedups_and_truncates() {
        let items = (0..12)
            .map(|i| FavCommand::new(&format!("c{}", i % 10)))
            .collect();
        let favs = Favorites::new(items);
        assert_eq!(favs.len(), MAX_FAVORITES);
        assert_eq!(favs.get(0).unwrap().id, "c0");
    }

    #[test]
    fn test_move_item_reorders() {
        let mut favs = Favorites::new(vec![
            FavCommand::new("a"),
            FavCommand::new("b"),
            FavCommand::new("c"),
        ]);
        assert!(favs.move_item(0, 2));
        let ids: Vec<&str> = favs.items().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
        assert!(!favs.move_item(0, 5));
        assert!(!favs.move_item(1, 1));
    }

    #[test]
    fn test_cycle_color_wraps() {
        let mut favs = Favorites::new(vec![FavCommand::new("a")]);
        assert_eq!(favs.cycle_color("a"), Some(0));
        assert_eq!(favs.get(0).unwrap().bg_color.as_deref(), Some(COLOR_PRESETS[0].0));
        for _ in 1..COLOR_PRESETS.len() {
            favs.cycle_color("a");
        }
        assert_eq!(favs.cycle_color("a"), Some(0));
        assert_eq!(favs.cycle_color("missing"), None);

        // Unknown colors restart the cycle.
        let mut favs = Favorites::new(vec![FavCommand {
            bg_color: Some("#000000".to_string()),
            ..FavCommand::new("a")
        }]);
        assert_eq!(favs.cycle_color("a"), Some(0));
    }
}
