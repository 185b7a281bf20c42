use crate::domain::favorites::Favorites;
use crate::domain::models::FavCommand;
use crate::error::StorageError;
use crate::infrastructure::storage::{read_json, write_json, KeyValueStore, FAVORITES_KEY};
use std::path::PathBuf;

/// `~/.config/spotlight`, home of the config file, logs and storage.
pub fn get_config_dir() -> Option<PathBuf> {
    home::home_dir().map(|mut path| {
        path.push(".config");
        path.push("spotlight");
        path
    })
}

/// Saved favorites. A missing or unreadable entry yields an empty list.
pub fn load_favorites(store: &dyn KeyValueStore) -> Favorites {
    match read_json::<Vec<FavCommand>>(store, FAVORITES_KEY) {
        Ok(Some(items)) => Favorites::new(items),
        Ok(None) => Favorites::default(),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable favorites");
            Favorites::default()
        }
    }
}

pub fn save_favorites(store: &dyn KeyValueStore, favorites: &Favorites) -> Result<(), StorageError> {
    write_json(store, FAVORITES_KEY, &favorites.items())
}
