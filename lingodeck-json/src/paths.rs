use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "lingodeck", "LingoDeck") {
        pd.data_dir().to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

pub fn default_store_file() -> PathBuf {
    data_root().join("lingodeck.json")
}

/// Backups live next to the store file, in `backups/`.
pub fn backups_dir_for(store_file: &Path) -> PathBuf {
    store_file
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("backups")
}
