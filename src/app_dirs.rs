use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "drillr";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// Menus, selection and language live here
    pub fn storage_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.data_local_dir().join("storage.json"))
            .unwrap_or_else(|| PathBuf::from("drillr_storage.json"))
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("drillr_config.json"))
    }

    /// Follows XDG state when HOME is set, like other terminal tools
    pub fn log_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
        } else {
            Self::project()
                .map(|pd| pd.data_local_dir().join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"))
        }
    }
}
