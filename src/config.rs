//! User configuration, read from `~/.config/talk_cleaner.ron`.

use chrono::{DateTime, Local};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::delete::RemovalMode;
use crate::core::scan::default_received_dir;
use crate::core::search::PREVIEW_MAX_CHARS;

const CONFIG_FILENAME: &str = "talk_cleaner.ron";

/// Overrides `root_dir` when set.
pub const ROOT_DIR_ENV: &str = "TALK_CLEANER_DIR";

/// External editor that can jump to a line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub program: PathBuf,
    /// Argument placed before the path; `{line}` is replaced by the line number.
    pub line_arg: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub root_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub preview_chars: usize,
    pub use_trash: bool,
    pub editor: Option<EditorConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            archive_dir: None,
            preview_chars: PREVIEW_MAX_CHARS,
            use_trash: false,
            editor: default_editor(),
        }
    }
}

fn default_editor() -> Option<EditorConfig> {
    if cfg!(target_os = "windows") {
        Some(EditorConfig {
            program: PathBuf::from(r"C:\Program Files\Notepad++\notepad++.exe"),
            line_arg: "-n{line}".into(),
        })
    } else {
        None
    }
}

impl AppConfig {
    /// Load from the user's config file, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = config_path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default();
        if let Some(dir) = std::env::var_os(ROOT_DIR_ENV) {
            config.root_dir = Some(PathBuf::from(dir));
        }
        config
    }

    /// Missing file yields defaults; unreadable or malformed files are logged
    /// and also yield defaults.
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Self::default();
            }
            Err(err) => {
                warn!("Failed to read config from {:?}: {}", path, err);
                return Self::default();
            }
        };

        match ron::from_str(&content) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(err) => {
                warn!("Failed to parse config from {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn received_dir(&self) -> PathBuf {
        self.root_dir.clone().unwrap_or_else(default_received_dir)
    }

    pub fn removal_mode(&self) -> RemovalMode {
        if self.use_trash {
            RemovalMode::Trash
        } else {
            RemovalMode::Permanent
        }
    }

    /// `<archive dir>/kakaotalk_file_<YYYYmmdd_HHMMSS>.zip`
    pub fn default_archive_path(&self, now: DateTime<Local>) -> PathBuf {
        let dir = self
            .archive_dir
            .clone()
            .or_else(|| home::home_dir().map(|h| h.join("Desktop")))
            .unwrap_or_default();
        dir.join(format!("kakaotalk_file_{}.zip", now.format("%Y%m%d_%H%M%S")))
    }
}

pub fn config_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(".config").join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("none.ron"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.preview_chars, 35);
        assert_eq!(config.removal_mode(), RemovalMode::Permanent);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(root_dir: Some("/data/received"), use_trash: true, preview_chars: 20)"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.received_dir(), PathBuf::from("/data/received"));
        assert_eq!(config.removal_mode(), RemovalMode::Trash);
        assert_eq!(config.preview_chars, 20);
        assert_eq!(config.archive_dir, None);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "(root_dir: ").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
    }

    #[test]
    fn archive_name_carries_timestamp() {
        let config = AppConfig {
            archive_dir: Some(PathBuf::from("/out")),
            ..AppConfig::default()
        };
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            config.default_archive_path(now),
            PathBuf::from("/out/kakaotalk_file_20240309_140507.zip")
        );
    }
}
