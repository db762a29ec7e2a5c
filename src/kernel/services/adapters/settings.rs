//! 配置与数据目录
//!
//! - 配置文件：`$FSEARCH_SETTINGS`，否则 `<config dir>/fsearch/settings.json`
//!   - macOS: ~/Library/Application Support
//!   - Linux: $XDG_CONFIG_HOME 或 ~/.config
//! - 日志目录：`<data dir>/fsearch/logs`
//!   - Linux: $XDG_DATA_HOME 或 ~/.local/share

use crate::kernel::services::ports::settings::SearchSettings;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "fsearch";
const SETTINGS_FILE: &str = "settings.json";
const SETTINGS_ENV: &str = "FSEARCH_SETTINGS";
const LOG_DIR: &str = "logs";

pub fn get_settings_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(SETTINGS_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    get_config_dir().map(|dir| dir.join(APP_NAME).join(SETTINGS_FILE))
}

/// 读取配置文件；文件不存在或无法解析时返回默认配置。
pub fn load_settings() -> SearchSettings {
    match get_settings_path() {
        Some(path) => load_settings_from(&path),
        None => SearchSettings::default(),
    }
}

pub fn load_settings_from(path: &Path) -> SearchSettings {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return SearchSettings::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
            return SearchSettings::default();
        }
    };
    match serde_json::from_str(&data) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "settings invalid, using defaults");
            SearchSettings::default()
        }
    }
}

/// 获取日志目录路径
pub fn get_log_dir() -> Option<PathBuf> {
    get_data_dir().map(|p| p.join(APP_NAME).join(LOG_DIR))
}

/// 确保日志目录存在
pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    let dir = get_log_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Cannot determine log directory",
        )
    })?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"));
    }

    #[cfg(not(target_os = "macos"))]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg));
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config"));
    }
}

fn get_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"));
    }

    #[cfg(not(target_os = "macos"))]
    {
        // 优先使用 XDG_DATA_HOME，否则使用 ~/.local/share
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return Some(PathBuf::from(xdg));
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".local/share"));
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
