use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub download_dir: PathBuf,
    pub session_cookie: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            download_dir: PathBuf::from("."),
            session_cookie: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    download_dir: Option<PathBuf>,
    session_cookie: Option<String>,
}

pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    load_settings_with_env(config_path, |key| std::env::var(key).ok())
}

/// Defaults, then the optional TOML file, then environment overrides.
fn load_settings_with_env(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let file_cfg = read_file_settings(config_path)?;
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.download_dir {
        settings.download_dir = v;
    }
    if let Some(v) = file_cfg.session_cookie {
        settings.session_cookie = Some(v);
    }

    if let Some(v) = env("SUMMARIZER_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("SUMMARIZER_DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }
    if let Some(v) = env("APP__DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }

    if let Some(v) = env("SUMMARIZER_SESSION_COOKIE").filter(|v| !v.trim().is_empty()) {
        settings.session_cookie = Some(v);
    }

    Ok(settings)
}

fn read_file_settings(config_path: &Path) -> anyhow::Result<FileSettings> {
    let raw = match fs::read_to_string(config_path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(FileSettings::default()),
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to read settings file '{}'", config_path.display())
            })
        }
    };

    toml::from_str(&raw)
        .with_context(|| format!("invalid settings file '{}'", config_path.display()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
