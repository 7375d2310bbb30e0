use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TellerError};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ledger_file: Option<String>,
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

fn default_session_file() -> String {
    ".teller-session.json".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ledger_file: None,
            session_file: default_session_file(),
        }
    }
}

impl Settings {
    /// Settings stored at `path`. A missing file means defaults; a file that
    /// cannot be read or decoded is logged and also falls back to defaults.
    pub fn read(path: &Path) -> Settings {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Settings::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read settings, using defaults");
                return Settings::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "malformed settings, using defaults");
            Settings::default()
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, format!("{json}\n"))?;
        debug!(path = %path.display(), "saved settings");
        Ok(())
    }
}

/// `$HOME/.config/teller/settings.json`, or `None` without a home directory.
pub fn settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("teller").join(SETTINGS_FILE))
}

pub fn load_settings() -> Settings {
    settings_path()
        .map(|path| Settings::read(&path))
        .unwrap_or_default()
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = settings_path()
        .ok_or_else(|| TellerError::Settings("no home directory to store settings in".to_string()))?;
    settings.write(&path)
}

/// Ledger path from the command line, falling back to the configured default.
pub fn resolve_ledger(explicit: Option<&str>) -> Result<PathBuf> {
    explicit
        .map(str::to_string)
        .or_else(|| load_settings().ledger_file)
        .map(|p| expand_home(&p))
        .ok_or(TellerError::NoLedger)
}

/// Replace a leading `~` or `~/` with the home directory. `~user` and every
/// other path come back unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}
