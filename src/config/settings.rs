use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Bridge settings, read from `~/.config/scribe/settings.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Scripts
    pub startup_script: Option<PathBuf>,
    /// JSON operation table replacing the builtin one
    pub catalog: Option<PathBuf>,

    // Script limits
    pub max_operations: u64,
    pub max_expr_depth: usize,

    // Documents
    pub code_page: i64,

    /// Echo script errors raised inside event handlers to the trace sink
    pub trace_errors: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            startup_script: None,
            catalog: None,

            max_operations: 100_000,
            max_expr_depth: 64,

            code_page: 0,

            trace_errors: true,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the default location; a missing file gives the defaults
    pub fn load() -> Result<Self, String> {
        match Self::settings_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings {}: {}", path.display(), e))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse settings: {}", e))
    }

    /// Save to the default location
    pub fn save(&self) -> Result<(), String> {
        let path = Self::settings_path().ok_or("No home directory")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        fs::write(&path, content).map_err(|e| format!("Failed to write settings: {}", e))
    }

    /// Uses ~/.config/scribe/ on all platforms for consistency
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("scribe"))
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// The configured startup script, else `init.rhai` in the config dir
    pub fn startup_script_path(&self) -> Option<PathBuf> {
        self.startup_script
            .clone()
            .or_else(|| Self::config_dir().map(|p| p.join("init.rhai")))
    }
}
