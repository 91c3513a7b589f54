//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment variable consulted for the root folder
pub const ROOT_FOLDER_ENV: &str = "ADAUDIT_ROOT_FOLDER";

/// Default backend base path (JSON over HTTPS, versioned under /api/v1/)
pub const DEFAULT_API_BASE_URL: &str = "https://api.adaudit.example.com/api/v1/";

/// Default public read base URL for uploaded creatives
pub const DEFAULT_STORAGE_BASE_URL: &str =
    "https://anuj-nextjs-s3-test.s3.eu-north-1.amazonaws.com/";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime. The CLI must be re-invoked
/// to pick up changes to the TOML file.
///
/// Minimal by design - only bootstrap concerns live here.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Backend base URL (must end with the /api/v1/ base path)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Public read base URL for uploaded assets
    #[serde(default = "default_storage_base_url")]
    pub storage_base_url: String,

    /// Overall per-request timeout applied to the HTTP client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Root folder for local state (optional)
    ///
    /// If not specified, resolution falls back to environment → OS default
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            storage_base_url: default_storage_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            root_folder: None,
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_storage_base_url() -> String {
    DEFAULT_STORAGE_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    20 // matches the backend's expected client timeout
}

impl Settings {
    /// Load settings from the platform config file, falling back to defaults
    /// when no file exists
    pub fn load() -> Result<Self> {
        match load_config_file() {
            Ok(path) => {
                let toml_content = std::fs::read_to_string(&path)?;
                let settings: Settings = toml::from_str(&toml_content)
                    .map_err(|e| Error::Config(format!("Failed to parse {:?}: {}", path, e)))?;
                info!("Loaded configuration from {:?}", path);
                Ok(settings)
            }
            Err(_) => Ok(Settings::default()),
        }
    }

    /// Parse settings from a TOML string
    pub fn from_toml(toml_content: &str) -> Result<Self> {
        toml::from_str(toml_content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable (ADAUDIT_ROOT_FOLDER)
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&PathBuf>, settings: &Settings) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.clone();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &settings.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    get_default_root_folder()
}

/// Create the root folder if it does not exist yet
pub fn ensure_root_folder(root: &PathBuf) -> Result<()> {
    if !root.exists() {
        std::fs::create_dir_all(root)?;
        info!("Created root folder {:?}", root);
    }
    Ok(())
}

/// Get default configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/adaudit/config.toml first, then /etc/adaudit/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("adaudit").join("config.toml"));
        let system_config = PathBuf::from("/etc/adaudit/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("adaudit").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default root folder path
pub fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/adaudit
        dirs::data_local_dir()
            .map(|d| d.join("adaudit"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/adaudit"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/adaudit
        dirs::data_dir()
            .map(|d| d.join("adaudit"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/adaudit"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\adaudit
        dirs::data_local_dir()
            .map(|d| d.join("adaudit"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\adaudit"))
    } else {
        warn!("Unrecognized platform, using ./adaudit_data");
        PathBuf::from("./adaudit_data")
    }
}
