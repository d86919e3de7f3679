//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (platform config dir, e.g. ~/.config/examforge/examforge.toml)
//! 3. Project config (./examforge.toml)
//! 4. Environment variables (EXAMFORGE_* prefix, `__` as section separator)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{ForgeError, Result};

/// Project-local config file name
const PROJECT_CONFIG_FILE: &str = "examforge.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Merge global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        // Merge project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // Merge environment variables.
        // Double underscore separates sections so keys like
        // EXAMFORGE_CHUNKING__MAX_TOKENS_PER_CHUNK map cleanly.
        figment = figment.merge(Env::prefixed("EXAMFORGE_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ForgeError::config(format!("configuration error: {e}")))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only (plus defaults)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ForgeError::config(format!("configuration error: {e}")))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to the global config directory (platform-specific)
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "examforge").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(PROJECT_CONFIG_FILE))
    }

    /// Get path to the project-local config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_CONFIG_FILE)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            ForgeError::config("cannot determine global config directory")
        })?;

        fs::create_dir_all(&global_dir)
            .map_err(|e| ForgeError::config(format!("failed to create config dir: {e}")))?;

        let config_path = global_dir.join(PROJECT_CONFIG_FILE);
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_template())
                .map_err(|e| ForgeError::config(format!("failed to write config: {e}")))?;
            info!("Created global config: {}", config_path.display());
        } else {
            info!("Global config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Initialize a project-local configuration file
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let config_path = Self::project_config_path();
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_template())
                .map_err(|e| ForgeError::config(format!("failed to write config: {e}")))?;
            info!("Created project config: {}", config_path.display());
        } else {
            info!("Project config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Starter config file content (TOML)
    fn default_config_template() -> &'static str {
        r#"# ExamForge Configuration
# Project settings here override the global file; EXAMFORGE_* environment
# variables override both (use __ between sections, e.g.
# EXAMFORGE_BACKEND__PROVIDER=gemini).

version = "1.0"

# Completion backend
[backend]
provider = "ollama"            # ollama | gemini
# model = "llama3:latest"
# endpoint = "http://localhost:11434"
timeout_secs = 120

# Structural chunking
[chunking]
max_tokens_per_chunk = 8000
min_tokens_per_chunk = 100

# Retry policy
[generation]
max_attempts = 3
base_delay_ms = 1000

# Sampling defaults
[sampling]
temperature = 0.7
top_p = 0.95
max_output_tokens = 8192
"#
    }
}
