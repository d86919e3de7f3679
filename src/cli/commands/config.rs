//! Config Command
//!
//! Manage ExamForge configuration.
//!
//! Usage:
//!   examforge config show [--format json]
//!   examforge config path
//!   examforge config init [--global] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;

/// Show the merged effective configuration.
pub fn show(format: &str) -> anyhow::Result<()> {
    let config = ConfigLoader::load()?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&config)?),
        _ => println!("{}", toml::to_string_pretty(&config)?),
    }
    Ok(())
}

/// Show configuration file paths and whether each exists.
pub fn path() -> anyhow::Result<()> {
    let output = Output::new();

    match ConfigLoader::global_config_path() {
        Some(global) => output.key_value(
            "Global",
            &format!(
                "{} {}",
                global.display(),
                if global.exists() { "(exists)" } else { "(missing)" }
            ),
        ),
        None => output.warning("Cannot determine global config directory"),
    }

    let project = ConfigLoader::project_config_path();
    output.key_value(
        "Project",
        &format!(
            "{} {}",
            project.display(),
            if project.exists() { "(exists)" } else { "(missing)" }
        ),
    );
    Ok(())
}

/// Create a starter config file, globally or in the current directory.
pub fn init(global: bool, force: bool) -> anyhow::Result<()> {
    let output = Output::new();
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    output.success(&format!("Configuration ready at {}", path.display()));
    Ok(())
}
