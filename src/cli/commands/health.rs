//! Health Command
//!
//! Check that the configured completion backend is reachable and that the
//! configured model is available.
//!
//! Usage:
//!   examforge health
//!   examforge health --provider gemini

use std::str::FromStr;

use crate::ai::provider::create_backend;
use crate::cli::ui::Output;
use crate::config::{BackendKind, ConfigLoader};

pub async fn run(provider: Option<String>, model: Option<String>) -> anyhow::Result<()> {
    let output = Output::new();

    let mut config = ConfigLoader::load()?;
    if let Some(provider) = &provider {
        config.backend.provider = BackendKind::from_str(provider).map_err(anyhow::Error::msg)?;
    }
    if let Some(model) = model {
        config.backend.model = Some(model);
    }

    let backend = create_backend(&config.backend)?;
    output.info(&format!(
        "Checking {} (model: {})",
        backend.name(),
        backend.model()
    ));

    if backend.health_check().await? {
        output.success("Backend is reachable and the model is available");
        Ok(())
    } else {
        output.error("Backend check failed; see warnings above");
        anyhow::bail!("backend '{}' is not healthy", backend.name());
    }
}
