use crate::core::config::AppConfig;
use anyhow::Context;

const DEFAULT_CONFIG: &str = r#"---
store:
  base_url: "https://your-project.supabase.co"
  api_key: "YOUR_STORE_API_KEY"

# Required only for `fundlot import`
parser:
  base_url: "https://t21-parser.example.com"
  api_key: "YOUR_PARSER_API_KEY"
"#;

/// Creates the default configuration file, refusing to overwrite one.
pub fn run() -> anyhow::Result<()> {
    let path = AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
