//! Initialize a sitesmith project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing sitesmith...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'sitesmith build' to generate your sites.");

    Ok(())
}

pub const DEFAULT_CONFIG: &str = r#"# sitesmith configuration

[output]
# Output directory for built sites
dir = "dist"

# Base URL (for deployment)
base_url = "/"

[build]
# Minify the preview stylesheet
minify = true

# HTML-escape business names and types in generated pages
escape = false

# Fail the build on website types outside:
# portfolio, saas, restaurant, ecommerce
strict_types = false

[[sites]]
business_name = "Nova Studio"
website_type = "portfolio"
prompt = """
A clean portfolio for a small **design studio**.
"""
"#;
