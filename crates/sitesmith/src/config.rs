//! Configuration file (sitesmith.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sitesmith_static::{BuildConfig, SiteSpec};
use sitesmith_template::{Escaping, WebsiteRequest};

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub sites: Vec<SiteEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output")]
    pub dir: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
    #[serde(default)]
    pub escape: bool,
    #[serde(default)]
    pub strict_types: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
            escape: false,
            strict_types: false,
        }
    }
}

/// A `[[sites]]` table.
#[derive(Debug, Deserialize)]
pub struct SiteEntry {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub website_type: String,
    #[serde(default)]
    pub prompt: String,
    pub slug: Option<String>,
}

fn default_output() -> String {
    "dist".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_minify() -> bool {
    true
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

impl ConfigFile {
    /// Builder configuration, with command line overrides applied.
    pub fn to_build_config(&self, output: Option<PathBuf>, minify: Option<bool>) -> BuildConfig {
        BuildConfig {
            output_dir: output.unwrap_or_else(|| PathBuf::from(&self.output.dir)),
            base_url: self.output.base_url.clone(),
            sites: self
                .sites
                .iter()
                .map(|site| SiteSpec {
                    request: WebsiteRequest::new(
                        site.business_name.as_str(),
                        site.website_type.as_str(),
                        site.prompt.as_str(),
                    ),
                    slug: site.slug.clone(),
                })
                .collect(),
            minify: minify.unwrap_or(self.build.minify),
            escaping: if self.build.escape {
                Escaping::Html
            } else {
                Escaping::None
            },
            strict_types: self.build.strict_types,
            live_reload: false,
        }
    }
}
