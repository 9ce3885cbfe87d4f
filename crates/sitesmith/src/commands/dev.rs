//! Development server command.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use sitesmith_server::{DevServer, DevServerConfig, SiteRebuilder};
use sitesmith_static::{BuildConfig, StaticBuilder};
use sitesmith_template::Escaping;

use super::build::wait_with_progress;
use crate::config::load_config;

/// Rebuilds from the config file on every change.
struct ConfigRebuilder {
    config_path: PathBuf,
    escaping: Mutex<Option<Escaping>>,
}

impl ConfigRebuilder {
    fn new(config_path: &Path) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            escaping: Mutex::new(None),
        }
    }

    fn build_config(&self) -> Result<BuildConfig> {
        let mut config = load_config(&self.config_path)?.to_build_config(None, None);
        config.live_reload = true;
        Ok(config)
    }
}

impl SiteRebuilder for ConfigRebuilder {
    fn rebuild(&self) -> Result<(), String> {
        let config = self.build_config().map_err(|e| format!("{:#}", e))?;
        let escaping = config.escaping;

        let result = StaticBuilder::new(config)
            .and_then(|builder| builder.build_blocking())
            .map_err(|e| e.to_string())?;

        tracing::info!("Rebuilt {} sites in {}ms", result.sites, result.duration_ms);

        if let Ok(mut last) = self.escaping.lock() {
            *last = Some(escaping);
        }
        Ok(())
    }

    fn escaping(&self) -> Option<Escaping> {
        self.escaping.lock().ok().and_then(|last| *last)
    }
}

/// Run the dev server.
pub async fn run(config_path: &Path, port: u16, open: bool) -> Result<()> {
    let rebuilder = ConfigRebuilder::new(config_path);

    let build_config = rebuilder.build_config()?;
    let output_dir = build_config.output_dir.clone();
    let escaping = build_config.escaping;

    wait_with_progress(StaticBuilder::new(build_config)?.spawn()).await?;

    tracing::info!("Starting development server on port {}", port);

    let config = DevServerConfig {
        output_dir,
        watch_paths: vec![config_path.to_path_buf()],
        port,
        open,
        escaping,
        ..Default::default()
    };

    DevServer::new(config).with_rebuilder(rebuilder).start().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn rebuild_enables_live_reload() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("sitesmith.toml");
        let out = temp.path().join("dist");

        fs::write(
            &config_path,
            format!(
                "[output]\ndir = {:?}\n\n[[sites]]\nbusiness_name = \"Acme\"\n",
                out.display().to_string()
            ),
        )
        .unwrap();

        let rebuilder = ConfigRebuilder::new(&config_path);
        rebuilder.rebuild().unwrap();

        let preview = fs::read_to_string(out.join("acme/preview.html")).unwrap();
        assert!(preview.contains("__reload.js"));
    }

    #[test]
    fn rebuild_picks_up_escape_setting() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("sitesmith.toml");
        let out = temp.path().join("dist").display().to_string();
        let write_config = |escape: bool| {
            fs::write(
                &config_path,
                format!(
                    "[output]\ndir = {:?}\n\n[build]\nescape = {}\n\n[[sites]]\nbusiness_name = \"Acme\"\n",
                    out, escape
                ),
            )
            .unwrap();
        };

        let rebuilder = ConfigRebuilder::new(&config_path);
        assert_eq!(rebuilder.escaping(), None);

        write_config(false);
        rebuilder.rebuild().unwrap();
        assert_eq!(rebuilder.escaping(), Some(Escaping::None));

        write_config(true);
        rebuilder.rebuild().unwrap();
        assert_eq!(rebuilder.escaping(), Some(Escaping::Html));
    }

    #[test]
    fn rebuild_reports_config_errors() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("sitesmith.toml");
        fs::write(&config_path, "not = [valid").unwrap();

        let rebuilder = ConfigRebuilder::new(&config_path);
        let err = rebuilder.rebuild().unwrap_err();
        assert_eq!(rebuilder.escaping(), None);
        assert!(err.contains("Failed to parse"));
    }
}
