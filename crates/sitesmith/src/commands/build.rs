//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use sitesmith_static::{BuildResult, GenerationTask, StaticBuilder};

use crate::config::load_config;

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building sites...");

    let config = load_config(config_path)?.to_build_config(output, minify);

    let task = StaticBuilder::new(config)?.spawn();
    let result = wait_with_progress(task).await?;

    tracing::info!(
        "Built {} sites ({} bytes) in {}ms",
        result.sites,
        result.bytes,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

/// Wait for a build, logging progress. Ctrl-C cancels the build.
pub async fn wait_with_progress(task: GenerationTask) -> Result<BuildResult> {
    let cancel = task.cancel_handle();
    let mut progress = task.progress();

    let join = task.join();
    tokio::pin!(join);

    let mut watching = true;
    let mut interrupted = false;

    loop {
        tokio::select! {
            result = &mut join => {
                return Ok(result?);
            }
            changed = progress.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }

                let snapshot = progress.borrow_and_update().clone();
                if let Some(current) = snapshot.current {
                    tracing::info!("[{:>3}%] {}", snapshot.percent, current);
                }
            }
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                tracing::warn!("Interrupted, cancelling build...");
                cancel.cancel();
                interrupted = true;
            }
        }
    }
}
