//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::info;

/// Create the parent directory of `data_file` if it is missing.
pub async fn ensure_data_dir(data_file: &str) -> anyhow::Result<()> {
    let Some(dir) = Path::new(data_file).parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::metadata(dir).await.is_err() {
        info!(dir = %dir.display(), "creating data directory");
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    Ok(())
}
