use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Where a `JsonMapStore` document lives.
/// Implementations can be file-backed or in-memory.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Raw document bytes, or `None` when no document exists yet.
    async fn read(&self) -> Result<Option<Vec<u8>>, ServiceError>;
    /// Replace the whole document.
    async fn write(&self, bytes: Vec<u8>) -> Result<(), ServiceError>;
    /// Move an unreadable document out of the way so it is not overwritten.
    async fn quarantine(&self) -> Result<(), ServiceError>;
    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Single JSON file, replaced atomically (temp file + rename) on every write.
#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// First `<file>.corrupt[.N]` name that is not taken.
    async fn quarantine_target(&self) -> PathBuf {
        let base = self.with_suffix(".corrupt");
        if !fs::try_exists(&base).await.unwrap_or(false) {
            return base;
        }
        let mut n = 1u32;
        loop {
            let candidate = self.with_suffix(&format!(".corrupt.{n}"));
            if !fs::try_exists(&candidate).await.unwrap_or(false) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[async_trait]
impl StoreBackend for FileBackend {
    async fn read(&self) -> Result<Option<Vec<u8>>, ServiceError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServiceError::Storage(format!("read {}: {e}", self.path.display()))),
        }
    }

    async fn write(&self, bytes: Vec<u8>) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Storage(format!("create {}: {e}", parent.display())))?;
        }

        // Same directory as the target so the rename stays on one filesystem.
        let tmp_path = self.with_suffix(".tmp");
        fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| ServiceError::Storage(format!("write {}: {e}", tmp_path.display())))?;

        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ServiceError::Storage(format!("replace {}: {e}", self.path.display())));
        }
        debug!(path = %self.path.display(), bytes = bytes.len(), "document written");
        Ok(())
    }

    async fn quarantine(&self) -> Result<(), ServiceError> {
        let target = self.quarantine_target().await;
        fs::rename(&self.path, &target)
            .await
            .map_err(|e| ServiceError::Storage(format!("quarantine {}: {e}", self.path.display())))?;
        warn!(from = %self.path.display(), to = %target.display(), "unreadable document moved aside");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory document for tests. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    doc: Mutex<Option<Vec<u8>>>,
    quarantined: Mutex<Vec<Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
        Self { doc: Mutex::new(Some(bytes.into())), ..Self::default() }
    }

    pub async fn contents(&self) -> Option<Vec<u8>> {
        self.doc.lock().await.clone()
    }

    pub async fn quarantined(&self) -> Vec<Vec<u8>> {
        self.quarantined.lock().await.clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn read(&self) -> Result<Option<Vec<u8>>, ServiceError> {
        Ok(self.doc.lock().await.clone())
    }

    async fn write(&self, bytes: Vec<u8>) -> Result<(), ServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::Storage("memory backend: write refused".into()));
        }
        *self.doc.lock().await = Some(bytes);
        Ok(())
    }

    async fn quarantine(&self) -> Result<(), ServiceError> {
        if let Some(bytes) = self.doc.lock().await.take() {
            self.quarantined.lock().await.push(bytes);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
