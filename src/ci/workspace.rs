use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::TempDir;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};

const WORKSPACE_PREFIX: &str = "docker-deploy-";

/// Ephemeral directory owned by a single run.
///
/// The directory is removed by [`Workspace::close`] or, on any other exit
/// path, when the handle is dropped.
#[derive(Debug)]
pub struct Workspace {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    dir: TempDir,
}

impl Workspace {
    /// Create the workspace under the system temp directory
    pub fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    pub fn create_in(base_path: &Path) -> Result<Self> {
        let id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(base_path)
            .map_err(|e| AppError::WorkspaceError(format!("Failed to create workspace: {}", e)))?;

        info!("📁 Workspace {} created: {:?}", id, dir.path());
        Ok(Self {
            id,
            created_at: Utc::now(),
            dir,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn get_file_path(&self, relative_path: &str) -> PathBuf {
        self.path().join(relative_path)
    }

    /// Write a file readable by the current user only
    pub async fn write_private_file(&self, relative_path: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.get_file_path(relative_path);

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&file_path)
            .await
            .map_err(|e| AppError::WorkspaceError(format!("Failed to create file: {}", e)))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| AppError::WorkspaceError(format!("Failed to write file: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| AppError::WorkspaceError(format!("Failed to write file: {}", e)))?;

        debug!("📝 File written: {:?}", file_path);
        Ok(file_path)
    }

    pub fn file_exists(&self, relative_path: &str) -> bool {
        self.get_file_path(relative_path).exists()
    }

    /// Remove the workspace now. Failures are logged, never raised.
    pub fn close(self) {
        let path = self.path().to_path_buf();
        let age_ms = (Utc::now() - self.created_at).num_milliseconds();
        match self.dir.close() {
            Ok(()) => info!("🗑️ Workspace {} cleaned up after {}ms: {:?}", self.id, age_ms, path),
            Err(e) => warn!("⚠️ Failed to cleanup workspace {} {:?}: {}", self.id, path, e),
        }
    }
}
