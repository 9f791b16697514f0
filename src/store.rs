use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{info, warn};
use thiserror::Error;

use crate::data::loader;
use crate::data::model::Table;
use crate::data::writer::to_csv;
use crate::error::TableError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    /// The operation is reserved for admins.
    #[error("Permission denied: {0} requires admin access")]
    PermissionDenied(&'static str),

    #[error("Invalid history prefix '{0}'")]
    InvalidPrefix(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

/// Caller-supplied privilege. No authentication happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Admin,
    Viewer,
}

impl Access {
    pub fn from_flag(privileged: bool) -> Self {
        if privileged {
            Access::Admin
        } else {
            Access::Viewer
        }
    }

    pub fn is_privileged(self) -> bool {
        self == Access::Admin
    }
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// On-disk layout of a workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    /// File name of the shared reference table, relative to `root`.
    pub master_file: String,
    /// Directory for trade-history uploads, relative to `root`.
    pub history_dir: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig::at("data")
    }
}

impl WorkspaceConfig {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        WorkspaceConfig {
            root: root.into(),
            master_file: "scrip_master.csv".to_string(),
            history_dir: "history".to_string(),
        }
    }
}

/// Storage for the admin-managed scrip master and per-upload trade history.
#[derive(Debug, Clone)]
pub struct Workspace {
    master_path: PathBuf,
    history_path: PathBuf,
}

impl Workspace {
    /// Open (and create if needed) the workspace directories.
    pub fn open(config: &WorkspaceConfig) -> StoreResult<Self> {
        let history_path = config.root.join(&config.history_dir);
        fs::create_dir_all(&history_path).map_err(io_err(&history_path))?;
        Ok(Workspace {
            master_path: config.root.join(&config.master_file),
            history_path,
        })
    }

    pub fn master_path(&self) -> &Path {
        &self.master_path
    }

    /// The current scrip master, or `None` if none has been uploaded.
    pub fn load_master(&self) -> StoreResult<Option<Table>> {
        if !self.master_path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.master_path).map_err(io_err(&self.master_path))?;
        Ok(Some(loader::load(&bytes, &file_name(&self.master_path))?))
    }

    /// Overwrite the scrip master. Admin only.
    pub fn replace_master(&self, access: Access, table: &Table) -> StoreResult<()> {
        require_admin(access, "replacing the scrip master")?;
        let bytes = to_csv(table)?;
        fs::write(&self.master_path, bytes).map_err(io_err(&self.master_path))?;
        info!(
            "scrip master replaced: {} rows -> {}",
            table.len(),
            self.master_path.display()
        );
        Ok(())
    }

    /// Delete the scrip master. Admin only. Returns whether a file was removed.
    pub fn delete_master(&self, access: Access) -> StoreResult<bool> {
        require_admin(access, "deleting the scrip master")?;
        match fs::remove_file(&self.master_path) {
            Ok(()) => {
                info!("scrip master deleted: {}", self.master_path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err(&self.master_path)(e)),
        }
    }

    /// Save an uploaded trade history as `<prefix>_<YYYYMMDD_HHMMSS>.csv`.
    pub fn save_history(
        &self,
        prefix: &str,
        table: &Table,
        at: NaiveDateTime,
    ) -> StoreResult<PathBuf> {
        let path = self.history_path.join(history_file_name(prefix, at)?);
        let bytes = to_csv(table)?;
        fs::write(&path, bytes).map_err(io_err(&path))?;
        info!("trade history saved: {}", path.display());
        Ok(path)
    }

    /// Saved history files, oldest name first.
    pub fn list_history(&self) -> StoreResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.history_path).map_err(io_err(&self.history_path))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(io_err(&self.history_path))?.path();
            if path.extension().is_some_and(|e| e == "csv") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn load_history(&self, path: &Path) -> StoreResult<Table> {
        let bytes = fs::read(path).map_err(io_err(path))?;
        Ok(loader::load(&bytes, &file_name(path))?)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `<prefix>_<YYYYMMDD_HHMMSS>.csv`. The prefix may not contain path separators.
pub fn history_file_name(prefix: &str, at: NaiveDateTime) -> StoreResult<String> {
    let valid = !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(StoreError::InvalidPrefix(prefix.to_string()));
    }
    Ok(format!("{prefix}_{}.csv", at.format("%Y%m%d_%H%M%S")))
}

fn require_admin(access: Access, op: &'static str) -> StoreResult<()> {
    if access.is_privileged() {
        Ok(())
    } else {
        warn!("refused {op} for a viewer");
        Err(StoreError::PermissionDenied(op))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
