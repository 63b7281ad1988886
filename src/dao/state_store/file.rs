//! JSON file backend shared between the control surface and the screen process.

use std::{
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tempfile::Builder;
use tokio::{fs, task};
use tracing::{debug, info, warn};

use crate::{
    dao::{
        models::StateDocument,
        state_store::StateStore,
        storage::{StorageError, StorageResult},
    },
    state::display::DisplayState,
};

/// Stores the display state as a JSON document, replacing it atomically on every save.
///
/// Saves go to a temporary sibling file that is flushed to disk and then renamed over the target,
/// so a concurrent reader sees either the previous or the next document in full.
#[derive(Clone)]
pub struct FileStateStore {
    path: Arc<Path>,
    defaults: Arc<DisplayState>,
}

impl FileStateStore {
    /// Create a store persisting to `path`, seeding it with `defaults` when nothing usable exists.
    pub fn new(path: impl Into<PathBuf>, defaults: DisplayState) -> Self {
        let path: PathBuf = path.into();
        Self {
            path: Arc::from(path),
            defaults: Arc::new(defaults),
        }
    }

    /// Location of the state document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> StorageResult<DisplayState> {
        match fs::read(&*self.path).await {
            Ok(bytes) => match serde_json::from_slice::<StateDocument>(&bytes) {
                Ok(document) => return Ok(document.into_state(&self.defaults)),
                Err(err) => warn!(
                    path = %self.path.display(),
                    error = %err,
                    "state file is corrupt; restoring defaults"
                ),
            },
            Err(err) if err.kind() == ErrorKind::NotFound => info!(
                path = %self.path.display(),
                "state file not found; writing defaults"
            ),
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                "state file unreadable; restoring defaults"
            ),
        }

        let defaults = DisplayState::clone(&self.defaults);
        self.write(&defaults).await?;
        Ok(defaults)
    }

    async fn write(&self, state: &DisplayState) -> StorageResult<()> {
        let document = StateDocument::from(state.clone());
        let bytes =
            serde_json::to_vec_pretty(&document).map_err(|source| StorageError::Encode {
                path: self.path.to_path_buf(),
                source,
            })?;

        self.ensure_parent_dir().await?;

        let path = Arc::clone(&self.path);
        let dir = self.parent_dir().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let replaced = task::spawn_blocking(move || replace_file(&dir, &path, &bytes))
            .await
            .map_err(|err| {
                StorageError::unavailable(
                    format!("write task for `{}` did not finish", self.path.display()),
                    err,
                )
            })?;

        replaced.map_err(|err| {
            StorageError::unavailable(format!("failed to replace `{}`", self.path.display()), err)
        })?;

        debug!(path = %self.path.display(), "state file replaced");
        Ok(())
    }

    async fn ensure_parent_dir(&self) -> StorageResult<()> {
        let Some(parent) = self.parent_dir() else {
            return Ok(());
        };
        fs::create_dir_all(parent).await.map_err(|err| {
            StorageError::unavailable(
                format!("failed to create directory `{}`", parent.display()),
                err,
            )
        })
    }

    async fn check(&self) -> StorageResult<()> {
        self.ensure_parent_dir().await?;
        let dir = self.parent_dir().unwrap_or_else(|| Path::new("."));
        let metadata = fs::metadata(dir).await.map_err(|err| {
            StorageError::unavailable(format!("cannot inspect `{}`", dir.display()), err)
        })?;

        if metadata.permissions().readonly() {
            return Err(StorageError::unavailable(
                format!("directory `{}` is read-only", dir.display()),
                io::Error::from(ErrorKind::PermissionDenied),
            ));
        }
        Ok(())
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }
}

/// Write `bytes` to a hidden sibling of `path`, flush it to disk and rename it over `path`.
///
/// The temporary file is removed when any step before the rename fails.
fn replace_file(dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let prefix = match path.file_name() {
        Some(name) => format!(".{}.", name.to_string_lossy()),
        None => ".state.".to_owned(),
    };
    let mut temp = Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

impl StateStore for FileStateStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<DisplayState>> {
        let store = self.clone();
        Box::pin(async move { store.read().await })
    }

    fn save(&self, state: DisplayState) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.write(&state).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check().await })
    }
}
