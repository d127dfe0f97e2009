use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const LOG_TARGET: &str = "     store";

const TOKENS_DIR: &str = "tokens";
const LOCK_FILE: &str = "tokens.lock";

/// Durable mapping from resource id to a resolved page token.
pub trait CredentialStore: Send + Sync {
    /// The stored token for `resource_id`, if any.
    fn get(&self, resource_id: &str) -> impl Future<Output = Result<Option<String>, Error>> + Send;

    /// Store `token` for `resource_id`.
    fn put(&self, resource_id: &str, token: &str) -> impl Future<Output = Result<(), Error>> + Send;
}

impl<S: CredentialStore> CredentialStore for Arc<S> {
    async fn get(&self, resource_id: &str) -> Result<Option<String>, Error> {
        (**self).get(resource_id).await
    }

    async fn put(&self, resource_id: &str, token: &str) -> Result<(), Error> {
        (**self).put(resource_id, token).await
    }
}

/// A store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, resource_id: &str) -> Result<Option<String>, Error> {
        Ok(self.lock().get(resource_id).cloned())
    }

    async fn put(&self, resource_id: &str, token: &str) -> Result<(), Error> {
        let _ = self.lock().insert(resource_id.to_owned(), token.to_owned());
        Ok(())
    }
}

/// On-disk form of one stored token.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    timestamp: DateTime<Utc>,
    resource_id: String,
    token: String,
}

/// A store keeping one JSON document per resource id below a directory.
///
/// Writers serialize on an advisory lock file, taken on the blocking thread
/// pool; readers never lock. Unreadable or mismatched documents count as absent.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    root: PathBuf,
}

impl FileCredentialStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, resource_id: &str) -> PathBuf {
        self.root.join(TOKENS_DIR).join(format!("{}.json", sanitize_key(resource_id)))
    }

    fn lock(&self) -> Result<StoreLockGuard, Error> {
        fs::create_dir_all(&self.root).map_err(|e| store_err(&self.root, e))?;

        let lock_path = self.root.join(LOCK_FILE);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| store_err(&lock_path, e))?;
        file.lock_exclusive().map_err(|e| store_err(&lock_path, e))?;

        Ok(StoreLockGuard(file))
    }
}

impl FileCredentialStore {
    fn read_entry(&self, resource_id: &str) -> Result<Option<String>, Error> {
        let path = self.entry_path(resource_id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!(target: LOG_TARGET, "No stored token for {resource_id}");
                return Ok(None);
            }
            Err(e) => return Err(store_err(&path, e)),
        };

        let envelope: Envelope = match serde_json::from_reader(BufReader::new(file)) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Ignoring unreadable token document '{}': {e:#}", path.display());
                return Ok(None);
            }
        };

        if envelope.resource_id != resource_id || envelope.token.is_empty() {
            log::debug!(target: LOG_TARGET, "Ignoring token document '{}' stored for another id", path.display());
            return Ok(None);
        }

        log::debug!(target: LOG_TARGET, "Found stored token for {resource_id} (stored {})", envelope.timestamp);
        Ok(Some(envelope.token))
    }

    fn write_entry(&self, resource_id: &str, token: &str) -> Result<(), Error> {
        let _guard = self.lock()?;

        let path = self.entry_path(resource_id);
        let envelope = Envelope {
            timestamp: Utc::now(),
            resource_id: resource_id.to_owned(),
            token: token.to_owned(),
        };
        let text = serde_json::to_vec_pretty(&envelope)?;

        write_private(&path, &text).map_err(|e| store_err(&path, e))?;
        log::debug!(target: LOG_TARGET, "Stored token for {resource_id}");
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    async fn get(&self, resource_id: &str) -> Result<Option<String>, Error> {
        let store = self.clone();
        let resource_id = resource_id.to_owned();
        tokio::task::spawn_blocking(move || store.read_entry(&resource_id))
            .await
            .map_err(|e| store_err(&self.root, io::Error::other(e)))?
    }

    async fn put(&self, resource_id: &str, token: &str) -> Result<(), Error> {
        let store = self.clone();
        let (resource_id, token) = (resource_id.to_owned(), token.to_owned());
        tokio::task::spawn_blocking(move || store.write_entry(&resource_id, &token))
            .await
            .map_err(|e| store_err(&self.root, io::Error::other(e)))?
    }
}

/// Releases the store lock when dropped.
#[derive(Debug)]
struct StoreLockGuard(File);

impl Drop for StoreLockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.0) {
            log::warn!(target: LOG_TARGET, "Could not unlock credential store: {e:#}");
        }
    }
}

/// Write `contents` next to `path` and rename it into place, readable by the owner only.
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    {
        let mut file = OpenOptions::new().create(true).write(true).truncate(true).open(&tmp)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(contents)?;
        file.sync_all()?;
    }

    fs::rename(tmp, path)
}

/// Map a resource id onto a safe file name.
fn sanitize_key(resource_id: &str) -> String {
    resource_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn store_err(path: &Path, source: io::Error) -> Error {
    Error::Store {
        path: path.display().to_string(),
        source,
    }
}
