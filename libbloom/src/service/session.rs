//! Durable client storage for the session
//!
//! The session survives restarts as two entries under fixed keys: the bearer
//! token and the JSON-encoded user. A token found on start-up triggers session
//! restoration in [`crate::app::App::start`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::types::{Session, UserRef};

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "auth_token";

/// Key holding the JSON-encoded [`UserRef`]
pub const USER_KEY: &str = "user";

/// Key/value storage that outlives the process
pub trait SessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// A session as persisted on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub token: String,
    pub user: UserRef,
}

impl PersistedSession {
    pub fn into_session(self) -> Session {
        Session::logged_in(self.user, self.token)
    }
}

/// Write the session entries
pub fn persist_session(
    storage: &dyn SessionStorage,
    session: &PersistedSession,
) -> Result<(), StorageError> {
    storage.set(TOKEN_KEY, &session.token)?;
    storage.set(USER_KEY, &serde_json::to_string(&session.user)?)?;
    Ok(())
}

/// Read the session entries
///
/// Returns `None` unless both a non-empty token and a user are stored.
pub fn restore_session(
    storage: &dyn SessionStorage,
) -> Result<Option<PersistedSession>, StorageError> {
    let token = match storage.get(TOKEN_KEY)? {
        Some(token) if !token.trim().is_empty() => token,
        _ => return Ok(None),
    };
    let user = match storage.get(USER_KEY)? {
        Some(raw) => serde_json::from_str::<UserRef>(&raw)?,
        None => return Ok(None),
    };
    if user.username.is_empty() {
        return Ok(None);
    }
    Ok(Some(PersistedSession { token, user }))
}

/// Remove the session entries
pub fn clear_session(storage: &dyn SessionStorage) -> Result<(), StorageError> {
    storage.remove(TOKEN_KEY)?;
    storage.remove(USER_KEY)?;
    Ok(())
}

/// One file per key inside a directory
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        std::fs::write(&path, value)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage, for tests and ephemeral shells
#[derive(Default)]
pub struct MemorySessionStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
