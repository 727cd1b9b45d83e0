//! Local key-value session storage.
//!
//! The surrounding app writes the session identity here at login and clears
//! it at logout; the profile-update workflow only reads it.

use std::{fs, io, path::PathBuf};

use anyhow::Context;
use perch_api_core::models::UserId;

/// The storage key holding the current session identity.
pub const USER_ID_KEY: &str = "userId";

/// Abstraction over a small string key-value store, suitable for mocking.
pub trait Kvs {
    /// Read the value for `key`. Missing keys read as `Ok(None)`.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Write the value for `key`, replacing any existing value.
    fn put(&self, key: &str, value: &str) -> io::Result<()>;

    /// Delete the value for `key`. Deleting a missing key is a no-op.
    fn delete(&self, key: &str) -> io::Result<()>;
}

/// Key-value store impl for [`Kvs`] that does real IO, one file per key.
#[derive(Clone)]
pub struct FileKvs {
    base_dir: PathBuf,
}

impl FileKvs {
    /// Create a new [`FileKvs`] without ensuring that the directory exists.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Create a new [`FileKvs`] ready for use.
    ///
    /// Normally, it's expected that this directory already exists. In case
    /// that directory doesn't exist, this fn will create `base_dir` and any
    /// parent directories.
    pub fn create_dir_all(base_dir: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&base_dir).with_context(|| {
            format!("Failed to create directory ({})", base_dir.display())
        })?;
        Ok(Self::new(base_dir))
    }
}

impl Kvs for FileKvs {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let bytes = match fs::read(self.base_dir.join(key)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound =>
                return Ok(None),
            Err(err) => return Err(err),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        fs::write(self.base_dir.join(key), value.as_bytes())
    }

    fn delete(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.base_dir.join(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// Reads and writes the session identity in a [`Kvs`].
pub struct SessionStore<K> {
    kvs: K,
}

impl<K: Kvs> SessionStore<K> {
    pub fn new(kvs: K) -> Self {
        Self { kvs }
    }

    /// Read the current session identity. Returns `Ok(None)` if no identity
    /// is stored.
    pub fn user_id(&self) -> anyhow::Result<Option<UserId>> {
        let maybe_value = self
            .kvs
            .get(USER_ID_KEY)
            .context("Failed to read session store")?;
        match maybe_value {
            Some(value) => {
                let user_id = UserId::parse(&value)
                    .context("Stored session identity is invalid")?;
                Ok(Some(user_id))
            }
            None => Ok(None),
        }
    }

    /// Write the session identity. Called by the surrounding app at login.
    pub fn store_user_id(&self, user_id: &UserId) -> anyhow::Result<()> {
        self.kvs
            .put(USER_ID_KEY, user_id.inner())
            .context("Failed to write session identity")
    }

    /// Delete the session identity. Called by the surrounding app at logout.
    pub fn clear_user_id(&self) -> anyhow::Result<()> {
        self.kvs
            .delete(USER_ID_KEY)
            .context("Failed to delete session identity")
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::{collections::BTreeMap, sync::Mutex};

    use super::*;

    /// In-memory [`Kvs`] impl for tests.
    #[derive(Default)]
    pub(crate) struct MemKvs {
        values: Mutex<BTreeMap<String, String>>,
    }

    impl MemKvs {
        pub(crate) fn new() -> Self {
            Self::default()
        }
    }

    impl Kvs for MemKvs {
        fn get(&self, key: &str) -> io::Result<Option<String>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn put(&self, key: &str, value: &str) -> io::Result<()> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_owned(), value.to_owned());
            Ok(())
        }

        fn delete(&self, key: &str) -> io::Result<()> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn test_session_store<K: Kvs>(store: &SessionStore<K>) {
        assert!(store.user_id().unwrap().is_none());

        let user_id = UserId::parse("c3b7e9a0").unwrap();
        store.store_user_id(&user_id).unwrap();
        assert_eq!(store.user_id().unwrap().unwrap(), user_id);

        store.clear_user_id().unwrap();
        assert!(store.user_id().unwrap().is_none());

        // clearing twice is fine
        store.clear_user_id().unwrap();
    }

    #[test]
    fn test_mem_store() {
        test_session_store(&SessionStore::new(MemKvs::new()));
    }

    #[test]
    fn test_file_store() {
        let tmpdir = tempfile::tempdir().unwrap();
        let kvs = FileKvs::create_dir_all(tmpdir.path().to_owned()).unwrap();
        test_session_store(&SessionStore::new(kvs));
    }

    #[test]
    fn test_file_store_rejects_empty_identity() {
        let tmpdir = tempfile::tempdir().unwrap();
        let kvs = FileKvs::create_dir_all(tmpdir.path().to_owned()).unwrap();
        kvs.put(USER_ID_KEY, "   ").unwrap();
        SessionStore::new(kvs).user_id().unwrap_err();
    }
}
