//! LMDB environment setup.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use fs2::FileExt;
use heed::types::Bytes;
use heed::{Database, Env, EnvFlags, EnvOpenOptions};

use crate::LmdbError;

/// Parameters for opening one LMDB environment.
#[derive(Clone, Copy, Debug)]
pub struct EnvSettings {
    pub map_size: usize,
    pub max_dbs: u32,
    pub flags: EnvFlags,
    /// Hold an advisory exclusive lock on the directory while open.
    pub exclusive: bool,
}

/// Name of the advisory lock file taken by exclusive environments.
pub const LOCK_FILE: &str = "explorer.lock";

/// Wraps an opened LMDB environment.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    read_only: bool,
    // Released when the environment is dropped.
    _lock: Option<File>,
}

fn lock_directory(path: &Path) -> Result<File, LmdbError> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path.join(LOCK_FILE))?;
    file.try_lock_exclusive()
        .map_err(|_| LmdbError::Locked(path.display().to_string()))?;
    Ok(file)
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment in the directory `path`.
    ///
    /// A read-only environment must already exist on disk.
    pub fn open(path: &Path, settings: EnvSettings) -> Result<Self, LmdbError> {
        let read_only = settings.flags.contains(EnvFlags::READ_ONLY);
        if read_only {
            crate::integrity::check_data_dir(path)?;
            if !path.exists() {
                return Err(LmdbError::NotFound(format!(
                    "no LMDB environment at {}",
                    path.display()
                )));
            }
        } else {
            std::fs::create_dir_all(path)?;
        }

        let lock = if settings.exclusive && !read_only {
            Some(lock_directory(path)?)
        } else {
            None
        };

        let mut options = EnvOpenOptions::new();
        options.map_size(settings.map_size).max_dbs(settings.max_dbs);
        // SAFETY: each path is opened once per process, and the flags never
        // include WRITE_MAP, so the map cannot be corrupted through stray writes.
        let env = unsafe {
            options.flags(settings.flags);
            options.open(path)
        }
        .map_err(LmdbError::from)?;

        tracing::debug!(
            path = %path.display(),
            read_only,
            exclusive = lock.is_some(),
            map_size = settings.map_size,
            "opened LMDB environment"
        );

        Ok(Self {
            env: Arc::new(env),
            read_only,
            _lock: lock,
        })
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Create the named database, or open it when the environment is read-only.
    ///
    /// Returns `None` only for a read-only environment in which the database
    /// has not been created yet.
    pub fn database(&self, name: &str) -> Result<Option<Database<Bytes, Bytes>>, LmdbError> {
        if self.read_only {
            let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
            let db = self
                .env
                .open_database::<Bytes, Bytes>(&rtxn, Some(name))
                .map_err(LmdbError::from)?;
            rtxn.commit().map_err(LmdbError::from)?;
            Ok(db)
        } else {
            let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
            let db = self
                .env
                .create_database::<Bytes, Bytes>(&mut wtxn, Some(name))
                .map_err(LmdbError::from)?;
            wtxn.commit().map_err(LmdbError::from)?;
            Ok(Some(db))
        }
    }
}
