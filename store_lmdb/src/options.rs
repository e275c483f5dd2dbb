//! Index storage configuration and its mapping onto LMDB environment flags.

use heed::EnvFlags;
use serde::{Deserialize, Serialize};

/// Smallest memory map the index environment is opened with.
pub const MIN_MAP_SIZE: usize = 64 * 1024 * 1024;

/// Default upper bound on the index file size.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// How the index file is shared with other processes.
///
/// LMDB's lock table stays on in both modes, so readers and the writer inside
/// one process are always coordinated by LMDB itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockingMode {
    /// Many reader processes alongside one writer.
    #[default]
    Shared,
    /// Additionally hold an advisory exclusive lock on the index directory,
    /// so a second writable open fails with `LmdbError::Locked`.
    Exclusive,
}

/// Storage options for the reference index environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStoreConfig {
    /// zstd-compress document bodies on write. Reads accept both forms.
    #[serde(default)]
    pub compress: bool,

    /// Sync the meta page on commit. Off trades the last transaction's
    /// durability for write speed.
    #[serde(default = "default_true")]
    pub journal: bool,

    /// Maximum size of the index file in bytes. LMDB reserves this much
    /// address space up front; writes past it fail with `MDB_MAP_FULL`.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// fsync on every commit.
    #[serde(default = "default_true")]
    pub flush: bool,

    /// Open for queries only; every write is rejected.
    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub locking: LockingMode,
}

fn default_true() -> bool {
    true
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

impl Default for IndexStoreConfig {
    fn default() -> Self {
        Self {
            compress: false,
            journal: default_true(),
            map_size: default_map_size(),
            flush: default_true(),
            read_only: false,
            locking: LockingMode::default(),
        }
    }
}

impl IndexStoreConfig {
    /// Environment flags for this configuration.
    ///
    /// Read-only mode takes precedence over every write-side option.
    pub fn env_flags(&self) -> EnvFlags {
        if self.read_only {
            return EnvFlags::READ_ONLY;
        }
        let mut flags = EnvFlags::empty();
        if !self.flush {
            flags |= EnvFlags::NO_SYNC;
        }
        if !self.journal {
            flags |= EnvFlags::NO_META_SYNC;
        }
        flags
    }

    pub fn map_size(&self) -> usize {
        self.map_size.max(MIN_MAP_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_durable_and_writable() {
        let config = IndexStoreConfig::default();
        assert!(config.env_flags().is_empty());
        assert_eq!(config.locking, LockingMode::Shared);
        assert_eq!(config.map_size(), 1 << 30);
    }

    #[test]
    fn read_only_overrides_write_options() {
        let config = IndexStoreConfig {
            read_only: true,
            flush: false,
            journal: false,
            locking: LockingMode::Exclusive,
            ..Default::default()
        };
        assert_eq!(config.env_flags().bits(), EnvFlags::READ_ONLY.bits());
    }

    #[test]
    fn relaxed_durability_flags() {
        let config = IndexStoreConfig {
            flush: false,
            journal: false,
            ..Default::default()
        };
        let flags = config.env_flags();
        assert!(flags.contains(EnvFlags::NO_SYNC));
        assert!(flags.contains(EnvFlags::NO_META_SYNC));
    }

    #[test]
    fn exclusive_keeps_the_lock_table() {
        let config = IndexStoreConfig {
            locking: LockingMode::Exclusive,
            ..Default::default()
        };
        assert!(!config.env_flags().contains(EnvFlags::NO_LOCK));
    }

    #[test]
    fn small_map_is_raised_to_minimum() {
        let config = IndexStoreConfig {
            map_size: 4096,
            ..Default::default()
        };
        assert_eq!(config.map_size(), MIN_MAP_SIZE);
    }

    #[test]
    fn toml_section_uses_defaults() {
        let config: IndexStoreConfig = toml::from_str("compress = true\nlocking = \"exclusive\"").unwrap();
        assert!(config.compress);
        assert!(config.journal);
        assert_eq!(config.locking, LockingMode::Exclusive);
        assert_eq!(config.map_size, DEFAULT_MAP_SIZE);
    }

    #[test]
    fn map_size_is_configurable() {
        let config: IndexStoreConfig = toml::from_str("map_size = 17179869184").unwrap();
        assert_eq!(config.map_size(), 16 << 30);
    }
}
