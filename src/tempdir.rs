//! The injected temp-directory / naming-pattern policy for run files.
//!
//! The core engine never picks a location or a name scheme on its own --
//! it asks a `TempPolicy`. This mirrors the way the rest of this family of
//! crates separates "what bytes to read" from "where the device lives"
//! (e.g. the scan engine takes a device path but never decides how that
//! path was chosen).

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where on disk a run file with a given process-unique id should live.
pub trait TempPolicy: Send + Sync {
    /// Path for the run identified by `id`. Must be stable: calling this
    /// twice with the same `id` must return the same path.
    fn path_for(&self, id: u64) -> PathBuf;
}

/// Reproduces the original engine's `run.{id}.bin` naming pattern, placed
/// in a fixed directory (the current directory by default).
pub struct PatternTempPolicy {
    dir: PathBuf,
    prefix: String,
    suffix: String,
}

impl PatternTempPolicy {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "run.".to_string(),
            suffix: ".bin".to_string(),
        }
    }

    pub fn in_current_dir() -> Self {
        Self::new(".")
    }

    pub fn with_pattern(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.suffix = suffix.into();
        self
    }
}

impl Default for PatternTempPolicy {
    fn default() -> Self {
        Self::in_current_dir()
    }
}

impl TempPolicy for PatternTempPolicy {
    fn path_for(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{}{}{}", self.prefix, id, self.suffix))
    }
}

/// Places run files inside a `tempfile::TempDir`, which is removed (and
/// with it every run file still on disk) when the policy is dropped.
///
/// Opt into this when the caller wants the whole run directory cleaned up
/// automatically even if individual `release()` cleanups are skipped or
/// fail (see `config::SortConfig::cleanup_on_release`).
pub struct ManagedTempPolicy {
    dir: tempfile::TempDir,
    prefix: String,
    suffix: String,
}

impl ManagedTempPolicy {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
            prefix: "run.".to_string(),
            suffix: ".bin".to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl TempPolicy for ManagedTempPolicy {
    fn path_for(&self, id: u64) -> PathBuf {
        self.dir
            .path()
            .join(format!("{}{}{}", self.prefix, id, self.suffix))
    }
}

pub fn default_policy() -> Arc<dyn TempPolicy> {
    Arc::new(PatternTempPolicy::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_policy_is_stable_and_unique() {
        let policy = PatternTempPolicy::in_current_dir();
        let a = policy.path_for(3);
        let b = policy.path_for(3);
        let c = policy.path_for(4);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, PathBuf::from("./run.3.bin"));
    }

    #[test]
    fn managed_policy_places_runs_inside_its_tempdir() {
        let policy = ManagedTempPolicy::new().unwrap();
        let p = policy.path_for(0);
        assert!(p.starts_with(policy.path()));
    }
}
