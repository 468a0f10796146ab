//! Engine configuration: memory budget, fan-in, temp-file policy, and the
//! cleanup-on-release knob, plus the defaults this family of tools
//! traditionally ships when nothing is configured.

use std::sync::Arc;

use crate::error::ExtSortError;
use crate::tempdir::{default_policy, TempPolicy};

/// Matches the original engine's `DEFAULT_MEMORY_SIZE`.
pub const DEFAULT_MEMORY_ELEMS: usize = 512;
/// Matches the original engine's `DEFAULT_MERGE_RANK`.
pub const DEFAULT_FAN_IN: usize = 5;

/// Tunables for one `sort()` invocation.
pub struct SortConfig {
    pub memory_elems: usize,
    pub fan_in: usize,
    pub temp_policy: Arc<dyn TempPolicy>,
    /// Best-effort delete a run's on-disk file when it is released.
    pub cleanup_on_release: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            memory_elems: DEFAULT_MEMORY_ELEMS,
            fan_in: DEFAULT_FAN_IN,
            temp_policy: default_policy(),
            cleanup_on_release: true,
        }
    }
}

impl SortConfig {
    pub fn new(memory_elems: usize, fan_in: usize) -> Self {
        Self {
            memory_elems,
            fan_in,
            ..Self::default()
        }
    }

    pub fn with_temp_policy(mut self, policy: Arc<dyn TempPolicy>) -> Self {
        self.temp_policy = policy;
        self
    }

    pub fn with_cleanup_on_release(mut self, cleanup: bool) -> Self {
        self.cleanup_on_release = cleanup;
        self
    }

    /// Read `EXT_SORT_MEMORY_ELEMS` / `EXT_SORT_FAN_IN` overrides, falling
    /// back to the struct's current values (typically the defaults) for
    /// anything unset or unparseable.
    pub fn from_env(mut self) -> Self {
        if let Ok(v) = std::env::var("EXT_SORT_MEMORY_ELEMS") {
            if let Ok(n) = v.parse() {
                self.memory_elems = n;
            }
        }
        if let Ok(v) = std::env::var("EXT_SORT_FAN_IN") {
            if let Ok(n) = v.parse() {
                self.fan_in = n;
            }
        }
        self
    }

    /// Enforce the §7 "budget too small" rule: the working buffer must
    /// cover `fan_in` input blocks plus one output block, each at least
    /// one element wide.
    pub fn validate(&self) -> Result<(), ExtSortError> {
        if self.fan_in < 2 {
            return Err(ExtSortError::BudgetTooSmall {
                memory_elems: self.memory_elems,
                fan_in: self.fan_in,
            });
        }
        if self.memory_elems < 4 || self.memory_elems < self.fan_in + 1 {
            return Err(ExtSortError::BudgetTooSmall {
                memory_elems: self.memory_elems,
                fan_in: self.fan_in,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SortConfig::default().validate().unwrap();
    }

    #[test]
    fn budget_below_fan_in_plus_one_is_rejected() {
        let cfg = SortConfig::new(4, 4);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn budget_below_four_is_rejected_even_with_small_fan_in() {
        let cfg = SortConfig::new(2, 2);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn env_overrides_take_precedence() {
        // SAFETY: test runs single-threaded within this process's test
        // harness slot and restores the vars it touches.
        unsafe {
            std::env::set_var("EXT_SORT_MEMORY_ELEMS", "1024");
            std::env::set_var("EXT_SORT_FAN_IN", "8");
        }
        let cfg = SortConfig::default().from_env();
        assert_eq!(cfg.memory_elems, 1024);
        assert_eq!(cfg.fan_in, 8);
        unsafe {
            std::env::remove_var("EXT_SORT_MEMORY_ELEMS");
            std::env::remove_var("EXT_SORT_FAN_IN");
        }
    }
}
