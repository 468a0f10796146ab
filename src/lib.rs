//! External k-way merge sort for files of `u64` elements, bounded by a
//! configurable in-memory element budget.
//!
//! The public entry point is [`sort`]; [`config::SortConfig`] controls the
//! memory budget, merge fan-in, and temp-run placement.

pub mod block;
pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod merge;
pub mod produce;
pub mod run;
pub mod tempdir;

use std::io::{Read, Seek, Write};

pub use config::SortConfig;
pub use error::ExtSortError;

/// Sort every `u64` element of `input` into `output`.
///
/// Both handles use the file-of-elements format: an 8-byte little-endian
/// count header followed by that many little-endian `u64`s. `memory_elems`
/// bounds how many elements are held in memory at once; `fan_in` bounds how
/// many runs are merged together per pass. See [`SortConfig`] for the
/// defaults and for temp-file placement control.
pub fn sort<IO: Read + Write + Seek>(
    input: &mut IO,
    output: &mut IO,
    memory_elems: usize,
    fan_in: usize,
) -> Result<(), ExtSortError> {
    let config = SortConfig::new(memory_elems, fan_in);
    sort_with_config(input, output, &config)
}

/// Like [`sort`], but with full control over temp-run placement and
/// cleanup via a caller-supplied [`SortConfig`].
pub fn sort_with_config<IO: Read + Write + Seek>(
    input: &mut IO,
    output: &mut IO,
    config: &SortConfig,
) -> Result<(), ExtSortError> {
    driver::do_merge_sort(input, output, config)
}
