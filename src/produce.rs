//! Run production: read the input in memory-sized chunks, sort each chunk
//! in place, and spill it to a fresh run file.
//!
//! The pool this returns is sized for every run this pass produces plus one
//! extra scratch run the merge driver rotates through its cascading
//! passes.

use std::io::{Read, Seek};
use std::sync::Arc;

use crate::block::Block;
use crate::error::ExtSortError;
use crate::format;
use crate::run::RunPool;
use crate::tempdir::TempPolicy;

/// Split `input` into sorted runs of at most `memory.len()` elements each,
/// returning a pool holding every run produced plus one spare scratch run.
pub fn split_into_runs<R: Read + Seek>(
    input: &mut R,
    memory: &mut [u64],
    temp_policy: Arc<dyn TempPolicy>,
    cleanup_on_release: bool,
) -> Result<RunPool, ExtSortError> {
    let n = format::read_header(input)?;
    format::validate_declared_length(input, std::path::Path::new("<input>"), n)?;
    input.seek(std::io::SeekFrom::Start(format::HEADER_BYTES as u64))?;
    let m = memory.len() as u64;
    let runs_cnt = if n == 0 { 0 } else { 1 + (n - 1) / m };

    let mut pool = RunPool::of_size(runs_cnt + 1, temp_policy, cleanup_on_release)?;

    let mut remaining = n;
    for _ in 0..runs_cnt {
        let want = remaining.min(m) as usize;
        let read = format::read_elements(input, &mut memory[..want])?;
        if read != want {
            return Err(ExtSortError::ShortRead {
                run_id: 0,
                expected: n,
                actually_read: n - remaining + read as u64,
            });
        }
        memory[..want].sort_unstable();

        let run = pool.get()?;
        let mut out = Block::create_output(run, want as u64, &mut memory[..want])?;
        out.mark_filled(want);
        out.flush()?;
        pool.put(out.into_external());

        remaining -= want as u64;
    }

    tracing::debug!(runs = runs_cnt, elements = n, "produced sorted runs");
    Ok(pool)
}
