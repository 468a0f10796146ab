//! The cascading merge driver: repeatedly pulls up to `fan_in` runs off the
//! pool, merges them into a rolling scratch run, and puts that scratch run
//! back, until one run remains -- which is then merged into the caller's
//! real output handle.
//!
//! The pool handed to [`do_merge_sort`] holds `runs_cnt + 1` runs: `runs_cnt`
//! sorted data runs plus one untouched scratch run. Thanks to the pool's
//! FIFO rotation during production, the first `get()` after production
//! always returns that untouched scratch run (see `run.rs`), so claiming it
//! needs no special bookkeeping.
//!
//! Each cascading round merges `m` pulled runs into the held scratch run,
//! puts the (now full) scratch back into the pool as a live run, keeps the
//! first of the `m` pulled (now drained) runs as the new scratch, and
//! releases the rest. This shrinks the count of live runs by `m - 1` per
//! round, so the `while pool.len() > 1` loop always terminates with exactly
//! one live run left.

use std::io::{Read, Seek, Write};

use crate::block::Block;
use crate::config::SortConfig;
use crate::error::ExtSortError;
use crate::format;
use crate::merge;
use crate::produce;
use crate::run::OpenRun;

/// Sort every element of `input` into `output`, using at most
/// `config.memory_elems` elements of working memory and merging at most
/// `config.fan_in` runs at a time.
pub fn do_merge_sort<IO: Read + Write + Seek>(
    input: &mut IO,
    output: &mut IO,
    config: &SortConfig,
) -> Result<(), ExtSortError> {
    config.validate()?;

    let mut memory = vec![0u64; config.memory_elems];
    let mut pool = produce::split_into_runs(
        input,
        &mut memory,
        config.temp_policy.clone(),
        config.cleanup_on_release,
    )?;

    let mut result: OpenRun = pool.get()?;

    if pool.is_empty() {
        // No data runs were produced: the input was empty. `result` is the
        // lone, never-written scratch run; discard it and write an empty
        // output directly.
        pool.release(result);
        output.seek(std::io::SeekFrom::Start(0))?;
        format::write_header(output, 0)?;
        tracing::debug!("sorted zero elements");
        return Ok(());
    }

    let fan_in = config.fan_in;
    while pool.len() > 1 {
        let m = fan_in.min(pool.len());
        let mut pulled_runs = Vec::with_capacity(m);
        for _ in 0..m {
            pulled_runs.push(pool.get()?);
        }

        let block_elems = memory.len() / (m + 1);
        let mut chunks = memory.chunks_mut(block_elems);

        let mut input_blocks = Vec::with_capacity(m);
        for run in pulled_runs {
            let slice = chunks.next().expect("memory partitioned for m inputs + 1 output");
            let mut block = Block::create_input(run, slice)?;
            if block.has_external_data() {
                block.read_next_block()?;
            }
            input_blocks.push(block);
        }

        let output_slice = chunks.next().expect("memory partitioned for m inputs + 1 output");
        let declared_total = merge::total_declared_size(&input_blocks);
        let mut output_block = Block::create_output(result, declared_total, output_slice)?;

        merge::merge(&mut input_blocks, &mut output_block)?;

        pool.put(output_block.into_external());

        let mut drained = input_blocks.into_iter();
        result = drained
            .next()
            .expect("m >= 2 pulled runs")
            .into_external();
        for leftover in drained {
            pool.release(leftover.into_external());
        }

        tracing::debug!(merged = m, pool_len = pool.len(), "completed merge round");
    }

    // Exactly one live run remains; its scratch companion is discarded
    // unread, and the live run is merged straight into the real output.
    let last = pool.get()?;
    pool.release(result);

    let half = (memory.len() / 2).max(1);
    let (in_mem, out_mem) = memory.split_at_mut(half);
    let mut input_block = Block::create_input(last, in_mem)?;
    if input_block.has_external_data() {
        input_block.read_next_block()?;
    }

    let declared_total = input_block.declared_external_size();
    let mut output_block = Block::create_output(output, declared_total, out_mem)?;
    merge::merge(std::slice::from_mut(&mut input_block), &mut output_block)?;

    pool.release(input_block.into_external());

    tracing::debug!(elements = declared_total, "merge sort complete");
    Ok(())
}
