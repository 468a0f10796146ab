//! Buffered block: a partition of the engine's working memory tied to one
//! external file-like handle, with cursor state for sequential fill/drain.
//!
//! Invariants: `0 <= occupancy <= capacity`; a non-empty block's read
//! cursor points to the next unread element; `remaining_on_disk +
//! elements_consumed_so_far == declared_external_size`.
//!
//! A block is generic over its external handle (`F: Read + Write + Seek`)
//! rather than hardcoded to a pool run: the same type serves a `Vec` of
//! pool-run blocks during the cascading merge rounds and a block built
//! directly over the caller's own input/output handle (`&mut IO` satisfies
//! the bound via std's blanket impls) for the final merge.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::ExtSortError;
use crate::format;

/// A slice of working memory paired with one external handle.
pub struct Block<'a, F> {
    external: F,
    slice: &'a mut [u64],
    /// Index of the next unread/unwritten element within `slice`.
    cursor: usize,
    /// Number of valid elements currently held in `slice`.
    occupancy: usize,
    /// Total element count this block's file declares in its header.
    declared_external_size: u64,
    /// Elements of `declared_external_size` not yet read from disk into
    /// this block (input blocks) or not yet flushed to disk (unused for
    /// output blocks, which track only `occupancy`).
    remaining_on_disk: u64,
    /// Byte offset within the payload (i.e. past the 8-byte header) that
    /// the next on-disk read/write will touch.
    payload_offset: u64,
}

impl<'a, F: Read + Write + Seek> Block<'a, F> {
    /// Build an input block: read and store the declared count from the
    /// file's 8-byte header, start with zero elements in memory.
    pub fn create_input(mut external: F, slice: &'a mut [u64]) -> Result<Self, ExtSortError> {
        external.seek(SeekFrom::Start(0))?;
        let declared_external_size = format::read_header(&mut external)?;
        Ok(Self {
            external,
            slice,
            cursor: 0,
            occupancy: 0,
            declared_external_size,
            remaining_on_disk: declared_external_size,
            payload_offset: 0,
        })
    }

    /// Build an output block: write the 8-byte header with `declared_total`
    /// up front, start empty.
    pub fn create_output(
        mut external: F,
        declared_total: u64,
        slice: &'a mut [u64],
    ) -> Result<Self, ExtSortError> {
        external.seek(SeekFrom::Start(0))?;
        format::write_header(&mut external, declared_total)?;
        Ok(Self {
            external,
            slice,
            cursor: 0,
            occupancy: 0,
            declared_external_size: declared_total,
            remaining_on_disk: 0,
            payload_offset: 0,
        })
    }

    pub fn empty(&self) -> bool {
        self.occupancy == 0
    }

    pub fn full(&self) -> bool {
        self.occupancy == self.slice.len()
    }

    pub fn has_external_data(&self) -> bool {
        self.remaining_on_disk > 0
    }

    pub fn capacity(&self) -> usize {
        self.slice.len()
    }

    pub fn declared_external_size(&self) -> u64 {
        self.declared_external_size
    }

    /// Look at the next element without consuming it.
    /// Precondition: `!empty()`.
    pub fn peek(&self) -> u64 {
        debug_assert!(!self.empty(), "peek() on an empty block");
        self.slice[self.cursor]
    }

    /// Precondition: `!empty()`. Returns the element under the cursor,
    /// advances the cursor, decrements occupancy.
    pub fn next(&mut self) -> u64 {
        debug_assert!(!self.empty(), "next() on an empty block");
        let v = self.slice[self.cursor];
        self.cursor += 1;
        self.occupancy -= 1;
        v
    }

    /// Precondition: `!full()`. Writes `v` at the next slot, advances the
    /// cursor, increments occupancy.
    pub fn push(&mut self, v: u64) {
        debug_assert!(!self.full(), "push() on a full block");
        let idx = self.cursor + self.occupancy;
        self.slice[idx] = v;
        self.occupancy += 1;
    }

    /// Fill the in-memory slice from disk with up to `capacity()` elements
    /// (or the remainder of the declared external size, whichever is
    /// smaller); reset the cursor to the slice base.
    pub fn read_next_block(&mut self) -> Result<(), ExtSortError> {
        self.external.seek(SeekFrom::Start(
            format::HEADER_BYTES as u64 + self.payload_offset,
        ))?;
        let want = (self.slice.len() as u64).min(self.remaining_on_disk) as usize;
        let read = format::read_elements(&mut self.external, &mut self.slice[..want])?;
        if (read as u64) != want as u64 {
            return Err(ExtSortError::ShortRead {
                run_id: 0,
                expected: self.declared_external_size,
                actually_read: self.declared_external_size - self.remaining_on_disk + read as u64,
            });
        }
        self.payload_offset += (read * format::ELEMENT_BYTES) as u64;
        self.remaining_on_disk -= read as u64;
        self.cursor = 0;
        self.occupancy = read;
        Ok(())
    }

    /// Write `occupancy` elements from the slice base to the external
    /// file; zero occupancy, reset cursor.
    pub fn flush(&mut self) -> Result<(), ExtSortError> {
        if self.occupancy == 0 {
            return Ok(());
        }
        self.external.seek(SeekFrom::Start(
            format::HEADER_BYTES as u64 + self.payload_offset,
        ))?;
        format::write_elements(
            &mut self.external,
            &self.slice[self.cursor..self.cursor + self.occupancy],
        )?;
        self.payload_offset += (self.occupancy * format::ELEMENT_BYTES) as u64;
        self.occupancy = 0;
        self.cursor = 0;
        Ok(())
    }

    /// Write this block's remaining in-memory elements directly to
    /// `dest`'s external file, bypassing `dest`'s in-memory slice
    /// entirely; zero this block's occupancy.
    pub fn move_to<G: Read + Write + Seek>(&mut self, dest: &mut Block<'_, G>) -> Result<(), ExtSortError> {
        if self.occupancy == 0 {
            return Ok(());
        }
        dest.external.seek(SeekFrom::Start(
            format::HEADER_BYTES as u64 + dest.payload_offset,
        ))?;
        format::write_elements(
            &mut dest.external,
            &self.slice[self.cursor..self.cursor + self.occupancy],
        )?;
        dest.payload_offset += (self.occupancy * format::ELEMENT_BYTES) as u64;
        self.occupancy = 0;
        self.cursor = 0;
        Ok(())
    }

    /// Declare that the first `n` slots of the slice already hold valid
    /// data (e.g. sorted in place before the block was built), without
    /// going through `push()` element by element.
    pub fn mark_filled(&mut self, n: usize) {
        debug_assert!(n <= self.slice.len(), "mark_filled() beyond capacity");
        self.cursor = 0;
        self.occupancy = n;
    }

    /// Replace the in-memory slice; prior contents are discarded.
    pub fn resize_buffer(&mut self, new_slice: &'a mut [u64]) {
        self.slice = new_slice;
        self.cursor = 0;
        self.occupancy = 0;
    }

    /// Reclaim the external handle, e.g. to `put`/`release` a pool run
    /// back into the pool once this block is no longer needed.
    pub fn into_external(self) -> F {
        self.external
    }

    pub fn external(&self) -> &F {
        &self.external
    }

    pub fn external_mut(&mut self) -> &mut F {
        &mut self.external
    }
}

/// Ensure all buffered writes for a handle reached the OS before the file
/// changes hands (e.g. before `put`/`release`).
pub fn sync<F: Write>(external: &mut F) -> Result<(), ExtSortError> {
    external.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunPool;
    use crate::tempdir::PatternTempPolicy;
    use std::sync::Arc;

    fn pool(dir: &std::path::Path, n: u64) -> RunPool {
        RunPool::of_size(n, Arc::new(PatternTempPolicy::new(dir)), true).unwrap()
    }

    #[test]
    fn output_block_push_flush_then_input_block_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pool(dir.path(), 2);

        let run_out = p.get().unwrap();
        let mut mem = [0u64; 4];
        {
            let mut out = Block::create_output(run_out, 3, &mut mem).unwrap();
            out.push(5);
            out.push(1);
            out.push(9);
            out.flush().unwrap();
            let run = out.into_external();
            p.put(run);
        }

        let run_in = p.get().unwrap();
        let mut mem2 = [0u64; 4];
        let mut inp = Block::create_input(run_in, &mut mem2).unwrap();
        assert_eq!(inp.declared_external_size(), 3);
        assert!(inp.has_external_data());
        inp.read_next_block().unwrap();
        assert!(!inp.has_external_data());
        let mut out = Vec::new();
        while !inp.empty() {
            out.push(inp.next());
        }
        assert_eq!(out, vec![5, 1, 9]);
    }

    #[test]
    fn read_next_block_paginates_when_capacity_smaller_than_declared_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = pool(dir.path(), 2);

        let run_out = p.get().unwrap();
        let mut mem = [0u64; 8];
        let mut out = Block::create_output(run_out, 6, &mut mem).unwrap();
        for v in [1, 2, 3, 4, 5, 6] {
            out.push(v);
        }
        out.flush().unwrap();
        p.put(out.into_external());

        let run_in = p.get().unwrap();
        let mut small_mem = [0u64; 4];
        let mut inp = Block::create_input(run_in, &mut small_mem).unwrap();

        inp.read_next_block().unwrap();
        let mut first: Vec<u64> = Vec::new();
        while !inp.empty() {
            first.push(inp.next());
        }
        assert_eq!(first, vec![1, 2, 3, 4]);
        assert!(inp.has_external_data());

        inp.read_next_block().unwrap();
        let mut second: Vec<u64> = Vec::new();
        while !inp.empty() {
            second.push(inp.next());
        }
        assert_eq!(second, vec![5, 6]);
        assert!(!inp.has_external_data());
    }
}
