//! K-way streaming merge over a set of already-sorted input blocks into one
//! output block.
//!
//! Each input block holds the head of its run already in memory; the merge
//! repeatedly picks the smallest head, ties broken in favor of the lowest
//! input index, and refills any input that empties out while it still has
//! data on disk.

use std::io::{Read, Seek, Write};

use crate::block::Block;
use crate::error::ExtSortError;

/// Sum of the declared sizes of `inputs`, i.e. how many elements the merge
/// is expected to produce.
pub fn total_declared_size<F: Read + Write + Seek>(inputs: &[Block<'_, F>]) -> u64 {
    inputs.iter().map(Block::declared_external_size).sum()
}

/// Merge every element across `inputs` into `output`, smallest first.
///
/// Each input must already have its first block of data loaded (or be
/// genuinely empty, i.e. `declared_external_size() == 0`). Flushes
/// `output`'s buffer whenever it fills, and once more at the end to drain
/// any remainder.
pub fn merge<F, G>(inputs: &mut [Block<'_, F>], output: &mut Block<'_, G>) -> Result<(), ExtSortError>
where
    F: Read + Write + Seek,
    G: Read + Write + Seek,
{
    loop {
        let mut best: Option<usize> = None;
        for (i, block) in inputs.iter().enumerate() {
            if block.empty() {
                continue;
            }
            match best {
                None => best = Some(i),
                Some(b) => {
                    if block.peek() < inputs[b].peek() {
                        best = Some(i);
                    }
                }
            }
        }

        let Some(i) = best else {
            break;
        };

        let v = inputs[i].next();
        if output.full() {
            output.flush()?;
        }
        output.push(v);

        if inputs[i].empty() && inputs[i].has_external_data() {
            inputs[i].read_next_block()?;
        }
    }

    output.flush()?;
    Ok(())
}
