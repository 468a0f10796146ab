//! Run files and the run pool: a FIFO of reusable scratch files that lets
//! the merge driver avoid any file creation during its hot loop.
//!
//! A run is "closed" while it sits in the pool's queue (no open file
//! descriptor) and "open" once handed out by [`RunPool::get`] /
//! [`RunPool::get_with_buffer`]. At most one file descriptor exists per run
//! at any time -- `put`/`release` always close it before the run can be
//! handed out again.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ExtSortError;
use crate::format;
use crate::tempdir::TempPolicy;

/// A run sitting in the pool, with no open file descriptor.
struct ClosedRun {
    id: u64,
    path: PathBuf,
}

/// A run handed out by the pool: an open file descriptor positioned at
/// offset 0.
///
/// `buffer_elems` records the size of the I/O buffer the caller asked for
/// via [`RunPool::get_with_buffer`] (0 means unbuffered). The engine's
/// [`crate::block::Block`] always transfers whole batches of elements in
/// one read/write call through the working-memory slice it owns, so that
/// slice already serves the role the installed buffer plays in the
/// original stdio-based engine; `buffer_elems` is kept only so callers can
/// observe what was requested, not because a second internal byte cache is
/// needed.
pub struct OpenRun {
    pub id: u64,
    pub path: PathBuf,
    pub file: File,
    pub buffer_elems: usize,
}

impl Read for OpenRun {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for OpenRun {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for OpenRun {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

/// A FIFO of reusable run handles.
pub struct RunPool {
    queue: VecDeque<ClosedRun>,
    next_id: u64,
    temp_policy: Arc<dyn TempPolicy>,
    cleanup_on_release: bool,
}

impl RunPool {
    /// Create `n` empty runs, each file created with an 8-byte zero header
    /// then closed. The id counter is owned by this pool instance, not a
    /// process-global -- two pools in the same process never collide.
    pub fn of_size(
        n: u64,
        temp_policy: Arc<dyn TempPolicy>,
        cleanup_on_release: bool,
    ) -> Result<Self, ExtSortError> {
        let mut queue = VecDeque::with_capacity(n as usize);
        let mut next_id = 0u64;
        for _ in 0..n {
            let id = next_id;
            next_id += 1;
            let path = temp_policy.path_for(id);
            let mut f = File::create(&path)?;
            format::write_header(&mut f, 0)?;
            queue.push_back(ClosedRun { id, path });
        }
        tracing::debug!(count = n, "allocated run pool");
        Ok(Self {
            queue,
            next_id,
            temp_policy,
            cleanup_on_release,
        })
    }

    /// Number of closed runs currently queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Dequeue the next run, reopen for read+write at offset 0, unbuffered.
    pub fn get(&mut self) -> Result<OpenRun, ExtSortError> {
        self.get_with_buffer(0)
    }

    /// Same as [`Self::get`], recording that the caller intends to drive
    /// I/O through a buffer sized for `n_elems` elements (0 = unbuffered).
    pub fn get_with_buffer(&mut self, n_elems: usize) -> Result<OpenRun, ExtSortError> {
        let closed = self
            .queue
            .pop_front()
            .expect("get() called on an empty run pool");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&closed.path)?;
        Ok(OpenRun {
            id: closed.id,
            path: closed.path,
            file,
            buffer_elems: n_elems,
        })
    }

    /// Close the file, re-enqueue at the tail.
    pub fn put(&mut self, run: OpenRun) {
        self.queue.push_back(ClosedRun {
            id: run.id,
            path: run.path,
        });
        // `run.file` is dropped here, closing the descriptor.
    }

    /// Close the file, forget the handle. The on-disk file is removed
    /// best-effort; failure is a warning, not a fatal error.
    pub fn release(&mut self, run: OpenRun) {
        let path = run.path.clone();
        let id = run.id;
        drop(run);
        if self.cleanup_on_release {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(run_id = id, path = %path.display(), error = %e, "failed to remove released run file");
            }
        }
    }

    /// Allocate one brand-new run beyond the pool's initial sizing,
    /// enqueuing it like any other closed run. Used by callers that need
    /// an extra scratch slot after construction (none of this engine's own
    /// code paths do -- `of_size(n)` always allocates the scratch run up
    /// front).
    pub fn grow(&mut self) -> Result<(), ExtSortError> {
        let id = self.next_id;
        self.next_id += 1;
        let path = self.temp_policy.path_for(id);
        let mut f = File::create(&path)?;
        format::write_header(&mut f, 0)?;
        self.queue.push_back(ClosedRun { id, path });
        Ok(())
    }
}
