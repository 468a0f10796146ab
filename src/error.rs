use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtSortError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header: declared count {declared} implies more bytes than {path:?} contains")]
    InvalidHeader { path: std::path::PathBuf, declared: u64 },

    #[error(
        "memory budget too small: {memory_elems} elements cannot cover fan-in {fan_in} \
         (need at least {fan_in} + 1)"
    )]
    BudgetTooSmall { memory_elems: usize, fan_in: usize },

    #[error("short read on run {run_id}: expected {expected} elements, found {actually_read}")]
    ShortRead {
        run_id: u64,
        expected: u64,
        actually_read: u64,
    },
}
