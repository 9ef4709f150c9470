use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("overlapping edits: [{first_start}, {first_end}) and [{second_start}, {second_end})")]
    OverlappingEdits {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error("edit list is not sorted descending by start offset")]
    UnsortedEdits,

    #[error("invalid byte range: [{byte_start}, {byte_end}) in buffer of length {buffer_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        buffer_len: usize,
    },

    #[error("before-text verification failed at byte {byte_start}: found {found:?}")]
    BeforeTextMismatch { byte_start: usize, found: String },

    #[error("edit would create malformed UTF-8")]
    InvalidUtf8Edit,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
