use crate::rewrite::errors::RewriteError;
use crate::rewrite::planner::RewriteEdit;
use std::io::Write;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_64;

/// Before-text verification strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Exact text match required.
    ExactMatch(String),
    /// xxh3 hash of the expected text (faster for large spans).
    Hash(u64),
}

impl Verification {
    /// Create verification from text, hashing anything over 1 KiB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            Verification::Hash(xxh3_64(text.as_bytes()))
        } else {
            Verification::ExactMatch(text.to_string())
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Verification::ExactMatch(expected) => text == expected,
            Verification::Hash(expected) => xxh3_64(text.as_bytes()) == *expected,
        }
    }
}

/// Apply a finalized edit list to a buffer, returning the new buffer.
///
/// Preconditions, each checked explicitly and rejected with an error rather
/// than silently applied:
/// - the list is sorted strictly descending by `byte_start`;
/// - no two edits overlap (overlap is a precondition check here, not an
///   emergent property of the sort order);
/// - every span is in bounds and its current text matches the edit's
///   `original`.
///
/// Descending order matters whenever a replacement's length differs from
/// the original: edits applied bottom-to-top never shift the offsets of
/// edits not yet applied.
pub fn apply_edits(source: &str, edits: &[RewriteEdit]) -> Result<String, RewriteError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    for window in edits.windows(2) {
        let (later, earlier) = (&window[0], &window[1]);
        if later.byte_start < earlier.byte_start {
            return Err(RewriteError::UnsortedEdits);
        }
        if earlier.byte_end > later.byte_start {
            return Err(RewriteError::OverlappingEdits {
                first_start: earlier.byte_start,
                first_end: earlier.byte_end,
                second_start: later.byte_start,
                second_end: later.byte_end,
            });
        }
    }

    for edit in edits {
        if edit.byte_start > edit.byte_end || edit.byte_end > source.len() {
            return Err(RewriteError::InvalidByteRange {
                byte_start: edit.byte_start,
                byte_end: edit.byte_end,
                buffer_len: source.len(),
            });
        }

        let current = &source[edit.byte_start..edit.byte_end];
        if !Verification::from_text(&edit.original).matches(current) {
            return Err(RewriteError::BeforeTextMismatch {
                byte_start: edit.byte_start,
                found: current.to_string(),
            });
        }
    }

    // Splice bottom-to-top; offsets stay valid relative to the current
    // buffer state at every step.
    let mut buffer = source.as_bytes().to_vec();
    for edit in edits {
        buffer.splice(
            edit.byte_start..edit.byte_end,
            edit.replacement.bytes(),
        );
    }

    String::from_utf8(buffer).map_err(|_| RewriteError::InvalidUtf8Edit)
}

/// Persist a rewritten buffer atomically: tempfile in the same directory,
/// fsync, rename, then an mtime touch.
pub fn persist(path: &Path, content: &str) -> Result<(), RewriteError> {
    let parent = path.parent().ok_or_else(|| {
        RewriteError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        ))
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    let now = filetime::FileTime::now();
    filetime::set_file_mtime(path, now)?;

    Ok(())
}
