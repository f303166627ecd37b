use thiserror::Error;

/// Failure of the raw insertion path.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    #[error("key already exists")]
    DuplicateKey,
}

/// Errors reported by [`ProbeMap`](crate::ProbeMap) operations.
///
/// Absence is not an error for `remove`, `contains_key` or `contains_value`;
/// those report it through their boolean result.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// `add` was given a key that is already present. Use `set` to overwrite.
    #[error("key already exists")]
    DuplicateKey,
    /// `get`/`get_mut` was given a key that is not present.
    #[error("key not found")]
    KeyNotFound,
    /// `try_remove` was given no key at all.
    #[error("refused to remove a null key")]
    NullKey,
}

impl From<InsertError> for MapError {
    fn from(e: InsertError) -> Self {
        match e {
            InsertError::DuplicateKey => MapError::DuplicateKey,
        }
    }
}
