use thiserror::Error;

/// Failures reported by [`RBTreeMap`](crate::RBTreeMap) and its cursors.
///
/// A missing key is only an error for [`at`](crate::RBTreeMap::at); every other lookup
/// reports it as `None` and `erase` of a missing key does nothing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The requested key is not stored in the map.
    #[error("key is not found")]
    KeyNotFound,
    /// A cursor positioned on the end sentinel was dereferenced.
    #[error("cursor is out of range")]
    CursorOutOfRange,
}

/// Shorthand for results carrying this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages() {
        assert_eq!(Error::KeyNotFound.to_string(), "key is not found");
        assert_eq!(Error::CursorOutOfRange.to_string(), "cursor is out of range");
    }

    #[test]
    fn implements_core_error() {
        let error: &dyn core::error::Error = &Error::KeyNotFound;
        assert!(error.source().is_none());
    }
}
