//! Configuration constants for the amendment engine
//!
//! Limits applied when decree and amendment documents are parsed. Both
//! documents are held in memory for the lifetime of a session, so the
//! limits bound how much a single load can allocate.

/// Maximum JSON document size in bytes (16 MB).
///
/// A full decree with a few hundred articles is typically 200-800 KB,
/// amendment sets are smaller.
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Maximum number of amendments accepted in one amendment document.
pub const MAX_AMENDMENTS: usize = 10_000;

/// Fallback key used in type counts for amendments without `amendment_type`.
pub const UNKNOWN_AMENDMENT_TYPE: &str = "Unknown";

/// `source` marker on combined views synthesized purely from an amendment.
pub const AMENDMENT_ONLY_SOURCE: &str = "amendment_only";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_reasonable() {
        assert!(MAX_DOCUMENT_SIZE >= 1_000_000, "Should allow at least 1MB");
        assert!(MAX_DOCUMENT_SIZE <= 100 * 1024 * 1024, "Should not allow 100MB+");
        assert!(MAX_AMENDMENTS >= 1_000);
    }
}
