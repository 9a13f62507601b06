//! Log sanitization utilities
//!
//! Keeps long record values (DKIM keys, SPF records, verification tokens)
//! from being written to logs in full.

/// Maximum number of bytes of a value included in log output.
const TRUNCATE_LIMIT: usize = 128;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a record value for logging.
///
/// Values within the limit are returned unchanged; longer ones are cut at a
/// char boundary and suffixed with the original length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [{} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}
