//! Workload shape: keys, payload, and worker partitioning

/// Fixed one-byte payload written under every key
pub const PAYLOAD: &[u8] = b".";

/// Render a numeric key in its embedded-store form (decimal text)
pub fn key_text(n: u64) -> String {
    n.to_string()
}

/// Iterations each worker runs when a total iteration count is fanned out
///
/// Each parallel worker loops its own local counter from zero, so the same
/// numeric key is written by every worker. Duplicate keys across workers are
/// part of the workload, not an error.
pub fn split_iterations(total: usize, workers: usize) -> usize {
    total / workers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_text_is_decimal() {
        assert_eq!(key_text(0), "0");
        assert_eq!(key_text(42), "42");
        assert_eq!(key_text(u64::MAX), "18446744073709551615");
    }

    #[test]
    fn test_payload_is_one_byte() {
        assert_eq!(PAYLOAD, b".");
        assert_eq!(PAYLOAD.len(), 1);
    }

    #[test]
    fn test_split_iterations() {
        assert_eq!(split_iterations(1_000, 4), 250);
        assert_eq!(split_iterations(10, 3), 3);
        assert_eq!(split_iterations(100, 1), 100);
    }
}
