//! Stable presentation identifiers.
//!
//! The visualization layer diffs successive documents by element id, so ids
//! must be pure functions of logical identity: the same node on two runs over
//! the same graph gets the same id.  They also have to be safe to embed as
//! element identifiers in the consuming format, so we emit fixed-length
//! lowercase hex.  This is identity stabilization, not a security boundary; a
//! truncated BLAKE3 digest is collision-negligible at realistic graph sizes.

use std::fmt::Write;

/// Bytes of digest kept; 128 bits renders as 32 hex chars.
const ID_BYTES: usize = 16;

/// Hash a logical node id into its presentation id.
pub fn node_id(logical: &str) -> String {
    hash_label(logical)
}

/// Hash an edge into its presentation id.  Source/target are already-hashed
/// node ids; the protocol label keeps parallel edges over different protocols
/// distinct.
pub fn edge_id(source: &str, target: &str, protocol: &str) -> String {
    hash_label(&format!("{}.{}.{}", source, target, protocol))
}

fn hash_label(label: &str) -> String {
    let digest = blake3::hash(label.as_bytes());
    let mut hex = String::with_capacity(ID_BYTES * 2);
    for byte in &digest.as_bytes()[..ID_BYTES] {
        write!(hex, "{:02x}", byte).unwrap();
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_stable_and_distinct() {
        assert_eq!(node_id("reviews.bookinfo"), node_id("reviews.bookinfo"));
        assert_ne!(node_id("reviews.bookinfo"), node_id("ratings.bookinfo"));
    }

    #[test]
    fn node_ids_are_fixed_length_lowercase_hex() {
        let id = node_id("productpage");
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn edge_ids_distinguish_protocols() {
        let source = node_id("a");
        let target = node_id("b");
        assert_eq!(
            edge_id(&source, &target, "http"),
            edge_id(&source, &target, "http")
        );
        assert_ne!(
            edge_id(&source, &target, "http"),
            edge_id(&source, &target, "tcp")
        );
    }
}
