//! Storage key layout.
//!
//! The whole database lives in one ordered byte keyspace, partitioned by
//! short ASCII prefixes:
//!
//! - `s:` - the schema envelope (a single key)
//! - `r:<k>` - record `k`, with `k` in decimal
//! - `i:<field>:<p>` - partition `p` of the IVF index for `field`, with
//!   `p` in decimal starting at 0
//! - `c:<field>` - reserved for centroids; currently colocated in the
//!   index envelope

/// The key under which the schema envelope is stored.
pub const SCHEMA_KEY: &[u8] = b"s:";

/// Prefix of all record keys.
pub const RECORD_PREFIX: &[u8] = b"r:";

/// Prefix of all index partition keys.
pub const INDEX_PREFIX: &[u8] = b"i:";

/// Reserved prefix for a standalone centroid namespace.
pub const CENTROID_PREFIX: &[u8] = b"c:";

/// Encode the storage key for a record.
#[inline]
#[must_use]
pub fn record_key(key: u64) -> Vec<u8> {
    format!("r:{key}").into_bytes()
}

/// Parse a record key back into the record's `u64` key.
///
/// Returns `None` if the key does not carry the record prefix or the
/// suffix is not a decimal number.
#[inline]
#[must_use]
pub fn parse_record_key(key: &[u8]) -> Option<u64> {
    let suffix = key.strip_prefix(RECORD_PREFIX)?;
    std::str::from_utf8(suffix).ok()?.parse().ok()
}

/// Encode the storage key for one partition of a field's index.
#[inline]
#[must_use]
pub fn index_partition_key(field: &str, partition: usize) -> Vec<u8> {
    format!("i:{field}:{partition}").into_bytes()
}

/// The key prefix shared by all partitions of a field's index.
#[inline]
#[must_use]
pub fn index_key_prefix(field: &str) -> Vec<u8> {
    format!("i:{field}:").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_roundtrip() {
        for key in [0u64, 1, 42, u64::MAX] {
            assert_eq!(parse_record_key(&record_key(key)), Some(key));
        }
    }

    #[test]
    fn record_keys_carry_the_prefix() {
        assert!(record_key(7).starts_with(RECORD_PREFIX));
    }

    #[test]
    fn parse_rejects_foreign_keys() {
        assert_eq!(parse_record_key(b"s:"), None);
        assert_eq!(parse_record_key(b"r:not-a-number"), None);
        assert_eq!(parse_record_key(b""), None);
    }

    #[test]
    fn index_partition_keys_share_the_field_prefix() {
        let prefix = index_key_prefix("embedding");
        assert!(index_partition_key("embedding", 0).starts_with(&prefix));
        assert!(index_partition_key("embedding", 12).starts_with(&prefix));
        assert!(!index_partition_key("other", 0).starts_with(&prefix));
    }

    #[test]
    fn prefixes_partition_the_keyspace() {
        assert!(SCHEMA_KEY < RECORD_PREFIX);
        assert_ne!(RECORD_PREFIX, INDEX_PREFIX);
        assert_ne!(INDEX_PREFIX, CENTROID_PREFIX);
    }
}
