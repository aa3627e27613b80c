//! Partitioned persistence envelope for IVF-Flat indexes.
//!
//! A large index is split into partitions so each stored value stays
//! within the comfortable size range of the backing key-value engine.
//! Each partition carries a contiguous range of centroid indices together
//! with the full `(field_name, dim, nlist)` metadata; partition 0 is read
//! first so the loader can derive the deterministic partition count and
//! fetch the rest by key.
//!
//! Envelope layout:
//!
//! ```text
//! [field name: string]
//! [dim: u64 BE] [nlist: u64 BE]
//! [centroid count: u32 BE] [vector envelope]...
//! [list count: u32 BE]
//!   per list: [entry count: u32 BE]
//!     per entry: [key: u64 BE] [vector envelope]
//! ```

use quiverdb_core::encoding::{
    decode_vector, encode_vector_to, read_string, read_u32, read_u64, write_len, write_string,
    Decoder, Encoder,
};
use quiverdb_core::CoreError;

use crate::error::VectorError;

use super::ivf::{IvfFlatIndex, IvfList};

/// Dimension at which one centroid counts at full weight toward the
/// partition budget; longer vectors fill partitions proportionally faster.
const PARTITION_BASE_DIM: usize = 128;

/// Weighted centroid budget per partition.
const CENTROIDS_PER_PARTITION: usize = 1000;

/// Number of partitions an index with the given shape is stored in.
///
/// Deterministic in `(nlist, dim)` so the on-disk layout is reproducible;
/// always at least 1.
#[must_use]
pub fn partition_count(nlist: usize, dim: usize) -> usize {
    nlist
        .saturating_mul(dim)
        .div_ceil(PARTITION_BASE_DIM * CENTROIDS_PER_PARTITION)
        .max(1)
}

/// One persisted slice of an IVF-Flat index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPartition {
    /// The indexed field's name; identical across partitions.
    pub field_name: String,
    /// Vector dimension; identical across partitions.
    pub dim: usize,
    /// Total cluster count of the index; identical across partitions.
    pub nlist: usize,
    /// Centroids of this partition's contiguous cluster range.
    pub centroids: Vec<Vec<f32>>,
    /// Inverted lists matching `centroids` position for position.
    pub inverted_lists: Vec<IvfList>,
}

impl IndexPartition {
    /// Split an index into its persistence partitions.
    ///
    /// `nlist` clusters are divided into `partition_count` contiguous
    /// ranges of `nlist / n` clusters each; the last partition absorbs
    /// the remainder. An index with `nlist == 0` yields one empty
    /// partition that still carries the metadata.
    #[must_use]
    pub fn split(index: &IvfFlatIndex) -> Vec<Self> {
        let nlist = index.nlist();
        let n_partitions = partition_count(nlist, index.dim());
        let partition_size = nlist / n_partitions;

        (0..n_partitions)
            .map(|i| {
                let start = i * partition_size;
                let end = if i == n_partitions - 1 { nlist } else { start + partition_size };
                Self {
                    field_name: index.field_name().to_owned(),
                    dim: index.dim(),
                    nlist,
                    centroids: index.centroids()[start..end].to_vec(),
                    inverted_lists: index.inverted_lists()[start..end].to_vec(),
                }
            })
            .collect()
    }

    /// Reassemble an index from its partitions, in partition order.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::Encoding`] if the partitions disagree on
    /// metadata or do not add up to `nlist` clusters.
    pub fn assemble(partitions: Vec<Self>) -> Result<IvfFlatIndex, VectorError> {
        let Some(first) = partitions.first() else {
            return Err(VectorError::Encoding("no index partitions".to_owned()));
        };
        let (field_name, dim, nlist) = (first.field_name.clone(), first.dim, first.nlist);

        let mut centroids = Vec::with_capacity(nlist);
        let mut inverted_lists = Vec::with_capacity(nlist);
        for partition in partitions {
            if partition.field_name != field_name
                || partition.dim != dim
                || partition.nlist != nlist
            {
                return Err(VectorError::Encoding(
                    "inconsistent index partition metadata".to_owned(),
                ));
            }
            if partition.centroids.len() != partition.inverted_lists.len() {
                return Err(VectorError::Encoding(
                    "partition centroid/list count mismatch".to_owned(),
                ));
            }
            centroids.extend(partition.centroids);
            inverted_lists.extend(partition.inverted_lists);
        }

        if centroids.len() != nlist {
            return Err(VectorError::Encoding(format!(
                "index partitions hold {} clusters, expected {nlist}",
                centroids.len()
            )));
        }

        Ok(IvfFlatIndex::restore(field_name, dim, nlist, centroids, inverted_lists))
    }
}

impl Encoder for IndexPartition {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        write_string(buf, &self.field_name)?;
        buf.extend_from_slice(&(self.dim as u64).to_be_bytes());
        buf.extend_from_slice(&(self.nlist as u64).to_be_bytes());

        write_len(buf, self.centroids.len(), "centroids")?;
        for centroid in &self.centroids {
            encode_vector_to(centroid, buf)?;
        }

        write_len(buf, self.inverted_lists.len(), "inverted lists")?;
        for list in &self.inverted_lists {
            write_len(buf, list.len(), "inverted list")?;
            for (key, vector) in list {
                buf.extend_from_slice(&key.to_be_bytes());
                encode_vector_to(vector, buf)?;
            }
        }
        Ok(())
    }
}

impl Decoder for IndexPartition {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let (field_name, mut offset) = read_string(bytes)?;
        let dim = read_u64(&bytes[offset..])? as usize;
        offset += 8;
        let nlist = read_u64(&bytes[offset..])? as usize;
        offset += 8;

        let centroid_count = read_u32(&bytes[offset..])? as usize;
        offset += 4;
        let mut centroids = Vec::with_capacity(centroid_count);
        for _ in 0..centroid_count {
            let (vector, consumed) = decode_vector(&bytes[offset..])?;
            centroids.push(vector);
            offset += consumed;
        }

        let list_count = read_u32(&bytes[offset..])? as usize;
        offset += 4;
        let mut inverted_lists = Vec::with_capacity(list_count);
        for _ in 0..list_count {
            let entry_count = read_u32(&bytes[offset..])? as usize;
            offset += 4;
            let mut list = IvfList::with_capacity(entry_count);
            for _ in 0..entry_count {
                let key = read_u64(&bytes[offset..])?;
                offset += 8;
                let (vector, consumed) = decode_vector(&bytes[offset..])?;
                offset += consumed;
                list.push((key, vector));
            }
            inverted_lists.push(list);
        }

        Ok(Self { field_name, dim, nlist, centroids, inverted_lists })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_index(dim: usize, nlist: usize, entries: u64) -> IvfFlatIndex {
        let mut index = IvfFlatIndex::new("vec", dim, nlist);
        let centroids: Vec<Vec<f32>> =
            (0..nlist).map(|i| vec![i as f32; dim]).collect();
        index.set_centroids(centroids).expect("set centroids");
        for key in 0..entries {
            let v = vec![(key % nlist as u64) as f32; dim];
            index.put(key, &v).expect("put");
        }
        index
    }

    #[test]
    fn partition_count_is_deterministic_and_positive() {
        assert_eq!(partition_count(0, 2), 1);
        assert_eq!(partition_count(4, 2), 1);
        assert_eq!(partition_count(1000, 128), 1);
        assert_eq!(partition_count(1001, 128), 2);
        assert_eq!(partition_count(1000, 256), 2);
        assert_eq!(partition_count(4000, 512), 16);
    }

    #[test]
    fn split_covers_all_clusters_with_remainder_in_last() {
        let index = populated_index(256, 1001, 0);
        let partitions = IndexPartition::split(&index);

        // 1001 * 256 / 128000 rounds up to 3 partitions of 333 + remainder.
        assert_eq!(partitions.len(), 3);
        assert_eq!(partitions[0].centroids.len(), 333);
        assert_eq!(partitions[1].centroids.len(), 333);
        assert_eq!(partitions[2].centroids.len(), 335);
        assert!(partitions.iter().all(|p| p.nlist == 1001 && p.dim == 256));
    }

    #[test]
    fn split_assemble_roundtrip() {
        let index = populated_index(4, 8, 64);
        let assembled =
            IndexPartition::assemble(IndexPartition::split(&index)).expect("assemble");

        assert_eq!(assembled.field_name(), index.field_name());
        assert_eq!(assembled.dim(), index.dim());
        assert_eq!(assembled.nlist(), index.nlist());
        assert_eq!(assembled.centroids(), index.centroids());
        assert_eq!(assembled.inverted_lists(), index.inverted_lists());
        assert!(assembled.has_centroids());
    }

    #[test]
    fn encode_decode_partition() {
        let index = populated_index(4, 8, 64);
        for partition in IndexPartition::split(&index) {
            let encoded = partition.encode().expect("encode");
            let decoded = IndexPartition::decode(&encoded).expect("decode");
            assert_eq!(decoded, partition);
        }
    }

    #[test]
    fn zero_cluster_index_persists_as_metadata_only() {
        let index = IvfFlatIndex::new("vec", 3, 0);
        let partitions = IndexPartition::split(&index);
        assert_eq!(partitions.len(), 1);
        assert!(partitions[0].centroids.is_empty());

        let assembled = IndexPartition::assemble(partitions).expect("assemble");
        assert_eq!(assembled.nlist(), 0);
        assert_eq!(assembled.dim(), 3);
        assert!(!assembled.has_centroids());
    }

    #[test]
    fn assemble_rejects_inconsistent_metadata() {
        let index = populated_index(256, 1001, 0);
        let mut partitions = IndexPartition::split(&index);
        partitions[1].dim = 64;
        assert!(matches!(
            IndexPartition::assemble(partitions),
            Err(VectorError::Encoding(_))
        ));
    }

    #[test]
    fn assemble_rejects_missing_partitions() {
        let index = populated_index(256, 1001, 0);
        let mut partitions = IndexPartition::split(&index);
        partitions.pop();
        assert!(IndexPartition::assemble(partitions).is_err());
        assert!(IndexPartition::assemble(Vec::new()).is_err());
    }

    #[test]
    fn decode_truncated_partition_fails() {
        let index = populated_index(2, 2, 4);
        let encoded = IndexPartition::split(&index)[0].encode().expect("encode");
        assert!(IndexPartition::decode(&encoded[..encoded.len() - 3]).is_err());
    }
}
