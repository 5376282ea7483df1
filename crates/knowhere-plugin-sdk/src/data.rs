//! Data containers crossing the capability surface.

use std::collections::BTreeMap;

/// Dense float vectors plus optional ids and distances.
///
/// The same container serves three shapes:
/// - build/query input: `rows` vectors of `dim` floats each;
/// - search output: `rows` queries with `dim` (= k) ids and distances, no
///   vectors;
/// - fetch-by-id output: retrieved vectors, no distances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: usize,
    dim: usize,
    vectors: Vec<f32>,
    ids: Vec<i64>,
    distances: Vec<f32>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dataset of `rows` vectors with `dim` components each.
    ///
    /// `vectors.len()` must equal `rows * dim`.
    pub fn from_vectors(rows: usize, dim: usize, vectors: Vec<f32>) -> Self {
        debug_assert_eq!(vectors.len(), rows * dim);
        Self {
            rows,
            dim,
            vectors,
            ids: Vec::new(),
            distances: Vec::new(),
        }
    }

    /// Search-result dataset: `rows` queries, `k` neighbors each.
    pub fn from_results(rows: usize, k: usize, ids: Vec<i64>, distances: Vec<f32>) -> Self {
        debug_assert_eq!(ids.len(), rows * k);
        debug_assert_eq!(distances.len(), rows * k);
        Self {
            rows,
            dim: k,
            vectors: Vec::new(),
            ids,
            distances,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Vector dimension, or `k` for a result dataset.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    /// The `row`-th vector, when vector data is present.
    pub fn vector(&self, row: usize) -> Option<&[f32]> {
        if row >= self.rows || self.vectors.is_empty() {
            return None;
        }
        let start = row * self.dim;
        self.vectors.get(start..start + self.dim)
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// Named binary blobs produced by serialize and consumed by deserialize.
///
/// Blob names are ordered so serialization output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinarySet {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl BinarySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a blob, replacing any previous blob of the same name.
    pub fn append(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.blobs.insert(name.into(), data);
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.blobs.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blobs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

/// Exclusion filter over candidate ids; a set bit removes that id from
/// search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bitset {
    bits: Vec<u64>,
    len: usize,
}

impl Bitset {
    /// All-clear bitset covering `len` ids.
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Zero-length bitset; filters nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set(&mut self, idx: usize) {
        if idx < self.len {
            self.bits[idx / 64] |= 1 << (idx % 64);
        }
    }

    /// True when `idx` is excluded. Out-of-range ids are never excluded.
    pub fn test(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        self.bits[idx / 64] & (1 << (idx % 64)) != 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_vector_access() {
        let data = Dataset::from_vectors(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(data.rows(), 2);
        assert_eq!(data.dim(), 3);
        assert_eq!(data.vector(0), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(data.vector(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(data.vector(2), None);
    }

    #[test]
    fn test_result_dataset_has_no_vectors() {
        let results = Dataset::from_results(1, 2, vec![3, 7], vec![0.5, 0.9]);
        assert_eq!(results.dim(), 2);
        assert_eq!(results.ids(), &[3, 7]);
        assert_eq!(results.vector(0), None);
    }

    #[test]
    fn test_binary_set() {
        let mut binset = BinarySet::new();
        binset.append("meta", b"{}".to_vec());
        binset.append("vectors", vec![0u8; 8]);

        assert_eq!(binset.len(), 2);
        assert_eq!(binset.get("meta"), Some(&b"{}"[..]));
        assert_eq!(binset.get("missing"), None);
        let names: Vec<&str> = binset.names().collect();
        assert_eq!(names, vec!["meta", "vectors"]);
    }

    #[test]
    fn test_bitset() {
        let mut bitset = Bitset::new(100);
        assert!(!bitset.test(65));
        bitset.set(65);
        assert!(bitset.test(65));
        assert!(!bitset.test(64));

        // Out of range: neither settable nor excluded.
        bitset.set(1000);
        assert!(!bitset.test(1000));

        assert!(!Bitset::empty().test(0));
    }
}
