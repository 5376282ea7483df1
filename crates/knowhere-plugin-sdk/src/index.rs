//! The index capability surface called through a registered extension.

use serde_json::Value;

use crate::data::{BinarySet, Bitset, Dataset};
use crate::error::IndexError;
use crate::types::{ExtensionFeatures, ExtensionInfo, HealthStatus};

/// Streaming nearest-neighbor access for iterator-based search.
pub trait AnnIterator: Send {
    /// Next `(id, distance)` pair, best first; `None` once exhausted.
    fn next_neighbor(&mut self) -> Option<(i64, f32)>;
}

/// Capability surface of a plugin-provided index instance.
///
/// Instances may be shared across threads only when the extension implements
/// the necessary synchronization itself; the `Send + Sync` bound makes that
/// obligation part of the contract rather than a host assumption. The host
/// makes no promises about instance-level concurrency beyond it.
///
/// Optional capabilities have documented defaults: `range_search`,
/// `ann_iterator` and `metrics` decline with [`IndexError::NotImplemented`],
/// and `health_check` reports [`HealthStatus::Healthy`]: an index that does
/// not override the hook is presumed healthy.
pub trait PluginIndex: Send + Sync {
    /// Extension descriptor, identical to the owning factory's.
    fn plugin_info(&self) -> ExtensionInfo;

    /// Capability flags, reported per instance.
    fn features(&self) -> ExtensionFeatures;

    fn health_check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }

    /// Plugin-specific metrics document.
    fn metrics(&self) -> Result<Value, IndexError> {
        Err(IndexError::NotImplemented("metrics".into()))
    }

    /// Builds the index over `dataset` with the given configuration.
    fn build(&mut self, dataset: &Dataset, config: &Value) -> Result<(), IndexError>;

    /// Top-k search. Returns a result dataset of `queries.rows()` rows with
    /// `k` ids/distances each; absent slots carry id `-1`.
    fn search(
        &self,
        queries: &Dataset,
        config: &Value,
        bitset: &Bitset,
    ) -> Result<Dataset, IndexError>;

    fn range_search(
        &self,
        queries: &Dataset,
        config: &Value,
        bitset: &Bitset,
    ) -> Result<Dataset, IndexError> {
        let _ = (queries, config, bitset);
        Err(IndexError::NotImplemented("range_search".into()))
    }

    /// One iterator per query row.
    fn ann_iterator(
        &self,
        queries: &Dataset,
        config: &Value,
        bitset: &Bitset,
    ) -> Result<Vec<Box<dyn AnnIterator>>, IndexError> {
        let _ = (queries, config, bitset);
        Err(IndexError::NotImplemented("ann_iterator".into()))
    }

    /// Fetches stored vectors by id.
    fn vectors_by_ids(&self, ids: &[i64]) -> Result<Dataset, IndexError>;

    /// Whether raw vectors are retrievable under the given metric.
    fn has_raw_data(&self, metric: &str) -> bool;

    fn serialize(&self, binset: &mut BinarySet) -> Result<(), IndexError>;

    fn deserialize(&mut self, binset: &BinarySet, config: &Value) -> Result<(), IndexError>;

    /// Structural metadata: row count, dimension, declared metric, footprint.
    fn index_meta(&self) -> Result<Value, IndexError>;

    /// Vector dimension, 0 before build.
    fn dim(&self) -> usize;

    /// Number of indexed vectors.
    fn count(&self) -> usize;

    /// Approximate memory footprint in bytes.
    fn size(&self) -> usize;

    /// Index type tag (e.g. `"DEMO_FLAT"`).
    fn index_type(&self) -> &str;
}
