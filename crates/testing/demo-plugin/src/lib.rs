//! Demo extension: a brute-force flat index.
//!
//! Kept deliberately small: it exists so the host's end-to-end paths (load,
//! register, construct, search, serialize) run against a real library. The
//! index stores raw vectors in memory and scans them all per query.

use knowhere_plugin_sdk::prelude::*;

const INDEX_TYPE: &str = "DEMO_FLAT";
const DEFAULT_DIM: u64 = 128;
const DEFAULT_K: u64 = 10;

/// Marker file written by the lifecycle hooks when this variable is set;
/// lets hosts observe hook invocation from the outside.
const EVENT_LOG_ENV: &str = "DEMO_PLUGIN_EVENT_LOG";

fn demo_info() -> ExtensionInfo {
    ExtensionInfo::new("Demo", "1.0.0")
        .with_author("Knowhere Plugins Contributors")
        .with_description("Brute-force flat vector index")
        .with_license("MIT")
}

#[derive(Default)]
struct DemoIndex {
    rows: usize,
    dim: usize,
    metric: String,
    vectors: Vec<f32>,
}

impl DemoIndex {
    fn distance(&self, query: &[f32], row: usize) -> f32 {
        let vector = &self.vectors[row * self.dim..(row + 1) * self.dim];
        match self.metric.as_str() {
            // Inner product negated so smaller stays better.
            "IP" => -query.iter().zip(vector).map(|(q, v)| q * v).sum::<f32>(),
            _ => query
                .iter()
                .zip(vector)
                .map(|(q, v)| (q - v) * (q - v))
                .sum(),
        }
    }
}

impl PluginIndex for DemoIndex {
    fn plugin_info(&self) -> ExtensionInfo {
        demo_info()
    }

    fn features(&self) -> ExtensionFeatures {
        ExtensionFeatures {
            supports_gpu: false,
            supports_mmap: true,
            supports_range_search: false,
            supports_iterator: false,
            supports_disk_storage: false,
            supported_metrics: vec!["L2".to_string(), "IP".to_string()],
            supported_data_types: vec!["float32".to_string()],
        }
    }

    fn health_check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }

    fn build(&mut self, dataset: &Dataset, config: &Value) -> Result<(), IndexError> {
        if dataset.vectors().is_empty() {
            return Err(IndexError::InvalidArgs("dataset has no raw data".into()));
        }

        if let Some(expected) = config.get("dim").and_then(Value::as_u64) {
            if expected as usize != dataset.dim() {
                return Err(IndexError::InvalidArgs(format!(
                    "dimension mismatch: config says {expected}, dataset has {}",
                    dataset.dim()
                )));
            }
        }

        let metric = config
            .get("metric_type")
            .and_then(Value::as_str)
            .unwrap_or("L2");
        if metric != "L2" && metric != "IP" {
            return Err(IndexError::InvalidArgs(format!(
                "unsupported metric type: {metric}"
            )));
        }

        self.rows = dataset.rows();
        self.dim = dataset.dim();
        self.metric = metric.to_string();
        self.vectors = dataset.vectors().to_vec();
        Ok(())
    }

    fn search(
        &self,
        queries: &Dataset,
        config: &Value,
        bitset: &Bitset,
    ) -> Result<Dataset, IndexError> {
        if self.dim == 0 {
            return Err(IndexError::InvalidArgs("index is not built".into()));
        }
        if queries.dim() != self.dim {
            return Err(IndexError::InvalidArgs(format!(
                "dimension mismatch: expected {}, got {}",
                self.dim,
                queries.dim()
            )));
        }
        let k = config.get("k").and_then(Value::as_u64).unwrap_or(DEFAULT_K) as usize;
        if k == 0 {
            return Err(IndexError::InvalidArgs("k must be positive".into()));
        }

        let nq = queries.rows();
        let mut ids = vec![-1i64; nq * k];
        let mut distances = vec![f32::MAX; nq * k];

        for (qi, chunk) in (0..nq).zip(queries.vectors().chunks_exact(self.dim)) {
            let mut scored: Vec<(f32, i64)> = (0..self.rows)
                .filter(|row| !bitset.test(*row))
                .map(|row| (self.distance(chunk, row), row as i64))
                .collect();
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));

            for (slot, (dist, id)) in scored.into_iter().take(k).enumerate() {
                ids[qi * k + slot] = id;
                distances[qi * k + slot] = dist;
            }
        }

        Ok(Dataset::from_results(nq, k, ids, distances))
    }

    fn vectors_by_ids(&self, ids: &[i64]) -> Result<Dataset, IndexError> {
        let mut out = Vec::with_capacity(ids.len() * self.dim);
        for &id in ids {
            if id < 0 || id as usize >= self.rows {
                return Err(IndexError::InvalidArgs(format!(
                    "id {id} out of range [0, {})",
                    self.rows
                )));
            }
            let row = id as usize;
            out.extend_from_slice(&self.vectors[row * self.dim..(row + 1) * self.dim]);
        }
        Ok(Dataset::from_vectors(ids.len(), self.dim, out))
    }

    fn has_raw_data(&self, _metric: &str) -> bool {
        true
    }

    fn serialize(&self, binset: &mut BinarySet) -> Result<(), IndexError> {
        let meta = serde_json::json!({
            "rows": self.rows,
            "dim": self.dim,
            "metric_type": self.metric,
        });
        binset.append("meta", serde_json::to_vec(&meta)?);

        let mut raw = Vec::with_capacity(self.vectors.len() * 4);
        for value in &self.vectors {
            raw.extend_from_slice(&value.to_le_bytes());
        }
        binset.append("vectors", raw);
        Ok(())
    }

    fn deserialize(&mut self, binset: &BinarySet, _config: &Value) -> Result<(), IndexError> {
        let meta = binset
            .get("meta")
            .ok_or_else(|| IndexError::Serialization("missing meta blob".into()))?;
        let meta: Value = serde_json::from_slice(meta)?;

        let rows = meta.get("rows").and_then(Value::as_u64).unwrap_or(0) as usize;
        let dim = meta.get("dim").and_then(Value::as_u64).unwrap_or(0) as usize;
        let metric = meta
            .get("metric_type")
            .and_then(Value::as_str)
            .unwrap_or("L2")
            .to_string();

        let raw = binset
            .get("vectors")
            .ok_or_else(|| IndexError::Serialization("missing vectors blob".into()))?;
        if raw.len() != rows * dim * 4 {
            return Err(IndexError::Serialization(format!(
                "vector blob has {} bytes, expected {}",
                raw.len(),
                rows * dim * 4
            )));
        }
        let vectors = raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        self.rows = rows;
        self.dim = dim;
        self.metric = metric;
        self.vectors = vectors;
        Ok(())
    }

    fn index_meta(&self) -> Result<Value, IndexError> {
        Ok(serde_json::json!({
            "index_type": INDEX_TYPE,
            "num_vectors": self.rows,
            "dim": self.dim,
            "metric_type": self.metric,
            "memory_usage": self.size(),
        }))
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn count(&self) -> usize {
        self.rows
    }

    fn size(&self) -> usize {
        self.vectors.len() * std::mem::size_of::<f32>()
    }

    fn index_type(&self) -> &str {
        INDEX_TYPE
    }
}

struct DemoConfig;

impl PluginConfig for DemoConfig {
    fn validate(&self, config: &Value) -> Result<(), IndexError> {
        if let Some(dim) = config.get("dim") {
            match dim.as_u64() {
                Some(d) if d > 0 => {}
                _ => return Err(IndexError::InvalidArgs("dim must be positive".into())),
            }
        }
        if let Some(metric) = config.get("metric_type").and_then(Value::as_str) {
            if metric != "L2" && metric != "IP" {
                return Err(IndexError::InvalidArgs(format!(
                    "unsupported metric type: {metric}"
                )));
            }
        }
        if let Some(k) = config.get("k") {
            match k.as_u64() {
                Some(k) if k > 0 => {}
                _ => return Err(IndexError::InvalidArgs("k must be positive".into())),
            }
        }
        Ok(())
    }

    fn default_config(&self) -> Value {
        serde_json::json!({
            "dim": DEFAULT_DIM,
            "metric_type": "L2",
            "k": DEFAULT_K,
        })
    }
}

#[derive(Default)]
struct DemoLifecycle;

impl DemoLifecycle {
    fn record(event: &str) {
        if let Ok(path) = std::env::var(EVENT_LOG_ENV) {
            use std::io::Write;
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
            {
                let _ = writeln!(file, "{event}");
            }
        }
    }
}

impl PluginLifecycle for DemoLifecycle {
    fn on_load(&self) -> Result<(), IndexError> {
        Self::record("on_load");
        Ok(())
    }

    fn on_unload(&self) -> Result<(), IndexError> {
        Self::record("on_unload");
        Ok(())
    }
}

#[derive(Default)]
struct DemoFactory;

impl PluginFactory for DemoFactory {
    fn create_index(&self) -> Option<Box<dyn PluginIndex>> {
        Some(Box::new(DemoIndex::default()))
    }

    fn create_config(&self) -> Option<Box<dyn PluginConfig>> {
        Some(Box::new(DemoConfig))
    }

    fn plugin_info(&self) -> ExtensionInfo {
        demo_info()
    }
}

declare_plugin!(DemoFactory, lifecycle: DemoLifecycle);
