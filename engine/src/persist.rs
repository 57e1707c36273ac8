use crate::frequency::FrequencyMap;
use crate::huffman::packed::PackedHuffman;
use crate::metrics::{self, RunningMetric};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs::{self, create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn metrics(&self) -> PathBuf { self.root.join("metrics.json") }
    fn metrics_tmp(&self) -> PathBuf { self.root.join("metrics.json.tmp") }
}

pub fn save_metric(paths: &StorePaths, metric: &RunningMetric) -> Result<()> {
    create_dir_all(&paths.root)?;
    let tmp = paths.metrics_tmp();
    {
        let mut f = File::create(&tmp)?;
        let json = serde_json::to_string_pretty(metric)?;
        f.write_all(json.as_bytes())?;
        f.sync_all()?;
    }
    // rename is atomic, readers never see a half-written record
    fs::rename(&tmp, paths.metrics())?;
    Ok(())
}

/// Load the running metric, or `None` if nothing has been recorded yet.
pub fn load_metric(paths: &StorePaths) -> Result<Option<RunningMetric>> {
    let mut f = match File::open(paths.metrics()) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let metric: RunningMetric = serde_json::from_str(&buf)
        .with_context(|| format!("parsing {}", paths.metrics().display()))?;
    Ok(Some(metric))
}

pub fn save_artifact(path: &Path, packed: &PackedHuffman) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    f.write_all(&packed.to_bytes()?)?;
    Ok(())
}

pub fn load_artifact(path: &Path) -> Result<PackedHuffman> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let packed = PackedHuffman::from_bytes(&buf)
        .with_context(|| format!("reading artifact {}", path.display()))?;
    Ok(packed)
}

/// File-backed running metric.
///
/// `record` holds a lock across load, update and save so concurrent callers
/// in this process each observe the previous caller's result. Separate
/// processes sharing a store directory are not coordinated.
pub struct MetricStore {
    paths: StorePaths,
    lock: Mutex<()>,
}

impl MetricStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let paths = StorePaths::new(root);
        create_dir_all(&paths.root)
            .with_context(|| format!("creating store directory {}", paths.root.display()))?;
        Ok(Self { paths, lock: Mutex::new(()) })
    }

    pub fn load(&self) -> Result<Option<RunningMetric>> {
        let _guard = self.lock.lock();
        load_metric(&self.paths)
    }

    /// Fold one processed file into the stored metric and persist it.
    pub fn record(&self, processing_time: f64, file_size_mb: f64, words: &FrequencyMap) -> Result<RunningMetric> {
        let _guard = self.lock.lock();
        let prior = load_metric(&self.paths)?;
        let mut next = metrics::update(prior.as_ref(), processing_time, file_size_mb);
        next.record_words(words);
        save_metric(&self.paths, &next)?;
        tracing::info!(
            files_processed = next.files_processed,
            avg_time = next.avg_time_processed,
            avg_size_mb = next.avg_file_size_mb,
            "metrics updated"
        );
        Ok(next)
    }
}
