use anyhow::{Context, Result};
use engine::frequency::{self, FrequencyMap};
use engine::huffman::packed::{compress, decompress};
use engine::huffman::{self, HuffmanReport};
use engine::metrics::{file_size_mb, processing_seconds};
use engine::persist::{load_artifact, save_artifact, MetricStore};
use engine::stats::{collection_statistics, document_statistics, upload_statistics, Statistics};
use engine::tokenizer::tokenize;
use engine::{RunningMetric, StatisticsConfig, WordStat};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

pub const STORE_ENV: &str = "ANALYZER_STORE";
pub const DEFAULT_STORE: &str = "./store";

/// Store directory from the flag, then `ANALYZER_STORE`, then the default.
pub fn resolve_store(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var(STORE_ENV).ok().filter(|s| !s.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE))
}

pub fn load_config(path: Option<&Path>, limit: Option<usize>) -> Result<StatisticsConfig> {
    let mut cfg = match path {
        Some(p) => {
            let text = fs::read_to_string(p).with_context(|| format!("reading config {}", p.display()))?;
            StatisticsConfig::from_json(&text)?
        }
        None => StatisticsConfig::default(),
    };
    if let Some(limit) = limit {
        cfg.rarest_limit = limit;
    }
    Ok(cfg)
}

#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub file: String,
    pub words: Vec<WordStat>,
    #[serde(flatten)]
    pub statistics: Statistics,
    pub metrics: MetricsView,
}

#[derive(Debug, Serialize)]
pub struct HuffmanSummary {
    pub file: String,
    #[serde(flatten)]
    pub report: HuffmanReport,
    pub packed_bytes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub files_processed: u64,
    pub latest_file_processed_timestamp: String,
    pub min_time_processed: f64,
    pub avg_time_processed: f64,
    pub max_time_processed: f64,
    pub total_file_size_mb: f64,
    pub avg_file_size_mb: f64,
    pub top_words: Vec<(String, u64)>,
}

impl MetricsView {
    pub fn new(m: &RunningMetric, top: usize) -> Self {
        Self {
            files_processed: m.files_processed,
            latest_file_processed_timestamp: m.latest_file_processed_timestamp.clone(),
            min_time_processed: m.min_time_processed,
            avg_time_processed: m.avg_time_processed,
            max_time_processed: m.max_time_processed,
            total_file_size_mb: m.total_file_size_mb,
            avg_file_size_mb: m.avg_file_size_mb,
            top_words: m.top_words(top),
        }
    }
}

pub struct Analyzer {
    store: MetricStore,
    config: StatisticsConfig,
}

impl Analyzer {
    pub fn new<P: AsRef<Path>>(store_dir: P, config: StatisticsConfig) -> Result<Self> {
        Ok(Self { store: MetricStore::open(store_dir)?, config })
    }

    /// Statistics for one file against an optional collection, recorded in
    /// the running metric.
    pub fn document(&self, input: &Path, collection: &[PathBuf]) -> Result<DocumentReport> {
        let start = Instant::now();
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let tokens = tokenize(&bytes);
        let doc_freq = frequency::count(&tokens);

        let mut collection_freqs: Vec<FrequencyMap> = Vec::new();
        let mut includes_self = false;
        for path in collect_files(collection)? {
            if same_file(&path, input) {
                includes_self = true;
            }
            match fs::read(&path) {
                Ok(b) => collection_freqs.push(frequency::count(&tokenize(&b))),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping collection document"),
            }
        }
        if !collection_freqs.is_empty() && !includes_self {
            collection_freqs.push(doc_freq.clone());
        }

        let statistics = document_statistics(&tokens, &collection_freqs, &self.config);
        let words = upload_statistics(&tokens, &self.config);
        let metric = self.store.record(
            processing_seconds(start.elapsed()),
            file_size_mb(bytes.len() as u64),
            &doc_freq,
        )?;
        Ok(DocumentReport {
            file: input.display().to_string(),
            words,
            statistics,
            metrics: MetricsView::new(&metric, 10),
        })
    }

    /// Statistics for every file under `inputs`, treated as one collection.
    pub fn collection(&self, inputs: &[PathBuf]) -> Result<Statistics> {
        let mut documents = Vec::new();
        for path in collect_files(inputs)? {
            let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            documents.push(tokenize(&bytes));
        }
        tracing::info!(documents = documents.len(), "analyzing collection");
        Ok(collection_statistics(&documents, &self.config))
    }

    pub fn metrics(&self, top: usize) -> Result<Option<MetricsView>> {
        Ok(self.store.load()?.map(|m| MetricsView::new(&m, top)))
    }
}

/// Encode and decode `input`, optionally writing the packed artifact.
pub fn huffman_file(input: &Path, output: Option<&Path>) -> Result<HuffmanSummary> {
    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let report = huffman::verify_round_trip(&bytes)?;
    let packed_bytes = match output {
        Some(out) => {
            let packed = compress(&bytes)?;
            save_artifact(out, &packed)?;
            Some(packed.to_bytes()?.len())
        }
        None => None,
    };
    Ok(HuffmanSummary { file: input.display().to_string(), report, packed_bytes })
}

/// Restore a packed artifact to `output`; returns the number of bytes written.
pub fn decompress_file(input: &Path, output: &Path) -> Result<usize> {
    let packed = load_artifact(input)?;
    let bytes = decompress(&packed)?;
    fs::write(output, &bytes).with_context(|| format!("writing {}", output.display()))?;
    Ok(bytes.len())
}

/// Expand directories into their files, sorted by name.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for p in paths {
        if p.is_dir() {
            for entry in WalkDir::new(p).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else if p.is_file() {
            files.push(p.clone());
        } else {
            anyhow::bail!("no such file or directory: {}", p.display());
        }
    }
    Ok(files)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
