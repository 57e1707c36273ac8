//! Text analytics and compression: tokenization, TF/IDF statistics with
//! rarity ranking, Huffman coding, and a running per-file metric.

pub mod config;
pub mod error;
pub mod frequency;
pub mod huffman;
pub mod metrics;
pub mod persist;
pub mod rank;
pub mod stats;
pub mod tfidf;
pub mod tokenizer;

pub use config::StatisticsConfig;
pub use error::{Error, Result};
pub use frequency::FrequencyMap;
pub use huffman::{decode, encode, HuffmanTree};
pub use metrics::RunningMetric;
pub use rank::{select_rarest, RankKey, WordStat};
pub use stats::{Statistics, StatisticsMeta};
