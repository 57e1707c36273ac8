//! Statistics requests: one document against its collections, a whole
//! collection, or a freshly uploaded file.

use crate::config::StatisticsConfig;
use crate::frequency::{self, FrequencyMap};
use crate::rank::{select_rarest, RankKey, WordStat};
use crate::tfidf::{inverse_document_frequency, term_frequency, InverseDocumentFrequency};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsMeta {
    pub total_documents: usize,
    pub total_tokens: usize,
    pub distinct_words: usize,
    /// Set when no collection was available and IDF was not computed.
    pub tf_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub statistics: Vec<WordStat>,
    pub meta: StatisticsMeta,
}

/// Rarest words of one document.
///
/// `collection` holds the frequency maps of every document sharing a
/// collection with this one (the document itself included). When it is
/// empty only TF is computed and words are ranked by ascending TF;
/// otherwise they are ranked by ascending TF-IDF.
pub fn document_statistics<S: AsRef<str>>(
    tokens: &[S],
    collection: &[FrequencyMap],
    cfg: &StatisticsConfig,
) -> Statistics {
    let freq = frequency::count(tokens);
    if collection.is_empty() {
        let stats = word_stats(&freq, tokens.len(), None);
        return finish(stats, RankKey::TermFrequency, &freq, tokens.len(), 0, true, cfg);
    }
    let idf = inverse_document_frequency(collection);
    let stats = word_stats(&freq, tokens.len(), Some(&idf));
    finish(stats, RankKey::TfIdf, &freq, tokens.len(), idf.num_docs(), false, cfg)
}

/// Rarest words of a collection. TF treats all documents as one text, IDF
/// is taken across the documents.
pub fn collection_statistics<S: AsRef<str>>(documents: &[Vec<S>], cfg: &StatisticsConfig) -> Statistics {
    let per_doc: Vec<FrequencyMap> = documents.iter().map(|d| frequency::count(d)).collect();
    let mut combined = FrequencyMap::new();
    for doc in &per_doc {
        frequency::merge_into(&mut combined, doc);
    }
    let total = frequency::total(&combined);
    let idf = inverse_document_frequency(&per_doc);
    let stats = word_stats(&combined, total, Some(&idf));
    finish(stats, RankKey::TfIdf, &combined, total, idf.num_docs(), false, cfg)
}

/// Word list reported right after an upload: ascending raw count, with the
/// document treated as its own corpus (`idf = ln(total / count)`).
pub fn upload_statistics<S: AsRef<str>>(tokens: &[S], cfg: &StatisticsConfig) -> Vec<WordStat> {
    let freq = frequency::count(tokens);
    let total = tokens.len() as f64;
    let stats = word_stats(&freq, tokens.len(), None).into_iter().map(|mut s| {
        s.idf = (total / s.count as f64).ln();
        s.tfidf = s.tf * s.idf;
        s
    });
    select_rarest(stats, RankKey::Count, cfg.rarest_limit)
        .into_iter()
        .map(|s| s.rounded(cfg.precision))
        .collect()
}

fn word_stats(freq: &FrequencyMap, total: usize, idf: Option<&InverseDocumentFrequency>) -> Vec<WordStat> {
    let tf = term_frequency(freq, total);
    freq.iter()
        .map(|(word, &count)| {
            let t = tf.get(word).copied().unwrap_or(0.0);
            let (document_frequency, i) = match idf {
                Some(idf) => (idf.document_frequency(word), idf.get(word)),
                None => (0, 0.0),
            };
            WordStat { word: word.clone(), count, tf: t, document_frequency, idf: i, tfidf: t * i }
        })
        .collect()
}

fn finish(
    stats: Vec<WordStat>,
    key: RankKey,
    freq: &FrequencyMap,
    total_tokens: usize,
    total_documents: usize,
    tf_only: bool,
    cfg: &StatisticsConfig,
) -> Statistics {
    let statistics: Vec<WordStat> = select_rarest(stats, key, cfg.rarest_limit)
        .into_iter()
        .map(|s| s.rounded(cfg.precision))
        .collect();
    tracing::debug!(total_tokens, distinct = freq.len(), returned = statistics.len(), ?key, "ranked statistics");
    Statistics {
        statistics,
        meta: StatisticsMeta { total_documents, total_tokens, distinct_words: freq.len(), tf_only },
    }
}
