use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Statistics for one word of a document or collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordStat {
    pub word: String,
    /// Occurrences in the analyzed text.
    pub count: usize,
    pub tf: f64,
    /// Number of collection documents containing the word.
    pub document_frequency: usize,
    pub idf: f64,
    pub tfidf: f64,
}

impl WordStat {
    pub fn rounded(mut self, places: u32) -> Self {
        use crate::config::round_to;
        self.tf = round_to(self.tf, places);
        self.idf = round_to(self.idf, places);
        self.tfidf = round_to(self.tfidf, places);
        self
    }
}

/// Which field of a [`WordStat`] orders the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankKey {
    Count,
    TermFrequency,
    TfIdf,
}

impl RankKey {
    fn value(self, stat: &WordStat) -> f64 {
        match self {
            RankKey::Count => stat.count as f64,
            RankKey::TermFrequency => stat.tf,
            RankKey::TfIdf => stat.tfidf,
        }
    }
}

/// The `limit` rarest entries: ascending by `key`, ties broken by word.
pub fn select_rarest<I>(stats: I, key: RankKey, limit: usize) -> Vec<WordStat>
where
    I: IntoIterator<Item = WordStat>,
{
    let mut stats: Vec<WordStat> = stats.into_iter().collect();
    bounded_sort(&mut stats, limit, |a, b| {
        key.value(a).total_cmp(&key.value(b)).then_with(|| a.word.cmp(&b.word))
    });
    stats
}

// Partition around the cut so only the kept prefix needs a full sort.
fn bounded_sort<T, F>(items: &mut Vec<T>, limit: usize, mut cmp: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if limit == 0 {
        items.clear();
        return;
    }
    if items.len() > limit {
        items.select_nth_unstable_by(limit - 1, &mut cmp);
        items.truncate(limit);
    }
    items.sort_by(cmp);
}
