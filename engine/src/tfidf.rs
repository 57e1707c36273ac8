use crate::frequency::FrequencyMap;
use std::collections::HashMap;

/// Term frequency of every word: `count / total_tokens`.
///
/// A zero `total_tokens` yields an empty map rather than dividing by zero.
pub fn term_frequency(freq: &FrequencyMap, total_tokens: usize) -> HashMap<String, f64> {
    if total_tokens == 0 {
        return HashMap::new();
    }
    let total = total_tokens as f64;
    freq.iter()
        .map(|(word, &count)| (word.clone(), count as f64 / total))
        .collect()
}

/// IDF values for a document collection.
///
/// Words that never occur in the collection are scored with the smoothed
/// fallback `ln(N + 1)` when looked up through [`InverseDocumentFrequency::get`].
#[derive(Debug, Clone, Default)]
pub struct InverseDocumentFrequency {
    values: HashMap<String, f64>,
    df: HashMap<String, usize>,
    num_docs: usize,
}

impl InverseDocumentFrequency {
    /// Number of documents the values were computed over.
    pub fn num_docs(&self) -> usize { self.num_docs }

    /// IDF recorded for `word`, if it appears in at least one document.
    pub fn entry(&self, word: &str) -> Option<f64> {
        self.values.get(word).copied()
    }

    /// IDF for `word`, falling back to `ln(N + 1)` for unseen words.
    pub fn get(&self, word: &str) -> f64 {
        self.entry(word).unwrap_or_else(|| self.fallback())
    }

    pub fn fallback(&self) -> f64 {
        ((self.num_docs + 1) as f64).ln()
    }

    /// Number of documents containing `word`.
    pub fn document_frequency(&self, word: &str) -> usize {
        self.df.get(word).copied().unwrap_or(0)
    }
}

/// IDF across a set of per-document frequency maps: `ln(N / df(w))`.
pub fn inverse_document_frequency(docs: &[FrequencyMap]) -> InverseDocumentFrequency {
    let mut df: HashMap<String, usize> = HashMap::new();
    for doc in docs {
        // keys are unique per map, so each document counts a word at most once
        for (word, &count) in doc {
            if count > 0 {
                *df.entry(word.clone()).or_insert(0) += 1;
            }
        }
    }
    let n = docs.len() as f64;
    let values = df
        .iter()
        .map(|(word, &d)| (word.clone(), (n / d as f64).ln()))
        .collect();
    tracing::debug!(num_docs = docs.len(), num_terms = df.len(), "computed idf");
    InverseDocumentFrequency { values, df, num_docs: docs.len() }
}

/// TF-IDF of every word in `tf`, using the fallback IDF for words the
/// collection has never seen.
pub fn combine(tf: &HashMap<String, f64>, idf: &InverseDocumentFrequency) -> HashMap<String, f64> {
    tf.iter()
        .map(|(word, &t)| (word.clone(), t * idf.get(word)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::count;

    #[test]
    fn tf_over_zero_tokens_is_empty() {
        let f = count(&["a"]);
        assert!(term_frequency(&f, 0).is_empty());
    }

    #[test]
    fn tf_divides_by_total() {
        let f = count(&["the", "fox", "the"]);
        let tf = term_frequency(&f, 3);
        assert!((tf["the"] - 2.0 / 3.0).abs() < 1e-12);
        assert!((tf["fox"] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn idf_of_two_documents() {
        let docs = vec![count(&["the"]), count(&["the", "fox"])];
        let idf = inverse_document_frequency(&docs);
        assert_eq!(idf.document_frequency("the"), 2);
        assert_eq!(idf.document_frequency("fox"), 1);
        assert_eq!(idf.get("the"), 0.0);
        assert!((idf.get("fox") - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn unseen_word_uses_fallback() {
        let docs = vec![count(&["a"]), count(&["b"])];
        let idf = inverse_document_frequency(&docs);
        assert_eq!(idf.entry("zzz"), None);
        assert!((idf.get("zzz") - 3f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn empty_collection() {
        let idf = inverse_document_frequency(&[]);
        assert_eq!(idf.num_docs(), 0);
        assert_eq!(idf.entry("x"), None);
        assert_eq!(idf.get("x"), 0.0);
    }

    #[test]
    fn combine_multiplies() {
        let docs = vec![count(&["a", "b"]), count(&["a"])];
        let idf = inverse_document_frequency(&docs);
        let f = count(&["a", "b", "b", "c"]);
        let tf = term_frequency(&f, 4);
        let scores = combine(&tf, &idf);
        assert_eq!(scores["a"], 0.0);
        assert!((scores["b"] - 0.5 * 2f64.ln()).abs() < 1e-12);
        assert!((scores["c"] - 0.25 * 3f64.ln()).abs() < 1e-12);
    }
}
