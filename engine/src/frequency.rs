use std::collections::HashMap;

/// Word to occurrence count. The values always sum to the length of the
/// token stream the map was built from.
pub type FrequencyMap = HashMap<String, usize>;

/// Count occurrences of every token in a single pass.
pub fn count<S: AsRef<str>>(tokens: &[S]) -> FrequencyMap {
    let mut counts: FrequencyMap = HashMap::new();
    for token in tokens {
        // avoid allocating a key for words we've already seen
        if let Some(c) = counts.get_mut(token.as_ref()) {
            *c += 1;
        } else {
            counts.insert(token.as_ref().to_owned(), 1);
        }
    }
    counts
}

/// Total number of tokens a frequency map was built from.
pub fn total(freq: &FrequencyMap) -> usize {
    freq.values().sum()
}

/// Add every count of `other` into `into`.
pub fn merge_into(into: &mut FrequencyMap, other: &FrequencyMap) {
    for (word, n) in other {
        *into.entry(word.clone()).or_insert(0) += n;
    }
}
