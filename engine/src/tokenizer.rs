use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Everything outside the Latin and Cyrillic lowercase alphabets is a separator.
    static ref SEPARATORS: Regex = Regex::new(r"[^a-zа-я]+").expect("valid regex");
}

/// Tokenize raw document bytes into lowercase Latin/Cyrillic words.
///
/// Invalid UTF-8 sequences and any other characters act as separators, so
/// arbitrary binary input is accepted and may yield no tokens at all.
pub fn tokenize(bytes: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes).to_lowercase();
    SEPARATORS
        .replace_all(&text, " ")
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Same as [`tokenize`] for text that is already a `str`.
pub fn tokenize_str(text: &str) -> Vec<String> {
    tokenize(text.as_bytes())
}
