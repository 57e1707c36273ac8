//! Huffman coding over bytes.
//!
//! The tree lives in an arena (`Vec<Node>`) and children are referenced by
//! index. Equal weights are ordered by arena index: leaves are created in
//! ascending byte order and merged nodes get increasing indices, so the same
//! input always builds the same tree.
//!
//! Encoded output here is a string of `'0'`/`'1'` characters and the tree is
//! the decoding key. See [`packed`] for a compact, self-describing form.

pub mod packed;

use crate::error::{Error, Result};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

type NodeId = usize;

/// Byte to number of occurrences.
pub type FrequencyTable = BTreeMap<u8, u64>;

/// Byte to its code as a `'0'`/`'1'` string.
pub type CodeTable = BTreeMap<u8, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Leaf { symbol: u8, weight: u64 },
    /// `right` is only absent for the root of a single-symbol tree.
    Internal { weight: u64, left: NodeId, right: Option<NodeId> },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }
}

/// An immutable Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl HuffmanTree {
    /// Total weight, i.e. the length of the input the tree was built from.
    pub fn weight(&self) -> u64 { self.nodes[self.root].weight() }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        match self.nodes[id] {
            Node::Internal { left, right, .. } => if bit { right } else { Some(left) },
            Node::Leaf { .. } => None,
        }
    }

    /// Depth of every leaf, which is the bit length of its code.
    pub fn code_lengths(&self) -> BTreeMap<u8, u32> {
        let mut out = BTreeMap::new();
        let mut stack = vec![(self.root, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            match self.nodes[id] {
                Node::Leaf { symbol, .. } => { out.insert(symbol, depth); }
                Node::Internal { left, right, .. } => {
                    stack.push((left, depth + 1));
                    if let Some(r) = right { stack.push((r, depth + 1)); }
                }
            }
        }
        out
    }
}

pub fn build_frequency_table(bytes: &[u8]) -> FrequencyTable {
    let mut counts = [0u64; 256];
    for &b in bytes {
        counts[b as usize] += 1;
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, &c)| c > 0)
        .map(|(b, &c)| (b as u8, c))
        .collect()
}

/// Greedy merge of the two lightest nodes until one remains.
pub fn build_tree(freq: &FrequencyTable) -> Result<HuffmanTree> {
    let mut nodes: Vec<Node> = Vec::with_capacity(freq.len() * 2);
    for (&symbol, &weight) in freq {
        if weight > 0 {
            nodes.push(Node::Leaf { symbol, weight });
        }
    }
    if nodes.is_empty() {
        return Err(Error::EmptyInput);
    }
    if nodes.len() == 1 {
        // a lone leaf would get the empty code; hang it off a root as "0"
        let weight = nodes[0].weight();
        nodes.push(Node::Internal { weight, left: 0, right: None });
        return Ok(HuffmanTree { nodes, root: 1 });
    }

    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> =
        nodes.iter().enumerate().map(|(id, n)| Reverse((n.weight(), id))).collect();
    while heap.len() > 1 {
        let (Some(Reverse((w1, left))), Some(Reverse((w2, right)))) = (heap.pop(), heap.pop()) else {
            break;
        };
        let id = nodes.len();
        let weight = w1 + w2;
        nodes.push(Node::Internal { weight, left, right: Some(right) });
        heap.push(Reverse((weight, id)));
    }
    let root = nodes.len() - 1;
    tracing::debug!(symbols = freq.len(), nodes = nodes.len(), "built huffman tree");
    Ok(HuffmanTree { nodes, root })
}

/// Walk the tree: left edges append `'0'`, right edges `'1'`.
pub fn generate_codes(tree: &HuffmanTree) -> CodeTable {
    let mut codes = CodeTable::new();
    let mut stack = vec![(tree.root, String::new())];
    while let Some((id, prefix)) = stack.pop() {
        match tree.nodes[id] {
            Node::Leaf { symbol, .. } => { codes.insert(symbol, prefix); }
            Node::Internal { left, right, .. } => {
                if let Some(r) = right {
                    stack.push((r, format!("{prefix}1")));
                }
                stack.push((left, prefix + "0"));
            }
        }
    }
    codes
}

/// Encode `bytes`, returning the bit string and the tree needed to decode it.
pub fn encode(bytes: &[u8]) -> Result<(String, HuffmanTree)> {
    let freq = build_frequency_table(bytes);
    let tree = build_tree(&freq)?;
    let codes = generate_codes(&tree);
    let total_bits: usize = freq.iter().map(|(b, &n)| codes[b].len() * n as usize).sum();
    let mut bits = String::with_capacity(total_bits);
    for b in bytes {
        bits.push_str(&codes[b]);
    }
    tracing::debug!(input_bytes = bytes.len(), encoded_bits = bits.len(), "huffman encoded");
    Ok((bits, tree))
}

/// Decode a bit string produced by [`encode`] with the same tree.
pub fn decode(bits: &str, tree: &HuffmanTree) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut node = tree.root;
    for (position, c) in bits.bytes().enumerate() {
        let bit = match c {
            b'0' => false,
            b'1' => true,
            _ => return Err(Error::InvalidEncoding { position, reason: "expected '0' or '1'" }),
        };
        node = tree
            .child(node, bit)
            .ok_or(Error::InvalidEncoding { position, reason: "no branch for bit" })?;
        if let Node::Leaf { symbol, .. } = tree.nodes[node] {
            out.push(symbol);
            node = tree.root;
        }
    }
    if node != tree.root {
        return Err(Error::InvalidEncoding { position: bits.len(), reason: "input ends inside a code" });
    }
    Ok(out)
}

/// Outcome of encoding a buffer and decoding it back.
#[derive(Debug, Clone, Serialize)]
pub struct HuffmanReport {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encoded: String,
    #[serde(skip)]
    pub decoded: Vec<u8>,
    pub original_bits: u64,
    pub encoded_bits: u64,
    pub distinct_symbols: usize,
    /// Encoded size over original size.
    pub compression_ratio: f64,
}

/// Encode, decode, and check the result matches `bytes` exactly.
pub fn verify_round_trip(bytes: &[u8]) -> Result<HuffmanReport> {
    let (encoded, tree) = encode(bytes)?;
    let decoded = decode(&encoded, &tree)?;
    if decoded != bytes {
        return Err(Error::RoundTripMismatch { original_len: bytes.len(), decoded_len: decoded.len() });
    }
    let original_bits = tree.weight() * 8;
    let encoded_bits = encoded.len() as u64;
    Ok(HuffmanReport {
        encoded,
        decoded,
        original_bits,
        encoded_bits,
        distinct_symbols: tree.leaf_count(),
        compression_ratio: crate::config::round3(encoded_bits as f64 / original_bits as f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_is_an_error() {
        assert!(matches!(build_tree(&FrequencyTable::new()), Err(Error::EmptyInput)));
        assert!(matches!(encode(b""), Err(Error::EmptyInput)));
    }

    #[test]
    fn single_symbol_gets_a_code() {
        let (bits, tree) = encode(&[65, 65, 65]).unwrap();
        assert_eq!(bits, "000");
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(generate_codes(&tree)[&65], "0");
        assert_eq!(decode(&bits, &tree).unwrap(), vec![65, 65, 65]);
    }

    #[test]
    fn single_symbol_rejects_right_branch() {
        let (_, tree) = encode(b"zz").unwrap();
        assert!(matches!(decode("01", &tree), Err(Error::InvalidEncoding { position: 1, .. })));
    }

    #[test]
    fn frequent_symbols_get_shorter_codes() {
        let tree = build_tree(&build_frequency_table(b"aaaaaaabbbc")).unwrap();
        let codes = generate_codes(&tree);
        assert_eq!(codes[&b'a'].len(), 1);
        assert_eq!(codes[&b'b'].len(), 2);
        assert_eq!(codes[&b'c'].len(), 2);
        assert_eq!(tree.weight(), 11);
    }

    #[test]
    fn ties_break_by_arena_order() {
        // equal weights: the lower byte is popped first and becomes the left child
        let tree = build_tree(&build_frequency_table(b"ab")).unwrap();
        let codes = generate_codes(&tree);
        assert_eq!(codes[&b'a'], "0");
        assert_eq!(codes[&b'b'], "1");
    }

    #[test]
    fn codes_are_prefix_free() {
        let tree = build_tree(&build_frequency_table(b"the quick brown fox jumps over the lazy dog")).unwrap();
        let table = generate_codes(&tree);
        let codes: Vec<&String> = table.values().collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a.as_str()));
                }
            }
        }
    }

    #[test]
    fn truncated_input_is_rejected() {
        let (bits, tree) = encode(b"abcabcabd").unwrap();
        let cut = &bits[..bits.len() - 1];
        assert!(matches!(decode(cut, &tree), Err(Error::InvalidEncoding { .. })));
        assert!(matches!(decode("0x", &tree), Err(Error::InvalidEncoding { position: 1, .. })));
    }

    #[test]
    fn report_round_trips() {
        let r = verify_round_trip(b"mississippi").unwrap();
        assert_eq!(r.decoded, b"mississippi");
        assert_eq!(r.distinct_symbols, 4);
        assert_eq!(r.original_bits, 88);
        assert_eq!(r.encoded_bits, r.encoded.len() as u64);
        assert!(r.compression_ratio < 1.0);
    }
}
