//! Self-describing compressed form: canonical code lengths plus the encoded
//! bits packed MSB-first into bytes.
//!
//! Only the code length of each symbol is stored. Codes are reassigned in
//! (length, symbol) order on both sides, so no tree has to be transmitted.

use super::{build_frequency_table, build_tree};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const MAX_CODE_LEN: u8 = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedHuffman {
    pub original_len: u64,
    /// `(symbol, code length)` sorted by symbol.
    pub code_lengths: Vec<(u8, u8)>,
    pub bit_len: u64,
    pub payload: Vec<u8>,
}

impl PackedHuffman {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let packed: PackedHuffman = bincode::deserialize(bytes)?;
        packed.check_payload()?;
        Ok(packed)
    }

    fn check_payload(&self) -> Result<()> {
        let needed = self.bit_len.div_ceil(8);
        if (self.payload.len() as u64) < needed {
            return Err(Error::InvalidArtifact(format!(
                "payload holds {} bytes, {} bits need {needed}",
                self.payload.len(),
                self.bit_len
            )));
        }
        Ok(())
    }
}

/// Compress `bytes` into a [`PackedHuffman`].
pub fn compress(bytes: &[u8]) -> Result<PackedHuffman> {
    let tree = build_tree(&build_frequency_table(bytes))?;
    let mut code_lengths = Vec::new();
    for (symbol, len) in tree.code_lengths() {
        let len = u8::try_from(len)
            .ok()
            .filter(|l| *l <= MAX_CODE_LEN)
            .ok_or_else(|| Error::InvalidArtifact(format!("code length {len} exceeds {MAX_CODE_LEN} bits")))?;
        code_lengths.push((symbol, len));
    }
    let codes = canonical_codes(&code_lengths)?;
    let mut table = [(0u8, 0u64); 256];
    for &(symbol, len, code) in &codes {
        table[symbol as usize] = (len, code);
    }

    let mut writer = BitWriter::default();
    for &b in bytes {
        let (len, code) = table[b as usize];
        writer.push_code(code, len);
    }
    tracing::debug!(input_bytes = bytes.len(), bit_len = writer.bit_len, "packed huffman payload");
    Ok(PackedHuffman {
        original_len: bytes.len() as u64,
        code_lengths,
        bit_len: writer.bit_len,
        payload: writer.bytes,
    })
}

/// Restore the original bytes of a [`PackedHuffman`].
pub fn decompress(packed: &PackedHuffman) -> Result<Vec<u8>> {
    packed.check_payload()?;
    let decoder = CanonicalDecoder::new(&canonical_codes(&packed.code_lengths)?);
    // every symbol costs at least one bit, so bit_len bounds the output
    let mut out = Vec::with_capacity(packed.original_len.min(packed.bit_len) as usize);
    let mut code = 0u64;
    let mut len = 0u8;
    for position in 0..packed.bit_len {
        let byte = packed.payload[(position / 8) as usize];
        let bit = (byte >> (7 - position % 8)) & 1;
        code = (code << 1) | bit as u64;
        len += 1;
        if let Some(symbol) = decoder.lookup(code, len) {
            out.push(symbol);
            code = 0;
            len = 0;
        } else if len >= decoder.max_len {
            return Err(Error::InvalidEncoding { position: position as usize, reason: "no code matches" });
        }
    }
    if len != 0 {
        return Err(Error::InvalidEncoding { position: packed.bit_len as usize, reason: "input ends inside a code" });
    }
    if out.len() as u64 != packed.original_len {
        return Err(Error::InvalidArtifact(format!(
            "decoded {} bytes, header says {}",
            out.len(),
            packed.original_len
        )));
    }
    Ok(out)
}

#[derive(Default)]
struct BitWriter {
    bytes: Vec<u8>,
    bit_len: u64,
}

impl BitWriter {
    fn push(&mut self, bit: bool) {
        let offset = (self.bit_len % 8) as u8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.bit_len += 1;
    }

    fn push_code(&mut self, code: u64, len: u8) {
        for i in (0..len).rev() {
            self.push((code >> i) & 1 == 1);
        }
    }
}

/// Assign canonical codes. Returns `(symbol, length, code)` in
/// (length, symbol) order.
fn canonical_codes(lengths: &[(u8, u8)]) -> Result<Vec<(u8, u8, u64)>> {
    if lengths.is_empty() {
        return Err(Error::InvalidArtifact("empty code length table".into()));
    }
    // Kraft sum scaled by 2^64 so every term is an integer
    let mut kraft: u128 = 0;
    for (i, &(symbol, len)) in lengths.iter().enumerate() {
        if len == 0 || len > MAX_CODE_LEN {
            return Err(Error::InvalidArtifact(format!("symbol {symbol} has code length {len}")));
        }
        if i > 0 && lengths[i - 1].0 >= symbol {
            return Err(Error::InvalidArtifact("symbols must be unique and sorted".into()));
        }
        kraft += 1u128 << (MAX_CODE_LEN - len);
    }
    if kraft > 1u128 << MAX_CODE_LEN {
        return Err(Error::InvalidArtifact("code lengths do not form a prefix code".into()));
    }

    let mut order: Vec<(u8, u8)> = lengths.to_vec();
    order.sort_by_key(|&(symbol, len)| (len, symbol));
    let mut out = Vec::with_capacity(order.len());
    let mut code = 0u64;
    let mut prev_len = order[0].1;
    for (symbol, len) in order {
        code <<= len - prev_len;
        out.push((symbol, len, code));
        code = code.wrapping_add(1);
        prev_len = len;
    }
    Ok(out)
}

struct CanonicalDecoder {
    /// Indexed by code length.
    first_code: [u64; MAX_CODE_LEN as usize + 1],
    count: [u64; MAX_CODE_LEN as usize + 1],
    offset: [usize; MAX_CODE_LEN as usize + 1],
    symbols: Vec<u8>,
    max_len: u8,
}

impl CanonicalDecoder {
    fn new(codes: &[(u8, u8, u64)]) -> Self {
        let mut d = CanonicalDecoder {
            first_code: [0; MAX_CODE_LEN as usize + 1],
            count: [0; MAX_CODE_LEN as usize + 1],
            offset: [0; MAX_CODE_LEN as usize + 1],
            symbols: Vec::with_capacity(codes.len()),
            max_len: 0,
        };
        for (i, &(symbol, len, code)) in codes.iter().enumerate() {
            let l = len as usize;
            if d.count[l] == 0 {
                d.first_code[l] = code;
                d.offset[l] = i;
            }
            d.count[l] += 1;
            d.symbols.push(symbol);
            d.max_len = d.max_len.max(len);
        }
        d
    }

    fn lookup(&self, code: u64, len: u8) -> Option<u8> {
        let l = len as usize;
        if l >= self.count.len() || self.count[l] == 0 || code < self.first_code[l] {
            return None;
        }
        let index = code - self.first_code[l];
        (index < self.count[l]).then(|| self.symbols[self.offset[l] + index as usize])
    }
}
