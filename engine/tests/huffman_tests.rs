use engine::huffman::packed::{compress, decompress, PackedHuffman};
use engine::huffman::{build_frequency_table, build_tree, decode, encode, generate_codes, verify_round_trip};
use engine::Error;
use proptest::prelude::*;

#[test]
fn single_symbol_scenario() {
    let (bits, tree) = encode(&[65, 65, 65]).unwrap();
    assert!(!bits.is_empty());
    assert_eq!(decode(&bits, &tree).unwrap(), vec![65, 65, 65]);
}

#[test]
fn repeated_builds_are_identical() {
    let text = b"she sells sea shells by the sea shore";
    let t1 = build_tree(&build_frequency_table(text)).unwrap();
    let t2 = build_tree(&build_frequency_table(text)).unwrap();
    assert_eq!(t1, t2);
    assert_eq!(generate_codes(&t1), generate_codes(&t2));
}

#[test]
fn empty_input_fails() {
    assert!(matches!(verify_round_trip(b""), Err(Error::EmptyInput)));
    assert!(matches!(compress(b""), Err(Error::EmptyInput)));
}

#[test]
fn all_byte_values() {
    let input: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let report = verify_round_trip(&input).unwrap();
    // uniform distribution over 256 symbols gives 8-bit codes
    assert_eq!(report.encoded_bits, report.original_bits);
    assert_eq!(decompress(&compress(&input).unwrap()).unwrap(), input);
}

#[test]
fn garbage_artifact_is_rejected() {
    assert!(PackedHuffman::from_bytes(&[1, 2, 3]).is_err());
}

proptest! {
    #[test]
    fn encode_decode_round_trip(input in proptest::collection::vec(any::<u8>(), 1..512)) {
        let (bits, tree) = encode(&input).unwrap();
        prop_assert_eq!(decode(&bits, &tree).unwrap(), input);
    }

    #[test]
    fn packed_round_trip(input in proptest::collection::vec(any::<u8>(), 1..512)) {
        let packed = compress(&input).unwrap();
        let restored = PackedHuffman::from_bytes(&packed.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(decompress(&restored).unwrap(), input);
    }

    #[test]
    fn packed_matches_tree_length(input in proptest::collection::vec(0u8..8, 1..256)) {
        let (bits, _) = encode(&input).unwrap();
        prop_assert_eq!(compress(&input).unwrap().bit_len, bits.len() as u64);
    }
}
