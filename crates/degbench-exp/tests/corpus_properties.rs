use std::collections::BTreeSet;
use std::fs;

use degbench_core::{Alphabet, DegError, RngHandle};
use degbench_exp::{
    generate_base_sequence, inject_degenerate_symbols, sample_positions, write_input_file,
};
use proptest::prelude::*;

#[derive(Debug, PartialEq)]
enum Symbol {
    Plain(u8),
    Degenerate(Vec<u8>),
}

fn decode(text: &str) -> Vec<Symbol> {
    let mut out = Vec::new();
    let mut bytes = text.bytes();
    while let Some(byte) = bytes.next() {
        if byte == b'{' {
            let set: Vec<u8> = bytes.by_ref().take_while(|&b| b != b'}').collect();
            out.push(Symbol::Degenerate(set));
        } else {
            out.push(Symbol::Plain(byte));
        }
    }
    out
}

fn dna() -> Alphabet {
    Alphabet::new("ACGT").expect("alphabet")
}

proptest! {
    #[test]
    fn injected_records_respect_invariants(
        seed in any::<u64>(),
        length in 1usize..200,
        fraction in 0.0f64..=1.0,
    ) {
        let alphabet = dna();
        let mut rng = RngHandle::from_seed(seed);
        let base = generate_base_sequence(&alphabet, length, &mut rng).unwrap();
        prop_assert_eq!(base.len(), length);
        prop_assert!(base.iter().all(|b| alphabet.symbols().contains(b)));

        let count = ((length as f64) * fraction).floor() as usize;
        let record = inject_degenerate_symbols(&base, count, &alphabet, &mut rng).unwrap();
        prop_assert_eq!(record.length, length);
        prop_assert_eq!(record.degeneracy, count);
        prop_assert_eq!(record.tokens.len(), count);

        let positions: Vec<usize> = record.tokens.iter().map(|t| t.position).collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        for token in &record.tokens {
            prop_assert!(token.position < length);
            prop_assert!(token.symbols.len() >= 2 && token.symbols.len() <= alphabet.len());
            let distinct: BTreeSet<u8> = token.symbols.iter().copied().collect();
            prop_assert_eq!(distinct.len(), token.symbols.len());
            prop_assert!(token.symbols.iter().all(|b| alphabet.symbols().contains(b)));
        }

        let decoded = decode(&record.text);
        prop_assert_eq!(decoded.len(), length);
        let mut tokens = record.tokens.iter();
        for (idx, symbol) in decoded.iter().enumerate() {
            match symbol {
                Symbol::Plain(byte) => prop_assert_eq!(*byte, base[idx]),
                Symbol::Degenerate(set) => {
                    let token = tokens.next().unwrap();
                    prop_assert_eq!(token.position, idx);
                    prop_assert_eq!(set, &token.symbols);
                }
            }
        }
        prop_assert!(tokens.next().is_none());
    }
}

#[test]
fn header_encodes_length_and_degeneracy() {
    let alphabet = dna();
    let mut rng = RngHandle::from_seed(1);
    let base = generate_base_sequence(&alphabet, 1000, &mut rng).expect("base");
    let record = inject_degenerate_symbols(&base, 5, &alphabet, &mut rng).expect("inject");
    assert_eq!(record.header(), ">seq 1000_5");
    assert_eq!(record.text.matches('{').count(), 5);
    assert_eq!(record.text.matches('}').count(), 5);
}

#[test]
fn zero_degeneracy_keeps_sequence_unmodified() {
    let alphabet = dna();
    let mut rng = RngHandle::from_seed(2);
    let base = generate_base_sequence(&alphabet, 64, &mut rng).expect("base");
    let record = inject_degenerate_symbols(&base, 0, &alphabet, &mut rng).expect("inject");
    assert_eq!(record.text.as_bytes(), base.as_slice());
    assert!(record.tokens.is_empty());
    assert_eq!(record.header(), ">seq 64_0");
}

#[test]
fn full_degeneracy_replaces_every_position() {
    let alphabet = dna();
    let mut rng = RngHandle::from_seed(3);
    let record = inject_degenerate_symbols(b"ACGTACGT", 8, &alphabet, &mut rng).expect("inject");
    let decoded = decode(&record.text);
    assert!(decoded.iter().all(|s| matches!(s, Symbol::Degenerate(_))));
}

#[test]
fn degeneracy_beyond_length_is_fatal() {
    let alphabet = dna();
    let mut rng = RngHandle::from_seed(4);
    let err = inject_degenerate_symbols(b"ACG", 4, &alphabet, &mut rng).unwrap_err();
    assert!(matches!(err, DegError::Generate(_)));
    assert_eq!(err.code(), "degeneracy-exceeds-length");
    assert_eq!(err.info().context.get("length").map(String::as_str), Some("3"));

    assert!(sample_positions(3, 4, &mut rng).is_err());
}

#[test]
fn single_symbol_alphabet_cannot_form_degenerate_symbols() {
    let alphabet = Alphabet::new("A").expect("alphabet");
    let mut rng = RngHandle::from_seed(5);
    let err = inject_degenerate_symbols(b"AAAA", 1, &alphabet, &mut rng).unwrap_err();
    assert_eq!(err.code(), "alphabet-too-small");
}

#[test]
fn empty_alphabet_cannot_yield_a_base_sequence() {
    // Deserializing skips `Alphabet::new` validation.
    let alphabet: Alphabet = serde_json::from_str("\"\"").expect("alphabet");
    let mut rng = RngHandle::from_seed(8);
    let err = generate_base_sequence(&alphabet, 10, &mut rng).unwrap_err();
    assert!(matches!(err, DegError::Generate(_)));
    assert_eq!(err.code(), "alphabet-empty");
    assert_eq!(err.info().context.get("length").map(String::as_str), Some("10"));

    assert!(generate_base_sequence(&alphabet, 0, &mut rng)
        .expect("empty")
        .is_empty());
}

#[test]
fn same_seed_yields_same_record() {
    let alphabet = dna();
    let mut rng_a = RngHandle::from_seed(99);
    let mut rng_b = RngHandle::from_seed(99);
    let base_a = generate_base_sequence(&alphabet, 500, &mut rng_a).expect("base");
    let base_b = generate_base_sequence(&alphabet, 500, &mut rng_b).expect("base");
    assert_eq!(base_a, base_b);
    let rec_a = inject_degenerate_symbols(&base_a, 20, &alphabet, &mut rng_a).expect("a");
    let rec_b = inject_degenerate_symbols(&base_b, 20, &alphabet, &mut rng_b).expect("b");
    assert_eq!(rec_a, rec_b);
}

#[test]
fn acgt_with_positions_one_and_three() {
    let alphabet = dna();
    let record = (0..10_000u64)
        .map(|seed| {
            let mut rng = RngHandle::from_seed(seed);
            inject_degenerate_symbols(b"ACGT", 2, &alphabet, &mut rng).expect("inject")
        })
        .find(|record| {
            record.tokens.iter().map(|t| t.position).collect::<Vec<_>>() == vec![1, 3]
        })
        .expect("some seed selects positions 1 and 3");

    let decoded = decode(&record.text);
    assert_eq!(decoded.len(), 4);
    assert_eq!(decoded[0], Symbol::Plain(b'A'));
    assert_eq!(decoded[2], Symbol::Plain(b'G'));
    for idx in [1, 3] {
        let Symbol::Degenerate(set) = &decoded[idx] else {
            panic!("position {idx} should be degenerate");
        };
        assert!((2..=4).contains(&set.len()));
    }
    assert!(record.text.starts_with("A{"));
}

#[test]
fn input_file_holds_one_block_per_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data").join("input0.txt");
    let alphabet = dna();
    let mut rng = RngHandle::from_seed(6);
    let base = generate_base_sequence(&alphabet, 1000, &mut rng).expect("base");
    let record = inject_degenerate_symbols(&base, 5, &alphabet, &mut rng).expect("inject");

    let written = write_input_file(&path, std::slice::from_ref(&record)).expect("write");
    assert_eq!(written, 1);

    let text = fs::read_to_string(&path).expect("read");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], ">seq 1000_5");
    assert_eq!(lines[1], record.text);
    assert_eq!(lines[2], "");
    assert_eq!(text.matches(">seq").count(), 1);
}
