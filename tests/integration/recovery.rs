//! Recovery-set selection and decoding from partial chunk sets.

use std::collections::{BTreeMap, BTreeSet};

use ecpool_erasure::{ErasureCode, ErasureError, WordSize};
use ecpool_integration_tests::{
    WORD_SIZES, all_chunks, combinations, encode_all, reassemble, rs_codec, test_data, without,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

// -----------------------------------------------------------------------
// minimum_to_decode
// -----------------------------------------------------------------------

#[test]
fn test_minimum_returns_exactly_k_when_enough_available() {
    let codec = rs_codec(4, 3, WordSize::W8);
    for size in 4..=7 {
        for available in combinations(7, size) {
            let available: BTreeSet<usize> = available.into_iter().collect();
            let minimum = codec
                .minimum_to_decode(&BTreeSet::from([0]), &available)
                .unwrap();
            assert_eq!(minimum.len(), 4);
            assert!(minimum.is_subset(&available));
            // Lowest indices first.
            assert_eq!(minimum, available.iter().take(4).copied().collect());
        }
    }
}

#[test]
fn test_minimum_fails_below_k() {
    let codec = rs_codec(4, 3, WordSize::W8);
    for size in 0..4 {
        for available in combinations(7, size) {
            let available: BTreeSet<usize> = available.into_iter().collect();
            let result = codec.minimum_to_decode(&all_chunks(4), &available);
            assert!(
                matches!(result, Err(ErasureError::NotEnoughChunks { needed: 4, got }) if got == size),
                "available={available:?}"
            );
        }
    }
}

#[test]
fn test_minimum_set_is_enough_to_decode() {
    let codec = rs_codec(5, 3, WordSize::W16);
    let data = test_data(2500);
    let encoded = encode_all(&codec, &data);

    for available in combinations(8, 6) {
        let available: BTreeSet<usize> = available.into_iter().collect();
        let minimum = codec
            .minimum_to_decode(&all_chunks(5), &available)
            .unwrap();
        let subset: BTreeMap<_, _> = minimum.iter().map(|&i| (i, encoded[&i].clone())).collect();
        let decoded = codec.decode(&all_chunks(5), &subset).unwrap();
        assert_eq!(reassemble(&codec, &decoded, data.len()), data);
    }
}

#[test]
fn test_minimum_with_cost_matches_plain_selection() {
    let codec = rs_codec(3, 2, WordSize::W8);
    let mut rng = StdRng::seed_from_u64(7);
    for available in combinations(5, 4) {
        let costs: BTreeMap<usize, u32> = available
            .iter()
            .map(|&i| (i, rng.random_range(0..1000)))
            .collect();
        let plain: BTreeSet<usize> = available.iter().copied().collect();
        let want = BTreeSet::from([1]);
        assert_eq!(
            codec.minimum_to_decode_with_cost(&want, &costs).unwrap(),
            codec.minimum_to_decode(&want, &plain).unwrap()
        );
    }
}

#[test]
fn test_minimum_with_cost_not_enough() {
    let codec = rs_codec(7, 3, WordSize::W8);
    let costs = BTreeMap::from([(0, 1), (5, 1), (9, 1)]);
    assert!(matches!(
        codec.minimum_to_decode_with_cost(&all_chunks(7), &costs),
        Err(ErasureError::NotEnoughChunks { needed: 7, got: 3 })
    ));
}

// -----------------------------------------------------------------------
// decode availability
// -----------------------------------------------------------------------

#[test]
fn test_decode_with_three_of_seven_fails() {
    let codec = rs_codec(7, 3, WordSize::W8);
    let encoded = encode_all(&codec, &test_data(700));
    let available = without(&encoded, &[0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(available.len(), 3);

    assert!(matches!(
        codec.decode(&all_chunks(10), &available),
        Err(ErasureError::NotEnoughChunks { needed: 7, got: 3 })
    ));
    let indices: BTreeSet<usize> = available.keys().copied().collect();
    assert!(matches!(
        codec.minimum_to_decode(&all_chunks(10), &indices),
        Err(ErasureError::NotEnoughChunks { needed: 7, got: 3 })
    ));
}

#[test]
fn test_decode_with_extra_chunks_beyond_k() {
    let codec = rs_codec(4, 4, WordSize::W32);
    let data = test_data(3000);
    let encoded = encode_all(&codec, &data);
    // 6 of 8 available: more than k, fewer than k + m.
    let decoded = codec
        .decode(&all_chunks(8), &without(&encoded, &[2, 7]))
        .unwrap();
    assert_eq!(decoded, encoded);
}

#[test]
fn test_decode_only_coding_chunks() {
    // With m >= k the coding chunks alone rebuild the data.
    for &w in &WORD_SIZES {
        let codec = rs_codec(3, 3, w);
        let data = test_data(900);
        let encoded = encode_all(&codec, &data);
        let decoded = codec
            .decode(&all_chunks(6), &without(&encoded, &[0, 1, 2]))
            .unwrap();
        assert_eq!(decoded, encoded, "w={w}");
    }
}

// -----------------------------------------------------------------------
// Randomized erasure patterns
// -----------------------------------------------------------------------

#[test]
fn test_random_erasures() {
    let mut rng = StdRng::seed_from_u64(0x5EED);

    for _ in 0..60 {
        let w = WORD_SIZES[rng.random_range(0..WORD_SIZES.len())];
        let k = rng.random_range(1..=10);
        let m = rng.random_range(1..=4);
        let size = rng.random_range(1..=20_000);

        let codec = rs_codec(k, m, w);
        let mut data = vec![0u8; size];
        rng.fill(&mut data[..]);
        let encoded = encode_all(&codec, &data);

        let mut indices: Vec<usize> = (0..k + m).collect();
        indices.shuffle(&mut rng);
        let lost = rng.random_range(0..=m);
        let erased = &indices[..lost];

        let want = all_chunks(k + m);
        let decoded = codec.decode(&want, &without(&encoded, erased)).unwrap();
        assert_eq!(
            decoded, encoded,
            "w={w} k={k} m={m} size={size} erased={erased:?}"
        );
    }
}

#[test]
fn test_decode_only_returns_requested_coding_chunks() {
    let codec = rs_codec(4, 3, WordSize::W8);
    let encoded = encode_all(&codec, &test_data(1024));
    let available = without(&encoded, &[1, 5, 6]);

    let decoded = codec
        .decode(&BTreeSet::from([1, 6]), &available)
        .unwrap();
    let keys: Vec<usize> = decoded.keys().copied().collect();
    assert_eq!(keys, vec![0, 1, 2, 3, 4, 6]);
    assert_eq!(decoded[&1], encoded[&1]);
    assert_eq!(decoded[&6], encoded[&6]);
}
