//! Encode → erase → decode round trips across code parameters.

use std::collections::HashMap;

use ecpool_erasure::{
    ErasureCode, ErasureCodeJerasure, K_KEY, M_KEY, ReedSolomonVandermonde, W_KEY, WordSize,
};
use ecpool_integration_tests::{
    WORD_SIZES, all_chunks, combinations, encode_all, reassemble, rs_codec, test_data, without,
};

// -----------------------------------------------------------------------
// Every erasure pattern
// -----------------------------------------------------------------------

#[test]
fn test_every_m_erasures_recover_input() {
    let configs: &[(usize, usize)] = &[(1, 1), (2, 1), (2, 2), (3, 2), (4, 2), (5, 3), (7, 3)];
    for &w in &WORD_SIZES {
        for &(k, m) in configs {
            let codec = rs_codec(k, m, w);
            let data = test_data(1000);
            let encoded = encode_all(&codec, &data);

            for erased in combinations(k + m, m) {
                let available = without(&encoded, &erased);
                let decoded = codec.decode(&all_chunks(k + m), &available).unwrap();
                assert_eq!(
                    decoded, encoded,
                    "w={w} k={k} m={m} erased={erased:?}"
                );
                assert_eq!(reassemble(&codec, &decoded, data.len()), data);
            }
        }
    }
}

#[test]
fn test_fewer_than_m_erasures_recover_input() {
    let codec = rs_codec(6, 3, WordSize::W16);
    let data = test_data(4321);
    let encoded = encode_all(&codec, &data);

    for count in 1..3 {
        for erased in combinations(9, count) {
            let decoded = codec
                .decode(&all_chunks(9), &without(&encoded, &erased))
                .unwrap();
            assert_eq!(decoded, encoded, "erased={erased:?}");
        }
    }
}

#[test]
fn test_input_sizes_around_alignment() {
    // k=3, w=8 pads to multiples of 96 bytes.
    let codec = rs_codec(3, 2, WordSize::W8);
    for size in [1, 2, 95, 96, 97, 191, 192, 193, 10_000] {
        let data = test_data(size);
        let encoded = encode_all(&codec, &data);
        let blocksize = codec.chunk_size(size);
        assert!(encoded.values().all(|c| c.len() == blocksize), "size={size}");
        assert_eq!((blocksize * 3) % 96, 0);

        let decoded = codec
            .decode(&all_chunks(5), &without(&encoded, &[0, 2]))
            .unwrap();
        assert_eq!(reassemble(&codec, &decoded, size), data, "size={size}");
    }
}

#[test]
fn test_large_buffer() {
    let codec = rs_codec(8, 4, WordSize::W8);
    let data = test_data(1024 * 1024);
    let encoded = encode_all(&codec, &data);
    let decoded = codec
        .decode(&all_chunks(12), &without(&encoded, &[0, 3, 7, 11]))
        .unwrap();
    assert_eq!(reassemble(&codec, &decoded, data.len()), data);
}

// -----------------------------------------------------------------------
// Systematic layout and determinism
// -----------------------------------------------------------------------

#[test]
fn test_data_chunks_are_padded_input_slices() {
    for &w in &WORD_SIZES {
        let codec = rs_codec(5, 2, w);
        let data = test_data(777);
        let encoded = encode_all(&codec, &data);

        let blocksize = codec.chunk_size(data.len());
        let mut padded = data.clone();
        padded.resize(blocksize * 5, 0);
        for i in 0..5 {
            assert_eq!(
                &encoded[&i][..],
                &padded[i * blocksize..(i + 1) * blocksize],
                "w={w} chunk={i}"
            );
        }
    }
}

#[test]
fn test_encode_is_deterministic() {
    for &w in &WORD_SIZES {
        let codec = rs_codec(4, 3, w);
        let data = test_data(5000);
        assert_eq!(encode_all(&codec, &data), encode_all(&codec, &data), "w={w}");

        // A second codec with the same parameters agrees too.
        let other = rs_codec(4, 3, w);
        assert_eq!(encode_all(&codec, &data), encode_all(&other, &data), "w={w}");
    }
}

#[test]
fn test_word_sizes_produce_different_parity() {
    let data = test_data(2048);
    let c8 = encode_all(&rs_codec(4, 2, WordSize::W8), &data);
    let c16 = encode_all(&rs_codec(4, 2, WordSize::W16), &data);
    // Same block size for this input (2048 is a multiple of 4 * 16 * 4).
    assert_eq!(c8[&5].len(), c16[&5].len());
    assert_ne!(c8[&5], c16[&5]);
}

// -----------------------------------------------------------------------
// Concrete scenarios
// -----------------------------------------------------------------------

#[test]
fn test_k4_m2_all_ones_input() {
    let codec = rs_codec(4, 2, WordSize::W8);
    let data = vec![0x01u8; 16];
    let encoded = encode_all(&codec, &data);

    // 16 bytes pad to 128 (k * w * 4), so each chunk holds 32 bytes.
    assert_eq!(encoded.len(), 6);
    assert!(encoded.values().all(|c| c.len() == 32));
    assert_eq!(&encoded[&0][..16], &[0x01; 16]);
    assert!(encoded[&0][16..].iter().all(|&b| b == 0));
    for i in 1..4 {
        assert!(encoded[&i].iter().all(|&b| b == 0), "chunk {i}");
    }
    // Only chunk 0 carries data and column 0 of the coding rows is all ones,
    // so both coding chunks equal chunk 0.
    assert_eq!(encoded[&4], encoded[&0]);
    assert_eq!(encoded[&5], encoded[&0]);

    for erased in combinations(6, 2) {
        let decoded = codec
            .decode(&all_chunks(6), &without(&encoded, &erased))
            .unwrap();
        assert_eq!(reassemble(&codec, &decoded, 16), data, "erased={erased:?}");
    }
}

#[test]
fn test_defaults_with_invalid_w_string() {
    let parameters = HashMap::from([(W_KEY.to_string(), "not-a-number".to_string())]);
    let codec = ErasureCodeJerasure::<ReedSolomonVandermonde>::init(&parameters).unwrap();
    assert_eq!(codec.technique().word_size(), WordSize::W8);
    assert_eq!(codec.data_chunk_count(), 7);
    assert_eq!(codec.chunk_count(), 10);

    let data = test_data(3000);
    let encoded = encode_all(&codec, &data);
    let decoded = codec
        .decode(&all_chunks(10), &without(&encoded, &[1, 5, 8]))
        .unwrap();
    assert_eq!(reassemble(&codec, &decoded, data.len()), data);
}

#[test]
fn test_init_from_parameters() {
    let parameters = HashMap::from([
        (K_KEY.to_string(), "5".to_string()),
        (M_KEY.to_string(), "2".to_string()),
        (W_KEY.to_string(), "32".to_string()),
    ]);
    let codec = ecpool_erasure::from_parameters(&parameters).unwrap();
    assert_eq!(codec.chunk_count(), 7);
    // k * w * 4 = 640-byte alignment.
    assert_eq!(codec.chunk_size(1), 128);

    let data = test_data(1500);
    let encoded = encode_all(codec.as_ref(), &data);
    let decoded = codec
        .decode(&all_chunks(7), &without(&encoded, &[4, 6]))
        .unwrap();
    assert_eq!(reassemble(codec.as_ref(), &decoded, data.len()), data);
}
