//! One codec instance shared by many threads.

use std::sync::Arc;
use std::thread;

use ecpool_erasure::{ErasureCode, WordSize};
use ecpool_integration_tests::{all_chunks, encode_all, reassemble, rs_codec, test_data, without};

#[test]
fn test_concurrent_encode_decode_on_shared_codec() {
    let codec: Arc<dyn ErasureCode> = Arc::new(rs_codec(6, 3, WordSize::W16));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let codec = Arc::clone(&codec);
            thread::spawn(move || {
                for round in 0..10 {
                    let data = test_data(1000 + t * 137 + round * 11);
                    let encoded = encode_all(codec.as_ref(), &data);
                    let erased = [t % 9, (t + round + 1) % 9];
                    let decoded = codec
                        .decode(&all_chunks(9), &without(&encoded, &erased))
                        .unwrap();
                    assert_eq!(reassemble(codec.as_ref(), &decoded, data.len()), data);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }
}

#[test]
fn test_concurrent_results_match_sequential() {
    let codec = Arc::new(rs_codec(4, 2, WordSize::W8));
    let data = Arc::new(test_data(64 * 1024));
    let expected = encode_all(codec.as_ref(), &data);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                assert_eq!(encode_all(codec.as_ref(), &data), expected);
            });
        }
    });
}
