//! Property tests: history buffers never exceed capacity and keep the newest values.

use proptest::prelude::*;
use pulse_monitor::{HistoryBuffer, HistoryStore};

proptest! {
    #[test]
    fn buffer_keeps_last_capacity_values(
        capacity in 1usize..64,
        values in prop::collection::vec(0.0f64..=1.0, 0..200),
    ) {
        let mut buffer = HistoryBuffer::new(capacity);
        for v in &values {
            buffer.push(*v);
            prop_assert!(buffer.len() <= capacity);
        }

        let expected: Vec<f64> = values
            .iter()
            .skip(values.len().saturating_sub(capacity))
            .copied()
            .collect();
        prop_assert_eq!(buffer.values(), expected);
        prop_assert_eq!(buffer.latest(), values.last().copied());
    }

    #[test]
    fn store_depth_never_exceeds_capacity(
        capacity in 1usize..32,
        pushes in prop::collection::vec((0usize..4, 0.0f64..=1.0), 0..150),
    ) {
        let mut store = HistoryStore::new(capacity);
        for (series, value) in &pushes {
            store.push(&format!("s{}", series), *value);
            prop_assert!(store.depth() <= capacity);
        }
    }

    #[test]
    fn variance_is_non_negative(values in prop::collection::vec(0.0f64..=1.0, 0..60)) {
        let mut buffer = HistoryBuffer::new(60);
        for v in &values {
            buffer.push(*v);
        }
        prop_assert!(buffer.variance() >= 0.0);
        prop_assert!(buffer.trend().is_finite());
    }
}
