// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use cpdetect_dist::{LogGammaTable, LogNormal, Normal};
use cpdetect_offline::BayesFactorScorer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);

    let table_len = common::bounded(cursor.next_u8(), 0, 128);
    let threshold = f64::from(cursor.next_i16()) / 32.0;
    let values_len = common::bounded(cursor.next_u8(), 0, 128).saturating_mul(8);
    let values = common::decode_f64_chunks(&cursor.take_padded(values_len), 128);

    let table = LogGammaTable::new(table_len);
    for n in 0..=table.max_len() {
        assert!(table.try_get(n).is_some());
    }

    let normal = BayesFactorScorer::new(&Normal, &table, threshold);
    if let Ok(Some(score)) = normal.score(&values) {
        assert!((3..=values.len() - 3).contains(&score.split));
        assert!(score.log_odds.is_finite() && score.log_odds >= threshold);
    }

    let log_normal = BayesFactorScorer::new(&LogNormal, &table, threshold);
    if let Ok(Some(score)) = log_normal.score(&values) {
        assert!(values.iter().all(|v| *v > 0.0));
        assert!((3..=values.len() - 3).contains(&score.split));
    }
});
