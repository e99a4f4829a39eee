// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use cpdetect_core::ReproMode;
use cpdetect_dist::Distribution;
use cpdetect_offline::{Detector, DetectorConfig};
use libfuzzer_sys::fuzz_target;

fn build_distribution(seed: u8) -> Distribution {
    match seed % 2 {
        0 => Distribution::Normal,
        _ => Distribution::LogNormal,
    }
}

fn build_repro_mode(seed: u8) -> ReproMode {
    match seed % 3 {
        0 => ReproMode::Strict,
        1 => ReproMode::Balanced,
        _ => ReproMode::Fast,
    }
}

fn build_threshold(seed: u8, raw: i16) -> f64 {
    match seed % 6 {
        0 => 0.0,
        1 => f64::from(raw) / 64.0,
        2 => f64::NAN,
        3 => f64::INFINITY,
        4 => -f64::from(raw.unsigned_abs()),
        _ => f64::from(seed),
    }
}

fn build_sample(mode_seed: u8, decoded: f64, raw: i16, level: f64) -> f64 {
    match mode_seed % 8 {
        0 | 1 | 2 => level + f64::from(raw) / 256.0,
        3 => decoded,
        4 => level,
        5 => 0.0,
        6 => f64::from(raw),
        _ => f64::NAN,
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);

    let config = DetectorConfig::new(build_distribution(cursor.next_u8()))
        .with_threshold(build_threshold(cursor.next_u8(), cursor.next_i16()))
        .with_repro_mode(build_repro_mode(cursor.next_u8()));

    let payload_len = common::bounded(cursor.next_u8(), 0, 32).saturating_mul(8);
    let mut decoded = common::decode_f64_chunks(&cursor.take_padded(payload_len), 32);
    if decoded.is_empty() {
        decoded.push(1.0);
    }

    let trajectory_count = common::bounded(cursor.next_u8(), 0, 4);
    let mut observations = Vec::with_capacity(trajectory_count);
    for _ in 0..trajectory_count {
        let len = common::bounded(cursor.next_u8(), 0, 96);
        let mut level = 1.0 + f64::from(cursor.next_u8()) / 8.0;
        let mut trajectory = Vec::with_capacity(len);
        for t in 0..len {
            if cursor.next_u8() % 17 == 0 {
                level += f64::from(cursor.next_i16()) / 512.0;
            }
            let sample = build_sample(
                cursor.next_u8(),
                decoded[t % decoded.len()],
                cursor.next_i16(),
                level,
            );
            trajectory.push(sample);
        }
        observations.push(trajectory);
    }

    let Ok(detector) = Detector::new(&observations, config) else {
        return;
    };
    let Ok(result) = detector.detect() else {
        return;
    };

    for (id, trajectory) in result.iter() {
        let n = observations[id.index()].len();
        assert!(
            trajectory.validate_coverage(n).is_ok(),
            "{id} partitions must cover the trajectory"
        );
        for cp in &trajectory.change_points {
            let (start, end) = cp.start_end;
            assert!(start + 3 <= cp.ts && cp.ts + 3 <= end);
            assert!(cp.log_odds >= detector.config().log_odds_threshold);
        }
    }
});
