// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Deterministic signal generators shared by the cpdetect benchmarks.

fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

fn lcg_unit(state: &mut u64) -> f64 {
    (lcg_next(state) >> 11) as f64 / (1u64 << 53) as f64
}

/// Concatenated `(level, count)` blocks with uniform noise of width `amplitude`.
pub fn noisy_levels(levels: &[(f64, usize)], amplitude: f64, seed: u64) -> Vec<f64> {
    let mut state = seed;
    let total: usize = levels.iter().map(|&(_, count)| count).sum();
    let mut out = Vec::with_capacity(total);
    for &(level, count) in levels {
        for _ in 0..count {
            out.push(level + (lcg_unit(&mut state) - 0.5) * amplitude);
        }
    }
    out
}

/// A length-`n` signal with `regimes` equal-width level shifts starting at 5.0.
pub fn staircase(n: usize, regimes: usize, seed: u64) -> Vec<f64> {
    let regimes = regimes.max(1);
    let width = n / regimes;
    let mut blocks: Vec<(f64, usize)> = (0..regimes)
        .map(|k| (5.0 + 4.0 * (k % 3) as f64, width))
        .collect();
    if let Some(last) = blocks.last_mut() {
        last.1 += n - width * regimes;
    }
    noisy_levels(&blocks, 1.0, seed)
}
