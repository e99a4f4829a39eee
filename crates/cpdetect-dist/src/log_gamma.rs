// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

const LOG_2PI: f64 = 1.8378770664093453;
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_7e-7,
];

/// Placeholder stored for segment lengths 0, 1 and 2. Never a real score term.
pub const LOG_GAMMA_SENTINEL: f64 = -99.0;

/// Smallest segment length with a real table entry.
const FIRST_ENTRY: usize = 3;

/// Natural log of the gamma function for finite `z > 0`.
pub fn ln_gamma(z: f64) -> f64 {
    debug_assert!(
        z.is_finite() && z > 0.0,
        "ln_gamma requires z > 0 and finite"
    );

    // ln Γ(z) = -ln(z) + O(z) as z -> 0+.
    if z < 1e-8 {
        return -z.ln();
    }

    if z < 0.5 {
        let sin_term = (std::f64::consts::PI * z).sin().abs();
        return std::f64::consts::PI.ln() - sin_term.ln() - ln_gamma(1.0 - z);
    }

    let shifted = z - 1.0;
    let mut x = LANCZOS_COEFFICIENTS[0];
    for (idx, coefficient) in LANCZOS_COEFFICIENTS.iter().copied().enumerate().skip(1) {
        x += coefficient / (shifted + idx as f64);
    }

    let t = shifted + LANCZOS_G + 0.5;
    0.5 * LOG_2PI + (shifted + 0.5) * t.ln() - t + x.ln()
}

/// Precomputed `ln Γ(n/2 - 1)` for every segment length `n` in `3..=max_len`.
///
/// Built once per detector and only ever read afterwards, so one table sized
/// to the longest trajectory serves every trajectory and every recursive call.
#[derive(Clone, Debug, PartialEq)]
pub struct LogGammaTable {
    values: Vec<f64>,
}

impl LogGammaTable {
    pub fn new(max_len: usize) -> Self {
        let mut values = Vec::with_capacity(max_len.max(FIRST_ENTRY - 1) + 1);
        values.extend([LOG_GAMMA_SENTINEL; FIRST_ENTRY]);
        for n in FIRST_ENTRY..=max_len {
            values.push(ln_gamma(0.5 * n as f64 - 1.0));
        }
        Self { values }
    }

    /// Largest segment length covered by the table.
    pub fn max_len(&self) -> usize {
        self.values.len() - 1
    }

    /// `ln Γ(n/2 - 1)`, or the sentinel for `n < 3`.
    ///
    /// `n` must not exceed [`LogGammaTable::max_len`].
    #[inline]
    pub fn get(&self, n: usize) -> f64 {
        self.values[n]
    }

    /// Checked variant of [`LogGammaTable::get`].
    pub fn try_get(&self, n: usize) -> Option<f64> {
        self.values.get(n).copied()
    }
}
