// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Reproducibility mode used to control determinism/parallelism trade-offs.
///
/// Detection output is identical in every mode; `Strict` additionally pins
/// execution to the calling thread.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReproMode {
    Strict,
    #[default]
    Balanced,
    Fast,
}

impl ReproMode {
    /// Whether trajectories may be fanned out across worker threads.
    pub fn allows_parallel(self) -> bool {
        self != Self::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::ReproMode;

    #[test]
    fn repro_mode_default_is_balanced() {
        assert_eq!(ReproMode::default(), ReproMode::Balanced);
    }

    #[test]
    fn only_strict_disables_parallelism() {
        assert!(!ReproMode::Strict.allows_parallel());
        assert!(ReproMode::Balanced.allows_parallel());
        assert!(ReproMode::Fast.allows_parallel());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn repro_mode_serde_roundtrip() {
        for mode in [ReproMode::Strict, ReproMode::Balanced, ReproMode::Fast] {
            let encoded = serde_json::to_string(&mode).expect("repro mode should serialize");
            let decoded: ReproMode =
                serde_json::from_str(&encoded).expect("repro mode should deserialize");
            assert_eq!(decoded, mode);
        }
    }
}
