//! Signal compositor — sums components into a sampled time-domain buffer.

use serde::{Deserialize, Serialize};

use crate::component::SignalComponent;

use num_complex::Complex64;

/// How components contribute over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalMode {
    /// Every component plays for the whole buffer.
    #[default]
    Ideal,
    /// Components play only inside their active window, shaped by their envelope.
    Gated,
}

/// Sample `n` points of the summed signal at `sample_rate`.
pub fn compose(
    components: &[SignalComponent],
    sample_rate: f64,
    n: usize,
    mode: SignalMode,
) -> Vec<f64> {
    compose_scaled(components, sample_rate, n, mode, 1.0)
}

/// Like [`compose`], with every carrier frequency multiplied by `pitch_multiplier`.
pub fn compose_scaled(
    components: &[SignalComponent],
    sample_rate: f64,
    n: usize,
    mode: SignalMode,
    pitch_multiplier: f64,
) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate;
            components
                .iter()
                .map(|c| c.sample(t, mode, pitch_multiplier))
                .sum()
        })
        .collect()
}

/// The composed signal as transform input (imaginary parts zero).
pub fn compose_complex(
    components: &[SignalComponent],
    sample_rate: f64,
    n: usize,
    mode: SignalMode,
) -> Vec<Complex64> {
    compose(components, sample_rate, n, mode)
        .into_iter()
        .map(|x| Complex64::new(x, 0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::Envelope;

    #[test]
    fn empty_component_list_is_silent() {
        let out = compose(&[], 256.0, 64, SignalMode::Ideal);
        assert_eq!(out.len(), 64);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn components_sum_linearly() {
        let a = SignalComponent::new("a", 2.0, 1.0, 2.0);
        let b = SignalComponent::new("b", 5.0, 0.5, 2.0);
        let both = compose(&[a.clone(), b.clone()], 256.0, 128, SignalMode::Ideal);
        let only_a = compose(&[a], 256.0, 128, SignalMode::Ideal);
        let only_b = compose(&[b], 256.0, 128, SignalMode::Ideal);
        for i in 0..128 {
            assert!((both[i] - only_a[i] - only_b[i]).abs() < 1e-12);
        }
        // Both cosines peak at t = 0.
        assert!((both[0] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn gated_mode_respects_window() {
        let mut c = SignalComponent::new("a", 4.0, 1.0, 2.0);
        c.start_time = 0.5;
        c.end_time = 1.0;
        let out = compose(&[c], 256.0, 512, SignalMode::Gated);
        assert!(out[..128].iter().all(|&s| s == 0.0), "silent before start");
        assert!(out[257..].iter().all(|&s| s == 0.0), "silent after end");
        assert!(out[128..=256].iter().any(|&s| s.abs() > 0.5));
    }

    #[test]
    fn gated_envelope_scales_output() {
        let mut c = SignalComponent::new("a", 1.0, 1.0, 2.0);
        c.envelope = Envelope::Adsr {
            attack: 0.5,
            decay: 0.0,
            sustain: 1.0,
            release: 0.0,
        };
        // Window [0, 2]: half-way through the attack at t = 0.5 → gain 0.5.
        let out = compose(&[c], 4.0, 8, SignalMode::Gated);
        assert_eq!(out[0], 0.0);
        // cos(2π·0.5) = -1
        assert!((out[2] + 0.5).abs() < 1e-12, "got {}", out[2]);
    }

    #[test]
    fn complex_output_is_real() {
        let c = SignalComponent::new("a", 3.0, 1.0, 2.0);
        let out = compose_complex(&[c], 64.0, 32, SignalMode::Ideal);
        assert!(out.iter().all(|s| s.im == 0.0));
    }
}
