//! Harmonic decomposition of the periodic waveforms.
//!
//! Amplitudes are the cosine-series coefficients matching the carriers in
//! `oscillator`: a waveform of base frequency `f` and phase `φ` is
//! `Σ amp_n · cos(2π·n·f·t + n·φ)` over the returned harmonics.
//!
//! The sawtooth series drops the alternating sign of the exact Fourier
//! coefficients.

use std::f64::consts::PI;

use super::oscillator::Waveform;

/// Upper bound on harmonics generated for one waveform.
pub const MAX_HARMONICS: usize = 100;

/// One partial of a periodic waveform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonic {
    /// Harmonic number, starting at 1 for the fundamental.
    pub order: u32,
    /// Frequency in Hz (`base · order`).
    pub frequency: f64,
    /// Signed amplitude relative to the waveform's peak amplitude.
    pub amplitude: f64,
}

impl Harmonic {
    /// Phase of this partial for a waveform with phase `phase`.
    pub fn phase(&self, phase: f64) -> f64 {
        self.order as f64 * phase
    }
}

/// Relative amplitude of harmonic `n` of `waveform`, or `None` when the
/// waveform has no energy at that harmonic.
pub fn harmonic_amplitude(waveform: Waveform, n: u32) -> Option<f64> {
    let nf = n as f64;
    let odd = n % 2 == 1;
    match waveform {
        Waveform::Sine => (n == 1).then_some(1.0),
        Waveform::Square => odd.then(|| {
            let sign = if (n - 1) / 2 % 2 == 0 { 1.0 } else { -1.0 };
            sign * 4.0 / (PI * nf)
        }),
        Waveform::Triangle => odd.then(|| 8.0 / (PI * PI * nf * nf)),
        Waveform::Sawtooth => Some(2.0 / (PI * nf)),
    }
}

/// Harmonics of `waveform` at `base_frequency` strictly below `nyquist`,
/// capped at [`MAX_HARMONICS`].
pub fn harmonics(base_frequency: f64, waveform: Waveform, nyquist: f64) -> Vec<Harmonic> {
    let mut out = Vec::new();
    if base_frequency.is_nan() || base_frequency <= 0.0 {
        return out;
    }
    for n in 1..=MAX_HARMONICS as u32 {
        let frequency = base_frequency * n as f64;
        if frequency >= nyquist {
            break;
        }
        if let Some(amplitude) = harmonic_amplitude(waveform, n) {
            out.push(Harmonic {
                order: n,
                frequency,
                amplitude,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator;

    fn assert_close(a: f64, b: f64, what: &str) {
        assert!((a - b).abs() < 1e-12, "{what}: {a} vs {b}");
    }

    #[test]
    fn square_series_below_nyquist() {
        let h = harmonics(100.0, Waveform::Square, 1000.0);
        let orders: Vec<u32> = h.iter().map(|h| h.order).collect();
        assert_eq!(orders, vec![1, 3, 5, 7, 9]);
        assert_close(h[0].amplitude, 4.0 / PI, "n=1");
        assert_close(h[1].amplitude, -4.0 / (3.0 * PI), "n=3");
        assert_close(h[2].amplitude, 4.0 / (5.0 * PI), "n=5");
        assert_close(h[3].amplitude, -4.0 / (7.0 * PI), "n=7");
        assert_close(h[4].amplitude, 4.0 / (9.0 * PI), "n=9");
        assert_close(h[4].frequency, 900.0, "n=9 frequency");
    }

    #[test]
    fn sine_has_only_fundamental() {
        let h = harmonics(50.0, Waveform::Sine, 22050.0);
        assert_eq!(h.len(), 1);
        assert_eq!(h[0].amplitude, 1.0);
    }

    #[test]
    fn triangle_odd_positive_inverse_square() {
        let h = harmonics(10.0, Waveform::Triangle, 100.0);
        assert_eq!(h.len(), 5);
        for harmonic in &h {
            assert!(harmonic.order % 2 == 1);
            let n = harmonic.order as f64;
            assert_close(harmonic.amplitude, 8.0 / (PI * PI * n * n), "triangle");
        }
    }

    #[test]
    fn sawtooth_includes_every_order() {
        let h = harmonics(10.0, Waveform::Sawtooth, 55.0);
        assert_eq!(h.len(), 5);
        assert_close(h[3].amplitude, 2.0 / (4.0 * PI), "n=4");
    }

    #[test]
    fn harmonic_count_is_capped() {
        let h = harmonics(1.0, Waveform::Sawtooth, 1e6);
        assert_eq!(h.len(), MAX_HARMONICS);
        assert_eq!(h.last().unwrap().order, MAX_HARMONICS as u32);
    }

    #[test]
    fn base_at_or_above_nyquist_is_empty() {
        assert!(harmonics(500.0, Waveform::Square, 500.0).is_empty());
        assert!(harmonics(0.0, Waveform::Square, 500.0).is_empty());
    }

    #[test]
    fn harmonic_phase_scales_with_order() {
        let h = Harmonic {
            order: 3,
            frequency: 30.0,
            amplitude: 1.0,
        };
        assert_close(h.phase(0.5), 1.5, "phase");
    }

    #[test]
    fn square_series_approximates_carrier() {
        // With enough partials the series tracks the carrier away from edges.
        let phase = 0.3;
        let h = harmonics(1.0, Waveform::Square, 100.5);
        let t = 0.1;
        let sum: f64 = h
            .iter()
            .map(|h| h.amplitude * (2.0 * PI * h.frequency * t + h.phase(phase)).cos())
            .sum();
        let exact = oscillator::evaluate(t, 1.0, phase, Waveform::Square);
        assert!((sum - exact).abs() < 0.05, "series {sum} vs carrier {exact}");
    }

    #[test]
    fn triangle_series_approximates_carrier() {
        let h = harmonics(1.0, Waveform::Triangle, 100.5);
        for i in 0..10 {
            let t = i as f64 / 10.0;
            let sum: f64 = h
                .iter()
                .map(|h| h.amplitude * (2.0 * PI * h.frequency * t).cos())
                .sum();
            let exact = oscillator::evaluate(t, 1.0, 0.0, Waveform::Triangle);
            assert!((sum - exact).abs() < 0.01, "t={t}: {sum} vs {exact}");
        }
    }
}
