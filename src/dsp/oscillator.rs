//! Waveform evaluation — stateless carrier functions of time.
//!
//! All shapes are cosine-phase: at `t = 0, φ = 0` every waveform except the
//! sawtooth starts at its positive peak. This keeps the time-domain carrier
//! consistent with the analytic harmonic series in `harmonics`.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    #[serde(alias = "saw")]
    Sawtooth,
}

impl Waveform {
    /// Evaluate this waveform at time `t` (seconds).
    pub fn evaluate(self, t: f64, frequency: f64, phase: f64) -> f64 {
        evaluate(t, frequency, phase, self)
    }
}

/// Carrier value in [-1, 1] for `angle = 2π·f·t + φ`.
///
/// The square wave maps `cos(angle) == 0` to `+1`.
pub fn evaluate(t: f64, frequency: f64, phase: f64, waveform: Waveform) -> f64 {
    let angle = 2.0 * PI * frequency * t + phase;
    match waveform {
        Waveform::Sine => angle.cos(),
        Waveform::Square => {
            if angle.cos() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        // asin may see |x| marginally above 1 from rounding; clamp first.
        Waveform::Triangle => (2.0 / PI) * angle.cos().clamp(-1.0, 1.0).asin(),
        Waveform::Sawtooth => {
            let u = frequency * t + phase / (2.0 * PI);
            2.0 * (u - (u + 0.5).floor())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sawtooth,
    ];

    #[test]
    fn sine_is_cosine_phase() {
        assert!((evaluate(0.0, 5.0, 0.0, Waveform::Sine) - 1.0).abs() < 1e-12);
        // Quarter period later the carrier crosses zero.
        let s = evaluate(0.05, 5.0, 0.0, Waveform::Sine);
        assert!(s.abs() < 1e-12, "Expected zero crossing, got {s}");
    }

    #[test]
    fn square_zero_crossing_is_positive() {
        assert_eq!(evaluate(0.0, 1.0, PI / 2.0, Waveform::Square), 1.0);
        assert_eq!(evaluate(0.5, 1.0, 0.0, Waveform::Square), -1.0);
    }

    #[test]
    fn triangle_peaks_and_midpoint() {
        assert!((evaluate(0.0, 2.0, 0.0, Waveform::Triangle) - 1.0).abs() < 1e-9);
        assert!((evaluate(0.25, 2.0, 0.0, Waveform::Triangle) + 1.0).abs() < 1e-9);
        assert!(evaluate(0.125, 2.0, 0.0, Waveform::Triangle).abs() < 1e-9);
    }

    #[test]
    fn sawtooth_ramps_and_wraps() {
        assert_eq!(evaluate(0.0, 1.0, 0.0, Waveform::Sawtooth), 0.0);
        assert!((evaluate(0.25, 1.0, 0.0, Waveform::Sawtooth) - 0.5).abs() < 1e-12);
        // u = 0.5 wraps to the bottom of the ramp.
        assert!((evaluate(0.5, 1.0, 0.0, Waveform::Sawtooth) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn sawtooth_phase_shifts_ramp() {
        let shifted = evaluate(0.0, 1.0, PI / 2.0, Waveform::Sawtooth);
        let delayed = evaluate(0.25, 1.0, 0.0, Waveform::Sawtooth);
        assert!((shifted - delayed).abs() < 1e-12);
    }

    #[test]
    fn all_waveforms_in_range() {
        for waveform in ALL {
            for i in 0..2000 {
                let t = i as f64 / 997.0;
                let v = evaluate(t, 3.7, 0.4, waveform);
                assert!((-1.0..=1.0).contains(&v), "{waveform:?} out of range: {v}");
            }
        }
    }

    #[test]
    fn parses_lowercase_names() {
        let w: Waveform = serde_json::from_str("\"triangle\"").unwrap();
        assert_eq!(w, Waveform::Triangle);
        let w: Waveform = serde_json::from_str("\"saw\"").unwrap();
        assert_eq!(w, Waveform::Sawtooth);
    }
}
