//! Frequency-domain band-pass filter.
//!
//! Responses are real scalars evaluated on absolute frequency, so mirrored
//! bins of a conjugate-symmetric spectrum get the same gain and the
//! filtered signal stays real.

use serde::{Deserialize, Serialize};

use num_complex::Complex64;

/// Smallest gaussian standard deviation, in Hz.
pub const MIN_GAUSSIAN_SIGMA: f64 = 0.1;

/// Filter shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Brick-wall passband of total width `width`.
    #[default]
    Square,
    /// Gaussian bell with σ = max(0.1, width / 4).
    Gaussian,
}

/// A band-pass filter description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub kind: FilterKind,
    /// Centre frequency in Hz.
    pub center: f64,
    /// Width in Hz (> 0).
    pub width: f64,
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec {
            kind: FilterKind::Square,
            center: 5.0,
            width: 4.0,
        }
    }
}

impl FilterSpec {
    pub fn new(kind: FilterKind, center: f64, width: f64) -> Self {
        FilterSpec {
            kind,
            center,
            width,
        }
    }

    pub fn sigma(&self) -> f64 {
        (self.width / 4.0).max(MIN_GAUSSIAN_SIGMA)
    }

    /// Whether `abs_freq` lies inside `[center - width/2, center + width/2]`.
    pub fn in_passband(&self, abs_freq: f64) -> bool {
        let half = self.width / 2.0;
        abs_freq >= self.center - half && abs_freq <= self.center + half
    }

    /// Gain applied at absolute frequency `abs_freq`.
    pub fn response(&self, abs_freq: f64) -> f64 {
        match self.kind {
            FilterKind::Square => {
                if self.in_passband(abs_freq) {
                    1.0
                } else {
                    0.0
                }
            }
            FilterKind::Gaussian => {
                let sigma = self.sigma();
                let d = abs_freq - self.center;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            }
        }
    }
}

/// Signed frequency represented by bin `k` of an `n`-point transform.
pub fn bin_frequency(k: usize, n: usize, sample_rate: f64) -> f64 {
    let bin_width = sample_rate / n as f64;
    if k > n / 2 {
        (k as f64 - n as f64) * bin_width
    } else {
        k as f64 * bin_width
    }
}

/// Scale every bin of `spectrum` by the filter response at its frequency.
pub fn apply(spectrum: &[Complex64], spec: &FilterSpec, sample_rate: f64) -> Vec<Complex64> {
    let n = spectrum.len();
    spectrum
        .iter()
        .enumerate()
        .map(|(k, &bin)| {
            let abs_f = bin_frequency(k, n, sample_rate).abs();
            bin.scale(spec.response(abs_f))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::SignalComponent;
    use crate::dsp::compositor::{SignalMode, compose_complex};
    use crate::dsp::fft;

    fn filtered_signal(freq: f64, spec: &FilterSpec) -> (Vec<Complex64>, Vec<Complex64>) {
        let c = SignalComponent::new("c", freq, 1.0, 2.0);
        let x = compose_complex(&[c], 256.0, 1024, SignalMode::Ideal);
        let spectrum = fft::forward(&x).unwrap();
        let y = fft::inverse(&apply(&spectrum, spec, 256.0)).unwrap();
        (x, y)
    }

    #[test]
    fn square_passband_edges() {
        let spec = FilterSpec::new(FilterKind::Square, 5.0, 4.0);
        assert_eq!(spec.response(3.0), 1.0);
        assert_eq!(spec.response(5.0), 1.0);
        assert_eq!(spec.response(7.0), 1.0);
        assert_eq!(spec.response(2.99), 0.0);
        assert_eq!(spec.response(7.01), 0.0);
    }

    #[test]
    fn square_filter_zeroes_out_of_band_component() {
        let spec = FilterSpec::new(FilterKind::Square, 5.0, 4.0);
        let (_, y) = filtered_signal(2.0, &spec);
        for (i, s) in y.iter().enumerate() {
            assert!(s.norm() < 1e-9, "sample {i} not zeroed: {s:?}");
        }
    }

    #[test]
    fn square_filter_passes_in_band_component() {
        let spec = FilterSpec::new(FilterKind::Square, 5.0, 4.0);
        let (x, y) = filtered_signal(5.0, &spec);
        for i in 0..x.len() {
            assert!((x[i] - y[i]).norm() < 1e-9, "sample {i} altered");
        }
    }

    #[test]
    fn gaussian_response_values() {
        let spec = FilterSpec::new(FilterKind::Gaussian, 5.0, 4.0);
        assert_eq!(spec.sigma(), 1.0);
        assert_eq!(spec.response(5.0), 1.0);
        assert!((spec.response(7.0) - (-2.0_f64).exp()).abs() < 1e-6);
        assert!((spec.response(7.0) - 0.1353).abs() < 1e-4);
    }

    #[test]
    fn gaussian_sigma_has_floor() {
        let spec = FilterSpec::new(FilterKind::Gaussian, 5.0, 0.1);
        assert_eq!(spec.sigma(), MIN_GAUSSIAN_SIGMA);
    }

    #[test]
    fn bin_layout_is_signed() {
        assert_eq!(bin_frequency(0, 1024, 256.0), 0.0);
        assert_eq!(bin_frequency(20, 1024, 256.0), 5.0);
        assert_eq!(bin_frequency(512, 1024, 256.0), 128.0);
        assert_eq!(bin_frequency(1004, 1024, 256.0), -5.0);
    }

    #[test]
    fn mirrored_bins_get_equal_gain() {
        let spec = FilterSpec::new(FilterKind::Gaussian, 10.0, 6.0);
        let spectrum = vec![Complex64::new(1.0, 1.0); 64];
        let out = apply(&spectrum, &spec, 64.0);
        for k in 1..32 {
            assert_eq!(out[k], out[64 - k], "bin {k}");
        }
    }
}
