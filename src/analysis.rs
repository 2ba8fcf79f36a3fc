//! Visualization pipeline: compose → FFT → filter → inverse FFT.
//!
//! One `analyse` call produces everything the three plots need from a
//! model snapshot. Nothing is cached between calls.

use serde::Serialize;
use tracing::trace;

use crate::dsp::compositor::compose_complex;
use crate::dsp::fft;
use crate::dsp::filter::{self, bin_frequency};
use crate::error::TransformError;
use crate::model::SignalModel;

/// One point of a time-domain plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub t: f64,
    pub value: f64,
}

/// One bar of the spectrum plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrumBin {
    /// Bin frequency in Hz.
    pub frequency: f64,
    /// Raw magnitude `sqrt(re² + im²)`.
    pub magnitude: f64,
    /// Magnitude normalized to component amplitude (`magnitude / (N/2)`).
    pub amplitude: f64,
    /// Whether the bin is inside the filter passband.
    pub in_passband: bool,
}

/// Result of one visualization pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub original: Vec<TimePoint>,
    pub reconstructed: Vec<TimePoint>,
    /// Bins `0..N/2`.
    pub spectrum: Vec<SpectrumBin>,
}

/// Run the full visualization pipeline for `model`.
pub fn analyse(model: &SignalModel) -> Result<Analysis, TransformError> {
    let n = model.fft_size;
    fft::check_length(n)?;
    let sr = model.sample_rate;

    let signal = compose_complex(&model.components, sr, n, model.mode);
    let spectrum = fft::forward(&signal)?;
    let filtered = filter::apply(&spectrum, &model.filter, sr);
    let reconstructed = fft::inverse(&filtered)?;

    let display_scale = 2.0 / n as f64;
    let bins = spectrum[..n / 2]
        .iter()
        .enumerate()
        .map(|(k, bin)| {
            let frequency = bin_frequency(k, n, sr);
            let magnitude = bin.norm();
            SpectrumBin {
                frequency,
                magnitude,
                amplitude: magnitude * display_scale,
                in_passband: model.filter.in_passband(frequency),
            }
        })
        .collect();

    let to_points = |values: Vec<f64>| -> Vec<TimePoint> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| TimePoint {
                t: i as f64 / sr,
                value,
            })
            .collect()
    };
    let mut original = to_points(signal.iter().map(|c| c.re).collect());
    let mut recon = to_points(reconstructed.iter().map(|c| c.re).collect());

    if model.smoothing > 0.0 {
        smooth(&mut original, model.smoothing);
        smooth(&mut recon, model.smoothing);
    }

    trace!(
        components = model.components.len(),
        n,
        filter_center = model.filter.center,
        "analysis pass"
    );

    Ok(Analysis {
        original,
        reconstructed: recon,
        spectrum: bins,
    })
}

/// Exponential smoothing in place: `y[i] = y[i-1]·s + x[i]·(1 - s)`.
pub fn smooth(points: &mut [TimePoint], factor: f64) {
    let Some(first) = points.first() else {
        return;
    };
    let mut acc = first.value;
    for p in points.iter_mut().skip(1) {
        acc = acc * factor + p.value * (1.0 - factor);
        p.value = acc;
    }
}

/// Points with `t <= duration`, the part of a series that is on screen.
pub fn visible(points: &[TimePoint], duration: f64) -> &[TimePoint] {
    let end = points.partition_point(|p| p.t <= duration);
    &points[..end]
}
