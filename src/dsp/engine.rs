//! Audio Engine — renders components to a full-duration audio buffer.
//!
//! Two paths share the same gating, mixing and soft clipping:
//!
//! - **Original**: each component's carrier is evaluated directly with its
//!   frequency multiplied by the pitch multiplier.
//! - **Reconstructed**: each component is decomposed into harmonics, each
//!   harmonic is weighted by the filter response at its *visual* frequency
//!   (`audio_freq / pitch_multiplier`), and the surviving partials are
//!   summed as cosines. This filters continuously in frequency instead of
//!   resynthesizing from FFT bins, which would quantize every partial onto
//!   the bin grid and pulse audibly.
//!
//! Rendering runs in blocks so a cancellation flag can stop a long render
//! between blocks.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::component::SignalComponent;

use super::compositor::SignalMode;
use super::filter::FilterSpec;
use super::harmonics::harmonics;
use super::mixer::Mixer;

/// Partials whose filter response is below this are dropped.
pub const RESPONSE_THRESHOLD: f64 = 0.001;

/// Samples rendered between cancellation checks.
const BLOCK_SIZE: usize = 128;

/// Parameters for one audio render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Factor moving visual-range frequencies into the audible range.
    pub pitch_multiplier: f64,
    /// `None` renders the original signal; `Some` renders the reconstruction.
    pub filter: Option<FilterSpec>,
    /// Length of the buffer in seconds.
    pub duration: f64,
    /// Output sample rate in Hz.
    pub sample_rate: f64,
    /// Gain applied after soft clipping.
    pub master_volume: f64,
    pub mode: SignalMode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            pitch_multiplier: 20.0,
            filter: None,
            duration: 2.0,
            sample_rate: 44100.0,
            master_volume: 0.5,
            mode: SignalMode::Ideal,
        }
    }
}

impl RenderOptions {
    /// Number of output samples (`duration · sample_rate`, to the nearest
    /// sample).
    pub fn num_samples(&self) -> usize {
        (self.duration * self.sample_rate).round().max(0.0) as usize
    }
}

/// A filtered harmonic ready for synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    pub order: u32,
    /// Audio-domain frequency in Hz.
    pub frequency: f64,
    /// Phase in radians (`order · component phase`).
    pub phase: f64,
    /// Combined weight: component amplitude × harmonic amplitude × response.
    pub gain: f64,
}

/// The partials that survive filtering for one component.
#[derive(Debug, Clone)]
pub struct ComponentPartials<'a> {
    pub component: &'a SignalComponent,
    pub partials: Vec<Partial>,
}

/// Build the filtered harmonic set for all components.
///
/// Components with no surviving partials are left out.
pub fn filtered_partials<'a>(
    components: &'a [SignalComponent],
    filter: &FilterSpec,
    pitch_multiplier: f64,
    sample_rate: f64,
) -> Vec<ComponentPartials<'a>> {
    let nyquist = sample_rate / 2.0;
    components
        .iter()
        .filter_map(|component| {
            let base = component.frequency * pitch_multiplier;
            let partials: Vec<Partial> = harmonics(base, component.waveform, nyquist)
                .into_iter()
                .filter_map(|h| {
                    let response = filter.response(h.frequency / pitch_multiplier);
                    if response < RESPONSE_THRESHOLD {
                        return None;
                    }
                    Some(Partial {
                        order: h.order,
                        frequency: h.frequency,
                        phase: h.phase(component.phase),
                        gain: component.amplitude * h.amplitude * response,
                    })
                })
                .collect();
            (!partials.is_empty()).then_some(ComponentPartials {
                component,
                partials,
            })
        })
        .collect()
}

/// The audio rendering engine.
#[derive(Debug, Clone)]
pub struct AudioEngine {
    pub options: RenderOptions,
}

impl AudioEngine {
    pub fn new(options: RenderOptions) -> Self {
        AudioEngine { options }
    }

    /// Render `components` to mono f64 samples.
    pub fn render(&self, components: &[SignalComponent]) -> Vec<f64> {
        let never = AtomicBool::new(false);
        self.render_cancellable(components, &never)
            .unwrap_or_default()
    }

    /// Render `components`, returning `None` if `cancel` is raised before
    /// the buffer is complete.
    pub fn render_cancellable(
        &self,
        components: &[SignalComponent],
        cancel: &AtomicBool,
    ) -> Option<Vec<f64>> {
        let opts = &self.options;
        let total_samples = opts.num_samples();
        let mut mixer = Mixer::new(opts.master_volume, total_samples);
        let mut block: Vec<f64> = Vec::with_capacity(BLOCK_SIZE);

        let partials = opts
            .filter
            .map(|filter| {
                filtered_partials(components, &filter, opts.pitch_multiplier, opts.sample_rate)
            });

        debug!(
            samples = total_samples,
            components = components.len(),
            partials = partials
                .as_ref()
                .map(|p| p.iter().map(|c| c.partials.len()).sum::<usize>()),
            "rendering audio"
        );

        let mut block_start = 0;
        while block_start < total_samples {
            if cancel.load(Ordering::Relaxed) {
                debug!(at_sample = block_start, "render cancelled");
                return None;
            }
            let block_end = (block_start + BLOCK_SIZE).min(total_samples);
            block.clear();
            block.extend((block_start..block_end).map(|i| {
                let t = i as f64 / opts.sample_rate;
                match &partials {
                    None => components
                        .iter()
                        .map(|c| c.sample(t, opts.mode, opts.pitch_multiplier))
                        .sum(),
                    Some(groups) => reconstructed_sample(groups, t, opts.mode),
                }
            }));
            mixer.add_block(block_start, &block);
            block_start = block_end;
        }

        Some(mixer.finish())
    }
}

fn reconstructed_sample(groups: &[ComponentPartials<'_>], t: f64, mode: SignalMode) -> f64 {
    let mut sum = 0.0;
    for group in groups {
        let gain = match mode {
            SignalMode::Ideal => 1.0,
            SignalMode::Gated => group.component.window_gain(t),
        };
        if gain == 0.0 {
            continue;
        }
        let partial_sum: f64 = group
            .partials
            .iter()
            .map(|p| p.gain * (2.0 * PI * p.frequency * t + p.phase).cos())
            .sum();
        sum += gain * partial_sum;
    }
    sum
}
