//! The signal model: one explicit snapshot of everything the pipeline reads.
//!
//! Pipeline stages take `&SignalModel`. Edits go through the methods here,
//! which validate on a copy and only commit when the result is valid, so a
//! rejected edit leaves the previous snapshot untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::{self, SignalComponent, WindowEdge, fit_window};
use crate::dsp::compositor::SignalMode;
use crate::dsp::engine::RenderOptions;
use crate::dsp::envelope::{Envelope, EnvelopeKind};
use crate::dsp::filter::{FilterKind, FilterSpec};
use crate::dsp::oscillator::Waveform;
use crate::error::EditError;

/// Visual sample rate of the time/spectrum displays, in Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 256.0;
/// Transform length used by the visualization pipeline.
pub const DEFAULT_FFT_SIZE: usize = 1024;
/// Seconds shown, and the bound on component windows.
pub const DEFAULT_DURATION: f64 = 2.0;
/// Longest accepted duration, in seconds. Also bounds audio buffer size.
pub const MAX_DURATION: f64 = 60.0;
/// Highest accepted playback sample rate, in Hz.
pub const MAX_AUDIO_SAMPLE_RATE: u32 = 192_000;

/// Playback settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    /// Multiplier taking visual frequencies (0.5–50 Hz) into the audible range.
    pub pitch_multiplier: f64,
    pub sample_rate: u32,
    pub master_volume: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        AudioSettings {
            pitch_multiplier: 20.0,
            sample_rate: 44100,
            master_volume: 0.5,
        }
    }
}

impl AudioSettings {
    /// Pitch multiplier finite and positive, sample rate in
    /// `1..=MAX_AUDIO_SAMPLE_RATE`, master volume in `[0, 1]`.
    pub fn validate(&self) -> Result<(), EditError> {
        if !(self.pitch_multiplier.is_finite() && self.pitch_multiplier > 0.0) {
            return Err(EditError::InvalidParameter {
                name: "pitchMultiplier",
                value: self.pitch_multiplier,
            });
        }
        if self.sample_rate == 0 || self.sample_rate > MAX_AUDIO_SAMPLE_RATE {
            return Err(EditError::InvalidParameter {
                name: "sampleRate",
                value: self.sample_rate as f64,
            });
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(EditError::InvalidParameter {
                name: "masterVolume",
                value: self.master_volume,
            });
        }
        Ok(())
    }
}

/// A single edit to one component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentEdit {
    Frequency(f64),
    Amplitude(f64),
    Phase(f64),
    Waveform(Waveform),
    StartTime(f64),
    EndTime(f64),
    /// Switch envelope shape, resetting its parameters to defaults.
    EnvelopeKind(EnvelopeKind),
    Envelope(Envelope),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalModel {
    pub components: Vec<SignalComponent>,
    pub filter: FilterSpec,
    /// Visual sample rate in Hz.
    pub sample_rate: f64,
    /// Visualization transform length (power of two).
    pub fft_size: usize,
    /// Seconds shown, the window bound and the audio render length.
    pub duration: f64,
    pub mode: SignalMode,
    /// Display-only exponential smoothing factor in [0, 1).
    pub smoothing: f64,
    pub show_axis: bool,
    pub audio: AudioSettings,
    next_id: u64,
}

impl Default for SignalModel {
    fn default() -> Self {
        let mut model = SignalModel::empty();
        for (freq, amp) in [(2.0, 1.0), (5.0, 0.5), (15.0, 0.3)] {
            model.push_new(freq, amp);
        }
        model
    }
}

impl SignalModel {
    /// A model with default settings and no components.
    pub fn empty() -> Self {
        SignalModel {
            components: Vec::new(),
            filter: FilterSpec::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            fft_size: DEFAULT_FFT_SIZE,
            duration: DEFAULT_DURATION,
            mode: SignalMode::Ideal,
            smoothing: 0.0,
            show_axis: true,
            audio: AudioSettings::default(),
            next_id: 0,
        }
    }

    /// Restore the starter session: two sines, default filter and display.
    /// Audio settings and the visual sample rate are kept.
    pub fn reset(&mut self) {
        let audio = self.audio;
        let sample_rate = self.sample_rate;
        let fft_size = self.fft_size;
        let next_id = self.next_id;
        *self = SignalModel::empty();
        self.audio = audio;
        self.sample_rate = sample_rate;
        self.fft_size = fft_size;
        self.next_id = next_id;
        for (freq, amp) in [(2.0, 1.0), (5.0, 0.5)] {
            self.push_new(freq, amp);
        }
        debug!("model reset");
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    pub fn component(&self, id: &str) -> Option<&SignalComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Generate an id not used by any current component.
    pub fn fresh_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = format!("c{}", self.next_id);
            if self.component(&id).is_none() {
                return id;
            }
        }
    }

    fn push_new(&mut self, frequency: f64, amplitude: f64) -> &SignalComponent {
        let id = self.fresh_id();
        let idx = self.components.len();
        self.components
            .push(SignalComponent::new(id, frequency, amplitude, self.duration));
        &self.components[idx]
    }

    /// Append a default component (10 Hz, amplitude 0.5).
    pub fn add_component(&mut self) -> &SignalComponent {
        self.push_new(component::DEFAULT_FREQUENCY, component::DEFAULT_AMPLITUDE)
    }

    /// Append `component` after validating it. An empty or duplicate id is
    /// replaced with a fresh one. Returns the id stored.
    pub fn insert_component(&mut self, mut component: SignalComponent) -> Result<String, EditError> {
        let (start, end) = fit_window(
            component.start_time,
            component.end_time,
            self.duration,
            WindowEdge::Start,
        )?;
        component.start_time = start;
        component.end_time = end;
        component.validate()?;
        if component.id.is_empty() || self.component(&component.id).is_some() {
            component.id = self.fresh_id();
        }
        let id = component.id.clone();
        self.components.push(component);
        Ok(id)
    }

    pub fn remove_component(&mut self, id: &str) -> Result<SignalComponent, EditError> {
        let idx = self.index_of(id)?;
        Ok(self.components.remove(idx))
    }

    /// Apply `edit` to the component with `id`. Window edits follow the
    /// push-the-other-bound rule; anything out of domain is rejected.
    pub fn update_component(&mut self, id: &str, edit: ComponentEdit) -> Result<(), EditError> {
        let idx = self.index_of(id)?;
        let mut next = self.components[idx].clone();
        match edit {
            ComponentEdit::Frequency(f) => next.frequency = f,
            ComponentEdit::Amplitude(a) => next.amplitude = a,
            ComponentEdit::Phase(p) => next.phase = p,
            ComponentEdit::Waveform(w) => next.waveform = w,
            ComponentEdit::StartTime(t) => {
                let (s, e) = fit_window(t, next.end_time, self.duration, WindowEdge::Start)?;
                next.start_time = s;
                next.end_time = e;
            }
            ComponentEdit::EndTime(t) => {
                let (s, e) = fit_window(next.start_time, t, self.duration, WindowEdge::End)?;
                next.start_time = s;
                next.end_time = e;
            }
            ComponentEdit::EnvelopeKind(kind) => {
                if next.envelope.kind() != kind {
                    next.envelope = Envelope::for_kind(kind);
                }
            }
            ComponentEdit::Envelope(env) => next.envelope = env,
        }
        if let Err(e) = next.validate() {
            debug!(id, error = %e, "component edit rejected");
            return Err(e);
        }
        self.components[idx] = next;
        Ok(())
    }

    /// Replace the whole component list (used by import).
    pub fn replace_components(&mut self, components: Vec<SignalComponent>) {
        self.components = components;
    }

    /// Move the filter centre, clamped to `[0, nyquist]`.
    pub fn set_filter_center(&mut self, center: f64) -> Result<(), EditError> {
        if !center.is_finite() {
            return Err(EditError::InvalidParameter {
                name: "filterCenter",
                value: center,
            });
        }
        self.filter.center = center.clamp(0.0, self.nyquist());
        Ok(())
    }

    pub fn set_filter_width(&mut self, width: f64) -> Result<(), EditError> {
        if !(width.is_finite() && width > 0.0) {
            return Err(EditError::InvalidParameter {
                name: "filterWidth",
                value: width,
            });
        }
        self.filter.width = width;
        Ok(())
    }

    pub fn set_filter_kind(&mut self, kind: FilterKind) {
        self.filter.kind = kind;
    }

    pub fn set_audio(&mut self, audio: AudioSettings) -> Result<(), EditError> {
        audio.validate()?;
        self.audio = audio;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: SignalMode) {
        self.mode = mode;
    }

    pub fn set_smoothing(&mut self, smoothing: f64) -> Result<(), EditError> {
        if !(0.0..1.0).contains(&smoothing) {
            return Err(EditError::InvalidParameter {
                name: "smoothing",
                value: smoothing,
            });
        }
        self.smoothing = smoothing;
        Ok(())
    }

    /// Change the shown duration, at most [`MAX_DURATION`]. Component
    /// windows are clamped to the new bound.
    pub fn set_duration(&mut self, duration: f64) -> Result<(), EditError> {
        if !(duration > 0.0 && duration <= MAX_DURATION) {
            return Err(EditError::InvalidParameter {
                name: "timeBase",
                value: duration,
            });
        }
        let mut fitted = Vec::with_capacity(self.components.len());
        for c in &self.components {
            let (s, e) = fit_window(c.start_time, c.end_time, duration, WindowEdge::Start)?;
            fitted.push((s, e));
        }
        for (c, (s, e)) in self.components.iter_mut().zip(fitted) {
            c.start_time = s;
            c.end_time = e;
        }
        self.duration = duration;
        Ok(())
    }

    /// Render options for playing back this model.
    pub fn render_options(&self, filter: Option<FilterSpec>) -> RenderOptions {
        RenderOptions {
            pitch_multiplier: self.audio.pitch_multiplier,
            filter,
            duration: self.duration,
            sample_rate: self.audio.sample_rate as f64,
            master_volume: self.audio.master_volume,
            mode: self.mode,
        }
    }

    fn index_of(&self, id: &str) -> Result<usize, EditError> {
        self.components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| EditError::UnknownComponent { id: id.to_string() })
    }
}
