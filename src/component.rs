//! Signal components and their persisted record shape.
//!
//! `SignalComponent` is the typed form used by the DSP pipeline.
//! `ComponentRecord` mirrors the JSON objects stored by the frontend
//! (`freq`, `amp`, `waveType`, `envelopeParams`, ...), where every field is
//! optional and falls back to the component defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::dsp::compositor::SignalMode;
use crate::dsp::envelope::{Envelope, EnvelopeKind};
use crate::dsp::oscillator::{self, Waveform};
use crate::error::EditError;

/// Gap enforced between start and end when an edit would invert the window.
pub const MIN_WINDOW_GAP: f64 = 0.1;

/// Windows shorter than this are treated as un-enveloped.
pub const MIN_ENVELOPE_WINDOW: f64 = 0.01;

pub const DEFAULT_FREQUENCY: f64 = 10.0;
pub const DEFAULT_AMPLITUDE: f64 = 0.5;

/// One additive source in the composed signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalComponent {
    pub id: String,
    /// Frequency in Hz (> 0).
    pub frequency: f64,
    /// Peak amplitude (≥ 0).
    pub amplitude: f64,
    /// Phase offset in radians.
    pub phase: f64,
    pub waveform: Waveform,
    /// Active window start in seconds.
    pub start_time: f64,
    /// Active window end in seconds, always greater than `start_time`.
    pub end_time: f64,
    pub envelope: Envelope,
}

impl SignalComponent {
    /// A sine component spanning `[0, max_duration]` with a flat envelope.
    pub fn new(id: impl Into<String>, frequency: f64, amplitude: f64, max_duration: f64) -> Self {
        SignalComponent {
            id: id.into(),
            frequency,
            amplitude,
            phase: 0.0,
            waveform: Waveform::Sine,
            start_time: 0.0,
            end_time: max_duration,
            envelope: Envelope::Square,
        }
    }

    pub fn window_duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Whether `t` falls inside the active window (inclusive).
    pub fn is_active(&self, t: f64) -> bool {
        t >= self.start_time && t <= self.end_time
    }

    /// Position of `t` within the active window, as a fraction in [0, 1].
    pub fn normalized_time(&self, t: f64) -> Result<f64, EditError> {
        let duration = self.window_duration();
        if duration < MIN_ENVELOPE_WINDOW {
            return Err(EditError::DegenerateEnvelope { duration });
        }
        Ok(((t - self.start_time) / duration).clamp(0.0, 1.0))
    }

    /// Gate × envelope gain at time `t`: zero outside the window.
    pub fn window_gain(&self, t: f64) -> f64 {
        if !self.is_active(t) {
            return 0.0;
        }
        match self.normalized_time(t) {
            Ok(tn) => self.envelope.evaluate(tn),
            Err(_) => 1.0,
        }
    }

    /// Contribution at time `t` with the carrier frequency scaled by
    /// `pitch_multiplier`. Window times are not scaled.
    pub fn sample(&self, t: f64, mode: SignalMode, pitch_multiplier: f64) -> f64 {
        let gain = match mode {
            SignalMode::Ideal => 1.0,
            SignalMode::Gated => {
                let g = self.window_gain(t);
                if g == 0.0 {
                    return 0.0;
                }
                g
            }
        };
        let carrier = oscillator::evaluate(
            t,
            self.frequency * pitch_multiplier,
            self.phase,
            self.waveform,
        );
        self.amplitude * carrier * gain
    }

    /// Reject out-of-domain values before they reach the DSP core.
    pub fn validate(&self) -> Result<(), EditError> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(EditError::InvalidParameter {
                name: "frequency",
                value: self.frequency,
            });
        }
        if !(self.amplitude.is_finite() && self.amplitude >= 0.0) {
            return Err(EditError::InvalidParameter {
                name: "amplitude",
                value: self.amplitude,
            });
        }
        if !self.phase.is_finite() {
            return Err(EditError::InvalidParameter {
                name: "phase",
                value: self.phase,
            });
        }
        if !(self.start_time < self.end_time) {
            return Err(EditError::InvalidWindow {
                start: self.start_time,
                end: self.end_time,
            });
        }
        validate_envelope(&self.envelope)
    }

    /// Persisted record for this component.
    pub fn to_record(&self) -> ComponentRecord {
        let envelope_params = match self.envelope {
            Envelope::Gaussian { center, width } => json!({ "center": center, "width": width }),
            Envelope::Adsr {
                attack,
                decay,
                sustain,
                release,
            } => json!({ "a": attack, "d": decay, "s": sustain, "r": release }),
            Envelope::Square => json!({}),
        };
        ComponentRecord {
            id: Some(self.id.clone()),
            freq: Some(self.frequency),
            amp: Some(self.amplitude),
            phase: Some(self.phase),
            wave_type: Some(self.waveform),
            start_time: Some(self.start_time),
            end_time: Some(self.end_time),
            envelope_type: Some(self.envelope.kind()),
            envelope_params: Some(envelope_params),
        }
    }

    /// Build a component from a persisted record, filling in defaults.
    ///
    /// The window is clamped into `[0, max_duration]` and repaired with the
    /// same rule as interactive edits.
    pub fn from_record(
        record: &ComponentRecord,
        fallback_id: impl Into<String>,
        max_duration: f64,
    ) -> Result<Self, EditError> {
        let kind = record.envelope_type.unwrap_or_default();
        let envelope = parse_envelope(kind, record.envelope_params.as_ref())?;
        let (start_time, end_time) = fit_window(
            record.start_time.unwrap_or(0.0),
            record.end_time.unwrap_or(max_duration),
            max_duration,
            WindowEdge::Start,
        )?;

        let component = SignalComponent {
            id: record.id.clone().unwrap_or_else(|| fallback_id.into()),
            frequency: record.freq.unwrap_or(DEFAULT_FREQUENCY),
            amplitude: record.amp.unwrap_or(DEFAULT_AMPLITUDE),
            phase: record.phase.unwrap_or(0.0),
            waveform: record.wave_type.unwrap_or_default(),
            start_time,
            end_time,
            envelope,
        };
        component.validate()?;
        Ok(component)
    }
}

/// The persisted JSON shape of a component. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub freq: Option<f64>,
    #[serde(default)]
    pub amp: Option<f64>,
    #[serde(default)]
    pub phase: Option<f64>,
    #[serde(default)]
    pub wave_type: Option<Waveform>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub envelope_type: Option<EnvelopeKind>,
    /// Parameters for `envelope_type`; stray keys are ignored.
    #[serde(default)]
    pub envelope_params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GaussianParams {
    #[serde(default = "default_gaussian_center")]
    center: f64,
    #[serde(default = "default_gaussian_width")]
    width: f64,
}

#[derive(Debug, Deserialize)]
struct AdsrParams {
    #[serde(default = "default_adsr_a")]
    a: f64,
    #[serde(default = "default_adsr_d")]
    d: f64,
    #[serde(default = "default_adsr_s")]
    s: f64,
    #[serde(default = "default_adsr_r")]
    r: f64,
}

fn default_gaussian_center() -> f64 {
    0.5
}
fn default_gaussian_width() -> f64 {
    0.15
}
fn default_adsr_a() -> f64 {
    0.1
}
fn default_adsr_d() -> f64 {
    0.1
}
fn default_adsr_s() -> f64 {
    0.7
}
fn default_adsr_r() -> f64 {
    0.2
}

fn parse_envelope(kind: EnvelopeKind, params: Option<&Value>) -> Result<Envelope, EditError> {
    let params = match params {
        None | Some(Value::Null) => return Ok(Envelope::for_kind(kind)),
        Some(v) => v.clone(),
    };
    let envelope = match kind {
        EnvelopeKind::Square => Envelope::Square,
        EnvelopeKind::Gaussian => {
            let p: GaussianParams = serde_json::from_value(params).map_err(|_| {
                EditError::InvalidParameter {
                    name: "envelopeParams",
                    value: f64::NAN,
                }
            })?;
            Envelope::Gaussian {
                center: p.center,
                width: p.width,
            }
        }
        EnvelopeKind::Adsr => {
            let p: AdsrParams = serde_json::from_value(params).map_err(|_| {
                EditError::InvalidParameter {
                    name: "envelopeParams",
                    value: f64::NAN,
                }
            })?;
            Envelope::Adsr {
                attack: p.a,
                decay: p.d,
                sustain: p.s,
                release: p.r,
            }
        }
    };
    Ok(envelope)
}

/// Check envelope parameters: gaussian centre in [0, 1] and width > 0,
/// ADSR fractions in [0, 1].
pub fn validate_envelope(envelope: &Envelope) -> Result<(), EditError> {
    let in_unit = |name: &'static str, value: f64| {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(EditError::InvalidParameter { name, value })
        }
    };
    match *envelope {
        Envelope::Gaussian { center, width } => {
            in_unit("center", center)?;
            if !(width.is_finite() && width > 0.0) {
                return Err(EditError::InvalidParameter {
                    name: "width",
                    value: width,
                });
            }
            Ok(())
        }
        Envelope::Adsr {
            attack,
            decay,
            sustain,
            release,
        } => {
            in_unit("a", attack)?;
            in_unit("d", decay)?;
            in_unit("s", sustain)?;
            in_unit("r", release)
        }
        Envelope::Square => Ok(()),
    }
}

/// Which bound of the window an edit moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEdge {
    Start,
    End,
}

/// Clamp a window into `[0, max_duration]`, keeping `start < end`.
///
/// When the pair would invert, the bound that was *not* edited is pushed by
/// `MIN_WINDOW_GAP`. If the pair still inverts against the clamp, the edited
/// bound yields as well.
pub fn fit_window(
    start: f64,
    end: f64,
    max_duration: f64,
    edited: WindowEdge,
) -> Result<(f64, f64), EditError> {
    if !(start.is_finite() && end.is_finite() && max_duration > 0.0) {
        return Err(EditError::InvalidWindow { start, end });
    }
    let mut start = start.clamp(0.0, max_duration);
    let mut end = end.clamp(0.0, max_duration);

    if start >= end {
        match edited {
            WindowEdge::Start => {
                end = (start + MIN_WINDOW_GAP).min(max_duration);
                if start >= end {
                    start = (end - MIN_WINDOW_GAP).max(0.0);
                }
            }
            WindowEdge::End => {
                start = (end - MIN_WINDOW_GAP).max(0.0);
                if start >= end {
                    end = (start + MIN_WINDOW_GAP).min(max_duration);
                }
            }
        }
    }

    if start < end {
        Ok((start, end))
    } else {
        Err(EditError::InvalidWindow { start, end })
    }
}
