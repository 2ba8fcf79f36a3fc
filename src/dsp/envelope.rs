//! Amplitude envelopes evaluated over a component's normalized active window.

use serde::{Deserialize, Serialize};

/// Envelope tag, as stored in the `envelopeType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    Gaussian,
    Adsr,
    #[default]
    Square,
}

/// An envelope shape together with the parameters relevant to it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Envelope {
    /// Bell curve centred at `center` (fraction of the window).
    Gaussian { center: f64, width: f64 },
    /// Linear ADSR. `attack`, `decay` and `release` are fractions of the
    /// window; `sustain` is a level in [0, 1].
    Adsr {
        attack: f64,
        decay: f64,
        sustain: f64,
        release: f64,
    },
    /// Flat gain of 1.
    #[default]
    Square,
}

impl Envelope {
    pub const DEFAULT_GAUSSIAN: Envelope = Envelope::Gaussian {
        center: 0.5,
        width: 0.15,
    };

    pub const DEFAULT_ADSR: Envelope = Envelope::Adsr {
        attack: 0.1,
        decay: 0.1,
        sustain: 0.7,
        release: 0.2,
    };

    /// The default-parameter envelope for `kind`.
    pub fn for_kind(kind: EnvelopeKind) -> Self {
        match kind {
            EnvelopeKind::Gaussian => Self::DEFAULT_GAUSSIAN,
            EnvelopeKind::Adsr => Self::DEFAULT_ADSR,
            EnvelopeKind::Square => Envelope::Square,
        }
    }

    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Envelope::Gaussian { .. } => EnvelopeKind::Gaussian,
            Envelope::Adsr { .. } => EnvelopeKind::Adsr,
            Envelope::Square => EnvelopeKind::Square,
        }
    }

    /// Gain in [0, 1] at normalized window time `t` ∈ [0, 1].
    pub fn evaluate(&self, t: f64) -> f64 {
        let gain = match *self {
            Envelope::Gaussian { center, width } => {
                let d = t - center;
                (-(d * d) / (2.0 * width * width)).exp()
            }
            Envelope::Square => 1.0,
            Envelope::Adsr {
                attack,
                decay,
                sustain,
                release,
            } => adsr(t, attack, decay, sustain, release),
        };
        gain.clamp(0.0, 1.0)
    }
}

fn adsr(t: f64, attack: f64, decay: f64, sustain: f64, release: f64) -> f64 {
    let decay_end = attack + decay;
    let release_start = 1.0 - release;

    if t >= 1.0 {
        return 0.0;
    }
    if t < attack {
        // t < attack implies attack > 0
        t / attack
    } else if t < decay_end {
        let progress = if decay > 0.0 { (t - attack) / decay } else { 1.0 };
        1.0 - (1.0 - sustain) * progress
    } else if t < release_start {
        sustain
    } else if release > 0.0 {
        let progress = (t - release_start) / release;
        (sustain * (1.0 - progress)).max(0.0)
    } else {
        0.0
    }
}
