//! Playback requests: render the original or reconstructed signal as audio.
//!
//! Rendering is synchronous here. With the `worker` feature,
//! [`PlaybackWorker`] runs renders on a blocking thread and cancels a
//! superseded render of the same kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dsp::engine::{AudioEngine, RenderOptions};
use crate::model::SignalModel;

#[cfg(feature = "worker")]
pub mod worker;
#[cfg(feature = "worker")]
pub use worker::{PlaybackTicket, PlaybackWorker};

/// Which signal a playback request plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackKind {
    /// The composed signal, evaluated directly.
    Original,
    /// The band-pass filtered signal, resynthesized from harmonics.
    Reconstructed,
}

impl fmt::Display for PlaybackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackKind::Original => write!(f, "original"),
            PlaybackKind::Reconstructed => write!(f, "reconstructed"),
        }
    }
}

impl FromStr for PlaybackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(PlaybackKind::Original),
            "reconstructed" | "filtered" => Ok(PlaybackKind::Reconstructed),
            other => Err(format!("Unknown playback kind '{other}'")),
        }
    }
}

/// Render options for playing `kind` from `model`.
pub fn render_options(model: &SignalModel, kind: PlaybackKind) -> RenderOptions {
    let filter = match kind {
        PlaybackKind::Original => None,
        PlaybackKind::Reconstructed => Some(model.filter),
    };
    model.render_options(filter)
}

/// Render the full audio buffer for `kind`.
pub fn render_playback(model: &SignalModel, kind: PlaybackKind) -> Vec<f64> {
    AudioEngine::new(render_options(model, kind)).render(&model.components)
}
