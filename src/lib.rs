pub mod analysis;
pub mod component;
pub mod dsp;
pub mod error;
pub mod model;
pub mod playback;
pub mod session;

use crate::model::SignalModel;
use crate::playback::PlaybackKind;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the ftfilter-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

fn load(session_json: &str) -> Result<SignalModel, JsValue> {
    session::load_session(session_json).map_err(|e| JsValue::from_str(&format!("{e}")))
}

fn parse_kind(kind: &str) -> Result<PlaybackKind, JsValue> {
    kind.parse::<PlaybackKind>().map_err(|e| JsValue::from_str(&e))
}

/// WASM-exposed: run the visualization pipeline for a saved session and
/// return `{ original, reconstructed, spectrum }`.
#[wasm_bindgen]
pub fn analyse_session(session_json: &str) -> Result<JsValue, JsValue> {
    let model = load(session_json)?;
    let result = analysis::analyse(&model).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render `"original"` or `"reconstructed"` audio for a
/// session as mono f32 samples.
#[wasm_bindgen]
pub fn render_session_samples(session_json: &str, kind: &str) -> Result<Vec<f32>, JsValue> {
    let model = load(session_json)?;
    let samples = playback::render_playback(&model, parse_kind(kind)?);
    Ok(samples.iter().map(|&s| s as f32).collect())
}

/// WASM-exposed: render session audio to a WAV byte array.
#[wasm_bindgen]
pub fn render_session_wav(session_json: &str, kind: &str) -> Result<Vec<u8>, JsValue> {
    let model = load(session_json)?;
    let samples = playback::render_playback(&model, parse_kind(kind)?);
    Ok(dsp::renderer::render_wav(&samples, model.audio.sample_rate))
}

/// WASM-exposed: validate an imported component list and return it in
/// canonical form (defaults filled in, ids assigned).
#[wasm_bindgen]
pub fn normalize_components(components_json: &str) -> Result<JsValue, JsValue> {
    let mut model = SignalModel::empty();
    session::import_components(&mut model, components_json)
        .map_err(|e| JsValue::from_str(&format!("{e}")))?;
    serde_wasm_bindgen::to_value(&session::export_components(&model))
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}
