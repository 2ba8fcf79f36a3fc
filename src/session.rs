//! Import/export of component lists and whole sessions.
//!
//! The component list is stored as an array of [`ComponentRecord`]s. A
//! session additionally carries filter and display settings:
//!
//! ```json
//! { "components": [{ "freq": 2, "amp": 1 }], "filterCenter": 5,
//!   "filterWidth": 4, "filterType": "square", "timeBase": 2,
//!   "showAxis": true, "smoothing": 0, "signalMode": "ideal" }
//! ```
//!
//! Imports are all-or-nothing: the model is only modified once every
//! record has been parsed and validated.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::component::{ComponentRecord, SignalComponent};
use crate::dsp::compositor::SignalMode;
use crate::dsp::filter::FilterKind;
use crate::error::{FtFilterError, ImportError};
use crate::model::{AudioSettings, SignalModel};

/// Saved session settings. Missing fields keep the model's current values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_center: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<FilterKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_base: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_axis: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_mode: Option<SignalMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioSettings>,
}

impl SessionState {
    /// Snapshot `model` in the persisted shape.
    pub fn from_model(model: &SignalModel) -> Self {
        let records: Vec<Value> = model
            .components
            .iter()
            .map(|c| record_value(&c.to_record()))
            .collect();
        SessionState {
            components: Some(Value::Array(records)),
            filter_center: Some(model.filter.center),
            filter_width: Some(model.filter.width),
            filter_type: Some(model.filter.kind),
            time_base: Some(model.duration),
            show_axis: Some(model.show_axis),
            smoothing: Some(model.smoothing),
            signal_mode: Some(model.mode),
            audio: Some(model.audio),
        }
    }

    /// Apply this session to `model`. On error `model` is unchanged.
    pub fn apply(&self, model: &mut SignalModel) -> Result<(), FtFilterError> {
        let mut next = model.clone();
        if let Some(duration) = self.time_base {
            next.set_duration(duration)?;
        }
        if let Some(width) = self.filter_width {
            next.set_filter_width(width)?;
        }
        if let Some(center) = self.filter_center {
            next.set_filter_center(center)?;
        }
        if let Some(kind) = self.filter_type {
            next.set_filter_kind(kind);
        }
        if let Some(show) = self.show_axis {
            next.show_axis = show;
        }
        if let Some(smoothing) = self.smoothing {
            next.set_smoothing(smoothing)?;
        }
        if let Some(mode) = self.signal_mode {
            next.set_mode(mode);
        }
        if let Some(audio) = self.audio {
            next.set_audio(audio)?;
        }
        if let Some(components) = &self.components {
            let parsed = parse_component_values(components, &mut next)?;
            next.replace_components(parsed);
        }
        *model = next;
        Ok(())
    }
}

fn record_value(record: &ComponentRecord) -> Value {
    // Records only hold numbers, strings and JSON values.
    serde_json::to_value(record).unwrap_or(Value::Null)
}

/// Parse a component-list payload against `model` without modifying the
/// list. Ids missing from a record, or repeated, are freshly allocated.
fn parse_component_values(
    payload: &Value,
    model: &mut SignalModel,
) -> Result<Vec<SignalComponent>, ImportError> {
    let Value::Array(items) = payload else {
        warn!("component import rejected: payload is not an array");
        return Err(ImportError::NotAnArray);
    };

    let mut components: Vec<SignalComponent> = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            return Err(ImportError::MalformedRecord {
                index,
                reason: "expected an object".to_string(),
            });
        }
        let record: ComponentRecord =
            serde_json::from_value(item.clone()).map_err(|e| ImportError::MalformedRecord {
                index,
                reason: e.to_string(),
            })?;
        let fallback = model.fresh_id();
        let mut component = SignalComponent::from_record(&record, fallback, model.duration)
            .map_err(|e| ImportError::MalformedRecord {
                index,
                reason: e.to_string(),
            })?;
        if components.iter().any(|c| c.id == component.id) {
            component.id = model.fresh_id();
        }
        components.push(component);
    }
    Ok(components)
}

/// Parse a JSON component list without touching any model state beyond
/// id allocation.
pub fn parse_components(
    json: &str,
    model: &mut SignalModel,
) -> Result<Vec<SignalComponent>, ImportError> {
    let payload: Value = serde_json::from_str(json).map_err(|e| ImportError::InvalidJson {
        reason: e.to_string(),
    })?;
    parse_component_values(&payload, model)
}

/// Replace `model`'s components with the list in `json`. Returns the number
/// of components imported. On error the component list is unchanged.
pub fn import_components(model: &mut SignalModel, json: &str) -> Result<usize, FtFilterError> {
    let mut scratch = model.clone();
    let components = parse_components(json, &mut scratch).inspect_err(|e| {
        warn!(error = %e, "component import rejected");
    })?;
    let count = components.len();
    scratch.replace_components(components);
    *model = scratch;
    debug!(count, "components imported");
    Ok(count)
}

/// The component list as persisted records.
pub fn export_components(model: &SignalModel) -> Vec<ComponentRecord> {
    model.components.iter().map(SignalComponent::to_record).collect()
}

/// The component list as a JSON array.
pub fn export_components_json(model: &SignalModel) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export_components(model))
}

/// Serialize the full session.
pub fn save_session(model: &SignalModel) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SessionState::from_model(model))
}

/// Restore a session onto a default model.
pub fn load_session(json: &str) -> Result<SignalModel, FtFilterError> {
    let state: SessionState = serde_json::from_str(json).map_err(|e| ImportError::InvalidJson {
        reason: e.to_string(),
    })?;
    let mut model = SignalModel::default();
    state.apply(&mut model)?;
    Ok(model)
}
