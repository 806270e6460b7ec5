//! Renderer configuration records.
//!
//! ```json
//! {
//!   "name": "SimpleFeatureRenderer",
//!   "style": { "name": "SimpleMarkerStyle", "type": "circle", "size": 6.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{RendererError, Result};
use crate::registry::StyleRegistry;
use crate::style::Style;

/// Type name written to renderer records.
pub const RENDERER_NAME: &str = "SimpleFeatureRenderer";

/// Serialized form of a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererRecord {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
}

/// Encode a renderer holding `style`.
pub fn encode(style: Option<&dyn Style>) -> Result<Value> {
    let record = RendererRecord {
        name: RENDERER_NAME.to_string(),
        style: style.map(|s| s.to_record()).transpose()?,
    };
    Ok(serde_json::to_value(record)?)
}

/// Decode the style held by a renderer record.
///
/// A record naming a different renderer type is accepted with a warning as
/// long as its style decodes.
pub fn decode_style(record: &Value, registry: &StyleRegistry) -> Result<Box<dyn Style>> {
    if !record.is_object() {
        return Err(RendererError::MissingField("style"));
    }
    let record: RendererRecord = serde_json::from_value(record.clone())?;

    if record.name != RENDERER_NAME {
        warn!(
            name = %record.name,
            expected = RENDERER_NAME,
            "Renderer record has an unexpected name"
        );
    }

    let style = record.style.ok_or(RendererError::MissingField("style"))?;
    registry.build(&style)
}
