//! Lookup from style type names to decoders.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{RendererError, Result};
use crate::style::{
    SimpleLineStyle, SimpleMarkerStyle, SimplePolygonStyle, SimpleTextLineStyle,
    SimpleTextMarkerStyle, Style, StyleType,
};

/// Decodes a style record into a style instance.
pub type StyleFactory = fn(&Value) -> Result<Box<dyn Style>>;

fn decode_boxed<S: StyleType>(record: &Value) -> Result<Box<dyn Style>> {
    Ok(Box::new(S::from_record(record)?))
}

/// Registry of style types keyed by the `name` tag of their record.
///
/// The default registry knows the five built-in styles. Further types can be
/// registered before records naming them are decoded.
#[derive(Clone)]
pub struct StyleRegistry {
    factories: HashMap<String, StyleFactory>,
}

impl StyleRegistry {
    /// A registry with no style types.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `name`, returning any factory it replaces.
    pub fn register(&mut self, name: impl Into<String>, factory: StyleFactory) -> Option<StyleFactory> {
        self.factories.insert(name.into(), factory)
    }

    /// Register a concrete style type under its own name.
    pub fn register_type<S: StyleType>(&mut self) -> &mut Self {
        self.factories
            .insert(S::NAME.to_string(), decode_boxed::<S> as StyleFactory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Decode a style record.
    pub fn build(&self, record: &Value) -> Result<Box<dyn Style>> {
        let name = record
            .get("name")
            .and_then(Value::as_str)
            .ok_or(RendererError::MissingField("style.name"))?;

        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RendererError::UnknownStyleType(name.to_string()))?;

        factory(record)
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register_type::<SimpleMarkerStyle>()
            .register_type::<SimpleTextMarkerStyle>()
            .register_type::<SimpleLineStyle>()
            .register_type::<SimpleTextLineStyle>()
            .register_type::<SimplePolygonStyle>();
        registry
    }
}

impl std::fmt::Debug for StyleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleRegistry")
            .field("names", &self.names())
            .finish()
    }
}
