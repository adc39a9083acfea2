//! Shape schema: which parameters each shape kind exposes and how they are edited.
//!
//! The schema is read once from a JSON resource shaped as
//! `{ "<shape>": { "<param>": "1" | "n" | "text" } }`. A resource that is
//! missing or malformed yields an empty schema; objects then only expose
//! id, shape and material for editing.

use serde_json::{Map, Value};
use std::path::Path;

/// Editing kind of a single shape parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ParamKind {
    /// One numeric field.
    #[serde(rename = "1")]
    SingleNumber,
    /// Three numeric fields mapped onto the first three array elements.
    #[serde(rename = "n")]
    Vector3,
    /// Arbitrary JSON value edited as raw text.
    #[serde(rename = "text")]
    FreeText,
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ShapeEntry {
    name: String,
    params: Vec<(String, ParamKind)>,
}

/// Immutable for the session once loaded. Shape and parameter order follow the resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeSchema {
    shapes: Vec<ShapeEntry>,
}

impl ShapeSchema {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let raw: Map<String, Value> = serde_json::from_str(text)?;
        let mut shapes = Vec::with_capacity(raw.len());
        for (name, params) in raw {
            let params: Map<String, Value> = serde_json::from_value(params)?;
            let mut kinds = Vec::with_capacity(params.len());
            for (param, kind) in params {
                kinds.push((param, serde_json::from_value::<ParamKind>(kind)?));
            }
            shapes.push(ShapeEntry {
                name,
                params: kinds,
            });
        }
        Ok(Self { shapes })
    }

    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Loads the schema, degrading to an empty one on any failure.
    pub fn load(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(schema) => {
                log::info!(
                    "Loaded shape schema from {} ({} shapes)",
                    path.display(),
                    schema.shapes.len()
                );
                schema
            }
            Err(err) => {
                log::warn!(
                    "Failed to load shape schema {}: {}; shape parameters will not be editable",
                    path.display(),
                    err
                );
                Self::empty()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shape_names(&self) -> Vec<&str> {
        self.shapes.iter().map(|shape| shape.name.as_str()).collect()
    }

    pub fn contains(&self, shape: &str) -> bool {
        self.shapes.iter().any(|entry| entry.name == shape)
    }

    /// Declared parameters for `shape`, in declaration order. Unknown shapes have none.
    pub fn parameter_kinds_for(&self, shape: &str) -> &[(String, ParamKind)] {
        self.shapes
            .iter()
            .find(|entry| entry.name == shape)
            .map(|entry| entry.params.as_slice())
            .unwrap_or_default()
    }
}
