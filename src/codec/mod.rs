//! Canonical document codec.
//!
//! A cube converts to a nested document holding its type tag, name, axes
//! (ordered categories plus per-category metadata) and the sparse data as an
//! explicit list of `(coordinate labels, value)` entries. Category ordinals are
//! never stored; they are derived from category order on load.
//!
//! The document renders to JSON or YAML text; both decode to the same cube.

pub mod checksum;

pub use checksum::{checksum, stamp_checksum, verify_checksum, CHECKSUM_KEY};

use crate::axis::{Axis, CategoryMetadata};
use crate::config::{CodecConfig, DocumentFormat};
use crate::cube::DataCube;
use crate::error::{CubeError, Result};
use crate::value::{CubeKind, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

/// The canonical serialized form of a cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeDocument {
    /// Type tag: `numeric` or `structured`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub axes: Vec<AxisDocument>,
    pub data: Vec<CellDocument>,
    /// Cube-level metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDocument {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, CategoryMetadata>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fixed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDocument {
    /// Category labels in document axis order
    pub coordinate: Vec<String>,
    pub value: Value,
}

/// Build the document for `cube`. Data entries follow store order.
pub fn to_document(cube: &DataCube) -> CubeDocument {
    let axes = cube
        .axes()
        .iter()
        .map(|axis| AxisDocument {
            name: axis.name().to_string(),
            categories: axis.categories().to_vec(),
            metadata: axis.metadata().clone(),
            fixed: axis.is_fixed(),
        })
        .collect();
    let data = cube
        .iter()
        .map(|(coordinate, value)| CellDocument {
            coordinate,
            value: value.clone(),
        })
        .collect();

    CubeDocument {
        kind: cube.kind().as_str().to_string(),
        name: cube.name().to_string(),
        axes,
        data,
        metadata: cube.metadata().clone(),
    }
}

/// Rebuild a cube, requiring the document's type tag to equal `expected`.
pub fn from_document(document: CubeDocument, expected: CubeKind) -> Result<DataCube> {
    let declared = parse_kind(&document.kind)?;
    if declared != expected {
        return Err(CubeError::SchemaMismatch(format!(
            "document '{}' holds a {} cube, expected {}",
            document.name, declared, expected
        )));
    }
    build(document, declared)
}

/// Rebuild a cube of whatever kind the document declares.
pub fn decode(document: CubeDocument) -> Result<DataCube> {
    let declared = parse_kind(&document.kind)?;
    build(document, declared)
}

/// The canonical nested dictionary for `cube`.
pub fn to_dict(cube: &DataCube) -> Result<JsonValue> {
    Ok(serde_json::to_value(to_document(cube))?)
}

/// Rebuild a cube from its nested dictionary form.
pub fn from_dict(dict: JsonValue, expected: CubeKind) -> Result<DataCube> {
    from_document(serde_json::from_value(dict)?, expected)
}

pub fn to_json_string(cube: &DataCube, pretty: bool) -> Result<String> {
    let document = to_document(cube);
    Ok(if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    })
}

pub fn from_json_str(text: &str, expected: CubeKind) -> Result<DataCube> {
    from_document(serde_json::from_str(text)?, expected)
}

pub fn to_yaml_string(cube: &DataCube) -> Result<String> {
    Ok(serde_yaml::to_string(&to_document(cube))?)
}

pub fn from_yaml_str(text: &str, expected: CubeKind) -> Result<DataCube> {
    from_document(serde_yaml::from_str(text)?, expected)
}

/// Render `cube` as text according to `config`.
///
/// When `config.stamp_checksum` is set the cube's checksum metadata is
/// refreshed before rendering.
#[instrument(skip_all, fields(cube = %cube.name(), format = ?config.format))]
pub fn encode_text(cube: &mut DataCube, config: &CodecConfig) -> Result<String> {
    if config.stamp_checksum {
        stamp_checksum(cube)?;
    }
    let text = match config.format {
        DocumentFormat::Json => to_json_string(cube, config.pretty)?,
        DocumentFormat::Yaml => to_yaml_string(cube)?,
    };
    debug!(bytes = text.len(), "encoded cube");
    Ok(text)
}

/// Parse text produced by [`encode_text`] back into a cube.
///
/// When `config.verify_checksum` is set a stored checksum must match the
/// decoded content.
#[instrument(skip_all, fields(format = ?config.format, expected = %expected))]
pub fn decode_text(text: &str, expected: CubeKind, config: &CodecConfig) -> Result<DataCube> {
    let cube = match config.format {
        DocumentFormat::Json => from_json_str(text, expected)?,
        DocumentFormat::Yaml => from_yaml_str(text, expected)?,
    };
    if config.verify_checksum {
        verify_checksum(&cube)?;
    }
    Ok(cube)
}

fn parse_kind(tag: &str) -> Result<CubeKind> {
    CubeKind::from_tag(tag)
        .ok_or_else(|| CubeError::SchemaMismatch(format!("unknown cube type '{}'", tag)))
}

#[instrument(skip_all, fields(cube = %document.name, kind = %kind))]
fn build(document: CubeDocument, kind: CubeKind) -> Result<DataCube> {
    let mut axes = Vec::with_capacity(document.axes.len());
    for axis_doc in document.axes {
        axes.push(build_axis(axis_doc)?);
    }

    let mut cube = DataCube::new(document.name, kind, axes).map_err(|e| match e {
        CubeError::DuplicateAxis(name) => {
            CubeError::SchemaMismatch(format!("axis '{}' declared twice", name))
        }
        other => other,
    })?;

    let arity = cube.axes().len();
    let entries = document.data.len();
    for cell in document.data {
        if cell.coordinate.len() != arity {
            return Err(CubeError::SchemaMismatch(format!(
                "coordinate {:?} has {} labels, expected {}",
                cell.coordinate,
                cell.coordinate.len(),
                arity
            )));
        }
        cube.check_kind(&cell.value)
            .map_err(|e| CubeError::SchemaMismatch(e.to_string()))?;

        let mut key = Vec::with_capacity(arity);
        for (axis, label) in cube.axes_mut().iter_mut().zip(&cell.coordinate) {
            key.push(axis.register_or_get(label.as_str())?);
        }
        if cube.read(&key).is_some() {
            return Err(CubeError::SchemaMismatch(format!(
                "coordinate {:?} appears more than once",
                cell.coordinate
            )));
        }
        cube.write(key, cell.value)?;
    }

    for (key, value) in document.metadata {
        cube.set_metadata(key, value);
    }

    debug!(axes = arity, entries, "decoded cube");
    Ok(cube)
}

fn build_axis(document: AxisDocument) -> Result<Axis> {
    let mut seen = HashSet::with_capacity(document.categories.len());
    if let Some(duplicate) = document
        .categories
        .iter()
        .find(|category| !seen.insert(category.as_str()))
    {
        return Err(CubeError::SchemaMismatch(format!(
            "category '{}' repeated on axis '{}'",
            duplicate, document.name
        )));
    }

    let mut axis = if document.fixed {
        Axis::fixed(document.name, document.categories)
    } else {
        Axis::with_categories(document.name, document.categories)
    };
    for (category, entries) in document.metadata {
        if !axis.has_category(&category) {
            return Err(CubeError::SchemaMismatch(format!(
                "metadata for unknown category '{}' on axis '{}'",
                category,
                axis.name()
            )));
        }
        for (key, value) in entries {
            axis.set_metadata(&category, key, value)?;
        }
    }
    Ok(axis)
}
