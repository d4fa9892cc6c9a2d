//! Axis: a named, ordered registry of category labels.
//!
//! Categories keep their insertion order, which is the "natural order" used by
//! traversal when no explicit sort direction is requested. Each category owns a
//! small key/value metadata map.

use crate::error::{CubeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// Metadata attached to one category.
pub type CategoryMetadata = BTreeMap<String, JsonValue>;

/// Whether an axis may grow when a new label is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// New labels are registered on first use.
    #[default]
    Dynamic,
    /// The category list is closed; unknown labels are rejected.
    Fixed,
}

/// A named dimension of a cube.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    name: String,
    kind: AxisKind,
    categories: Vec<String>,
    index: HashMap<String, usize>,
    metadata: BTreeMap<String, CategoryMetadata>,
}

impl Axis {
    /// Create an empty dynamic axis.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AxisKind::Dynamic,
            categories: Vec::new(),
            index: HashMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Create a dynamic axis seeded with initial categories.
    ///
    /// Repeated labels collapse onto their first occurrence.
    pub fn with_categories<I, S>(name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut axis = Self::new(name);
        for category in categories {
            axis.push(category.into());
        }
        axis
    }

    /// Create a fixed axis whose category list cannot grow.
    pub fn fixed<I, S>(name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut axis = Self::with_categories(name, categories);
        axis.kind = AxisKind::Fixed;
        axis
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    pub fn is_fixed(&self) -> bool {
        self.kind == AxisKind::Fixed
    }

    /// Categories in natural (insertion) order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn has_category(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Append `label` if it is not yet registered.
    ///
    /// Fails on fixed axes when the label is new.
    pub fn add_category(&mut self, label: impl Into<String>) -> Result<()> {
        self.register_or_get(label).map(|_| ())
    }

    /// Return the ordinal of `label`, registering it first on dynamic axes.
    pub fn register_or_get(&mut self, label: impl Into<String>) -> Result<usize> {
        let label = label.into();
        if let Some(&ordinal) = self.index.get(&label) {
            return Ok(ordinal);
        }
        if self.is_fixed() {
            return Err(self.unknown(&label));
        }
        trace!(axis = %self.name, category = %label, "registering category");
        Ok(self.push(label))
    }

    /// Ordinal of an existing category.
    pub fn index_of(&self, label: &str) -> Result<usize> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| self.unknown(label))
    }

    /// Label stored at `ordinal`, if any.
    pub fn category(&self, ordinal: usize) -> Option<&str> {
        self.categories.get(ordinal).map(String::as_str)
    }

    /// Replace the category list and rebuild the ordinal index.
    ///
    /// Metadata of categories that are no longer present is dropped.
    pub(crate) fn set_categories<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.clear();
        self.index.clear();
        for category in categories {
            self.push(category.into());
        }
        let index = &self.index;
        self.metadata.retain(|category, _| index.contains_key(category));
    }

    pub fn set_metadata(
        &mut self,
        category: &str,
        key: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Result<()> {
        if !self.has_category(category) {
            return Err(self.unknown(category));
        }
        self.metadata
            .entry(category.to_string())
            .or_default()
            .insert(key.into(), value.into());
        Ok(())
    }

    pub fn get_metadata(&self, category: &str, key: &str) -> Result<&JsonValue> {
        self.metadata
            .get(category)
            .and_then(|entries| entries.get(key))
            .ok_or_else(|| CubeError::MetadataNotFound {
                axis: self.name.clone(),
                category: category.to_string(),
                key: key.to_string(),
            })
    }

    /// All metadata recorded for `category`.
    pub fn category_metadata(&self, category: &str) -> Option<&CategoryMetadata> {
        self.metadata.get(category)
    }

    /// Metadata for every annotated category, keyed by label.
    pub fn metadata(&self) -> &BTreeMap<String, CategoryMetadata> {
        &self.metadata
    }

    fn push(&mut self, label: String) -> usize {
        if let Some(&ordinal) = self.index.get(&label) {
            return ordinal;
        }
        let ordinal = self.categories.len();
        self.index.insert(label.clone(), ordinal);
        self.categories.push(label);
        ordinal
    }

    fn unknown(&self, label: &str) -> CubeError {
        CubeError::UnknownCategory {
            axis: self.name.clone(),
            category: label.to_string(),
        }
    }
}
