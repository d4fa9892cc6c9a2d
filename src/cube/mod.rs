//! Sparse N-dimensional cube storage.
//!
//! A cube owns an ordered list of axes and a sparse map from storage keys
//! (one category ordinal per axis, in axis order) to cell values. Only
//! coordinates that were explicitly written are present; absence means
//! "no value recorded".

pub mod cursor;

pub use cursor::{Cursor, Slot};

use crate::axis::Axis;
use crate::error::{CubeError, Result};
use crate::value::{CubeKind, Value};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Category labels of a full coordinate, one per axis.
pub type Coordinate = Vec<String>;

/// Storage key: category ordinals in cube axis order.
pub(crate) type StorageKey = Vec<usize>;

/// A sparse labeled data cube.
#[derive(Debug, Clone, PartialEq)]
pub struct DataCube {
    name: String,
    kind: CubeKind,
    axes: Vec<Axis>,
    cells: BTreeMap<StorageKey, Value>,
    metadata: BTreeMap<String, JsonValue>,
}

impl DataCube {
    /// Create an empty cube over `axes`. Axis names must be unique.
    pub fn new(name: impl Into<String>, kind: CubeKind, axes: Vec<Axis>) -> Result<Self> {
        let mut seen = HashSet::new();
        for axis in &axes {
            if !seen.insert(axis.name()) {
                return Err(CubeError::DuplicateAxis(axis.name().to_string()));
            }
        }
        Ok(Self {
            name: name.into(),
            kind,
            axes,
            cells: BTreeMap::new(),
            metadata: BTreeMap::new(),
        })
    }

    /// Create a cube storing numbers.
    pub fn numeric(name: impl Into<String>, axes: Vec<Axis>) -> Result<Self> {
        Self::new(name, CubeKind::Numeric, axes)
    }

    /// Create a cube storing records.
    pub fn structured(name: impl Into<String>, axes: Vec<Axis>) -> Result<Self> {
        Self::new(name, CubeKind::Structured, axes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CubeKind {
        self.kind
    }

    /// Axes in dimensionality order.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.name() == name)
    }

    /// Annotate a category of the named axis.
    ///
    /// Fails with `UnknownAxis` or `UnknownCategory`; categories are never
    /// registered here.
    pub fn set_category_metadata(
        &mut self,
        axis: &str,
        category: &str,
        key: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Result<()> {
        let position = self.axis_position(axis)?;
        self.axes[position].set_metadata(category, key, value)
    }

    /// Position of the named axis in the cube's axis order.
    pub fn axis_position(&self, name: &str) -> Result<usize> {
        self.axes
            .iter()
            .position(|axis| axis.name() == name)
            .ok_or_else(|| CubeError::UnknownAxis(name.to_string()))
    }

    /// Open a cursor for addressing a single cell.
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor::new(self)
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Stored cells in store order, with labels in cube axis order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &Value)> + '_ {
        self.cells
            .iter()
            .map(move |(key, value)| (self.labels_of(key), value))
    }

    /// Whether a value is stored at the labeled coordinate.
    ///
    /// Unknown labels never grow axes; they simply mean "no value".
    pub fn has_value<S: AsRef<str>>(&self, coordinate: &[S]) -> Result<bool> {
        Ok(match self.lookup_key(coordinate)? {
            Some(key) => self.cells.contains_key(&key),
            None => false,
        })
    }

    /// Value stored at the labeled coordinate, without numeric defaulting.
    pub fn get<S: AsRef<str>>(&self, coordinate: &[S]) -> Result<Option<&Value>> {
        Ok(self
            .lookup_key(coordinate)?
            .and_then(|key| self.cells.get(&key)))
    }

    /// Remove the value stored at the labeled coordinate, returning it.
    pub fn delete_value<S: AsRef<str>>(&mut self, coordinate: &[S]) -> Result<Option<Value>> {
        let removed = match self.lookup_key(coordinate)? {
            Some(key) => self.cells.remove(&key),
            None => None,
        };
        if removed.is_some() {
            debug!(cube = %self.name, "deleted cell");
        }
        Ok(removed)
    }

    /// Remove categories from an axis.
    ///
    /// Their metadata is dropped, cells addressing them are discarded and the
    /// remaining cells are re-keyed against the compacted category list.
    /// Labels that are not on the axis are ignored.
    pub fn remove_categories<S: AsRef<str>>(&mut self, axis_name: &str, labels: &[S]) -> Result<usize> {
        let position = self.axis_position(axis_name)?;
        let doomed: HashSet<&str> = labels.iter().map(AsRef::as_ref).collect();

        let axis = &mut self.axes[position];
        let old: Vec<String> = axis.categories().to_vec();
        let remaining: Vec<String> = old
            .iter()
            .filter(|c| !doomed.contains(c.as_str()))
            .cloned()
            .collect();
        if remaining.len() == old.len() {
            return Ok(0);
        }

        // old ordinal -> new ordinal, None when removed
        let remap: Vec<Option<usize>> = {
            let mut next = 0;
            old.iter()
                .map(|c| {
                    if doomed.contains(c.as_str()) {
                        None
                    } else {
                        next += 1;
                        Some(next - 1)
                    }
                })
                .collect()
        };
        axis.set_categories(remaining);

        let before = self.cells.len();
        let cells = std::mem::take(&mut self.cells);
        self.cells = cells
            .into_iter()
            .filter_map(|(mut key, value)| {
                let ordinal = remap[key[position]]?;
                key[position] = ordinal;
                Some((key, value))
            })
            .collect();
        let dropped = before - self.cells.len();

        debug!(
            cube = %self.name,
            axis = axis_name,
            removed_categories = old.len() - self.axes[position].len(),
            dropped_cells = dropped,
            "removed categories"
        );
        Ok(dropped)
    }

    /// Store cube-level metadata.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&JsonValue> {
        self.metadata.get(key)
    }

    /// All cube-level metadata.
    pub fn metadata(&self) -> &BTreeMap<String, JsonValue> {
        &self.metadata
    }

    pub(crate) fn cells(&self) -> &BTreeMap<StorageKey, Value> {
        &self.cells
    }

    pub(crate) fn axes_mut(&mut self) -> &mut [Axis] {
        &mut self.axes
    }

    /// Labels for a storage key, in cube axis order.
    pub(crate) fn labels_of(&self, key: &[usize]) -> Coordinate {
        self.axes
            .iter()
            .zip(key)
            .map(|(axis, &ordinal)| axis.category(ordinal).unwrap_or_default().to_string())
            .collect()
    }

    /// Check that `value` matches the cube's kind.
    pub(crate) fn check_kind(&self, value: &Value) -> Result<()> {
        if value.kind() == self.kind {
            Ok(())
        } else {
            Err(CubeError::ValueKindMismatch {
                expected: self.kind.as_str(),
                found: value.kind().as_str(),
            })
        }
    }

    pub(crate) fn read(&self, key: &[usize]) -> Option<&Value> {
        self.cells.get(key)
    }

    /// Store `value` at `key`. NaN and infinities are rejected so every
    /// stored number survives the document codec.
    pub(crate) fn write(&mut self, key: StorageKey, value: Value) -> Result<()> {
        self.check_kind(&value)?;
        if let Value::Number(n) = value {
            if !n.is_finite() {
                return Err(CubeError::NonFiniteNumber(n));
            }
        }
        self.cells.insert(key, value);
        Ok(())
    }

    pub(crate) fn remove(&mut self, key: &[usize]) -> Option<Value> {
        self.cells.remove(key)
    }

    /// Resolve labels to a storage key without growing any axis.
    fn lookup_key<S: AsRef<str>>(&self, coordinate: &[S]) -> Result<Option<StorageKey>> {
        if coordinate.len() != self.axes.len() {
            return Err(CubeError::SchemaMismatch(format!(
                "coordinate has {} labels, cube '{}' has {} axes",
                coordinate.len(),
                self.name,
                self.axes.len()
            )));
        }
        let mut key = Vec::with_capacity(coordinate.len());
        for (axis, label) in self.axes.iter().zip(coordinate) {
            match axis.index_of(label.as_ref()) {
                Ok(ordinal) => key.push(ordinal),
                Err(_) => return Ok(None),
            }
        }
        Ok(Some(key))
    }
}
