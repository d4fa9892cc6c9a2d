//! Cursor: a short-lived coordinate accumulator bound to one cube.
//!
//! The cursor mutably borrows its cube, so at most one cursor writes at a time
//! and every later cursor sees the writes of the earlier ones.

use super::{DataCube, StorageKey};
use crate::error::{CubeError, Result};
use crate::value::{CubeKind, Value};
use tracing::trace;

/// One coordinate slot per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Unset,
    /// Category ordinal on the slot's axis.
    Set(usize),
}

/// Addresses a single cell of a [`DataCube`].
#[derive(Debug)]
pub struct Cursor<'c> {
    cube: &'c mut DataCube,
    slots: Vec<Slot>,
}

impl<'c> Cursor<'c> {
    pub(crate) fn new(cube: &'c mut DataCube) -> Self {
        let slots = vec![Slot::Unset; cube.axes().len()];
        Self { cube, slots }
    }

    /// Set the slot for `axis` to `label`.
    ///
    /// Unknown labels are registered on dynamic axes and rejected on fixed
    /// ones. The axis must belong to the cursor's cube.
    pub fn set_coordinate(&mut self, axis: &str, label: &str) -> Result<&mut Self> {
        let position = self.cube.axis_position(axis)?;
        let ordinal = self.cube.axes_mut()[position].register_or_get(label)?;
        self.slots[position] = Slot::Set(ordinal);
        Ok(self)
    }

    /// Reset every slot to unset.
    pub fn clear_coordinates(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = Slot::Unset);
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// True when every axis slot is set.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| matches!(slot, Slot::Set(_)))
    }

    /// Value at the addressed cell.
    ///
    /// Numeric cubes read an unset cell as `0`; structured cubes fail with
    /// [`CubeError::NoValueAtCoordinate`].
    pub fn value(&self) -> Result<Value> {
        let key = self.key()?;
        match (self.cube.read(&key), self.cube.kind()) {
            (Some(value), _) => Ok(value.clone()),
            (None, CubeKind::Numeric) => Ok(Value::Number(0.0)),
            (None, CubeKind::Structured) => Err(CubeError::NoValueAtCoordinate {
                coordinate: self.cube.labels_of(&key),
            }),
        }
    }

    /// Numeric value at the addressed cell, `0` when unset.
    pub fn number(&self) -> Result<f64> {
        self.require_numeric("number")?;
        Ok(self.value()?.as_number().unwrap_or_default())
    }

    pub fn has_value(&self) -> Result<bool> {
        let key = self.key()?;
        Ok(self.cube.read(&key).is_some())
    }

    /// Overwrite the addressed cell. Records replace the old record wholesale.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let key = self.key()?;
        trace!(cube = %self.cube.name(), ?key, "set value");
        self.cube.write(key, value.into())
    }

    /// Add `delta` to the addressed numeric cell, treating unset as `0`.
    pub fn increment_value_with(&mut self, delta: f64) -> Result<f64> {
        self.require_numeric("increment_value_with")?;
        let key = self.key()?;
        let current = self
            .cube
            .read(&key)
            .and_then(Value::as_number)
            .unwrap_or_default();
        let updated = current + delta;
        trace!(cube = %self.cube.name(), ?key, delta, updated, "increment value");
        self.cube.write(key, Value::Number(updated))?;
        Ok(updated)
    }

    /// Remove the addressed cell, returning its previous value.
    pub fn remove_value(&mut self) -> Result<Option<Value>> {
        let key = self.key()?;
        Ok(self.cube.remove(&key))
    }

    fn require_numeric(&self, operation: &str) -> Result<()> {
        match self.cube.kind() {
            CubeKind::Numeric => Ok(()),
            CubeKind::Structured => Err(CubeError::UnsupportedOperation(format!(
                "{} on structured cube '{}'",
                operation,
                self.cube.name()
            ))),
        }
    }

    fn key(&self) -> Result<StorageKey> {
        self.slots
            .iter()
            .zip(self.cube.axes())
            .map(|(slot, axis)| match slot {
                Slot::Set(ordinal) => Ok(*ordinal),
                Slot::Unset => Err(CubeError::IncompleteCoordinate {
                    axis: axis.name().to_string(),
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::axis::Axis;
    use crate::cube::DataCube;
    use crate::error::CubeError;
    use crate::value::Value;
    use serde_json::json;

    fn numeric() -> DataCube {
        DataCube::numeric("payroll", vec![Axis::new("Year"), Axis::new("Department")]).unwrap()
    }

    #[test]
    fn test_set_coordinate_grows_axis() {
        let mut cube = numeric();
        let mut cursor = cube.cursor();
        cursor.set_coordinate("Department", "HR").unwrap();
        cursor.set_coordinate("Department", "IT").unwrap();
        drop(cursor);

        assert_eq!(cube.axis("Department").unwrap().categories(), ["HR", "IT"]);
        assert!(cube.axis("Year").unwrap().is_empty());
    }

    #[test]
    fn test_foreign_axis_rejected_eagerly() {
        let mut cube = numeric();
        let mut cursor = cube.cursor();
        assert!(matches!(
            cursor.set_coordinate("Region", "EU"),
            Err(CubeError::UnknownAxis(name)) if name == "Region"
        ));
    }

    #[test]
    fn test_incomplete_coordinate() {
        let mut cube = numeric();
        let mut cursor = cube.cursor();
        cursor.set_coordinate("Year", "2023").unwrap();

        assert!(!cursor.is_complete());
        assert!(matches!(
            cursor.value(),
            Err(CubeError::IncompleteCoordinate { axis }) if axis == "Department"
        ));
        assert!(matches!(
            cursor.set_value(1.0),
            Err(CubeError::IncompleteCoordinate { .. })
        ));
    }

    #[test]
    fn test_numeric_default_and_increment() {
        let mut cube = numeric();
        let mut cursor = cube.cursor();
        cursor
            .set_coordinate("Year", "2024")
            .unwrap()
            .set_coordinate("Department", "HR")
            .unwrap();

        assert_eq!(cursor.number().unwrap(), 0.0);
        assert!(!cursor.has_value().unwrap());

        cursor.increment_value_with(10000.0).unwrap();
        assert_eq!(cursor.value().unwrap(), Value::Number(10000.0));
        cursor.increment_value_with(5000.0).unwrap();
        assert_eq!(cursor.number().unwrap(), 15000.0);
        drop(cursor);

        assert_eq!(cube.len(), 1);
    }

    #[test]
    fn test_cursors_share_store() {
        let mut cube = numeric();
        {
            let mut writer = cube.cursor();
            writer.set_coordinate("Year", "2023").unwrap();
            writer.set_coordinate("Department", "IT").unwrap();
            writer.set_value(70000.0).unwrap();
        }
        let mut reader = cube.cursor();
        reader.set_coordinate("Department", "IT").unwrap();
        reader.set_coordinate("Year", "2023").unwrap();
        assert_eq!(reader.number().unwrap(), 70000.0);
    }

    #[test]
    fn test_structured_cells() {
        let mut cube =
            DataCube::structured("people", vec![Axis::new("Team"), Axis::new("Role")]).unwrap();
        let mut cursor = cube.cursor();
        cursor.set_coordinate("Team", "Core").unwrap();
        cursor.set_coordinate("Role", "Lead").unwrap();

        assert!(matches!(
            cursor.value(),
            Err(CubeError::NoValueAtCoordinate { coordinate }) if coordinate == ["Core", "Lead"]
        ));
        assert!(matches!(
            cursor.increment_value_with(1.0),
            Err(CubeError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            cursor.set_value(3.0),
            Err(CubeError::ValueKindMismatch { .. })
        ));

        let first = json!({"name": "Ada", "level": 3});
        let second = json!({"name": "Grace"});
        cursor
            .set_value(first.as_object().cloned().unwrap())
            .unwrap();
        cursor
            .set_value(second.as_object().cloned().unwrap())
            .unwrap();

        let stored = cursor.value().unwrap();
        assert_eq!(stored.as_record().unwrap().get("level"), None);
        assert_eq!(stored.as_record().unwrap().get("name"), Some(&json!("Grace")));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let mut cube = numeric();
        let mut cursor = cube.cursor();
        cursor
            .set_coordinate("Year", "2023")
            .unwrap()
            .set_coordinate("Department", "HR")
            .unwrap();

        assert!(matches!(
            cursor.set_value(f64::NAN),
            Err(CubeError::NonFiniteNumber(_))
        ));
        assert!(!cursor.has_value().unwrap());

        cursor.increment_value_with(f64::MAX).unwrap();
        assert!(matches!(
            cursor.increment_value_with(f64::MAX),
            Err(CubeError::NonFiniteNumber(n)) if n == f64::INFINITY
        ));
        // failed increment leaves the stored value alone
        assert_eq!(cursor.number().unwrap(), f64::MAX);
        drop(cursor);

        let document = crate::codec::to_dict(&cube).unwrap();
        let restored = crate::codec::from_dict(document, crate::value::CubeKind::Numeric).unwrap();
        assert_eq!(restored, cube);
    }

    #[test]
    fn test_clear_and_remove() {
        let mut cube = numeric();
        let mut cursor = cube.cursor();
        cursor.set_coordinate("Year", "2023").unwrap();
        cursor.set_coordinate("Department", "HR").unwrap();
        cursor.set_value(5.0).unwrap();

        assert_eq!(cursor.remove_value().unwrap(), Some(Value::Number(5.0)));
        assert!(!cursor.has_value().unwrap());

        cursor.clear_coordinates();
        assert!(matches!(
            cursor.has_value(),
            Err(CubeError::IncompleteCoordinate { axis }) if axis == "Year"
        ));
    }
}
