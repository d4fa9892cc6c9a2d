//! Content checksum for cubes.
//!
//! The digest covers the canonical document minus the checksum entry itself,
//! with data entries sorted by their coordinate labels so that store order
//! does not affect it. Axis category order is part of the digest because it
//! defines traversal order.

use super::to_document;
use crate::cube::DataCube;
use crate::error::{CubeError, Result};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Cube metadata key holding the stamped checksum.
pub const CHECKSUM_KEY: &str = "checksum";

/// SHA-256 hex digest of the cube's content.
pub fn checksum(cube: &DataCube) -> Result<String> {
    let mut document = to_document(cube);
    document.metadata.remove(CHECKSUM_KEY);
    document
        .data
        .sort_by(|a, b| a.coordinate.cmp(&b.coordinate));

    let bytes = serde_json::to_vec(&document)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the checksum and store it under [`CHECKSUM_KEY`].
pub fn stamp_checksum(cube: &mut DataCube) -> Result<String> {
    let digest = checksum(cube)?;
    debug!(cube = %cube.name(), checksum = %digest, "stamped checksum");
    cube.set_metadata(CHECKSUM_KEY, digest.clone());
    Ok(digest)
}

/// Check a stamped checksum against the cube's content.
///
/// Cubes without a stamped checksum pass.
pub fn verify_checksum(cube: &DataCube) -> Result<()> {
    let expected = match cube.get_metadata(CHECKSUM_KEY) {
        None => return Ok(()),
        Some(JsonValue::String(expected)) => expected.clone(),
        Some(other) => {
            return Err(CubeError::SchemaMismatch(format!(
                "checksum metadata must be a string, got {}",
                other
            )))
        }
    };
    let actual = checksum(cube)?;
    if actual != expected {
        return Err(CubeError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;

    fn cube_with(entries: &[(&str, &str, f64)]) -> DataCube {
        let mut cube = DataCube::numeric(
            "payroll",
            vec![
                Axis::with_categories("Year", ["2023", "2024"]),
                Axis::with_categories("Department", ["HR", "IT"]),
            ],
        )
        .unwrap();
        for (year, dept, value) in entries {
            let mut cursor = cube.cursor();
            cursor.set_coordinate("Year", year).unwrap();
            cursor.set_coordinate("Department", dept).unwrap();
            cursor.set_value(*value).unwrap();
        }
        cube
    }

    #[test]
    fn test_checksum_is_hex_sha256() {
        let digest = checksum(&cube_with(&[("2023", "HR", 1.0)])).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_checksum_ignores_write_order() {
        let a = cube_with(&[("2023", "HR", 1.0), ("2024", "IT", 2.0)]);
        let b = cube_with(&[("2024", "IT", 2.0), ("2023", "HR", 1.0)]);
        assert_eq!(checksum(&a).unwrap(), checksum(&b).unwrap());

        let c = cube_with(&[("2023", "HR", 1.0), ("2024", "IT", 3.0)]);
        assert_ne!(checksum(&a).unwrap(), checksum(&c).unwrap());
    }

    #[test]
    fn test_stamp_and_verify() {
        let mut cube = cube_with(&[("2023", "HR", 1.0)]);
        let digest = stamp_checksum(&mut cube).unwrap();

        // stamping does not change the digest
        assert_eq!(checksum(&cube).unwrap(), digest);
        verify_checksum(&cube).unwrap();

        let mut cursor = cube.cursor();
        cursor.set_coordinate("Year", "2023").unwrap();
        cursor.set_coordinate("Department", "HR").unwrap();
        cursor.increment_value_with(1.0).unwrap();
        drop(cursor);

        assert!(matches!(
            verify_checksum(&cube),
            Err(CubeError::ChecksumMismatch { .. })
        ));
    }
}
