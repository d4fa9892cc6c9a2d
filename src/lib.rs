//! Sparse N-dimensional labeled data cube.
//!
//! This crate provides:
//! - Axes: ordered category registries with per-category metadata
//! - Cubes: sparse coordinate-to-value stores over numeric or structured cells
//! - Cursors for addressing, writing and incrementing single cells
//! - Filtered, sorted traversal and scalar aggregation
//! - A canonical document codec (JSON / YAML) with content checksums
//!
//! ```
//! use duststat_core::{AggregateFunction, Axis, DataCube, Selection};
//!
//! let mut cube = DataCube::numeric("payroll", vec![Axis::new("Year"), Axis::new("Department")])?;
//! let mut cursor = cube.cursor();
//! cursor.set_coordinate("Year", "2023")?.set_coordinate("Department", "HR")?;
//! cursor.set_value(50000.0)?;
//!
//! let total = cube.aggregate(AggregateFunction::Sum, &Selection::all())?;
//! assert_eq!(total, Some(50000.0));
//! # Ok::<(), duststat_core::CubeError>(())
//! ```

pub mod aggregation;
pub mod axis;
pub mod codec;
pub mod config;
pub mod cube;
pub mod error;
pub mod logging;
pub mod query;
pub mod shared;
pub mod value;

pub use aggregation::AggregateFunction;
pub use axis::{Axis, AxisKind, CategoryMetadata};
pub use codec::{CubeDocument, CHECKSUM_KEY};
pub use config::{CodecConfig, DocumentFormat, DustConfig, LoggingConfig};
pub use cube::{Coordinate, Cursor, DataCube, Slot};
pub use error::{CubeError, Result};
pub use query::{Selection, SortOrder, Visit, VisitOptions};
pub use shared::SharedCube;
pub use value::{CubeKind, Record, Value};
