//! Traversal engine.
//!
//! Only stored cells are visited; the dense cross-product of categories is
//! never materialized. Surviving cells are ordered by a composite key built
//! from the presentation axis order, each axis compared by category ordinal
//! (natural order) in its requested direction.

use super::{SortOrder, VisitOptions};
use crate::cube::{Coordinate, DataCube, StorageKey};
use crate::error::Result;
use crate::value::Value;
use std::cmp::Ordering;
use std::iter::FusedIterator;
use tracing::debug;

/// Ordered `(coordinate, value)` sequence produced by [`DataCube::visit`].
///
/// Coordinates are labels in the requested presentation order. The sequence
/// borrows the cube, so the store cannot change while it is being consumed.
#[derive(Debug, Clone)]
pub struct Visit<'c> {
    cube: &'c DataCube,
    order: Vec<usize>,
    hits: std::vec::IntoIter<(&'c StorageKey, &'c Value)>,
}

impl<'c> Visit<'c> {
    /// Presentation order as axis names.
    pub fn axis_names(&self) -> Vec<&'c str> {
        let cube = self.cube;
        self.order
            .iter()
            .map(|&position| cube.axes()[position].name())
            .collect()
    }

    fn present(&self, key: &[usize]) -> Coordinate {
        self.order
            .iter()
            .map(|&position| {
                self.cube.axes()[position]
                    .category(key[position])
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

impl<'c> Iterator for Visit<'c> {
    type Item = (Coordinate, &'c Value);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.hits.next()?;
        Some((self.present(key), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hits.size_hint()
    }
}

impl ExactSizeIterator for Visit<'_> {}

impl FusedIterator for Visit<'_> {}

impl DataCube {
    /// Traverse stored cells, filtered and sorted per `options`.
    ///
    /// Each call recomputes the sequence from the current store; sequences do
    /// not share state.
    pub fn visit(&self, options: &VisitOptions<'_>) -> Result<Visit<'_>> {
        let order = options.resolve_axis_order(self)?;
        let directions = options.resolve_directions(self)?;
        let selection = options.selection().compile(self)?;

        let mut hits: Vec<(&StorageKey, &Value)> = self
            .cells()
            .iter()
            .filter(|(key, value)| selection.accepts(self, key) && options.accepts_value(value))
            .collect();
        hits.sort_by(|(a, _), (b, _)| compare_keys(a, b, &order, &directions));

        debug!(
            cube = %self.name(),
            stored = self.len(),
            matched = hits.len(),
            "visit"
        );
        Ok(Visit {
            cube: self,
            order,
            hits: hits.into_iter(),
        })
    }

    /// Push every visited entry through `handler` instead of returning a
    /// sequence. Returns the number of entries delivered.
    pub fn visit_each<F>(&self, options: &VisitOptions<'_>, mut handler: F) -> Result<usize>
    where
        F: FnMut(&[String], &Value),
    {
        let mut delivered = 0;
        for (coordinate, value) in self.visit(options)? {
            handler(coordinate.as_slice(), value);
            delivered += 1;
        }
        Ok(delivered)
    }
}

fn compare_keys(a: &[usize], b: &[usize], order: &[usize], directions: &[SortOrder]) -> Ordering {
    for &position in order {
        let ordering = match directions[position] {
            SortOrder::Ascending => a[position].cmp(&b[position]),
            SortOrder::Descending => b[position].cmp(&a[position]),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
