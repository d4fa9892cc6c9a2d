//! Selection, ordering and traversal over a cube's sparse store.
//!
//! A [`Selection`] restricts cells by per-axis category allow-lists (axes not
//! named are wildcards) ANDed with an optional predicate over the full label
//! coordinate. [`VisitOptions`] adds presentation order, per-axis sort
//! direction and a value predicate for [`DataCube::visit`].
//!
//! [`DataCube::visit`]: crate::cube::DataCube::visit

pub mod visit;

pub use visit::Visit;

use crate::cube::DataCube;
use crate::error::{CubeError, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Sort direction for one axis during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

type CoordinatePredicate<'a> = Box<dyn Fn(&[String]) -> bool + 'a>;
type ValuePredicate<'a> = Box<dyn Fn(&Value) -> bool + 'a>;

/// Which stored cells take part in an aggregation or traversal.
#[derive(Default)]
pub struct Selection<'a> {
    categories: BTreeMap<String, HashSet<String>>,
    predicate: Option<CoordinatePredicate<'a>>,
}

impl<'a> Selection<'a> {
    /// Selection that matches every stored cell.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict `axis` to the given labels. Repeated calls for the same axis
    /// replace the previous allow-list.
    pub fn allow<I, S>(mut self, axis: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .insert(axis.into(), labels.into_iter().map(Into::into).collect());
        self
    }

    /// Keep only cells whose label coordinate (cube axis order) satisfies `f`.
    pub fn matching(mut self, f: impl Fn(&[String]) -> bool + 'a) -> Self {
        self.predicate = Some(Box::new(f));
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.categories.is_empty() && self.predicate.is_none()
    }

    /// Bind the selection to a cube, translating allow-lists into ordinal sets.
    pub(crate) fn compile(&self, cube: &DataCube) -> Result<CompiledSelection<'_, 'a>> {
        let mut allowed = Vec::with_capacity(self.categories.len());
        for (axis_name, labels) in &self.categories {
            let position = cube.axis_position(axis_name)?;
            let axis = &cube.axes()[position];
            let ordinals: HashSet<usize> = labels
                .iter()
                .filter_map(|label| axis.index_of(label).ok())
                .collect();
            allowed.push((position, ordinals));
        }
        Ok(CompiledSelection {
            allowed,
            predicate: self.predicate.as_ref(),
        })
    }
}

impl fmt::Debug for Selection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("categories", &self.categories)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// A selection resolved against one cube's axes.
pub(crate) struct CompiledSelection<'s, 'a> {
    allowed: Vec<(usize, HashSet<usize>)>,
    predicate: Option<&'s CoordinatePredicate<'a>>,
}

impl CompiledSelection<'_, '_> {
    pub(crate) fn accepts(&self, cube: &DataCube, key: &[usize]) -> bool {
        let categories_pass = self
            .allowed
            .iter()
            .all(|(position, ordinals)| ordinals.contains(&key[*position]));
        if !categories_pass {
            return false;
        }
        match self.predicate {
            Some(predicate) => predicate(cube.labels_of(key).as_slice()),
            None => true,
        }
    }
}

/// Arguments for a traversal.
#[derive(Default)]
pub struct VisitOptions<'a> {
    axis_order: Option<Vec<String>>,
    sort_order: HashMap<String, SortOrder>,
    selection: Selection<'a>,
    value_filter: Option<ValuePredicate<'a>>,
}

impl<'a> VisitOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presentation and sort-precedence order. Axes not listed follow in
    /// cube order.
    pub fn axis_order<I, S>(mut self, axes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.axis_order = Some(axes.into_iter().map(Into::into).collect());
        self
    }

    pub fn sort(mut self, axis: impl Into<String>, order: SortOrder) -> Self {
        self.sort_order.insert(axis.into(), order);
        self
    }

    pub fn select(mut self, selection: Selection<'a>) -> Self {
        self.selection = selection;
        self
    }

    /// Shorthand for adding a category allow-list to the selection.
    pub fn allow<I, S>(mut self, axis: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = self.selection.allow(axis, labels);
        self
    }

    /// Shorthand for setting the selection's coordinate predicate.
    pub fn matching(mut self, f: impl Fn(&[String]) -> bool + 'a) -> Self {
        self.selection = self.selection.matching(f);
        self
    }

    /// Keep only cells whose value satisfies `f`.
    pub fn filter_values(mut self, f: impl Fn(&Value) -> bool + 'a) -> Self {
        self.value_filter = Some(Box::new(f));
        self
    }

    pub fn selection(&self) -> &Selection<'a> {
        &self.selection
    }

    /// Resolve the presentation order to cube axis positions.
    pub(crate) fn resolve_axis_order(&self, cube: &DataCube) -> Result<Vec<usize>> {
        let mut order = Vec::with_capacity(cube.axes().len());
        if let Some(names) = &self.axis_order {
            for name in names {
                let position = cube.axis_position(name)?;
                if order.contains(&position) {
                    return Err(CubeError::DuplicateAxis(name.clone()));
                }
                order.push(position);
            }
        }
        for position in 0..cube.axes().len() {
            if !order.contains(&position) {
                order.push(position);
            }
        }
        Ok(order)
    }

    /// Sort direction per cube axis position.
    pub(crate) fn resolve_directions(&self, cube: &DataCube) -> Result<Vec<SortOrder>> {
        let mut directions = vec![SortOrder::Ascending; cube.axes().len()];
        for (name, order) in &self.sort_order {
            directions[cube.axis_position(name)?] = *order;
        }
        Ok(directions)
    }

    pub(crate) fn accepts_value(&self, value: &Value) -> bool {
        self.value_filter.as_ref().map_or(true, |f| f(value))
    }
}

impl fmt::Debug for VisitOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitOptions")
            .field("axis_order", &self.axis_order)
            .field("sort_order", &self.sort_order)
            .field("selection", &self.selection)
            .field("value_filter", &self.value_filter.is_some())
            .finish()
    }
}
