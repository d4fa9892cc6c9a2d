//! Scalar aggregation over selected cells.

use crate::cube::DataCube;
use crate::error::{CubeError, Result};
use crate::query::Selection;
use crate::value::{CubeKind, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Named reduction applied to the surviving values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Count => "count",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }

    /// Reduce `values`.
    ///
    /// `Sum` and `Count` yield `0` over no values; the other functions have no
    /// identity and yield `None`.
    pub fn reduce<I>(&self, values: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut state = Accumulator::default();
        for value in values {
            state.push(value);
        }
        match self {
            AggregateFunction::Sum => Some(state.sum),
            AggregateFunction::Count => Some(state.count as f64),
            AggregateFunction::Avg => (state.count > 0).then(|| state.sum / state.count as f64),
            AggregateFunction::Min => state.min,
            AggregateFunction::Max => state.max,
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateFunction {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(AggregateFunction::Sum),
            "count" => Ok(AggregateFunction::Count),
            "avg" | "mean" => Ok(AggregateFunction::Avg),
            "min" => Ok(AggregateFunction::Min),
            "max" => Ok(AggregateFunction::Max),
            other => Err(CubeError::UnsupportedOperation(format!(
                "unknown aggregate function '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }
}

impl DataCube {
    /// Aggregate the numeric cells matched by `selection`.
    ///
    /// Structured cubes need an explicit extractor; see
    /// [`aggregate_with`](Self::aggregate_with).
    pub fn aggregate(&self, function: AggregateFunction, selection: &Selection<'_>) -> Result<Option<f64>> {
        if self.kind() != CubeKind::Numeric {
            return Err(CubeError::UnsupportedOperation(format!(
                "{} on structured cube '{}' requires a numeric extractor",
                function,
                self.name()
            )));
        }
        self.aggregate_with(function, selection, Value::as_number)
    }

    /// Aggregate using `extractor` to turn each matched cell into a number.
    /// Cells for which the extractor yields `None` are skipped.
    pub fn aggregate_with<F>(
        &self,
        function: AggregateFunction,
        selection: &Selection<'_>,
        extractor: F,
    ) -> Result<Option<f64>>
    where
        F: Fn(&Value) -> Option<f64>,
    {
        let compiled = selection.compile(self)?;
        let values = self
            .cells()
            .iter()
            .filter(|(key, _)| compiled.accepts(self, key))
            .filter_map(|(_, value)| extractor(value));
        let result = function.reduce(values);
        debug!(cube = %self.name(), %function, ?result, "aggregate");
        Ok(result)
    }
}
