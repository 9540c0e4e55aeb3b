//! Derivation rules for computed columns
//!
//! Formulas read score columns only. Ungraded and absent cells are skipped;
//! a formula with no graded input yields the ungraded marker.

use crate::schema::CourseSchema;
use crate::types::{ColId, RawRow, RawTable, RawValue};
use serde::{Deserialize, Serialize};

/// One weighted input of [`Formula::Weighted`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTerm {
    /// Score column
    pub col: ColId,
    /// Multiplier applied to the column value
    pub weight: f64,
}

/// Derivation rule of a calc column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Formula {
    /// Mean of the listed score columns of the row (all when empty)
    Average {
        #[serde(default)]
        cols: Vec<ColId>,
    },
    /// Sum of the listed score columns of the row (all when empty)
    Sum {
        #[serde(default)]
        cols: Vec<ColId>,
    },
    /// Weighted sum over the row
    Weighted { terms: Vec<WeightedTerm> },
    /// Mean of one score column over every row of the table
    ClassAverage { col: ColId },
}

impl Formula {
    /// Average over every score column
    #[must_use]
    pub fn average_of_all() -> Self {
        Self::Average { cols: Vec::new() }
    }

    /// Average over the given columns
    #[must_use]
    pub fn average<I, S>(cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ColId>,
    {
        Self::Average {
            cols: cols.into_iter().map(Into::into).collect(),
        }
    }

    /// Sum over the given columns
    #[must_use]
    pub fn sum<I, S>(cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ColId>,
    {
        Self::Sum {
            cols: cols.into_iter().map(Into::into).collect(),
        }
    }

    /// Column ids this formula reads explicitly
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        match self {
            Self::Average { cols } | Self::Sum { cols } => cols.iter().map(String::as_str).collect(),
            Self::Weighted { terms } => terms.iter().map(|t| t.col.as_str()).collect(),
            Self::ClassAverage { col } => vec![col.as_str()],
        }
    }

    /// Compute the value for `row` within `table`
    #[must_use]
    pub fn evaluate(&self, schema: &CourseSchema, row: &RawRow, table: &RawTable) -> RawValue {
        let result = match self {
            Self::Average { cols } => mean(Self::inputs(schema, cols).filter_map(|c| graded(row, c))),
            Self::Sum { cols } => {
                let values: Vec<f64> = Self::inputs(schema, cols)
                    .filter_map(|c| graded(row, c))
                    .collect();
                (!values.is_empty()).then(|| values.iter().sum::<f64>())
            }
            Self::Weighted { terms } => {
                let weighted: Vec<f64> = terms
                    .iter()
                    .filter_map(|t| graded(row, &t.col).map(|v| v * t.weight))
                    .collect();
                (!weighted.is_empty()).then(|| weighted.iter().sum::<f64>())
            }
            Self::ClassAverage { col } => mean(table.values().filter_map(|r| graded(r, col))),
        };
        result.map_or_else(RawValue::empty, RawValue::Num)
    }

    fn inputs<'a>(
        schema: &'a CourseSchema,
        cols: &'a [ColId],
    ) -> Box<dyn Iterator<Item = &'a ColId> + 'a> {
        if cols.is_empty() {
            Box::new(schema.score_columns())
        } else {
            Box::new(cols.iter())
        }
    }
}

fn graded(row: &RawRow, col: &str) -> Option<f64> {
    row.get(col).and_then(RawValue::as_number)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_u32), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / f64::from(count))
}
