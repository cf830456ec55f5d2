use crate::errors::ShapeError;
use crate::model::{CellValue, CheckOptions, TabularResult};

/// A TabularResult canonicalized for comparison.
///
/// Cells never hold `Bool`, and a `Float` is never integral: booleans become
/// `Int(0|1)` and floats that round to a whole number become `Int`, so that
/// `SUM(..)` and `ROUND(.., 0)` formulations of the same answer compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl NormalizedResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

pub fn normalize(
    result: &TabularResult,
    opts: &CheckOptions,
) -> Result<NormalizedResult, ShapeError> {
    result.check_shape()?;

    let columns = if opts.ignore_column_names {
        (0..result.columns.len())
            .map(|i| format!("col_{}", i))
            .collect()
    } else {
        result.columns.clone()
    };

    let rows = result
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|c| normalize_cell(c, opts.float_precision))
                .collect()
        })
        .collect();

    Ok(NormalizedResult { columns, rows })
}

pub fn normalize_cell(cell: &CellValue, precision: u32) -> CellValue {
    match cell {
        CellValue::Null => CellValue::Null,
        CellValue::Bool(b) => CellValue::Int(i64::from(*b)),
        CellValue::Int(i) => CellValue::Int(*i),
        CellValue::Float(x) => canonical_number(round_half_up(*x, precision)),
        CellValue::Text(s) => CellValue::Text(s.trim().to_lowercase()),
    }
}

/// Rounds to `precision` decimal digits, ties away from zero.
/// Values that cannot be scaled without overflow are returned unchanged.
pub fn round_half_up(x: f64, precision: u32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let factor = 10f64.powi(precision.min(i32::MAX as u32) as i32);
    let scaled = x * factor;
    if !factor.is_finite() || !scaled.is_finite() {
        return x;
    }
    scaled.round() / factor
}

fn canonical_number(x: f64) -> CellValue {
    // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if x.is_finite() && x.fract() == 0.0 && x.abs() < LIMIT {
        CellValue::Int(x as i64)
    } else {
        CellValue::Float(x)
    }
}
