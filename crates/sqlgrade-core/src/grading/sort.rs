use super::normalize::NormalizedResult;
use crate::model::CellValue;

/// Composite sort key for a row: one tagged key per cell, compared
/// lexicographically. The tag keeps `NULL`, numbers and text from colliding.
pub fn sort_key(row: &[CellValue]) -> Vec<String> {
    row.iter().map(cell_key).collect()
}

fn cell_key(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => "0".to_string(),
        CellValue::Bool(b) => format!("1{}", i64::from(*b)),
        CellValue::Int(i) => format!("1{}", i),
        CellValue::Float(x) => format!("1{}", x),
        CellValue::Text(s) => format!("2{}", s),
    }
}

/// Reorders rows into a canonical order independent of the input order.
/// Rows with identical keys keep their relative order.
pub fn sort_rows(result: NormalizedResult) -> NormalizedResult {
    let NormalizedResult { columns, rows } = result;
    let mut keyed: Vec<(Vec<String>, Vec<CellValue>)> =
        rows.into_iter().map(|r| (sort_key(&r), r)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    NormalizedResult {
        columns,
        rows: keyed.into_iter().map(|(_, r)| r).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rows: Vec<Vec<CellValue>>) -> NormalizedResult {
        NormalizedResult {
            columns: vec!["col_0".into(), "col_1".into()],
            rows,
        }
    }

    #[test]
    fn test_order_independent() {
        let a = result(vec![
            vec![CellValue::Int(2), "b".into()],
            vec![CellValue::Int(1), "a".into()],
            vec![CellValue::Null, "c".into()],
        ]);
        let mut rows = a.rows.clone();
        rows.reverse();
        let b = result(rows);
        assert_eq!(sort_rows(a), sort_rows(b));
    }

    #[test]
    fn test_idempotent() {
        let a = result(vec![
            vec![CellValue::Float(1.5), "x".into()],
            vec![CellValue::Int(1), "y".into()],
        ]);
        let once = sort_rows(a);
        let twice = sort_rows(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_null_and_text_null_have_distinct_keys() {
        assert_ne!(
            sort_key(&[CellValue::Null]),
            sort_key(&[CellValue::Text("null".into())])
        );
        assert_ne!(
            sort_key(&[CellValue::Text("".into())]),
            sort_key(&[CellValue::Null])
        );
    }

    #[test]
    fn test_separator_cannot_collide() {
        // "a|b","c" and "a","b|c" would join to the same string with '|'.
        let left = sort_key(&["a|b".into(), "c".into()]);
        let right = sort_key(&["a".into(), "b|c".into()]);
        assert_ne!(left, right);
    }
}
