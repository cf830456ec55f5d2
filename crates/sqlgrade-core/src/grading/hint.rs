use crate::model::CellValue;

/// Compares the numeric cells of the first rows pairwise and, when a pair is
/// off by more than 10%, suggests where the query likely went wrong.
///
/// Never affects the score. Returns `None` when there is nothing to say.
pub fn value_difference_hint(
    user_rows: &[Vec<CellValue>],
    reference_rows: &[Vec<CellValue>],
) -> Option<String> {
    let user = user_rows.first()?;
    let reference = reference_rows.first()?;

    for (u, r) in user.iter().zip(reference) {
        let (Some(u), Some(r)) = (u.as_f64(), r.as_f64()) else {
            continue;
        };
        if u == 0.0 || r == 0.0 {
            continue;
        }
        let ratio = u / r;
        if !ratio.is_finite() || (0.9..=1.1).contains(&ratio) {
            continue;
        }
        return Some(if ratio > 1.0 {
            format!(
                "Some numeric values are {:.1}x larger than expected. Check your aggregation.",
                ratio
            )
        } else {
            format!(
                "Some numeric values are {:.1}x smaller than expected. Check your filter conditions.",
                1.0 / ratio
            )
        });
    }
    None
}
