use super::hint::value_difference_hint;
use super::normalize::normalize;
use super::sort::{sort_key, sort_rows};
use crate::errors::ShapeError;
use crate::model::{CellValue, CheckOptions, CheckResult, CheckStatus, ScoreBreakdown, TabularResult};
use std::collections::HashMap;

pub const ROW_WEIGHT: u8 = 30;
pub const COLUMN_WEIGHT: u8 = 20;
pub const VALUE_WEIGHT: u8 = 50;

/// Grades a user result against the reference result.
///
/// Total over its inputs: precondition failures come back as
/// [`CheckStatus::Error`], comparison failures as a zero value score.
pub fn check(
    user: Option<&TabularResult>,
    reference: Option<&TabularResult>,
    opts: &CheckOptions,
) -> CheckResult {
    let Some(user) = user else {
        return CheckResult {
            status: CheckStatus::Error,
            score: 0,
            message: "Run the query first.".into(),
            details: vec!["Execute your query to see its result before checking it.".into()],
            breakdown: None,
        };
    };

    let Some(reference) = reference else {
        return CheckResult {
            status: CheckStatus::Error,
            score: 0,
            message: "Internal error: the reference query failed to run.".into(),
            details: vec!["This is a problem with the question itself. Please contact support.".into()],
            breakdown: None,
        };
    };

    if user.is_empty() && reference.is_empty() {
        return CheckResult {
            status: CheckStatus::Correct,
            score: 100,
            message: "Correct!".into(),
            details: vec!["An empty result is the expected answer.".into()],
            breakdown: None,
        };
    }

    if user.is_empty() {
        return CheckResult {
            status: CheckStatus::Wrong,
            score: 0,
            message: "Your query returned no rows.".into(),
            details: vec![format!(
                "The expected result has {} rows.",
                reference.row_count()
            )],
            breakdown: None,
        };
    }

    let mut details = Vec::new();

    let (rows, row_detail) = check_row_count(user.row_count(), reference.row_count());
    details.extend(row_detail);

    let (columns, column_detail) = check_column_count(user, reference, opts);
    details.extend(column_detail);

    let (values, value_details) = check_values(user, reference, opts);
    details.extend(value_details);

    let breakdown = ScoreBreakdown {
        rows,
        columns,
        values,
    };
    let score = breakdown.total();

    tracing::debug!(
        event = "sqlgrade.check",
        rows = rows,
        columns = columns,
        values = values,
        score = score
    );

    match CheckStatus::from_score(score) {
        CheckStatus::Correct => CheckResult {
            status: CheckStatus::Correct,
            score: 100,
            message: "Correct!".into(),
            details: vec!["All checks passed.".into()],
            breakdown: Some(breakdown),
        },
        CheckStatus::Partial => CheckResult {
            status: CheckStatus::Partial,
            score,
            message: format!("Partially correct ({} points).", score),
            details,
            breakdown: Some(breakdown),
        },
        _ => CheckResult {
            status: CheckStatus::Wrong,
            score,
            message: "Incorrect.".into(),
            details,
            breakdown: Some(breakdown),
        },
    }
}

/// Full credit for an exact match; near misses relative to the reference
/// count earn partial credit (<=10% -> 20, <=30% -> 10).
pub fn check_row_count(user_rows: usize, reference_rows: usize) -> (u8, Option<String>) {
    if user_rows == reference_rows {
        return (ROW_WEIGHT, None);
    }

    let diff = user_rows.abs_diff(reference_rows);
    let score = if reference_rows == 0 {
        0
    } else if diff * 100 <= reference_rows * 10 {
        20
    } else if diff * 100 <= reference_rows * 30 {
        10
    } else {
        0
    };

    let direction = if user_rows > reference_rows {
        "Too many rows"
    } else {
        "Too few rows"
    };
    (
        score,
        Some(format!(
            "{}. (yours: {} rows, expected: {} rows)",
            direction, user_rows, reference_rows
        )),
    )
}

/// All or nothing. When column names are compared, a name mismatch is
/// reported but not penalized.
pub fn check_column_count(
    user: &TabularResult,
    reference: &TabularResult,
    opts: &CheckOptions,
) -> (u8, Option<String>) {
    let (u, r) = (user.column_count(), reference.column_count());
    if u != r {
        let direction = if u > r {
            "Too many columns"
        } else {
            "Too few columns"
        };
        return (
            0,
            Some(format!(
                "{}. (yours: {} columns, expected: {} columns)",
                direction, u, r
            )),
        );
    }

    if !opts.ignore_column_names && !same_names(&user.columns, &reference.columns) {
        return (
            COLUMN_WEIGHT,
            Some(format!(
                "Column names differ from the expected result ({}).",
                reference.columns.join(", ")
            )),
        );
    }

    (COLUMN_WEIGHT, None)
}

fn same_names(a: &[String], b: &[String]) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| x.trim().eq_ignore_ascii_case(y.trim()))
}

/// Only attempted when both row and column counts match.
pub fn check_values(
    user: &TabularResult,
    reference: &TabularResult,
    opts: &CheckOptions,
) -> (u8, Vec<String>) {
    if user.column_count() != reference.column_count() {
        return (
            0,
            vec!["Column counts differ, so values were not compared.".into()],
        );
    }
    if user.row_count() != reference.row_count() {
        return (
            0,
            vec!["Row counts differ, so values were not compared.".into()],
        );
    }

    match compare_values(user, reference, opts) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(event = "sqlgrade.compare_error", error = %e);
            (0, vec![format!("Error while comparing values: {}", e)])
        }
    }
}

fn compare_values(
    user: &TabularResult,
    reference: &TabularResult,
    opts: &CheckOptions,
) -> Result<(u8, Vec<String>), ShapeError> {
    let mut user = normalize(user, opts)?;
    let mut reference = normalize(reference, opts)?;

    if opts.ignore_row_order {
        user = sort_rows(user);
        reference = sort_rows(reference);
    }

    if user.rows == reference.rows {
        return Ok((VALUE_WEIGHT, Vec::new()));
    }

    let matched = count_matches(&user.rows, &reference.rows, opts.strict_multiset);
    let match_pct = if reference.rows.is_empty() {
        0.0
    } else {
        matched as f64 / reference.rows.len() as f64 * 100.0
    };

    let mut details = Vec::new();
    let score = if match_pct >= 80.0 {
        details.push(format!("Most values match. ({:.0}% matched)", match_pct));
        40
    } else if match_pct >= 50.0 {
        details.push(format!("Some values match. ({:.0}% matched)", match_pct));
        25
    } else if match_pct > 0.0 {
        details.push(format!(
            "Values differ substantially. ({:.0}% matched)",
            match_pct
        ));
        10
    } else {
        details.push("No values match.".into());
        0
    };

    if let Some(hint) = value_difference_hint(&user.rows, &reference.rows) {
        details.push(hint);
    }

    Ok((score, details))
}

/// Number of user rows found in the reference rows.
///
/// The lenient mode tests membership only, so a duplicated user row may match
/// the same reference row repeatedly. The strict mode consumes each reference
/// row at most once.
pub fn count_matches(
    user_rows: &[Vec<CellValue>],
    reference_rows: &[Vec<CellValue>],
    strict_multiset: bool,
) -> usize {
    if !strict_multiset {
        return user_rows
            .iter()
            .filter(|row| reference_rows.contains(row))
            .count();
    }

    let mut remaining: HashMap<Vec<String>, usize> = HashMap::new();
    for row in reference_rows {
        *remaining.entry(sort_key(row)).or_default() += 1;
    }
    user_rows
        .iter()
        .filter(|row| match remaining.get_mut(&sort_key(row)) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        })
        .count()
}
