use crate::model::{CheckResult, CheckStatus, QuestionSpec, TabularResult};
use crate::storage::ProgressStats;
use std::fmt::Write;

pub const DEFAULT_MAX_ROWS: usize = 20;

fn icon(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Correct => "✅",
        CheckStatus::Partial => "🟡",
        CheckStatus::Wrong => "❌",
        CheckStatus::Error => "⚠️",
    }
}

/// Aligned plain-text table. Rows past `max_rows` are summarized in a
/// trailing "… N more rows" line.
pub fn render_table(result: &TabularResult, max_rows: usize) -> String {
    let shown = result.rows.len().min(max_rows);
    let cells: Vec<Vec<String>> = result.rows[..shown]
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let line = |values: &[String], out: &mut String| {
        let parts: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:<w$}", v, w = w)
            })
            .collect();
        out.push_str(parts.join(" | ").trim_end());
        out.push('\n');
    };

    line(&result.columns[..], &mut out);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in &cells {
        line(&row[..], &mut out);
    }

    let hidden = result.rows.len() - shown;
    if hidden > 0 {
        let _ = writeln!(out, "… {} more rows", hidden);
    }
    let _ = write!(out, "({} rows)", result.rows.len());
    out
}

pub fn render_check(result: &CheckResult) -> String {
    let mut out = format!(
        "{} {} [{}/100] {}",
        icon(result.status),
        result.status.as_str().to_uppercase(),
        result.score,
        result.message
    );
    for d in &result.details {
        let _ = write!(out, "\n    - {}", d);
    }
    out
}

pub fn render_progress(stats: &ProgressStats, total_questions: usize) -> String {
    let pct = if total_questions == 0 {
        0.0
    } else {
        stats.completed as f64 / total_questions as f64 * 100.0
    };
    format!(
        "Progress: {}/{} completed ({:.0}%), {} attempted, {} total attempts",
        stats.completed, total_questions, pct, stats.attempted, stats.total_attempts
    )
}

/// Question card. Only the first `hints` hints are included.
pub fn render_question(q: &QuestionSpec, hints: usize) -> String {
    let mut out = format!("[{}] {}  (difficulty {}/5)\n", q.id, q.title, q.difficulty);
    if !q.module.is_empty() {
        let _ = writeln!(out, "module: {}", q.module);
    }
    let _ = write!(out, "\n{}", q.prompt.trim_end());
    for (i, h) in q.hints.iter().take(hints).enumerate() {
        let _ = write!(out, "\n\nHint {}: {}", i + 1, h.trim_end());
    }
    let remaining = q.hints.len().saturating_sub(hints);
    if remaining > 0 {
        let _ = write!(out, "\n\n({} more hints available)", remaining);
    }
    out
}
