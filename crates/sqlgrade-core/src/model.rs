use crate::errors::ShapeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single scalar produced by query execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view used by the value-difference hint.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Columns and rows produced by one query execution, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TabularResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row must have exactly one cell per column.
    pub fn check_shape(&self) -> Result<(), ShapeError> {
        let expected = self.columns.len();
        for (row, cells) in self.rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(ShapeError {
                    row,
                    expected,
                    found: cells.len(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Correct,
    Partial,
    Wrong,
    Error,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Correct => "correct",
            CheckStatus::Partial => "partial",
            CheckStatus::Wrong => "wrong",
            CheckStatus::Error => "error",
        }
    }

    /// Status implied by a total score in `[0, 100]`.
    pub fn from_score(score: u8) -> Self {
        match score {
            100.. => CheckStatus::Correct,
            50..=99 => CheckStatus::Partial,
            _ => CheckStatus::Wrong,
        }
    }
}

/// Points awarded by each weighted check.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub rows: u8,
    pub columns: u8,
    pub values: u8,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        self.rows + self.columns + self.values
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub score: u8,
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

impl CheckResult {
    pub fn is_correct(&self) -> bool {
        self.status == CheckStatus::Correct
    }

    pub fn is_partial(&self) -> bool {
        self.status == CheckStatus::Partial
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckOptions {
    #[serde(default = "default_true")]
    pub ignore_column_names: bool,
    #[serde(default = "default_true")]
    pub ignore_row_order: bool,
    #[serde(default = "default_float_precision")]
    pub float_precision: u32,
    /// Consume reference rows when counting partial matches, so duplicated
    /// user rows cannot match a single reference row more than once.
    #[serde(default)]
    pub strict_multiset: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            ignore_column_names: true,
            ignore_row_order: true,
            float_precision: default_float_precision(),
            strict_multiset: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_float_precision() -> u32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module: String,
    pub title: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    pub reference_query: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_tip: Option<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading: Option<CheckOptions>,
}

fn default_difficulty() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    pub version: u32,
    pub questions: Vec<QuestionSpec>,
}

impl QuestionBank {
    pub fn get(&self, id: &str) -> Option<&QuestionSpec> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn by_module<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a QuestionSpec> {
        self.questions.iter().filter(move |q| q.module == module)
    }

    /// Module names in first-seen order.
    pub fn modules(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for q in &self.questions {
            if !out.contains(&q.module.as_str()) {
                out.push(q.module.as_str());
            }
        }
        out
    }
}
