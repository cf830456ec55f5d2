use crate::model::{CellValue, TabularResult};
use anyhow::Context;
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Executes SQL text against the exercise database.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> anyhow::Result<TabularResult>;
}

/// Read-only executor over a local SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    path: PathBuf,
    timeout: Duration,
}

impl SqliteExecutor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> anyhow::Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
                | OpenFlags::SQLITE_OPEN_URI,
        )
        .with_context(|| format!("failed to open database {}", self.path.display()))
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    async fn execute(&self, sql: &str) -> anyhow::Result<TabularResult> {
        let sql = clean_sql(sql)?;
        let conn = self.open()?;
        let interrupt = conn.get_interrupt_handle();

        let task = tokio::task::spawn_blocking(move || run_query(&conn, &sql));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined.map_err(|e| anyhow::anyhow!("query task failed: {}", e))?,
            Err(_) => {
                interrupt.interrupt();
                let ms = self.timeout.as_millis();
                tracing::warn!(event = "sqlgrade.query_timeout", timeout_ms = ms as u64);
                anyhow::bail!("query timed out after {} ms", ms)
            }
        }
    }
}

/// Trims whitespace and trailing semicolons; rejects empty input.
pub fn clean_sql(sql: &str) -> anyhow::Result<String> {
    let cleaned = sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if cleaned.is_empty() {
        anyhow::bail!("query is empty");
    }
    Ok(cleaned.to_string())
}

/// Runs one read-only statement and collects every row.
pub fn run_query(conn: &Connection, sql: &str) -> anyhow::Result<TabularResult> {
    let mut stmt = conn.prepare(sql)?;
    if !stmt.readonly() {
        anyhow::bail!("only read-only queries (SELECT / WITH) are allowed");
    }

    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(to_cell(row.get_ref(i)?));
        }
        rows.push(cells);
    }

    Ok(TabularResult::new(columns, rows))
}

fn to_cell(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Int(i),
        ValueRef::Real(f) => CellValue::Float(f),
        ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => CellValue::Text(String::from_utf8_lossy(b).into_owned()),
    }
}
