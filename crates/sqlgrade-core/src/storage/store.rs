use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Per-question learning state. Only the coarse outcome is kept: whether the
/// question was ever solved, how often it was attempted and the last query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionProgress {
    pub question_id: String,
    pub is_completed: bool,
    pub attempts: u32,
    pub last_query: String,
    pub solved_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressStats {
    pub completed: u64,
    pub attempted: u64,
    pub total_attempts: u64,
}

#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path).context("failed to open progress db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("progress db lock poisoned"))
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    /// Records one submission.
    ///
    /// Attempts always increase. Completion is sticky: a wrong answer after a
    /// correct one keeps the question completed, and `solved_at` is written
    /// only on the first transition to completed.
    pub fn save_progress(
        &self,
        question_id: &str,
        is_completed: bool,
        query: &str,
    ) -> anyhow::Result<QuestionProgress> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = chrono::Utc::now().to_rfc3339();

        let existing: Option<(u32, bool)> = tx
            .query_row(
                "SELECT attempts, is_completed FROM user_progress WHERE question_id = ?1",
                params![question_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match existing {
            Some((attempts, was_completed)) => {
                let first_solve = is_completed && !was_completed;
                tx.execute(
                    "UPDATE user_progress
                     SET is_completed = ?1, attempts = ?2, last_query = ?3,
                         solved_at = CASE WHEN ?4 THEN ?5 ELSE solved_at END,
                         updated_at = ?5
                     WHERE question_id = ?6",
                    params![
                        is_completed || was_completed,
                        attempts + 1,
                        query,
                        first_solve,
                        now,
                        question_id
                    ],
                )?;
            }
            None => {
                let solved_at = if is_completed { Some(now.as_str()) } else { None };
                tx.execute(
                    "INSERT INTO user_progress
                     (question_id, is_completed, attempts, last_query, solved_at, created_at, updated_at)
                     VALUES (?1, ?2, 1, ?3, ?4, ?5, ?5)",
                    params![question_id, is_completed, query, solved_at, now],
                )?;
            }
        }

        let saved = select_progress(&tx, question_id)?
            .context("progress row missing after save")?;
        tx.commit()?;

        tracing::info!(
            event = "sqlgrade.progress_saved",
            question_id = %question_id,
            completed = saved.is_completed,
            attempts = saved.attempts
        );
        Ok(saved)
    }

    pub fn get_progress(&self, question_id: &str) -> anyhow::Result<Option<QuestionProgress>> {
        let conn = self.lock()?;
        select_progress(&conn, question_id)
    }

    pub fn load_all_progress(&self) -> anyhow::Result<Vec<QuestionProgress>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT question_id, is_completed, attempts, last_query, solved_at, updated_at
             FROM user_progress
             ORDER BY question_id",
        )?;
        let rows = stmt.query_map([], map_progress)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn completed_count(&self) -> anyhow::Result<u64> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM user_progress WHERE is_completed = 1",
            [],
            |r| r.get(0),
        )?;
        Ok(n as u64)
    }

    pub fn stats(&self) -> anyhow::Result<ProgressStats> {
        let conn = self.lock()?;
        let stats = conn.query_row(
            "SELECT
                COUNT(CASE WHEN is_completed = 1 THEN 1 END),
                COUNT(*),
                COALESCE(SUM(attempts), 0)
             FROM user_progress",
            [],
            |r| {
                Ok(ProgressStats {
                    completed: r.get::<_, i64>(0)? as u64,
                    attempted: r.get::<_, i64>(1)? as u64,
                    total_attempts: r.get::<_, i64>(2)? as u64,
                })
            },
        )?;
        Ok(stats)
    }

    pub fn reset(&self) -> anyhow::Result<usize> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM user_progress", [])?;
        tracing::info!(event = "sqlgrade.progress_reset", removed = n);
        Ok(n)
    }
}

fn select_progress(conn: &Connection, question_id: &str) -> anyhow::Result<Option<QuestionProgress>> {
    let mut stmt = conn.prepare(
        "SELECT question_id, is_completed, attempts, last_query, solved_at, updated_at
         FROM user_progress
         WHERE question_id = ?1",
    )?;
    Ok(stmt
        .query_row(params![question_id], map_progress)
        .optional()?)
}

fn map_progress(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuestionProgress> {
    Ok(QuestionProgress {
        question_id: row.get(0)?,
        is_completed: row.get(1)?,
        attempts: row.get(2)?,
        last_query: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        solved_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        let s = Store::memory().unwrap();
        s.init_schema().unwrap();
        s
    }

    #[test]
    fn test_first_attempt_inserts() {
        let s = store();
        let p = s.save_progress("rfm_1", false, "SELECT 1").unwrap();
        assert_eq!(p.attempts, 1);
        assert!(!p.is_completed);
        assert!(p.solved_at.is_none());
        assert_eq!(p.last_query, "SELECT 1");
    }

    #[test]
    fn test_completion_is_sticky_and_solved_at_fixed() {
        let s = store();
        s.save_progress("rfm_1", false, "q1").unwrap();
        let solved = s.save_progress("rfm_1", true, "q2").unwrap();
        assert!(solved.is_completed);
        let solved_at = solved.solved_at.clone().unwrap();

        let later = s.save_progress("rfm_1", false, "q3").unwrap();
        assert!(later.is_completed);
        assert_eq!(later.attempts, 3);
        assert_eq!(later.last_query, "q3");
        assert_eq!(later.solved_at.as_deref(), Some(solved_at.as_str()));

        let again = s.save_progress("rfm_1", true, "q4").unwrap();
        assert_eq!(again.solved_at.as_deref(), Some(solved_at.as_str()));
    }

    #[test]
    fn test_stats_and_reset() {
        let s = store();
        assert_eq!(s.stats().unwrap(), ProgressStats::default());

        s.save_progress("a", true, "x").unwrap();
        s.save_progress("b", false, "x").unwrap();
        s.save_progress("b", false, "y").unwrap();

        let stats = s.stats().unwrap();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.attempted, 2);
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(s.completed_count().unwrap(), 1);
        assert_eq!(s.load_all_progress().unwrap().len(), 2);

        assert_eq!(s.reset().unwrap(), 2);
        assert!(s.get_progress("a").unwrap().is_none());
    }
}
