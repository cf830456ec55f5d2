pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS user_progress (
  question_id TEXT PRIMARY KEY,
  is_completed INTEGER NOT NULL DEFAULT 0,
  attempts INTEGER NOT NULL DEFAULT 0,
  last_query TEXT NOT NULL DEFAULT '',
  solved_at TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_progress_completed ON user_progress(is_completed);
"#;
