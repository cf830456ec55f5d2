use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sqlgrade",
    version,
    about = "SQL practice for CRM analytics, graded against reference answers"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

/// Overrides layered on top of `SQLGRADE_*` environment variables.
#[derive(clap::Args, Clone, Debug)]
pub struct GlobalArgs {
    /// sample CRM database (default: data/crm.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// progress database (default: .sqlgrade/progress.db)
    #[arg(long, global = true)]
    pub progress_db: Option<PathBuf>,

    /// question bank YAML (default: questions.yaml)
    #[arg(long, global = true)]
    pub questions: Option<PathBuf>,

    /// per-query timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// reject unknown keys in the question bank
    #[arg(long, global = true)]
    pub strict: bool,

    #[arg(long, global = true, value_enum, env = "SQLGRADE_FORMAT", default_value = "text")]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the sample database and a starter question bank
    Init(InitArgs),
    /// List questions with completion status
    List(ListArgs),
    /// Show a question, optionally with hints
    Show(ShowArgs),
    /// Run ad-hoc SQL against the sample database
    Query(QueryArgs),
    /// Grade SQL for a question and record the attempt
    Submit(SubmitArgs),
    /// Show the reference answer and its result
    Answer(AnswerArgs),
    /// Show or reset learning progress
    Progress(ProgressArgs),
    /// Interactive practice loop on stdin
    Practice(PracticeArgs),
    Version,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    /// recreate the sample database even if it exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Clone)]
pub struct ListArgs {
    /// only questions from this module
    #[arg(long)]
    pub module: Option<String>,
}

#[derive(Parser, Clone)]
pub struct ShowArgs {
    pub id: String,

    /// number of hints to reveal
    #[arg(long, default_value_t = 0)]
    pub hints: usize,
}

#[derive(clap::Args, Clone, Debug)]
#[group(required = true, multiple = false)]
pub struct SqlSource {
    /// SQL text
    #[arg(long)]
    pub sql: Option<String>,

    /// file containing the SQL
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl SqlSource {
    pub fn read(&self) -> anyhow::Result<String> {
        match (&self.sql, &self.file) {
            (Some(sql), _) => Ok(sql.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e)),
            (None, None) => anyhow::bail!("either --sql or --file is required"),
        }
    }
}

#[derive(Parser, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub source: SqlSource,

    /// rows to print before truncating
    #[arg(long, default_value_t = sqlgrade_core::report::DEFAULT_MAX_ROWS)]
    pub max_rows: usize,
}

#[derive(Parser, Clone)]
pub struct SubmitArgs {
    pub id: String,

    #[command(flatten)]
    pub source: SqlSource,

    #[arg(long, default_value_t = sqlgrade_core::report::DEFAULT_MAX_ROWS)]
    pub max_rows: usize,
}

#[derive(Parser, Clone)]
pub struct AnswerArgs {
    pub id: String,

    #[arg(long, default_value_t = sqlgrade_core::report::DEFAULT_MAX_ROWS)]
    pub max_rows: usize,
}

#[derive(Parser, Clone)]
pub struct ProgressArgs {
    /// delete all recorded progress
    #[arg(long)]
    pub reset: bool,
}

#[derive(Parser, Clone)]
pub struct PracticeArgs {
    pub id: String,

    #[arg(long, default_value_t = sqlgrade_core::report::DEFAULT_MAX_ROWS)]
    pub max_rows: usize,
}
