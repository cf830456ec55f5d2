use super::args::*;
use serde::Serialize;
use sqlgrade_core::config::AppConfig;
use sqlgrade_core::executor::SqliteExecutor;
use sqlgrade_core::model::QuestionBank;
use sqlgrade_core::storage::Store;

pub mod answer;
pub mod init;
pub mod list;
pub mod practice;
pub mod progress;
pub mod query;
pub mod show;
pub mod submit;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const NOT_CORRECT: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

/// Resolved settings shared by every subcommand.
pub struct Context {
    pub cfg: AppConfig,
    pub format: OutputFormat,
    pub strict: bool,
}

impl Context {
    pub fn new(global: &GlobalArgs) -> Self {
        Self {
            cfg: resolve_config(AppConfig::from_env(), global),
            format: global.format,
            strict: global.strict,
        }
    }

    pub fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn load_bank(&self) -> anyhow::Result<QuestionBank> {
        if !self.cfg.questions_path.exists() {
            anyhow::bail!(
                "question bank {} not found; run `sqlgrade init` first",
                self.cfg.questions_path.display()
            );
        }
        Ok(sqlgrade_core::questions::load_questions(
            &self.cfg.questions_path,
            self.strict,
        )?)
    }

    pub fn executor(&self) -> anyhow::Result<SqliteExecutor> {
        if !self.cfg.db_path.exists() {
            anyhow::bail!(
                "database {} not found; run `sqlgrade init` first",
                self.cfg.db_path.display()
            );
        }
        Ok(SqliteExecutor::new(&self.cfg.db_path).with_timeout(self.cfg.query_timeout()))
    }

    pub fn store(&self) -> anyhow::Result<Store> {
        let store = Store::open(&self.cfg.progress_path)?;
        store.init_schema()?;
        Ok(store)
    }
}

/// Flags win over environment, environment over defaults.
pub fn resolve_config(mut cfg: AppConfig, global: &GlobalArgs) -> AppConfig {
    if let Some(p) = &global.db {
        cfg.db_path = p.clone();
    }
    if let Some(p) = &global.progress_db {
        cfg.progress_path = p.clone();
    }
    if let Some(p) = &global.questions {
        cfg.questions_path = p.clone();
    }
    if let Some(ms) = global.timeout_ms {
        cfg.query_timeout_ms = ms;
    }
    cfg
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", sqlgrade_core::report::to_json(value)?);
    Ok(())
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let ctx = Context::new(&cli.global);
    tracing::debug!(
        event = "sqlgrade.config",
        db = %ctx.cfg.db_path.display(),
        progress_db = %ctx.cfg.progress_path.display(),
        questions = %ctx.cfg.questions_path.display(),
        timeout_ms = ctx.cfg.query_timeout_ms
    );
    match cli.cmd {
        Command::Init(args) => init::run(&ctx, args),
        Command::List(args) => list::run(&ctx, args),
        Command::Show(args) => show::run(&ctx, args),
        Command::Query(args) => query::run(&ctx, args).await,
        Command::Submit(args) => submit::run(&ctx, args).await,
        Command::Answer(args) => answer::run(&ctx, args).await,
        Command::Progress(args) => progress::run(&ctx, args),
        Command::Practice(args) => practice::run(&ctx, args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}
