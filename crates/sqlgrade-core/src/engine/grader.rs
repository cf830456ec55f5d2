use crate::executor::QueryExecutor;
use crate::grading::check;
use crate::model::{CheckOptions, CheckResult, QuestionSpec, TabularResult};
use crate::session::SessionState;
use crate::storage::{QuestionProgress, Store};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Blank input; the session is left untouched.
    Skipped,
    Rows(usize),
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub question_id: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TabularResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub check: CheckResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<QuestionProgress>,
}

pub struct Grader {
    pub executor: Arc<dyn QueryExecutor>,
    pub store: Option<Store>,
    pub options: CheckOptions,
}

impl Grader {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            executor,
            store: None,
            options: CheckOptions::default(),
        }
    }

    pub fn with_store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    /// Executes user SQL and caches the result (or the error) in the session.
    pub async fn run(&self, session: &mut SessionState, question_id: &str, sql: &str) -> RunOutcome {
        if sql.trim().is_empty() {
            return RunOutcome::Skipped;
        }
        match self.executor.execute(sql).await {
            Ok(res) => {
                let n = res.row_count();
                session.question(question_id).record_result(sql, res);
                RunOutcome::Rows(n)
            }
            Err(e) => {
                let msg = format!("{:#}", e);
                tracing::debug!(event = "sqlgrade.user_query_failed", question_id = %question_id, error = %msg);
                session.question(question_id).record_error(sql, msg.clone());
                RunOutcome::Failed(msg)
            }
        }
    }

    pub async fn reference_result(&self, question: &QuestionSpec) -> anyhow::Result<TabularResult> {
        self.executor.execute(&question.reference_query).await
    }

    /// Grades the cached user result against a fresh run of the reference query.
    pub async fn check(&self, session: &mut SessionState, question: &QuestionSpec) -> CheckResult {
        self.grade(session, question).await.0
    }

    /// Like [`Grader::check`], also reporting whether the reference query ran.
    async fn grade(&self, session: &mut SessionState, question: &QuestionSpec) -> (CheckResult, bool) {
        let reference = match self.reference_result(question).await {
            Ok(r) => Some(r),
            Err(e) => {
                tracing::warn!(
                    event = "sqlgrade.reference_failed",
                    question_id = %question.id,
                    error = %format!("{:#}", e)
                );
                None
            }
        };

        let opts = question.grading.unwrap_or(self.options);
        let state = session.question(&question.id);
        let result = check(state.last_result.as_ref(), reference.as_ref(), &opts);
        state.checked = Some(result.clone());
        (result, reference.is_some())
    }

    /// Grades the session's last successful run and records it. Nothing is
    /// recorded without a result, or when the reference query is broken.
    pub async fn check_and_record(
        &self,
        session: &mut SessionState,
        question: &QuestionSpec,
    ) -> anyhow::Result<(CheckResult, Option<QuestionProgress>)> {
        let (result, reference_ran) = self.grade(session, question).await;
        let graded_query = session
            .get(&question.id)
            .filter(|s| reference_ran && s.last_result.is_some())
            .and_then(|s| s.last_query.clone());
        let progress = match graded_query {
            Some(sql) => self.record(&question.id, &result, &sql)?,
            None => None,
        };
        Ok((result, progress))
    }

    /// Persists a graded attempt when a store is attached.
    pub fn record(
        &self,
        question_id: &str,
        result: &CheckResult,
        sql: &str,
    ) -> anyhow::Result<Option<QuestionProgress>> {
        match &self.store {
            Some(store) => Ok(Some(store.save_progress(
                question_id,
                result.is_correct(),
                sql.trim(),
            )?)),
            None => Ok(None),
        }
    }

    /// Runs, grades and records one attempt. Blank SQL and a failing
    /// reference query are graded (as errors) but not recorded.
    pub async fn submit(
        &self,
        session: &mut SessionState,
        question: &QuestionSpec,
        sql: &str,
    ) -> anyhow::Result<Submission> {
        let outcome = self.run(session, &question.id, sql).await;
        if outcome == RunOutcome::Skipped {
            session.question(&question.id).last_result = None;
        }
        let (result, reference_ran) = self.grade(session, question).await;

        let progress = match outcome {
            RunOutcome::Skipped => None,
            _ if !reference_ran => None,
            _ => self.record(&question.id, &result, sql)?,
        };

        let state = session.question(&question.id);
        Ok(Submission {
            question_id: question.id.clone(),
            query: sql.trim().to_string(),
            result: state.last_result.clone(),
            error: state.last_error.clone(),
            check: result,
            progress,
        })
    }
}
