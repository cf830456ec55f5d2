//! Per-question UI state, owned by whoever drives the practice loop.

use crate::model::{CheckResult, TabularResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct QuestionState {
    pub draft_query: String,
    /// Number of hints revealed so far.
    pub hint_stage: usize,
    pub last_query: Option<String>,
    pub last_result: Option<TabularResult>,
    pub last_error: Option<String>,
    pub checked: Option<CheckResult>,
}

impl QuestionState {
    pub fn record_result(&mut self, sql: &str, result: TabularResult) {
        self.last_query = Some(sql.to_string());
        self.last_result = Some(result);
        self.last_error = None;
        self.checked = None;
    }

    /// A failed run drops the previous result so a later check cannot grade
    /// stale output.
    pub fn record_error(&mut self, sql: &str, error: String) {
        self.last_query = Some(sql.to_string());
        self.last_result = None;
        self.last_error = Some(error);
        self.checked = None;
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    questions: HashMap<String, QuestionState>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(&mut self, id: &str) -> &mut QuestionState {
        self.questions.entry(id.to_string()).or_default()
    }

    pub fn get(&self, id: &str) -> Option<&QuestionState> {
        self.questions.get(id)
    }

    /// Reveals the next hint, if any remain, and returns the new stage.
    pub fn reveal_hint(&mut self, id: &str, total_hints: usize) -> usize {
        let state = self.question(id);
        if state.hint_stage < total_hints {
            state.hint_stage += 1;
        }
        state.hint_stage
    }

    pub fn clear(&mut self, id: &str) {
        self.questions.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    #[test]
    fn test_state_created_on_first_access() {
        let mut s = SessionState::new();
        assert!(s.get("q").is_none());
        s.question("q").draft_query = "SELECT".into();
        assert_eq!(s.get("q").unwrap().draft_query, "SELECT");
    }

    #[test]
    fn test_hints_are_bounded() {
        let mut s = SessionState::new();
        assert_eq!(s.reveal_hint("q", 2), 1);
        assert_eq!(s.reveal_hint("q", 2), 2);
        assert_eq!(s.reveal_hint("q", 2), 2);
        assert_eq!(s.reveal_hint("none", 0), 0);
    }

    #[test]
    fn test_error_replaces_result_and_clear_resets() {
        let mut s = SessionState::new();
        let res = TabularResult::new(vec!["a".into()], vec![vec![CellValue::Int(1)]]);
        s.question("q").record_result("SELECT 1", res);
        s.question("q").record_error("SELEC", "syntax error".into());
        let st = s.get("q").unwrap();
        assert!(st.last_result.is_none());
        assert_eq!(st.last_error.as_deref(), Some("syntax error"));

        s.clear("q");
        assert!(s.get("q").is_none());
    }
}
