use crate::errors::ConfigError;
use crate::model::{QuestionBank, QuestionSpec};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

pub const SUPPORTED_BANK_VERSION: u32 = 1;

const SAMPLE_BANK: &str = include_str!("../assets/questions.yaml");

pub fn load_questions(path: &Path, strict: bool) -> Result<QuestionBank, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ConfigError(format!(
            "failed to read question bank {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_questions(&raw, strict)
        .map_err(|e| ConfigError(format!("{} (file: {})", e.0, path.display())))
}

pub fn parse_questions(raw: &str, strict: bool) -> Result<QuestionBank, ConfigError> {
    let mut ignored_keys = BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);
    let bank: QuestionBank = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    let unknown: Vec<_> = ignored_keys
        .into_iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();
    if !unknown.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "unknown fields in question bank: {:?}",
                unknown
            )));
        }
        tracing::warn!(event = "sqlgrade.bank_unknown_fields", fields = ?unknown);
    }

    validate(&bank)?;
    Ok(bank)
}

fn validate(bank: &QuestionBank) -> Result<(), ConfigError> {
    if bank.version != SUPPORTED_BANK_VERSION {
        return Err(ConfigError(format!(
            "unsupported question bank version {} (supported: {})",
            bank.version, SUPPORTED_BANK_VERSION
        )));
    }
    if bank.questions.is_empty() {
        return Err(ConfigError("question bank has no questions".into()));
    }

    let mut seen = HashSet::new();
    for q in &bank.questions {
        if q.id.trim().is_empty() {
            return Err(ConfigError("question with empty id".into()));
        }
        if !seen.insert(q.id.as_str()) {
            return Err(ConfigError(format!("duplicate question id '{}'", q.id)));
        }
        if !(1..=5).contains(&q.difficulty) {
            return Err(ConfigError(format!(
                "question '{}': difficulty must be between 1 and 5 (got {})",
                q.id, q.difficulty
            )));
        }
        if q.reference_query.trim().is_empty() {
            return Err(ConfigError(format!(
                "question '{}' has no reference_query",
                q.id
            )));
        }
    }
    Ok(())
}

/// Looks up a question, suggesting the closest id when there is no match.
pub fn find_question<'a>(bank: &'a QuestionBank, id: &str) -> Result<&'a QuestionSpec, ConfigError> {
    if let Some(q) = bank.get(id) {
        return Ok(q);
    }
    match suggest_id(bank, id) {
        Some(s) => Err(ConfigError(format!(
            "unknown question '{}'. Did you mean '{}'?",
            id, s
        ))),
        None => Err(ConfigError(format!("unknown question '{}'", id))),
    }
}

pub fn suggest_id<'a>(bank: &'a QuestionBank, id: &str) -> Option<&'a str> {
    bank.questions
        .iter()
        .map(|q| (strsim::levenshtein(id, &q.id), q.id.as_str()))
        .filter(|(d, _)| *d <= 3)
        .min_by_key(|(d, _)| *d)
        .map(|(_, s)| s)
}

pub fn write_sample_questions(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError(format!("failed to create {}: {}", parent.display(), e)))?;
        }
    }
    std::fs::write(path, SAMPLE_BANK)
        .map_err(|e| ConfigError(format!("failed to write sample questions: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version: 1
questions:
  - id: q1
    title: One
    prompt: Count rows
    reference_query: SELECT 1
"#;

    #[test]
    fn test_sample_bank_parses_strictly() {
        let bank = parse_questions(SAMPLE_BANK, true).unwrap();
        assert!(bank.questions.len() >= 10);
        assert!(bank.get("rfm_1").is_some());
        let ab: Vec<&str> = bank
            .questions
            .iter()
            .filter(|q| q.module == "ab_test")
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(ab.len(), 10);
        assert_eq!(ab.first(), Some(&"ab_1"));
        assert_eq!(ab.last(), Some(&"ab_10"));
        let cohort = bank.get("cohort_1").unwrap();
        assert!(!cohort.grading.as_ref().unwrap().ignore_row_order);
    }

    #[test]
    fn test_defaults_apply() {
        let bank = parse_questions(MINIMAL, true).unwrap();
        let q = bank.get("q1").unwrap();
        assert_eq!(q.difficulty, 1);
        assert!(q.hints.is_empty());
        assert!(q.grading.is_none());
    }

    #[test]
    fn test_unknown_fields_rejected_only_when_strict() {
        let raw = MINIMAL.replace("title: One", "title: One\n    answer: nope");
        let err = parse_questions(&raw, true).unwrap_err();
        assert!(err.0.contains("unknown fields"));
        assert!(parse_questions(&raw, false).is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let dup = format!("{}{}", MINIMAL, "  - id: q1\n    title: Two\n    prompt: p\n    reference_query: SELECT 2\n");
        assert!(parse_questions(&dup, false).unwrap_err().0.contains("duplicate"));

        let bad_version = MINIMAL.replace("version: 1", "version: 2");
        assert!(parse_questions(&bad_version, false).unwrap_err().0.contains("version"));

        let hard = MINIMAL.replace("title: One", "title: One\n    difficulty: 9");
        assert!(parse_questions(&hard, false).unwrap_err().0.contains("difficulty"));

        let empty = "version: 1\nquestions: []\n";
        assert!(parse_questions(empty, false).unwrap_err().0.contains("no questions"));
    }

    #[test]
    fn test_find_question_suggests() {
        let bank = parse_questions(SAMPLE_BANK, false).unwrap();
        let err = find_question(&bank, "rfm1").unwrap_err();
        assert!(err.0.contains("Did you mean"));
        assert!(find_question(&bank, "completely_unrelated_name").is_err());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank").join("questions.yaml");
        write_sample_questions(&path).unwrap();
        let bank = load_questions(&path, true).unwrap();
        assert_eq!(bank.version, SUPPORTED_BANK_VERSION);
    }
}
