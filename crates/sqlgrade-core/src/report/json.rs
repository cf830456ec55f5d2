use serde::Serialize;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckResult, CheckStatus};

    #[test]
    fn test_check_result_json_shape() {
        let r = CheckResult {
            status: CheckStatus::Partial,
            score: 70,
            message: "Partially correct (70 points).".into(),
            details: vec!["Too few rows.".into()],
            breakdown: None,
        };
        let v: serde_json::Value = serde_json::from_str(&to_json(&r).unwrap()).unwrap();
        assert_eq!(v["status"], "partial");
        assert_eq!(v["score"], 70);
        assert!(v.get("breakdown").is_none());
    }
}
