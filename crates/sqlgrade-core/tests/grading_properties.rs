use sqlgrade_core::grading::checker::check_row_count;
use sqlgrade_core::model::{CellValue, CheckOptions, CheckStatus, TabularResult};
use sqlgrade_core::check;

fn table(rows: &[(&str, f64)]) -> TabularResult {
    TabularResult::new(
        vec!["k".into(), "v".into()],
        rows.iter()
            .map(|(k, v)| vec![CellValue::from(*k), CellValue::Float(*v)])
            .collect(),
    )
}

fn samples() -> Vec<TabularResult> {
    vec![
        table(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]),
        table(&[("C", 3.0), ("a ", 1.001), ("b", 2.0)]),
        table(&[("a", 1.0), ("b", 2.0)]),
        table(&[("a", 1.0), ("b", 2.5), ("c", 3.0)]),
        table(&[("x", 9.0), ("y", 8.0), ("z", 7.0), ("w", 6.0)]),
        TabularResult::new(vec!["k".into()], vec![vec!["a".into()]]),
    ]
}

#[test]
fn score_status_and_breakdown_agree() {
    let opts = CheckOptions::default();
    for u in samples() {
        for r in samples() {
            let res = check(Some(&u), Some(&r), &opts);
            assert!(res.score <= 100);
            assert_eq!(res.status, CheckStatus::from_score(res.score));
            if let Some(b) = res.breakdown {
                assert_eq!(b.total(), res.score);
            }
            if res.status == CheckStatus::Correct {
                assert_eq!(res.details, vec!["All checks passed.".to_string()]);
            }
        }
    }
}

#[test]
fn exact_components_are_symmetric() {
    let opts = CheckOptions::default();
    for u in samples() {
        for r in samples() {
            let a = check(Some(&u), Some(&r), &opts).breakdown.unwrap();
            let b = check(Some(&r), Some(&u), &opts).breakdown.unwrap();
            assert_eq!(a.columns, b.columns);
            assert_eq!(a.rows == 30, b.rows == 30);
            assert_eq!(a.values == 50, b.values == 50);
        }
    }
}

#[test]
fn grading_is_reflexive() {
    let opts = CheckOptions::default();
    for t in samples() {
        assert!(check(Some(&t), Some(&t), &opts).is_correct());
    }
}

#[test]
fn row_tiers_are_relative_to_reference() {
    assert_eq!(check_row_count(10, 10).0, 30);
    assert_eq!(check_row_count(11, 10).0, 20);
    assert_eq!(check_row_count(13, 10).0, 10);
    assert_eq!(check_row_count(14, 10).0, 0);
    assert_eq!(check_row_count(3, 0).0, 0);
}
