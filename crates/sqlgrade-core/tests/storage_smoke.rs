use sqlgrade_core::storage::Store;

#[test]
fn progress_survives_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("progress.db");

    {
        let store = Store::open(&path)?;
        store.init_schema()?;
        store.save_progress("cohort_1", true, "SELECT 1")?;
        store.save_progress("cohort_2", false, "SELECT 2")?;
    }

    let store = Store::open(&path)?;
    store.init_schema()?;
    let all = store.load_all_progress()?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].question_id, "cohort_1");
    assert!(all[0].is_completed);
    assert!(all[0].solved_at.is_some());
    assert_eq!(store.completed_count()?, 1);
    Ok(())
}
