use super::{exit_codes, print_json, Context};
use crate::cli::args::ProgressArgs;
use sqlgrade_core::report::render_progress;

pub fn run(ctx: &Context, args: ProgressArgs) -> anyhow::Result<i32> {
    let store = ctx.store()?;

    if args.reset {
        let removed = store.reset()?;
        if ctx.json() {
            print_json(&serde_json::json!({ "removed": removed }))?;
        } else {
            eprintln!("progress reset ({} questions cleared)", removed);
        }
        return Ok(exit_codes::OK);
    }

    let total = ctx.load_bank()?.questions.len();
    let stats = store.stats()?;
    let rows = store.load_all_progress()?;

    if ctx.json() {
        print_json(&serde_json::json!({
            "total_questions": total,
            "stats": stats,
            "questions": rows,
        }))?;
        return Ok(exit_codes::OK);
    }

    println!("{}", render_progress(&stats, total));
    for p in &rows {
        println!(
            "  {} {:<10} attempts={:<3} {}",
            if p.is_completed { "✅" } else { "🟡" },
            p.question_id,
            p.attempts,
            p.solved_at.as_deref().map(|t| format!("solved {}", t)).unwrap_or_default()
        );
    }
    Ok(exit_codes::OK)
}
