use super::{exit_codes, print_json, Context};
use crate::cli::args::AnswerArgs;
use anyhow::Context as _;
use sqlgrade_core::engine::Grader;
use sqlgrade_core::questions::find_question;
use sqlgrade_core::report::render_table;
use std::sync::Arc;

pub async fn run(ctx: &Context, args: AnswerArgs) -> anyhow::Result<i32> {
    let bank = ctx.load_bank()?;
    let q = find_question(&bank, &args.id)?;
    let grader = Grader::new(Arc::new(ctx.executor()?));
    let result = grader
        .reference_result(q)
        .await
        .with_context(|| format!("reference query for '{}' failed", q.id))?;

    if ctx.json() {
        print_json(&serde_json::json!({
            "id": q.id,
            "reference_query": q.reference_query,
            "result": result,
            "explanation": q.explanation,
            "interview_tip": q.interview_tip,
        }))?;
        return Ok(exit_codes::OK);
    }

    println!("{}\n", q.reference_query.trim_end());
    println!("{}", render_table(&result, args.max_rows));
    if !q.explanation.trim().is_empty() {
        println!("\n{}", q.explanation.trim_end());
    }
    if let Some(tip) = &q.interview_tip {
        println!("\nInterview tip: {}", tip.trim_end());
    }
    Ok(exit_codes::OK)
}
