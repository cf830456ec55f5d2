use super::{exit_codes, print_json, Context};
use crate::cli::args::ShowArgs;
use sqlgrade_core::questions::find_question;
use sqlgrade_core::report::render_question;

pub fn run(ctx: &Context, args: ShowArgs) -> anyhow::Result<i32> {
    let bank = ctx.load_bank()?;
    let q = find_question(&bank, &args.id)?;

    if ctx.json() {
        let hints: Vec<&String> = q.hints.iter().take(args.hints).collect();
        print_json(&serde_json::json!({
            "id": q.id,
            "module": q.module,
            "title": q.title,
            "difficulty": q.difficulty,
            "prompt": q.prompt,
            "hints": hints,
            "hints_total": q.hints.len(),
        }))?;
    } else {
        println!("{}", render_question(q, args.hints));
    }
    Ok(exit_codes::OK)
}
