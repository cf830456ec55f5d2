use super::{exit_codes, print_json, Context};
use crate::cli::args::SubmitArgs;
use sqlgrade_core::engine::{Grader, Submission};
use sqlgrade_core::questions::find_question;
use sqlgrade_core::report::{render_check, render_table};
use sqlgrade_core::session::SessionState;
use std::sync::Arc;

pub async fn run(ctx: &Context, args: SubmitArgs) -> anyhow::Result<i32> {
    let sql = args.source.read()?;
    let bank = ctx.load_bank()?;
    let q = find_question(&bank, &args.id)?;
    let grader = Grader::new(Arc::new(ctx.executor()?)).with_store(ctx.store()?);

    let mut session = SessionState::new();
    let submission = grader.submit(&mut session, q, &sql).await?;

    if ctx.json() {
        print_json(&submission)?;
    } else {
        print_submission(&submission, args.max_rows);
    }

    Ok(if submission.check.is_correct() {
        exit_codes::OK
    } else {
        exit_codes::NOT_CORRECT
    })
}

fn print_submission(s: &Submission, max_rows: usize) {
    if let Some(result) = &s.result {
        println!("{}\n", render_table(result, max_rows));
    }
    if let Some(err) = &s.error {
        println!("error: {}\n", err);
    }
    println!("{}", render_check(&s.check));
    if let Some(p) = &s.progress {
        let state = if p.is_completed { "completed" } else { "not completed" };
        eprintln!("attempt #{} recorded for {} ({})", p.attempts, s.question_id, state);
    }
}
