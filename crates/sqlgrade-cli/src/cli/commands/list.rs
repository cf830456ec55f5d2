use super::{exit_codes, print_json, Context};
use crate::cli::args::ListArgs;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize)]
struct Entry<'a> {
    id: &'a str,
    module: &'a str,
    title: &'a str,
    difficulty: u8,
    completed: bool,
    attempts: u32,
}

pub fn run(ctx: &Context, args: ListArgs) -> anyhow::Result<i32> {
    let bank = ctx.load_bank()?;
    let progress: HashMap<String, _> = ctx
        .store()?
        .load_all_progress()?
        .into_iter()
        .map(|p| (p.question_id.clone(), p))
        .collect();

    let entries: Vec<Entry> = bank
        .questions
        .iter()
        .filter(|q| args.module.as_deref().map_or(true, |m| q.module == m))
        .map(|q| {
            let p = progress.get(&q.id);
            Entry {
                id: &q.id,
                module: &q.module,
                title: &q.title,
                difficulty: q.difficulty,
                completed: p.is_some_and(|p| p.is_completed),
                attempts: p.map_or(0, |p| p.attempts),
            }
        })
        .collect();

    if ctx.json() {
        print_json(&entries)?;
        return Ok(exit_codes::OK);
    }

    let mut module = None;
    for e in &entries {
        if module != Some(e.module) {
            println!("{}", if e.module.is_empty() { "(no module)" } else { e.module });
            module = Some(e.module);
        }
        let mark = if e.completed {
            "✅"
        } else if e.attempts > 0 {
            "🟡"
        } else {
            "  "
        };
        println!(
            "  {} {:<10} {:<45} {}",
            mark,
            e.id,
            e.title,
            "★".repeat(e.difficulty as usize)
        );
    }
    Ok(exit_codes::OK)
}
