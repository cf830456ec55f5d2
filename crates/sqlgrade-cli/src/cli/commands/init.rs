use super::{exit_codes, print_json, Context};
use crate::cli::args::InitArgs;
use sqlgrade_core::questions::write_sample_questions;
use sqlgrade_core::sample::create_sample_database;

pub fn run(ctx: &Context, args: InitArgs) -> anyhow::Result<i32> {
    let db = &ctx.cfg.db_path;
    let sample = if db.exists() && !args.force {
        eprintln!("note: {} already exists (use --force to recreate)", db.display());
        None
    } else {
        Some(create_sample_database(db)?)
    };

    let bank = &ctx.cfg.questions_path;
    let questions_created = !bank.exists();
    if questions_created {
        write_sample_questions(bank)?;
    } else {
        eprintln!("note: {} already exists", bank.display());
    }

    ctx.store()?;

    if ctx.json() {
        print_json(&serde_json::json!({
            "db": db,
            "sample": sample,
            "questions": bank,
            "questions_created": questions_created,
            "progress_db": ctx.cfg.progress_path,
        }))?;
    } else {
        if let Some(s) = &sample {
            eprintln!(
                "created {} ({} customers, {} transactions, {} events, {} campaigns)",
                db.display(),
                s.customers,
                s.transactions,
                s.events,
                s.campaigns
            );
        }
        if questions_created {
            eprintln!("created {}", bank.display());
        }
        eprintln!("progress is stored in {}", ctx.cfg.progress_path.display());
    }
    Ok(exit_codes::OK)
}
