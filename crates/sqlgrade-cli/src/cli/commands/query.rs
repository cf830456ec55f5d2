use super::{exit_codes, print_json, Context};
use crate::cli::args::QueryArgs;
use sqlgrade_core::executor::QueryExecutor;
use sqlgrade_core::report::render_table;

pub async fn run(ctx: &Context, args: QueryArgs) -> anyhow::Result<i32> {
    let sql = args.source.read()?;
    let exec = ctx.executor()?;

    match exec.execute(&sql).await {
        Ok(result) => {
            if ctx.json() {
                print_json(&result)?;
            } else {
                println!("{}", render_table(&result, args.max_rows));
            }
            Ok(exit_codes::OK)
        }
        Err(e) => {
            if ctx.json() {
                print_json(&serde_json::json!({ "error": format!("{:#}", e) }))?;
            } else {
                eprintln!("error: {:#}", e);
            }
            Ok(exit_codes::NOT_CORRECT)
        }
    }
}
