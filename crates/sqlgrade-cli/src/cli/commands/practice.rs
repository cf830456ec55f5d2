use super::{exit_codes, Context};
use crate::cli::args::PracticeArgs;
use sqlgrade_core::engine::{Grader, RunOutcome};
use sqlgrade_core::model::QuestionSpec;
use sqlgrade_core::questions::find_question;
use sqlgrade_core::report::{render_check, render_question, render_table};
use sqlgrade_core::session::SessionState;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Type SQL ending with ';' to run it. Commands: :hint :check :clear :quit";

#[derive(Debug, PartialEq, Eq)]
enum PracticeCommand {
    Hint,
    Check,
    Clear,
    Quit,
    Help,
    Unknown(String),
}

fn parse_command(line: &str) -> PracticeCommand {
    match line.trim().to_ascii_lowercase().as_str() {
        ":hint" | ":h" => PracticeCommand::Hint,
        ":check" | ":c" => PracticeCommand::Check,
        ":clear" => PracticeCommand::Clear,
        ":quit" | ":q" | ":exit" => PracticeCommand::Quit,
        ":help" | ":?" => PracticeCommand::Help,
        other => PracticeCommand::Unknown(other.to_string()),
    }
}

pub async fn run(ctx: &Context, args: PracticeArgs) -> anyhow::Result<i32> {
    let bank = ctx.load_bank()?;
    let q = find_question(&bank, &args.id)?;
    let grader = Grader::new(Arc::new(ctx.executor()?)).with_store(ctx.store()?);
    let mut session = SessionState::new();

    println!("{}\n", render_question(q, 0));
    println!("{}", HELP);

    let mut buffer = String::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if buffer.trim().is_empty() && trimmed.starts_with(':') {
            match parse_command(trimmed) {
                PracticeCommand::Quit => break,
                PracticeCommand::Hint => show_next_hint(&mut session, q),
                PracticeCommand::Check => check(&grader, &mut session, q).await?,
                PracticeCommand::Clear => {
                    session.clear(&q.id);
                    println!("Cleared.");
                }
                PracticeCommand::Help => println!("{}", HELP),
                PracticeCommand::Unknown(cmd) => println!("unknown command {}. {}", cmd, HELP),
            }
            continue;
        }

        buffer.push_str(&line);
        buffer.push('\n');
        if !trimmed.ends_with(';') {
            continue;
        }

        let sql = std::mem::take(&mut buffer);
        session.question(&q.id).draft_query = sql.clone();
        match grader.run(&mut session, &q.id, &sql).await {
            RunOutcome::Rows(_) => {
                if let Some(result) = session.get(&q.id).and_then(|s| s.last_result.as_ref()) {
                    println!("{}", render_table(result, args.max_rows));
                }
            }
            RunOutcome::Failed(e) => println!("error: {}", e),
            RunOutcome::Skipped => {}
        }
    }

    Ok(exit_codes::OK)
}

fn show_next_hint(session: &mut SessionState, q: &QuestionSpec) {
    if q.hints.is_empty() {
        println!("No hints for this question.");
        return;
    }
    let before = session.get(&q.id).map_or(0, |s| s.hint_stage);
    let stage = session.reveal_hint(&q.id, q.hints.len());
    if stage == before {
        println!("No more hints.");
    } else {
        println!("Hint {}/{}: {}", stage, q.hints.len(), q.hints[stage - 1].trim_end());
    }
}

async fn check(grader: &Grader, session: &mut SessionState, q: &QuestionSpec) -> anyhow::Result<()> {
    let (result, _) = grader.check_and_record(session, q).await?;
    println!("{}", render_check(&result));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(":hint"), PracticeCommand::Hint);
        assert_eq!(parse_command(" :CHECK "), PracticeCommand::Check);
        assert_eq!(parse_command(":q"), PracticeCommand::Quit);
        assert_eq!(parse_command(":clear"), PracticeCommand::Clear);
        assert_eq!(
            parse_command(":run"),
            PracticeCommand::Unknown(":run".into())
        );
    }
}
