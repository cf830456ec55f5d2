pub mod console;
pub mod json;

pub use console::{render_check, render_progress, render_question, render_table, DEFAULT_MAX_ROWS};
pub use json::to_json;
