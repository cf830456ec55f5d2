pub mod schema;
pub mod store;

pub use store::{ProgressStats, QuestionProgress, Store};
