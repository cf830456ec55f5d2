pub mod grader;

pub use grader::{Grader, RunOutcome, Submission};
