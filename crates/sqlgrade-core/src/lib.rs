pub mod config;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod grading;
pub mod model;
pub mod questions;
pub mod report;
pub mod sample;
pub mod session;
pub mod storage;

pub use grading::check;
pub use model::{CellValue, CheckOptions, CheckResult, CheckStatus, TabularResult};
