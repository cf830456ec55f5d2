//! Result-set grading: normalize both results, put rows in a canonical
//! order, then score row count, column count and values (30/20/50).

pub mod checker;
pub mod hint;
pub mod normalize;
pub mod sort;

pub use checker::check;
pub use normalize::{normalize, NormalizedResult};
pub use sort::sort_rows;
