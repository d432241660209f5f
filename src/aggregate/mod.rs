pub mod classifier;
pub mod range;

pub use classifier::{classify, classify_by_time, time_key, Bucket};
pub use range::{filter_from, filter_range, filter_until, parse_bound};
