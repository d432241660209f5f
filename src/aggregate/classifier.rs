use crate::source::mapper::LogEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroI64;

/// One aggregation group: `x` is the group key, `y` the number of members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bucket {
    pub x: i64,
    pub y: u64,
}

/// Group items by `key` and count each group.
///
/// Buckets are emitted in the order their key is first seen, not sorted by
/// key. Input that is already time-ordered therefore yields sorted output.
pub fn classify<T, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<Bucket>
where
    F: FnMut(&T) -> i64,
{
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut positions: HashMap<i64, usize> = HashMap::new();

    for item in items {
        let x = key(&item);
        match positions.get(&x) {
            Some(&position) => buckets[position].y += 1,
            None => {
                positions.insert(x, buckets.len());
                buckets.push(Bucket { x, y: 1 });
            }
        }
    }

    buckets
}

/// Round `timestamp` to the nearest multiple of `width_ms`.
///
/// Halves round up toward positive infinity, so `width_ms / 2` lands on
/// `width_ms` and `-width_ms / 2` lands on zero. Only the magnitude of the
/// width is used.
pub fn time_key(timestamp: i64, width_ms: NonZeroI64) -> i64 {
    let t = i128::from(timestamp);
    let w = i128::from(width_ms.get().unsigned_abs());
    let key = (2 * t + w).div_euclid(2 * w) * w;
    // |key - t| <= w / 2, so the result only leaves i64 range at the extremes
    key.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Bucket entries by their rounded timestamp. Entries without one are skipped.
pub fn classify_by_time<'a>(
    entries: impl IntoIterator<Item = &'a LogEntry>,
    width_ms: NonZeroI64,
) -> Vec<Bucket> {
    classify(entries.into_iter().filter_map(|entry| entry.timestamp), |ts| {
        time_key(*ts, width_ms)
    })
}
