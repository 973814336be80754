//! Load-factor policy: decides the bucket count after a structural change.
//!
//! Capacities are always powers of two so that the index fold in
//! `bucket_table` can mask instead of dividing. Starting from
//! `START_CAPACITY`, the policy only ever doubles or halves.

/// Bucket count of a freshly constructed map.
pub const START_CAPACITY: usize = 16;

/// Below this load factor the table shrinks (unless it has one bucket).
pub const LOWER_LOAD_FACTOR: f64 = 0.25;

/// Above this load factor the table grows.
pub const UPPER_LOAD_FACTOR: f64 = 0.75;

// Integer forms of the thresholds: len/cap > 3/4 and len/cap < 1/4.
#[inline]
fn overloaded(len: usize, capacity: usize) -> bool {
    len.saturating_mul(4) > capacity.saturating_mul(3)
}

#[inline]
fn underloaded(len: usize, capacity: usize) -> bool {
    len.saturating_mul(4) < capacity
}

/// Capacity the table should have for `len` entries, given it currently
/// has `capacity` buckets. Returns `capacity` when no resize is needed.
///
/// Grow and shrink are mutually exclusive: the first doubles until the load
/// factor is at most 0.75, the second halves until it is at least 0.25 or
/// a single bucket remains.
pub fn target_capacity(len: usize, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    let mut cap = capacity;
    if overloaded(len, cap) {
        while overloaded(len, cap) {
            cap *= 2;
        }
    } else if underloaded(len, cap) {
        while underloaded(len, cap) && cap > 1 {
            cap /= 2;
        }
    }
    cap
}

/// `len / capacity` as a float.
#[inline]
pub fn load_factor(len: usize, capacity: usize) -> f64 {
    len as f64 / capacity as f64
}
