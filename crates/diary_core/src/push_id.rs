//! Push-style key generation for appended tree nodes.

use chrono::Utc;
use std::sync::Mutex;

/// Generates keys that sort lexically in the order they were generated.
///
/// A key is 12 hex digits of the millisecond clock followed by 8 hex digits of
/// a counter. The clock reading never moves backwards: a stalled or stepped-back
/// clock keeps the last reading and bumps the counter instead.
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    last: Mutex<(i64, u32)>,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&self, now_millis: i64) -> String {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if now_millis > last.0 {
            *last = (now_millis, 0);
        } else if last.1 == u32::MAX {
            *last = (last.0 + 1, 0);
        } else {
            last.1 += 1;
        }
        format!("{:012x}{:08x}", last.0, last.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_sort_in_generation_order_when_the_clock_stalls() {
        let ids = PushIdGenerator::new();
        let keys = vec![
            ids.next_at(1_000),
            ids.next_at(1_000),
            ids.next_at(999),
            ids.next_at(1_001),
        ];

        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), 4);
        assert!(keys.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn keys_are_fixed_width() {
        let ids = PushIdGenerator::new();
        assert_eq!(ids.next_at(1).len(), 20);
        assert_eq!(ids.next_id().len(), 20);
    }
}
