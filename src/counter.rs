use serde::{Deserialize, Serialize};

/// Monotonic key allocator. `next_key` pre-increments, so a fresh counter yields 1 first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Counter {
    value: u32,
}

impl Counter {
    pub fn new(initial: u32) -> Counter {
        Counter { value: initial }
    }

    pub fn next_key(&mut self) -> u32 {
        self.value += 1;
        self.value
    }

    /// Last key handed out (or the seed value if none were).
    pub fn value(&self) -> u32 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_starts_after_seed() {
        let mut counter = Counter::new(3);
        assert_eq!(counter.value(), 3);
        assert_eq!(counter.next_key(), 4);
        assert_eq!(counter.next_key(), 5);
        assert_eq!(Counter::default().next_key(), 1);
    }
}
