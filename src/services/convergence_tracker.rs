//! Bounded history of recent candidates used to detect stabilization.
//!
//! Near the fixed point the refinement map is a contraction, so once the
//! sequence settles at a given precision a new candidate reproduces one that
//! was already seen. The scheduler pairs this exact-reappearance test with a
//! bound on the change between successive candidates, since the last guard
//! digit can cycle through more values than the window holds.

use std::collections::VecDeque;

use crate::services::precision::Decimal;

/// Number of past candidates kept in the window.
pub const WINDOW_CAPACITY: usize = 4;

/// FIFO window over the most recent candidates.
#[derive(Debug, Clone)]
pub struct ConvergenceWindow {
    entries: VecDeque<Decimal>,
}

impl ConvergenceWindow {
    /// Window holding zero-valued placeholders followed by `start`.
    pub fn seeded(start: Decimal) -> Self {
        let mut entries = VecDeque::with_capacity(WINDOW_CAPACITY);
        entries.extend(std::iter::repeat_n(Decimal::zero(), WINDOW_CAPACITY - 1));
        entries.push_back(start);
        Self { entries }
    }

    /// Whether `candidate` equals (by value) any entry currently held.
    pub fn observe(&self, candidate: &Decimal) -> bool {
        self.entries.iter().any(|entry| entry == candidate)
    }

    /// Append `candidate`, evicting the oldest entry when full.
    pub fn push(&mut self, candidate: Decimal) {
        if self.len() == WINDOW_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(candidate);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_seeded_layout() {
        let window = ConvergenceWindow::seeded(dec("3"));
        let entries: Vec<String> = window.entries.iter().map(ToString::to_string).collect();
        assert_eq!(entries, vec!["0", "0", "0", "3"]);
        assert_eq!(window.len(), WINDOW_CAPACITY);
    }

    #[test]
    fn test_observe_uses_value_equality() {
        let window = ConvergenceWindow::seeded(dec("3.10"));
        assert!(window.observe(&dec("3.1")));
        assert!(window.observe(&Decimal::zero()));
        assert!(!window.observe(&dec("3.14")));
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut window = ConvergenceWindow::seeded(dec("3"));
        for value in ["3.1", "3.14", "3.141"] {
            window.push(dec(value));
            assert_eq!(window.len(), WINDOW_CAPACITY);
        }
        // All placeholders are gone now.
        assert!(!window.observe(&Decimal::zero()));
        assert!(window.observe(&dec("3")));

        window.push(dec("3.1415"));
        assert!(!window.observe(&dec("3")));
        assert_eq!(window.entries.back(), Some(&dec("3.1415")));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut window = ConvergenceWindow::seeded(dec("3"));
        for i in 0..50u64 {
            window.push(Decimal::from(i));
            assert!(window.len() <= WINDOW_CAPACITY);
        }
        assert!(!window.is_empty());
    }
}
