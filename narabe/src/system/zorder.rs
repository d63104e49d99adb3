//! Tracks how a process's window indices move as windows are raised.
//!
//! System Events numbers a process's windows front to back, so raising
//! window 3 makes it window 1 and pushes windows 1 and 2 down by one.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ZOrder {
    /// Per process, the listed indices in current front-to-back order.
    stacks: HashMap<u32, Vec<u32>>,
}

impl ZOrder {
    /// Starts over from a fresh listing of `(pid, index)` pairs.
    pub fn reset(&mut self, windows: impl IntoIterator<Item = (u32, u32)>) {
        self.stacks.clear();
        for (pid, index) in windows {
            self.stacks.entry(pid).or_default().push(index);
        }
        for stack in self.stacks.values_mut() {
            stack.sort_unstable();
        }
    }

    /// The current index of the window that was listed at `index`.
    pub fn current_index(&self, pid: u32, index: u32) -> u32 {
        self.stacks
            .get(&pid)
            .and_then(|stack| stack.iter().position(|&i| i == index))
            .and_then(|pos| u32::try_from(pos + 1).ok())
            .unwrap_or(index)
    }

    /// Records that the window listed at `index` is now frontmost.
    pub fn raise(&mut self, pid: u32, index: u32) {
        if let Some(stack) = self.stacks.get_mut(&pid) {
            if let Some(pos) = stack.iter().position(|&i| i == index) {
                let raised = stack.remove(pos);
                stack.insert(0, raised);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_listing_keeps_indices() {
        let mut order = ZOrder::default();
        order.reset([(10, 1), (10, 2), (20, 1)]);
        assert_eq!(order.current_index(10, 1), 1);
        assert_eq!(order.current_index(10, 2), 2);
        assert_eq!(order.current_index(20, 1), 1);
    }

    #[test]
    fn test_raise_shifts_windows_in_front() {
        let mut order = ZOrder::default();
        order.reset([(10, 1), (10, 2), (10, 3)]);

        order.raise(10, 2);
        assert_eq!(order.current_index(10, 2), 1);
        assert_eq!(order.current_index(10, 1), 2);
        assert_eq!(order.current_index(10, 3), 3);

        order.raise(10, 3);
        assert_eq!(order.current_index(10, 3), 1);
        assert_eq!(order.current_index(10, 2), 2);
        assert_eq!(order.current_index(10, 1), 3);
    }

    #[test]
    fn test_raise_leaves_other_processes_alone() {
        let mut order = ZOrder::default();
        order.reset([(10, 1), (10, 2), (20, 1), (20, 2)]);
        order.raise(10, 2);
        assert_eq!(order.current_index(20, 1), 1);
        assert_eq!(order.current_index(20, 2), 2);
    }

    #[test]
    fn test_unknown_window_keeps_its_index() {
        let mut order = ZOrder::default();
        order.reset([(10, 1)]);
        order.raise(30, 4);
        assert_eq!(order.current_index(30, 4), 4);
    }

    #[test]
    fn test_reset_forgets_raises() {
        let mut order = ZOrder::default();
        order.reset([(10, 1), (10, 2)]);
        order.raise(10, 2);
        order.reset([(10, 1), (10, 2)]);
        assert_eq!(order.current_index(10, 2), 2);
    }
}
