//! The context stack handlers consult while converting nested nodes.
//!
//! A parent passes an update when it converts a child; the update is merged
//! onto the current top for the duration of that conversion and popped
//! afterwards. The pop is tied to a [`ContextGuard`], so it happens on every
//! exit path of the conversion.

use std::cell::{Cell, RefCell};

/// A stack of merged context values with a fixed root.
#[derive(Debug)]
pub struct ContextStack<C> {
    root: C,
    pushed: RefCell<Vec<C>>,
    pushes: Cell<usize>,
    pops: Cell<usize>,
}

impl<C: Clone> ContextStack<C> {
    pub fn new(root: C) -> Self {
        Self {
            root,
            pushed: RefCell::new(Vec::new()),
            pushes: Cell::new(0),
            pops: Cell::new(0),
        }
    }

    /// The innermost context value.
    pub fn top(&self) -> C {
        self.with_top(C::clone)
    }

    /// Runs `f` on the innermost context value without cloning it.
    pub fn with_top<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        let pushed = self.pushed.borrow();
        f(pushed.last().unwrap_or(&self.root))
    }

    /// Number of values on the stack, the root included.
    pub fn depth(&self) -> usize {
        1 + self.pushed.borrow().len()
    }

    /// Pushes `merge(top, update)` until the returned guard is dropped.
    ///
    /// Without an update nothing is pushed and the guard is inert.
    pub fn push(
        &self,
        update: Option<C>,
        merge: impl FnOnce(&C, C) -> C,
    ) -> ContextGuard<'_, C> {
        let Some(update) = update else {
            return ContextGuard {
                stack: self,
                depth: None,
            };
        };
        let merged = self.with_top(|top| merge(top, update));
        let mut pushed = self.pushed.borrow_mut();
        pushed.push(merged);
        self.pushes.set(self.pushes.get() + 1);
        ContextGuard {
            stack: self,
            depth: Some(1 + pushed.len()),
        }
    }

    /// Total pushes since creation.
    pub fn push_count(&self) -> usize {
        self.pushes.get()
    }

    /// Total pops since creation.
    pub fn pop_count(&self) -> usize {
        self.pops.get()
    }

    fn pop_expecting(&self, depth: usize) {
        let mut pushed = self.pushed.borrow_mut();
        assert_eq!(
            1 + pushed.len(),
            depth,
            "context stack imbalance: the popped context is not the one this guard pushed"
        );
        pushed.pop();
        self.pops.set(self.pops.get() + 1);
    }
}

/// Pops the context pushed by [`ContextStack::push`] when dropped.
///
/// # Panics
///
/// Dropping a guard while a context pushed after it is still on the stack
/// panics: the innermost context must always be popped first.
#[must_use = "the context is popped as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard<'s, C: Clone> {
    stack: &'s ContextStack<C>,
    depth: Option<usize>,
}

impl<C: Clone> Drop for ContextGuard<'_, C> {
    fn drop(&mut self) {
        if let Some(depth) = self.depth.take() {
            self.stack.pop_expecting(depth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(old: &Vec<&'static str>, update: Vec<&'static str>) -> Vec<&'static str> {
        old.iter().copied().chain(update).collect()
    }

    #[test]
    fn test_push_merges_and_pops() {
        let stack = ContextStack::new(vec!["root"]);
        {
            let _outer = stack.push(Some(vec!["a"]), merge);
            assert_eq!(stack.top(), vec!["root", "a"]);
            {
                let _inner = stack.push(Some(vec!["b"]), merge);
                assert_eq!(stack.top(), vec!["root", "a", "b"]);
                assert_eq!(stack.depth(), 3);
            }
            assert_eq!(stack.top(), vec!["root", "a"]);
        }
        assert_eq!(stack.top(), vec!["root"]);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.push_count(), stack.pop_count());
    }

    #[test]
    fn test_push_without_update_is_noop() {
        let stack = ContextStack::new(0u8);
        {
            let _guard = stack.push(None, |_, update| update);
            assert_eq!(stack.depth(), 1);
        }
        assert_eq!(stack.push_count(), 0);
        assert_eq!(stack.pop_count(), 0);
    }

    #[test]
    fn test_guard_pops_on_unwind() {
        let stack = ContextStack::new(0u8);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = stack.push(Some(1), |_, update| update);
            panic!("handler failed");
        }));
        assert!(result.is_err());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top(), 0);
    }

    #[test]
    #[should_panic(expected = "context stack imbalance")]
    fn test_out_of_order_pop_panics() {
        let stack = ContextStack::new(0u8);
        let outer = stack.push(Some(1), |_, update| update);
        let inner = stack.push(Some(2), |_, update| update);
        drop(outer);
        drop(inner);
    }
}
