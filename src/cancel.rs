//! Subscription handles.

use core::fmt;
use std::cell::RefCell;

/// A handle representing one live subscription.
///
/// Cancelling runs the teardown exactly once; cancelling again is a no-op.
/// Dropping a `Cancellable` does *not* cancel it; cancellation is either
/// explicit or scoped through a [`DisposeBag`].
pub struct Cancellable {
    teardown: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Cancellable {
    /// Creates a handle that runs `teardown` on cancellation.
    pub fn new<F: FnOnce() + 'static>(teardown: F) -> Cancellable {
        Cancellable {
            teardown: RefCell::new(Some(Box::new(teardown))),
        }
    }

    /// A handle that does nothing when cancelled.
    pub fn empty() -> Cancellable {
        Cancellable {
            teardown: RefCell::new(None),
        }
    }

    /// Removes the subscription this handle represents. Idempotent.
    pub fn cancel(&self) {
        let teardown = self.teardown.borrow_mut().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.teardown.borrow().is_none()
    }

    /// Moves this handle into `bag`, tying its lifetime to the bag's.
    pub fn store(self, bag: &mut DisposeBag) {
        bag.insert(self);
    }
}

impl fmt::Debug for Cancellable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Cancellable({})",
            if self.is_cancelled() { "cancelled" } else { "live" }
        )
    }
}

/// Owns a set of subscriptions and cancels them all when dropped.
#[derive(Debug, Default)]
pub struct DisposeBag {
    items: Vec<Cancellable>,
}

impl DisposeBag {
    pub fn new() -> DisposeBag {
        DisposeBag { items: Vec::new() }
    }

    pub fn insert(&mut self, cancellable: Cancellable) {
        self.items.push(cancellable);
    }

    /// Cancels and removes everything held; the bag is reusable afterwards.
    pub fn cancel_all(&mut self) {
        for item in self.items.drain(..) {
            item.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Drop for DisposeBag {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn cancel_runs_teardown_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let cancellable = Cancellable::new(move || c.set(c.get() + 1));

        assert!(!cancellable.is_cancelled());
        cancellable.cancel();
        cancellable.cancel();
        assert!(cancellable.is_cancelled());
        assert_eq!(count.get(), 1, "second cancel must be a no-op");
    }

    #[test]
    fn drop_does_not_cancel() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        drop(Cancellable::new(move || c.set(c.get() + 1)));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn bag_drop_cancels_everything() {
        let count = Rc::new(Cell::new(0));
        {
            let mut bag = DisposeBag::new();
            for _ in 0..3 {
                let c = count.clone();
                Cancellable::new(move || c.set(c.get() + 1)).store(&mut bag);
            }
            assert_eq!(bag.len(), 3);
        }
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn bag_is_reusable_after_cancel_all() {
        let count = Rc::new(Cell::new(0));
        let mut bag = DisposeBag::new();

        let c = count.clone();
        bag.insert(Cancellable::new(move || c.set(c.get() + 1)));
        bag.cancel_all();
        assert!(bag.is_empty());
        assert_eq!(count.get(), 1);

        let c = count.clone();
        bag.insert(Cancellable::new(move || c.set(c.get() + 10)));
        bag.cancel_all();
        assert_eq!(count.get(), 11);
    }
}
