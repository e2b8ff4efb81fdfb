//! Single-consumer callback wrappers.
//!
//! [`ActionWith`] is the mechanism by which native control callbacks (button
//! tap, text change, toggle flip) are threaded back into the binding graph
//! without the core depending on any specific widget type.

use core::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::scheduler::MainScheduler;

/// A callback taking no value.
pub type Action = ActionWith<()>;

/// A single-parameter callback value.
pub struct ActionWith<T> {
    block: Rc<dyn Fn(T)>,
}

impl<T> Clone for ActionWith<T> {
    fn clone(&self) -> ActionWith<T> {
        ActionWith {
            block: Rc::clone(&self.block),
        }
    }
}

impl<T> fmt::Debug for ActionWith<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ActionWith<{}>", core::any::type_name::<T>())
    }
}

impl<T: 'static> ActionWith<T> {
    pub fn new<F: Fn(T) + 'static>(block: F) -> ActionWith<T> {
        ActionWith {
            block: Rc::new(block),
        }
    }

    /// Wraps an optional callback; `None` yields no action.
    pub fn maybe<F: Fn(T) + 'static>(block: Option<F>) -> Option<ActionWith<T>> {
        block.map(ActionWith::new)
    }

    /// An action that does nothing.
    pub fn empty() -> ActionWith<T> {
        ActionWith::new(|_| {})
    }

    /// Invokes the callback now.
    pub fn execute(&self, value: T) {
        (self.block)(value);
    }

    /// Invokes the callback after `delay` on the main scheduling context.
    ///
    /// A zero delay executes immediately.
    pub fn execute_after(&self, value: T, delay: Duration, scheduler: &MainScheduler) {
        if delay == Duration::from_secs(0) {
            self.execute(value);
        } else {
            let action = self.clone();
            scheduler.schedule(delay, move || action.execute(value));
        }
    }

    /// Adapts the input: the new action transforms an incoming value and
    /// forwards it to `self`.
    pub fn map<C: 'static, F: Fn(C) -> T + 'static>(&self, transform: F) -> ActionWith<C> {
        let inner = self.clone();
        ActionWith::new(move |value| inner.execute(transform(value)))
    }

    /// As [`map`](ActionWith::map), but the transform may decline to
    /// forward by returning `None`.
    pub fn compact_map<C: 'static, F: Fn(C) -> Option<T> + 'static>(
        &self,
        transform: F,
    ) -> ActionWith<C> {
        let inner = self.clone();
        ActionWith::new(move |value| {
            if let Some(value) = transform(value) {
                inner.execute(value);
            }
        })
    }

    /// Invokes `self` and `other` in sequence with the same value.
    pub fn merge(&self, other: Option<ActionWith<T>>) -> ActionWith<T>
    where
        T: Clone,
    {
        ActionWith::merge_all(vec![Some(self.clone()), other])
    }

    /// Invokes every present action in order with the same value.
    pub fn merge_all(actions: Vec<Option<ActionWith<T>>>) -> ActionWith<T>
    where
        T: Clone,
    {
        ActionWith::new(move |value: T| {
            for action in actions.iter().flatten() {
                action.execute(value.clone());
            }
        })
    }

    /// Pairs two actions: executing with `(T, U)` invokes both.
    pub fn combine<U: 'static>(&self, other: &ActionWith<U>) -> ActionWith<(T, U)> {
        let first = self.clone();
        let second = other.clone();
        ActionWith::new(move |(a, b)| {
            first.execute(a);
            second.execute(b);
        })
    }
}

impl ActionWith<()> {
    /// Invokes a no-value action.
    pub fn run(&self) {
        self.execute(());
    }

    /// Widens a no-value action to accept (and discard) any value.
    pub fn adapt<T: 'static>(&self) -> ActionWith<T> {
        self.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn execute_invokes_block() {
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let action = ActionWith::new(move |v: i32| s.set(v));
        action.execute(7);
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn map_transforms_input() {
        let seen = Rc::new(RefCell::new(String::new()));
        let s = seen.clone();
        let action = ActionWith::new(move |v: String| *s.borrow_mut() = v);
        let numeric = action.map(|n: i32| format!("#{}", n));
        numeric.execute(3);
        assert_eq!(*seen.borrow(), "#3");
    }

    #[test]
    fn compact_map_filters() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let action = ActionWith::new(move |_: i32| c.set(c.get() + 1));
        let gated = action.compact_map(|n: i32| if n > 10 { Some(n) } else { None });

        gated.execute(5);
        gated.execute(50);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn merge_invokes_both_in_sequence() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        let first = ActionWith::new(move |v: i32| o.borrow_mut().push(("first", v)));
        let o = order.clone();
        let second = ActionWith::new(move |v: i32| o.borrow_mut().push(("second", v)));

        first.merge(Some(second)).execute(4);
        assert_eq!(*order.borrow(), vec![("first", 4), ("second", 4)]);
    }

    #[test]
    fn merge_skips_absent() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let action = ActionWith::new(move |_: i32| c.set(c.get() + 1));
        action.merge(None).execute(1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn combine_splits_pair() {
        let left = Rc::new(Cell::new(0));
        let right = Rc::new(RefCell::new(String::new()));

        let l = left.clone();
        let a = ActionWith::new(move |v: i32| l.set(v));
        let r = right.clone();
        let b = ActionWith::new(move |v: String| *r.borrow_mut() = v);

        a.combine(&b).execute((9, "nine".to_string()));
        assert_eq!(left.get(), 9);
        assert_eq!(*right.borrow(), "nine");
    }

    #[test]
    fn adapt_discards_value() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let action = Action::new(move |()| c.set(c.get() + 1));
        let adapted: ActionWith<&str> = action.adapt();
        adapted.execute("ignored");
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn delayed_execute_fires_on_scheduler() {
        let scheduler = MainScheduler::new();
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let action = ActionWith::new(move |v: i32| s.set(v));

        action.execute_after(42, Duration::from_millis(100), &scheduler);
        assert_eq!(seen.get(), 0, "must not fire before the delay elapses");

        scheduler.advance(Duration::from_millis(100));
        assert_eq!(seen.get(), 42);
    }

    #[test]
    fn zero_delay_executes_immediately() {
        let scheduler = MainScheduler::new();
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let action = ActionWith::new(move |v: i32| s.set(v));
        action.execute_after(1, Duration::from_secs(0), &scheduler);
        assert_eq!(seen.get(), 1);
    }
}
