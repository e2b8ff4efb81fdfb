//! Reactive value containers.
//!
//! A [`Binding`] holds an optional current value and an ordered table of
//! subscribers. Updating the value synchronously notifies every subscriber
//! in registration order. Derived bindings (`map`, `compact_map`, `filter`,
//! `combine`, `merge`, `debounce`) each own the subscription wiring them to
//! their source and hold only a weak back-reference from the source's
//! callback, so either side may outlive the other: a derived binding whose
//! source is gone simply stops receiving updates.
//!
//! The graph is single-threaded; all propagation is synchronous re-entrant
//! calls on the main loop, and the only deferred element is the debounce
//! timer on the [`MainScheduler`].

use core::fmt;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::action::ActionWith;
use crate::cancel::Cancellable;
use crate::scheduler::MainScheduler;

type Callback<T> = Rc<dyn Fn(&T)>;

struct Subscriber<T> {
    id: u64,
    callback: Callback<T>,
}

struct BindingCell<T> {
    value: RefCell<Option<T>>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
    next_id: Cell<u64>,
    debug_name: RefCell<Option<String>>,
    /// Subscriptions to upstream sources, for derived bindings. Dropping
    /// the cell cancels them, detaching this binding from its sources.
    owned: RefCell<Vec<Cancellable>>,
}

impl<T> Drop for BindingCell<T> {
    fn drop(&mut self) {
        for subscription in self.owned.borrow_mut().drain(..) {
            subscription.cancel();
        }
    }
}

/// A reactive container holding a current value and notifying subscribers
/// on change.
///
/// `Binding` is a shared handle; cloning it aliases the same cell.
pub struct Binding<T> {
    cell: Rc<BindingCell<T>>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Binding<T> {
        Binding {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = self.cell.debug_name.borrow();
        let mut s = f.debug_struct("Binding");
        if let Some(name) = &*name {
            s.field("name", name);
        }
        s.field("value", &*self.cell.value.borrow()).finish()
    }
}

impl<T: Clone + 'static> Binding<T> {
    /// Creates a binding, optionally seeded with a value.
    pub fn new(value: Option<T>) -> Binding<T> {
        Binding {
            cell: Rc::new(BindingCell {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                debug_name: RefCell::new(None),
                owned: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Creates a binding holding `value`.
    pub fn create(value: T) -> Binding<T> {
        Binding::new(Some(value))
    }

    /// A binding holding a fixed starting value. Alias for [`create`]
    /// matching the declarative call sites (`.constant(true)`).
    ///
    /// [`create`]: Binding::create
    pub fn constant(value: T) -> Binding<T> {
        Binding::create(value)
    }

    /// Creates a binding with no value yet.
    pub fn empty() -> Binding<T> {
        Binding::new(None)
    }

    /// Attaches a name used in `Debug` output.
    pub fn named(self, name: &str) -> Binding<T> {
        *self.cell.debug_name.borrow_mut() = Some(name.to_string());
        self
    }

    /// The current value. A binding that has never been given a value
    /// yields `None`.
    pub fn value(&self) -> Option<T> {
        self.cell.value.borrow().clone()
    }

    pub fn has_value(&self) -> bool {
        self.cell.value.borrow().is_some()
    }

    /// Borrows the current value without cloning.
    pub fn with_value<R, F: FnOnce(&T) -> R>(&self, f: F) -> Option<R> {
        self.cell.value.borrow().as_ref().map(f)
    }

    /// Sets the value, then synchronously invokes every currently
    /// registered subscriber in registration order.
    ///
    /// Delivery iterates a snapshot of the subscriber table taken at entry:
    /// subscribers registered during a delivery do not observe the
    /// in-flight update.
    pub fn update(&self, value: T) {
        *self.cell.value.borrow_mut() = Some(value.clone());
        let snapshot: Vec<Callback<T>> = self
            .cell
            .subscribers
            .borrow()
            .iter()
            .map(|s| Rc::clone(&s.callback))
            .collect();
        for callback in snapshot {
            callback(&value);
        }
    }

    /// Registers a subscriber. The callback is *not* invoked with the
    /// current value; callers that need it read [`value`](Binding::value).
    pub fn bind<F: Fn(&T) + 'static>(&self, callback: F) -> Cancellable {
        let id = self.cell.next_id.get();
        self.cell.next_id.set(id + 1);
        self.cell.subscribers.borrow_mut().push(Subscriber {
            id,
            callback: Rc::new(callback),
        });

        let weak = Rc::downgrade(&self.cell);
        Cancellable::new(move || {
            if let Some(cell) = weak.upgrade() {
                cell.subscribers.borrow_mut().retain(|s| s.id != id);
            }
        })
    }

    /// Registers an [`ActionWith`] as a subscriber.
    pub fn bind_action(&self, action: ActionWith<T>) -> Cancellable {
        self.bind(move |value| action.execute(value.clone()))
    }

    pub(crate) fn retain_subscription(&self, subscription: Cancellable) {
        self.cell.owned.borrow_mut().push(subscription);
    }

    fn from_weak(weak: &Weak<BindingCell<T>>) -> Option<Binding<T>> {
        weak.upgrade().map(|cell| Binding { cell })
    }

    /// A derived binding carrying `transform(value)`, updated whenever the
    /// source updates.
    pub fn map<U: Clone + 'static, F: Fn(&T) -> U + 'static>(&self, transform: F) -> Binding<U> {
        let derived = Binding::new(self.with_value(|v| transform(v)));
        let weak = Rc::downgrade(&derived.cell);
        let subscription = self.bind(move |value| {
            if let Some(derived) = Binding::from_weak(&weak) {
                derived.update(transform(value));
            }
        });
        derived.retain_subscription(subscription);
        derived
    }

    /// As [`map`](Binding::map), but source events for which the transform
    /// yields `None` are dropped.
    pub fn compact_map<U: Clone + 'static, F: Fn(&T) -> Option<U> + 'static>(
        &self,
        transform: F,
    ) -> Binding<U> {
        let derived = Binding::new(self.with_value(|v| transform(v)).and_then(|v| v));
        let weak = Rc::downgrade(&derived.cell);
        let subscription = self.bind(move |value| {
            if let Some(mapped) = transform(value) {
                if let Some(derived) = Binding::from_weak(&weak) {
                    derived.update(mapped);
                }
            }
        });
        derived.retain_subscription(subscription);
        derived
    }

    /// A derived binding that only updates when `predicate` holds. Its
    /// initial value is the source's current value if that passes, else
    /// absent.
    pub fn filter<F: Fn(&T) -> bool + 'static>(&self, predicate: F) -> Binding<T> {
        let initial = match self.value() {
            Some(value) if predicate(&value) => Some(value),
            _ => None,
        };
        let derived = Binding::new(initial);
        let weak = Rc::downgrade(&derived.cell);
        let subscription = self.bind(move |value| {
            if predicate(value) {
                if let Some(derived) = Binding::from_weak(&weak) {
                    derived.update(value.clone());
                }
            }
        });
        derived.retain_subscription(subscription);
        derived
    }

    /// Discards the value, keeping only the update events.
    pub fn map_to_unit(&self) -> Binding<()> {
        self.map(|_| ())
    }

    /// A derived binding updating whenever either source updates, pairing
    /// the latest value from each side. It stays absent until both sides
    /// have a value; each side's update fires its own propagation, so the
    /// pair may briefly reflect a stale partner (no transactional
    /// atomicity across sources).
    pub fn combine<U: Clone + 'static>(&self, other: &Binding<U>) -> Binding<(T, U)> {
        let initial = match (self.value(), other.value()) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        };
        let derived = Binding::new(initial);

        let weak_derived = Rc::downgrade(&derived.cell);
        let weak_other = Rc::downgrade(&other.cell);
        let left = self.bind(move |value| {
            let other = match weak_other.upgrade() {
                Some(cell) => cell,
                None => return,
            };
            let partner = other.value.borrow().clone();
            if let (Some(partner), Some(derived)) = (partner, Binding::from_weak(&weak_derived)) {
                derived.update((value.clone(), partner));
            }
        });

        let weak_derived = Rc::downgrade(&derived.cell);
        let weak_this = Rc::downgrade(&self.cell);
        let right = other.bind(move |value| {
            let this = match weak_this.upgrade() {
                Some(cell) => cell,
                None => return,
            };
            let partner = this.value.borrow().clone();
            if let (Some(partner), Some(derived)) = (partner, Binding::from_weak(&weak_derived)) {
                derived.update((partner, value.clone()));
            }
        });

        derived.retain_subscription(left);
        derived.retain_subscription(right);
        derived
    }

    /// A binding re-emitting whatever any input emits, in the order events
    /// occur. It is a pure event relay: its initial value is absent.
    pub fn merge(inputs: &[Binding<T>]) -> Binding<T> {
        let derived = Binding::empty();
        for input in inputs {
            let weak = Rc::downgrade(&derived.cell);
            let subscription = input.bind(move |value| {
                if let Some(derived) = Binding::from_weak(&weak) {
                    derived.update(value.clone());
                }
            });
            derived.retain_subscription(subscription);
        }
        derived
    }

    /// A derived binding that commits an update only once `interval` has
    /// elapsed with no further source update superseding it. Every source
    /// update cancels and restarts the pending timer; the timer fires on
    /// the main scheduling context.
    pub fn debounce(&self, interval: Duration, scheduler: &MainScheduler) -> Binding<T> {
        let derived = Binding::new(self.value());
        let weak = Rc::downgrade(&derived.cell);
        let scheduler = scheduler.clone();
        let pending: Rc<RefCell<Option<Cancellable>>> = Rc::new(RefCell::new(None));

        let subscription = self.bind(move |value| {
            if let Some(previous) = pending.borrow_mut().take() {
                previous.cancel();
            }
            let weak = weak.clone();
            let value = value.clone();
            let timer = scheduler.schedule(interval, move || {
                if let Some(derived) = Binding::from_weak(&weak) {
                    derived.update(value);
                }
            });
            *pending.borrow_mut() = Some(timer);
        });
        derived.retain_subscription(subscription);
        derived
    }
}

/// A binding variant with a debounced update queue.
///
/// Without a configured debounce, `update` behaves exactly like
/// [`Binding::update`]. With one, updates coalesce into a single-slot
/// latest-value queue: the pending timer restarts on every update, and on
/// fire the queued value is committed and delivered once.
pub struct Publisher<T> {
    binding: Binding<T>,
    queue: Rc<RefCell<UpdateQueue<T>>>,
}

struct UpdateQueue<T> {
    interval: Option<Duration>,
    scheduler: Option<MainScheduler>,
    pending: Option<Cancellable>,
    latest: Option<T>,
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Publisher<T> {
        Publisher {
            binding: self.binding.clone(),
            queue: Rc::clone(&self.queue),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Publisher<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("value", &*self.binding.cell.value.borrow())
            .field("debounced", &self.queue.borrow().interval.is_some())
            .finish()
    }
}

impl<T: Clone + 'static> Publisher<T> {
    pub fn new(value: Option<T>) -> Publisher<T> {
        Publisher {
            binding: Binding::new(value),
            queue: Rc::new(RefCell::new(UpdateQueue {
                interval: None,
                scheduler: None,
                pending: None,
                latest: None,
            })),
        }
    }

    pub fn create(value: T) -> Publisher<T> {
        Publisher::new(Some(value))
    }

    pub fn empty() -> Publisher<T> {
        Publisher::new(None)
    }

    /// Configures debounced delivery on the given scheduler.
    pub fn debounce(self, interval: Duration, scheduler: &MainScheduler) -> Publisher<T> {
        {
            let mut queue = self.queue.borrow_mut();
            queue.interval = Some(interval);
            queue.scheduler = Some(scheduler.clone());
        }
        self
    }

    pub fn value(&self) -> Option<T> {
        self.binding.value()
    }

    /// The underlying binding, for deriving further transformations.
    pub fn binding(&self) -> Binding<T> {
        self.binding.clone()
    }

    pub fn bind<F: Fn(&T) + 'static>(&self, callback: F) -> Cancellable {
        self.binding.bind(callback)
    }

    pub fn map<U: Clone + 'static, F: Fn(&T) -> U + 'static>(&self, transform: F) -> Binding<U> {
        self.binding.map(transform)
    }

    pub fn map_to_unit(&self) -> Binding<()> {
        self.binding.map_to_unit()
    }

    /// Submits a value. Delivery is debounced when configured.
    pub fn update(&self, value: T) {
        let configured = {
            let queue = self.queue.borrow();
            match (&queue.interval, &queue.scheduler) {
                (Some(interval), Some(scheduler)) => Some((*interval, scheduler.clone())),
                _ => None,
            }
        };
        let (interval, scheduler) = match configured {
            Some(pair) => pair,
            None => {
                self.binding.update(value);
                return;
            }
        };

        let mut queue = self.queue.borrow_mut();
        queue.latest = Some(value);
        if let Some(previous) = queue.pending.take() {
            previous.cancel();
        }
        let binding = self.binding.clone();
        let slot = Rc::clone(&self.queue);
        queue.pending = Some(scheduler.schedule(interval, move || {
            let latest = slot.borrow_mut().latest.take();
            if let Some(value) = latest {
                binding.update(value);
            }
        }));
    }
}
