//! The main scheduling context.
//!
//! All deferred work in the runtime (debounce timers, delayed actions) is
//! queued here and fired on the main loop. The clock is virtual: the host
//! advances it with real elapsed time, tests advance it manually, so timer
//! behavior is deterministic either way. There are no background threads.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Duration;

use crate::cancel::Cancellable;

struct Timer {
    deadline: Duration,
    seq: u64,
    cancelled: Rc<Cell<bool>>,
    callback: Box<dyn FnOnce()>,
}

// BinaryHeap is a max-heap; order timers so the earliest deadline (then the
// earliest scheduled) is the greatest element.
impl PartialEq for Timer {
    fn eq(&self, other: &Timer) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}
impl Eq for Timer {}
impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Timer) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Timer {
    fn cmp(&self, other: &Timer) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then(other.seq.cmp(&self.seq))
    }
}

struct SchedulerState {
    now: Duration,
    next_seq: u64,
    timers: BinaryHeap<Timer>,
}

/// A cheaply clonable handle to the main-loop timer queue.
pub struct MainScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl Clone for MainScheduler {
    fn clone(&self) -> MainScheduler {
        MainScheduler {
            state: Rc::clone(&self.state),
        }
    }
}

impl Default for MainScheduler {
    fn default() -> MainScheduler {
        MainScheduler::new()
    }
}

impl MainScheduler {
    pub fn new() -> MainScheduler {
        MainScheduler {
            state: Rc::new(RefCell::new(SchedulerState {
                now: Duration::from_secs(0),
                next_seq: 0,
                timers: BinaryHeap::new(),
            })),
        }
    }

    /// The current virtual time.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Runs `callback` once after `delay` has elapsed on this scheduler.
    ///
    /// Cancelling the returned handle drops the pending callback with no
    /// effect.
    pub fn schedule<F: FnOnce() + 'static>(&self, delay: Duration, callback: F) -> Cancellable {
        let cancelled = Rc::new(Cell::new(false));
        {
            let mut state = self.state.borrow_mut();
            let deadline = state.now + delay;
            let seq = state.next_seq;
            state.next_seq += 1;
            state.timers.push(Timer {
                deadline,
                seq,
                cancelled: Rc::clone(&cancelled),
                callback: Box::new(callback),
            });
        }
        Cancellable::new(move || cancelled.set(true))
    }

    /// Advances the clock by `dt`, firing due timers in deadline order.
    ///
    /// Callbacks may schedule or cancel further timers; anything they
    /// schedule with an already-elapsed deadline fires within this call.
    pub fn advance(&self, dt: Duration) {
        let target = self.state.borrow().now + dt;
        loop {
            let timer = {
                let mut state = self.state.borrow_mut();
                match state.timers.peek() {
                    Some(timer) if timer.deadline <= target => {
                        let timer = state.timers.pop().unwrap();
                        // Clock follows the timer so callbacks observe a
                        // consistent `now` and relative scheduling works.
                        if timer.deadline > state.now {
                            state.now = timer.deadline;
                        }
                        Some(timer)
                    }
                    _ => None,
                }
            };
            match timer {
                Some(timer) => {
                    if !timer.cancelled.get() {
                        (timer.callback)();
                    }
                }
                None => break,
            }
        }
        self.state.borrow_mut().now = target;
    }

    /// Fires any timers that are already due without moving the clock.
    pub fn run_pending(&self) {
        self.advance(Duration::from_secs(0));
    }

    /// Time until the earliest live timer, if any. Used by the host run
    /// loop to bound how long it blocks on the event channel.
    pub fn next_deadline(&self) -> Option<Duration> {
        let mut state = self.state.borrow_mut();
        loop {
            match state.timers.peek() {
                Some(timer) if timer.cancelled.get() => {
                    state.timers.pop();
                }
                Some(timer) => {
                    let now = state.now;
                    return Some(if timer.deadline > now {
                        timer.deadline - now
                    } else {
                        Duration::from_secs(0)
                    });
                }
                None => return None,
            }
        }
    }
}
