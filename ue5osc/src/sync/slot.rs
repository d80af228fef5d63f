//! Single-value hand-off between the listener thread and a waiting caller.
//!
//! # Overview
//!
//! A [`ReplySlot`] is either EMPTY or FILLED.
//!
//! - [`ReplySlot::deposit`] (listener thread) fills the slot and wakes one
//!   waiter. It never waits on the consumer. Depositing into a FILLED slot
//!   replaces the old value, which is handed back to the caller so it can be
//!   logged.
//! - [`ReplySlot::wait`] (caller thread) takes the value, blocking while the
//!   slot is EMPTY. Taking empties the slot under the same lock that
//!   `deposit` fills it with, so a value is observed whole or not at all.
//! - [`ReplySlot::close`] marks the producer as gone. Waiters still get a
//!   value that is already in the slot; otherwise they return `None`
//!   instead of blocking forever.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ue5osc::sync::ReplySlot;
//!
//! let slot = Arc::new(ReplySlot::new());
//! let producer = Arc::clone(&slot);
//! std::thread::spawn(move || {
//!     producer.deposit(42);
//! });
//! assert_eq!(slot.wait(), Some(42));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use minstant::Instant;

/// Timeout specification for blocking operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Wait indefinitely.
    Infinite,
    /// Wait for at most the specified duration.
    Duration(Duration),
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

/// One pending value guarded by a mutex and a condition variable.
#[derive(Debug)]
pub struct ReplySlot<T> {
    value: Mutex<Option<T>>,
    filled: Condvar,
    /// Only written with `value` locked.
    closed: AtomicBool,
}

impl<T> Default for ReplySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReplySlot<T> {
    /// Creates an EMPTY slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: Mutex::new(None),
            filled: Condvar::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// A poisoned lock only means another thread panicked while holding it;
    /// the `Option` inside is still whole.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fills the slot and wakes one waiter.
    ///
    /// Returns the value that was overwritten, if the slot was already FILLED.
    pub fn deposit(&self, value: T) -> Option<T> {
        let previous = self.lock().replace(value);
        self.filled.notify_one();
        previous
    }

    /// Takes the value without blocking.
    #[must_use]
    pub fn try_take(&self) -> Option<T> {
        self.lock().take()
    }

    /// Returns `true` if a value is waiting to be taken.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.lock().is_some()
    }

    /// Marks the slot closed and wakes every waiter.
    pub fn close(&self) {
        let _guard = self.lock();
        self.closed.store(true, Ordering::Release);
        self.filled.notify_all();
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Blocks until the slot is FILLED, then takes the value.
    ///
    /// Returns `None` if the slot is closed while EMPTY.
    #[must_use]
    pub fn wait(&self) -> Option<T> {
        let mut guard = self.lock();
        loop {
            if let Some(value) = guard.take() {
                return Some(value);
            }
            if self.is_closed() {
                return None;
            }
            guard = self
                .filled
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`wait`](Self::wait) but gives up once `timeout` elapses.
    ///
    /// Returns `None` on timeout or once closed while EMPTY; the slot is left
    /// untouched in that case.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Timeout) -> Option<T> {
        let deadline = match timeout {
            Timeout::Infinite => return self.wait(),
            Timeout::Duration(d) => match Instant::now().checked_add(d) {
                Some(deadline) => deadline,
                // Past the end of the clock; no different from waiting forever.
                None => return self.wait(),
            },
        };

        let mut guard = self.lock();
        loop {
            if let Some(value) = guard.take() {
                return Some(value);
            }
            if self.is_closed() {
                return None;
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            if remaining.is_zero() {
                return None;
            }
            guard = self
                .filled
                .wait_timeout(guard, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const SHORT: Duration = Duration::from_millis(50);

    #[test]
    fn starts_empty() {
        let slot = ReplySlot::<u32>::new();
        assert!(!slot.is_filled());
        assert_eq!(slot.try_take(), None);
        assert_eq!(slot.wait_timeout(SHORT.into()), None);
    }

    #[test]
    fn value_is_returned_once() {
        let slot = ReplySlot::new();
        assert_eq!(slot.deposit((1.0, 2.0, 3.0)), None);
        assert!(slot.is_filled());

        assert_eq!(slot.wait(), Some((1.0, 2.0, 3.0)));
        assert!(!slot.is_filled());
        // Nothing new arrived, so a second consume must block rather than
        // hand back the old value.
        assert_eq!(slot.wait_timeout(SHORT.into()), None);
    }

    #[test]
    fn unrepresentable_deadline_waits_without_limit() {
        let slot = ReplySlot::new();
        slot.deposit(5);
        assert_eq!(slot.wait_timeout(Duration::MAX.into()), Some(5));

        slot.deposit(6);
        assert_eq!(
            slot.wait_timeout(Duration::from_secs(u64::MAX / 4).into()),
            Some(6)
        );
    }

    #[test]
    fn second_deposit_overwrites() {
        let slot = ReplySlot::new();
        assert_eq!(slot.deposit("first"), None);
        assert_eq!(slot.deposit("second"), Some("first"));
        assert_eq!(slot.wait(), Some("second"));
        assert_eq!(slot.try_take(), None);
    }

    #[test]
    fn waiter_is_woken_by_deposit() {
        let slot = Arc::new(ReplySlot::new());
        let waiter = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.wait())
        };

        thread::sleep(SHORT);
        assert!(!waiter.is_finished());
        slot.deposit(String::from("Warehouse"));

        assert_eq!(waiter.join().unwrap().as_deref(), Some("Warehouse"));
    }

    #[test]
    fn timed_wait_sees_late_deposit() {
        let slot = Arc::new(ReplySlot::new());
        let producer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                thread::sleep(SHORT);
                slot.deposit(7u8);
            })
        };

        assert_eq!(slot.wait_timeout(Duration::from_secs(5).into()), Some(7));
        producer.join().unwrap();
    }

    #[test]
    fn close_releases_blocked_waiters() {
        let slot = Arc::new(ReplySlot::<u32>::new());
        let waiters: Vec<_> = (0..2)
            .map(|i| {
                let slot = Arc::clone(&slot);
                thread::spawn(move || {
                    if i == 0 {
                        slot.wait()
                    } else {
                        slot.wait_timeout(Duration::from_secs(30).into())
                    }
                })
            })
            .collect();

        thread::sleep(SHORT);
        slot.close();
        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), None);
        }
        assert!(slot.is_closed());
        assert_eq!(slot.wait(), None);
    }

    #[test]
    fn value_deposited_before_close_is_still_taken() {
        let slot = ReplySlot::new();
        slot.deposit(9);
        slot.close();
        assert_eq!(slot.wait_timeout(Timeout::Infinite), Some(9));
        assert_eq!(slot.wait_timeout(Timeout::Infinite), None);
    }

    #[test]
    fn infinite_timeout_is_plain_wait() {
        let slot = ReplySlot::new();
        slot.deposit(1);
        assert_eq!(slot.wait_timeout(Timeout::Infinite), Some(1));
    }

    #[test]
    fn alternating_requests_get_their_own_reply() {
        const ROUNDS: u32 = 200;
        let slot = Arc::new(ReplySlot::new());
        let (request_tx, request_rx) = std::sync::mpsc::channel::<u32>();

        // Plays the listener: one reply per request, tagged with its number.
        let producer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                for n in request_rx {
                    slot.deposit(n * 10);
                }
            })
        };

        for n in 0..ROUNDS {
            request_tx.send(n).unwrap();
            assert_eq!(slot.wait(), Some(n * 10));
        }
        drop(request_tx);
        producer.join().unwrap();
        assert!(!slot.is_filled());
    }
}
