//! # Debounce
//!
//! Holds back the latest input until nothing new has arrived for `delay`.
//!
//! - [`Debouncer::schedule`] replaces the pending input and pushes the deadline out
//! - [`Debouncer::ready`] resolves once per armed timer with the latest input
//! - [`Debouncer::cancel`] drops the pending input, nothing fires
//!
//! One `Sleep` is kept and reset instead of spawning a task per keystroke, so
//! there is no background work once the timer has fired. `ready` is cancel safe
//! and meant to sit in a `select!` loop next to the input channel.
use std::{pin::Pin, time::Duration};

use tokio::time::{Instant, Sleep, sleep_until};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
    timer: Option<Pin<Box<Sleep>>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            timer: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, input: T) {
        let deadline = Instant::now() + self.delay;

        match self.timer.as_mut() {
            Some(timer) => timer.as_mut().reset(deadline),
            None => self.timer = Some(Box::pin(sleep_until(deadline))),
        }

        self.pending = Some(input);
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Pending forever while nothing is scheduled.
    pub async fn ready(&mut self) -> T {
        loop {
            match (self.timer.as_mut(), self.pending.is_some()) {
                (Some(timer), true) => {
                    timer.as_mut().await;

                    if let Some(input) = self.pending.take() {
                        return input;
                    }
                }
                _ => std::future::pending::<()>().await,
            }
        }
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}
