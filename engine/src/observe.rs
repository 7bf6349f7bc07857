//! Change detection over store snapshots and observable controller fields.

use tokio::sync::watch;
use url::Url;

/// A value the controller owns and a renderer observes.
///
/// Writes publish only when the value actually changes.
#[derive(Debug)]
pub struct ObservableCell<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone + PartialEq> ObservableCell<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value. Returns `true` if subscribers were notified.
    pub fn set(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

/// Outcome of feeding a projection to a [`Projection`] tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    First,
    Changed,
    Unchanged,
}

/// Remembers the last projection of a snapshot and reports changes.
#[derive(Debug, Clone)]
pub struct Projection<T> {
    last: Option<T>,
}

impl<T> Default for Projection<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: PartialEq> Projection<T> {
    pub fn observe(&mut self, next: T) -> Observation {
        match &self.last {
            None => {
                self.last = Some(next);
                Observation::First
            }
            Some(last) if *last == next => Observation::Unchanged,
            Some(_) => {
                self.last = Some(next);
                Observation::Changed
            }
        }
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Host part of `url`, if it parses and has one.
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
}
