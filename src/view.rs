//! Reducers folded over the event log.
//!
//! Every derived quantity is a fold: start from `S::default()`, feed each
//! event through a pure reducer, read off the result. Nothing here keeps
//! state between calls.

use crate::event::{LifeEvent, Polarity};

/// A pure function that folds an event into state.
///
/// Reducers receive owned state and return owned state. They must not do
/// I/O or look at anything other than their two arguments.
///
/// # Examples
///
/// ```
/// use lifefold::{LifeEvent, Polarity, ReduceFn, view};
///
/// fn count(state: usize, _event: &LifeEvent) -> usize {
///     state + 1
/// }
///
/// let reducer: ReduceFn<usize> = count;
/// let events = vec![LifeEvent::new(Polarity::Negative, 4, "flat tyre")];
/// assert_eq!(view::fold(&events, reducer), 1);
/// ```
pub type ReduceFn<S> = fn(S, &LifeEvent) -> S;

/// Fold `events` into a fresh `S` with `reducer`.
pub fn fold<S: Default>(events: &[LifeEvent], reducer: ReduceFn<S>) -> S {
    events.iter().fold(S::default(), reducer)
}

/// Event counts per polarity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub negative: usize,
    pub positive: usize,
}

impl Tally {
    pub fn of(events: &[LifeEvent]) -> Self {
        fold(events, tally_reducer)
    }

    pub fn total(&self) -> usize {
        self.negative + self.positive
    }
}

pub fn tally_reducer(mut state: Tally, event: &LifeEvent) -> Tally {
    match event.polarity {
        Polarity::Negative => state.negative += 1,
        Polarity::Positive => state.positive += 1,
    }
    state
}

pub fn balance_reducer(state: i64, event: &LifeEvent) -> i64 {
    state + event.signed_magnitude()
}
