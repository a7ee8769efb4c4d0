#![allow(dead_code)]

use lifefold::{Friend, FriendId, KeyValueStore, LifeEvent, MemoryStore, Polarity, StoreError};
use std::cell::Cell;

pub fn negative(id: &str, magnitude: u32) -> LifeEvent {
    LifeEvent::new(Polarity::Negative, magnitude, format!("negative {id}"))
        .with_id(id)
        .with_created_at(1000)
}

pub fn positive(id: &str, magnitude: u32) -> LifeEvent {
    LifeEvent::new(Polarity::Positive, magnitude, format!("positive {id}"))
        .with_id(id)
        .with_created_at(1000)
}

pub fn shared(event: LifeEvent, friends: &[&str]) -> LifeEvent {
    event.with_shared_with(friends.iter().map(|f| FriendId::from(*f)))
}

pub fn friend(id: &str, coefficient: f64) -> Friend {
    Friend::new(format!("name of {id}"), coefficient).with_id(id)
}

/// `n` negative and `p` positive events, all magnitude 1.
pub fn counts(n: usize, p: usize) -> Vec<LifeEvent> {
    let mut events = Vec::with_capacity(n + p);
    for i in 0..n {
        events.push(negative(&format!("n{i}"), 1));
    }
    for i in 0..p {
        events.push(positive(&format!("p{i}"), 1));
    }
    events
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Reads succeed (optionally returning a fixed value); every write fails.
#[derive(Debug, Default)]
pub struct FailingStore {
    pub contents: Option<String>,
    pub write_attempts: Cell<usize>,
}

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.contents.clone())
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        self.write_attempts.set(self.write_attempts.get() + 1);
        Err(StoreError::Unavailable("disk full".to_string()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}

/// Every read fails.
#[derive(Debug, Default)]
pub struct UnreadableStore;

impl KeyValueStore for UnreadableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// A working store whose `remove` always fails.
#[derive(Debug, Default)]
pub struct UndeletableStore {
    pub inner: MemoryStore,
}

impl KeyValueStore for UndeletableStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("delete not permitted".to_string()))
    }
}
