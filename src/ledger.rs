use crate::balance::BalancePoint;
use crate::debt::DebtState;
use crate::error::{PersistError, ValidationError};
use crate::event::{EventId, LifeEvent, MAX_MAGNITUDE, MIN_MAGNITUDE, Polarity};
use crate::friend::{Friend, FriendId, MAX_COEFFICIENT, MIN_COEFFICIENT};
use crate::network::NetworkEffect;
use crate::ratio::RatioStatus;
use crate::snapshot::{Snapshot, Summary};
use crate::store::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Default slot holding the serialized event log.
pub const DEFAULT_EVENTS_KEY: &str = "lifefold_events";

/// Default slot holding the serialized friend registry.
pub const DEFAULT_FRIENDS_KEY: &str = "lifefold_friends";

/// The authoritative event log and friend registry.
///
/// Mutations validate their input, update memory, then write the affected
/// slot through to the store. A failed write is logged and remembered in
/// [`last_persist_error`](Ledger::last_persist_error) but never undoes the
/// mutation: the in-memory state is what every subsequent read sees.
///
/// Derived values are recomputed from the current snapshot on every call.
///
/// # Examples
///
/// ```
/// use lifefold::{Ledger, MemoryStore, Polarity};
///
/// let mut ledger = Ledger::open(MemoryStore::new());
/// let ana = ledger.add_friend("Ana", 0.5).unwrap();
/// ledger.add_event(Polarity::Negative, 6, "missed the train", &[]).unwrap();
/// ledger.add_event(Polarity::Positive, 10, "beach day", &[ana]).unwrap();
///
/// assert_eq!(ledger.direct_balance(), 4);
/// assert_eq!(ledger.network_effect().total, 5.0);
/// assert_eq!(ledger.summary().total_balance, 9.0);
/// ```
#[derive(Debug)]
pub struct Ledger<S: KeyValueStore> {
    store: S,
    events_key: String,
    friends_key: String,
    snapshot: Snapshot,
    last_persist_error: Option<PersistError>,
}

/// Builder for opening a [`Ledger`] with non-default slot keys.
///
/// ```
/// use lifefold::{KeyValueStore, Ledger, MemoryStore, Polarity};
///
/// let mut ledger = Ledger::builder(MemoryStore::new())
///     .events_key("alice_events")
///     .friends_key("alice_friends")
///     .open()
///     .unwrap();
/// ledger.add_event(Polarity::Positive, 3, "sunny morning", &[]).unwrap();
/// assert!(ledger.store().get("alice_events").unwrap().is_some());
/// ```
#[derive(Debug)]
pub struct LedgerBuilder<S: KeyValueStore> {
    store: S,
    events_key: String,
    friends_key: String,
}

impl<S: KeyValueStore> LedgerBuilder<S> {
    fn new(store: S) -> Self {
        LedgerBuilder {
            store,
            events_key: DEFAULT_EVENTS_KEY.to_string(),
            friends_key: DEFAULT_FRIENDS_KEY.to_string(),
        }
    }

    pub fn events_key(mut self, key: impl Into<String>) -> Self {
        self.events_key = key.into();
        self
    }

    pub fn friends_key(mut self, key: impl Into<String>) -> Self {
        self.friends_key = key.into();
        self
    }

    /// Load both slots and return the ledger.
    ///
    /// A slot that is missing, unreadable or malformed starts empty; the
    /// last such failure is kept in [`Ledger::last_persist_error`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SharedSlotKey`] when both collections
    /// were given the same key.
    pub fn open(self) -> Result<Ledger<S>, ValidationError> {
        if self.events_key == self.friends_key {
            return Err(ValidationError::SharedSlotKey(self.events_key));
        }
        Ok(Ledger::load(self.store, self.events_key, self.friends_key))
    }
}

impl<S: KeyValueStore> Ledger<S> {
    /// Open a ledger on `store` using the default slot keys.
    pub fn open(store: S) -> Self {
        Self::load(
            store,
            DEFAULT_EVENTS_KEY.to_string(),
            DEFAULT_FRIENDS_KEY.to_string(),
        )
    }

    pub fn builder(store: S) -> LedgerBuilder<S> {
        LedgerBuilder::new(store)
    }

    fn load(store: S, events_key: String, friends_key: String) -> Self {
        let mut ledger = Ledger {
            store,
            events_key,
            friends_key,
            snapshot: Snapshot::default(),
            last_persist_error: None,
        };

        match load_slot::<S, LifeEvent>(&ledger.store, &ledger.events_key) {
            Ok(events) => ledger.snapshot.events = events,
            Err(e) => ledger.record_failure("load", e),
        }
        match load_slot::<S, Friend>(&ledger.store, &ledger.friends_key) {
            Ok(friends) => ledger.snapshot.friends = friends,
            Err(e) => ledger.record_failure("load", e),
        }

        log::debug!(
            "lifefold: loaded {} events and {} friends",
            ledger.snapshot.events.len(),
            ledger.snapshot.friends.len()
        );
        ledger
    }

    /// Log a new event and return its id.
    ///
    /// The description is trimmed. `shared_with` is deduplicated, and
    /// dropped entirely for negative events. Ids that don't name a
    /// registered friend are kept; derivations skip them.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the magnitude is outside 1–20 or the
    /// description is blank. Nothing is logged or persisted in that case.
    pub fn add_event(
        &mut self,
        polarity: Polarity,
        magnitude: u32,
        description: &str,
        shared_with: &[FriendId],
    ) -> Result<EventId, ValidationError> {
        if !(MIN_MAGNITUDE..=MAX_MAGNITUDE).contains(&magnitude) {
            return Err(ValidationError::MagnitudeOutOfRange {
                value: magnitude,
                min: MIN_MAGNITUDE,
                max: MAX_MAGNITUDE,
            });
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        let debt = self.debt();
        if debt.is_contradicted_by(polarity) {
            log::warn!(
                "lifefold: logging a {polarity} while the forecast says {} (net debt {:+})",
                debt.prediction,
                debt.net_debt
            );
        }

        let mut shared: Vec<FriendId> = Vec::new();
        if polarity == Polarity::Positive {
            for id in shared_with {
                if !shared.contains(id) {
                    shared.push(id.clone());
                }
            }
        }

        let id = self.fresh_event_id();
        let event = LifeEvent::new(polarity, magnitude, description)
            .with_id(id.clone())
            .with_shared_with(shared);
        self.snapshot.events.push(event);
        log::debug!("lifefold: added event {id}");

        self.persist_events();
        Ok(id)
    }

    /// Register a new friend and return their id.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the coefficient is outside 0.1–1.0
    /// (or NaN) or the name is blank.
    pub fn add_friend(&mut self, name: &str, coefficient: f64) -> Result<FriendId, ValidationError> {
        if !(MIN_COEFFICIENT..=MAX_COEFFICIENT).contains(&coefficient) {
            return Err(ValidationError::CoefficientOutOfRange {
                value: coefficient,
                min: MIN_COEFFICIENT,
                max: MAX_COEFFICIENT,
            });
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let id = self.fresh_friend_id();
        self.snapshot
            .friends
            .push(Friend::new(name, coefficient).with_id(id.clone()));
        log::debug!("lifefold: added friend {id}");

        self.persist_friends();
        Ok(id)
    }

    /// Delete an event. Returns `false` if no event had that id.
    pub fn remove_event(&mut self, id: &EventId) -> bool {
        let before = self.snapshot.events.len();
        self.snapshot.events.retain(|e| &e.id != id);
        let removed = self.snapshot.events.len() != before;
        self.persist_events();
        removed
    }

    /// Delete a friend. Events already shared with them keep the id.
    /// Returns `false` if no friend had that id.
    pub fn remove_friend(&mut self, id: &FriendId) -> bool {
        let before = self.snapshot.friends.len();
        self.snapshot.friends.retain(|f| &f.id != id);
        let removed = self.snapshot.friends.len() != before;
        self.persist_friends();
        removed
    }

    /// Empty both collections and erase both slots.
    ///
    /// A slot the store refuses to remove is overwritten with an empty list
    /// instead.
    ///
    /// Irreversible; asking the user first is the caller's job.
    pub fn clear_all(&mut self) {
        self.snapshot = Snapshot::default();
        for key in [self.events_key.clone(), self.friends_key.clone()] {
            let Err(e) = self.store.remove(&key) else {
                continue;
            };
            self.record_failure("clear", e.into());
            // An empty slot still reads back as cleared.
            if let Err(e) = save_slot::<S, LifeEvent>(&mut self.store, &key, &[]) {
                self.record_failure("clear", e);
            }
        }
        log::debug!("lifefold: cleared all events and friends");
    }

    /// Flush both slots and hand the store back.
    ///
    /// # Errors
    ///
    /// Returns the first write failure. The ledger is consumed either way.
    pub fn close(mut self) -> Result<S, PersistError> {
        save_slot(&mut self.store, &self.events_key, &self.snapshot.events)?;
        save_slot(&mut self.store, &self.friends_key, &self.snapshot.friends)?;
        Ok(self.store)
    }

    pub fn events(&self) -> &[LifeEvent] {
        &self.snapshot.events
    }

    pub fn friends(&self) -> &[Friend] {
        &self.snapshot.friends
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn events_key(&self) -> &str {
        &self.events_key
    }

    pub fn friends_key(&self) -> &str {
        &self.friends_key
    }

    /// The most recent load or save failure, if any.
    pub fn last_persist_error(&self) -> Option<&PersistError> {
        self.last_persist_error.as_ref()
    }

    pub fn debt(&self) -> DebtState {
        self.snapshot.debt()
    }

    pub fn direct_balance(&self) -> i64 {
        self.snapshot.direct_balance()
    }

    pub fn network_effect(&self) -> NetworkEffect {
        self.snapshot.network_effect()
    }

    pub fn network_multiplier(&self) -> f64 {
        self.snapshot.network_multiplier()
    }

    pub fn ratio_status(&self) -> RatioStatus {
        self.snapshot.ratio_status()
    }

    pub fn summary(&self) -> Summary {
        self.snapshot.summary()
    }

    pub fn timeline(&self) -> Vec<BalancePoint> {
        self.snapshot.timeline()
    }

    pub fn fingerprint(&self) -> String {
        self.snapshot.fingerprint()
    }

    fn fresh_event_id(&self) -> EventId {
        loop {
            let id = EventId::generate();
            if !self.snapshot.events.iter().any(|e| e.id == id) {
                return id;
            }
        }
    }

    fn fresh_friend_id(&self) -> FriendId {
        loop {
            let id = FriendId::generate();
            if !self.snapshot.friends.iter().any(|f| f.id == id) {
                return id;
            }
        }
    }

    fn persist_events(&mut self) {
        if let Err(e) = save_slot(&mut self.store, &self.events_key, &self.snapshot.events) {
            self.record_failure("save", e);
        }
    }

    fn persist_friends(&mut self) {
        if let Err(e) = save_slot(&mut self.store, &self.friends_key, &self.snapshot.friends) {
            self.record_failure("save", e);
        }
    }

    fn record_failure(&mut self, op: &str, err: PersistError) {
        log::warn!("lifefold: {op} failed, continuing in memory: {err}");
        self.last_persist_error = Some(err);
    }
}

fn load_slot<S: KeyValueStore, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Vec<T>, PersistError> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&raw).map_err(|source| PersistError::Corrupt {
        key: key.to_string(),
        source,
    })
}

fn save_slot<S: KeyValueStore, T: Serialize>(
    store: &mut S,
    key: &str,
    items: &[T],
) -> Result<(), PersistError> {
    let json = serde_json::to_string(items).map_err(|source| PersistError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_rejected_event_leaves_store_untouched() {
        let mut ledger = Ledger::open(MemoryStore::new());
        let err = ledger
            .add_event(Polarity::Negative, 0, "nothing", &[])
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MagnitudeOutOfRange {
                value: 0,
                min: 1,
                max: 20
            }
        );
        assert!(ledger.events().is_empty());
        assert!(ledger.store().is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut ledger = Ledger::open(MemoryStore::new());
        assert_eq!(
            ledger.add_friend("   ", 0.5).unwrap_err(),
            ValidationError::EmptyName
        );
        assert!(matches!(
            ledger.add_friend("Ana", f64::NAN).unwrap_err(),
            ValidationError::CoefficientOutOfRange { .. }
        ));
    }

    #[test]
    fn test_text_is_trimmed() {
        let mut ledger = Ledger::open(MemoryStore::new());
        ledger.add_event(Polarity::Positive, 4, "  cake  ", &[]).unwrap();
        ledger.add_friend("  Bo ", 0.3).unwrap();
        assert_eq!(ledger.events()[0].description, "cake");
        assert_eq!(ledger.friends()[0].name, "Bo");
    }
}
