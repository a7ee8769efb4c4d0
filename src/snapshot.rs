//! The (events, friends) pair every derivation reads from.

use crate::balance::{BalancePoint, compute_direct_balance, compute_timeline};
use crate::debt::{DebtState, compute_debt};
use crate::event::LifeEvent;
use crate::friend::{Friend, FriendId};
use crate::network::{NetworkEffect, compute_network_effect, compute_network_multiplier};
use crate::ratio::{RatioStatus, compute_ratio_status};
use crate::view::Tally;
use serde::Serialize;
use xxhash_rust::xxh64::Xxh64;

/// Everything the dashboard shows at a glance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub direct_balance: i64,
    pub network_effect: f64,
    /// `direct_balance + network_effect`.
    pub total_balance: f64,
    pub network_multiplier: f64,
    pub debt: DebtState,
    pub ratio: RatioStatus,
    pub negative_count: usize,
    pub positive_count: usize,
}

/// An event log and friend registry, in insertion order.
///
/// Derivations are recomputed on every call. Callers that want to memoize
/// can key on [`Snapshot::fingerprint`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub events: Vec<LifeEvent>,
    pub friends: Vec<Friend>,
}

impl Snapshot {
    pub fn new(events: Vec<LifeEvent>, friends: Vec<Friend>) -> Self {
        Snapshot { events, friends }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.friends.is_empty()
    }

    pub fn tally(&self) -> Tally {
        Tally::of(&self.events)
    }

    pub fn debt(&self) -> DebtState {
        compute_debt(&self.events)
    }

    pub fn direct_balance(&self) -> i64 {
        compute_direct_balance(&self.events)
    }

    pub fn network_effect(&self) -> NetworkEffect {
        compute_network_effect(&self.events, &self.friends)
    }

    pub fn network_multiplier(&self) -> f64 {
        compute_network_multiplier(&self.friends)
    }

    pub fn ratio_status(&self) -> RatioStatus {
        compute_ratio_status(&self.events)
    }

    pub fn timeline(&self) -> Vec<BalancePoint> {
        compute_timeline(&self.events, &self.friends)
    }

    pub fn summary(&self) -> Summary {
        let tally = self.tally();
        let direct_balance = self.direct_balance();
        let network_effect = self.network_effect().total;
        Summary {
            direct_balance,
            network_effect,
            total_balance: direct_balance as f64 + network_effect,
            network_multiplier: self.network_multiplier(),
            debt: self.debt(),
            ratio: self.ratio_status(),
            negative_count: tally.negative,
            positive_count: tally.positive,
        }
    }

    pub fn friend(&self, id: &FriendId) -> Option<&Friend> {
        self.friends.iter().find(|f| &f.id == id)
    }

    /// Names of the registered friends an event was shared with. Ids that
    /// no longer resolve are left out.
    pub fn shared_friend_names(&self, event: &LifeEvent) -> Vec<&str> {
        event
            .shared_with
            .iter()
            .filter_map(|id| self.friend(id))
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Events ordered newest first. Ties keep log order.
    pub fn events_newest_first(&self) -> Vec<&LifeEvent> {
        let mut events: Vec<&LifeEvent> = self.events.iter().collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events
    }

    /// Hex-encoded xxh64 digest of the snapshot's content.
    ///
    /// Equal snapshots always produce equal fingerprints.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Xxh64::new(0);
        for event in &self.events {
            write_field(&mut hasher, event.id.as_str().as_bytes());
            hasher.update(&[event.is_positive() as u8]);
            hasher.update(&event.magnitude.to_le_bytes());
            write_field(&mut hasher, event.description.as_bytes());
            hasher.update(&event.created_at.to_le_bytes());
            hasher.update(&(event.shared_with.len() as u64).to_le_bytes());
            for id in &event.shared_with {
                write_field(&mut hasher, id.as_str().as_bytes());
            }
        }
        hasher.update(b"\x1dfriends\x1d");
        for friend in &self.friends {
            write_field(&mut hasher, friend.id.as_str().as_bytes());
            write_field(&mut hasher, friend.name.as_bytes());
            hasher.update(&friend.coefficient.to_bits().to_le_bytes());
        }
        format!("{:016x}", hasher.digest())
    }
}

// Length-prefixed so adjacent fields can't run together.
fn write_field(hasher: &mut Xxh64, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
