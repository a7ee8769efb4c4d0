//! Network amplification: what friends add to shared good fortunes.

use crate::event::{EventId, LifeEvent};
use crate::friend::{Friend, FriendId};
use serde::Serialize;

/// One friend's share of the network effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FriendContribution {
    pub friend_id: FriendId,
    pub friend_name: String,
    /// `coefficient * Σ magnitude` over the positive events shared with this
    /// friend.
    pub contribution: f64,
    /// Those events, in log order.
    pub event_ids: Vec<EventId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkEffect {
    pub total: f64,
    /// One entry per registered friend, in registry order.
    pub breakdown: Vec<FriendContribution>,
}

/// Compute each friend's contribution and the total.
///
/// Negative events never contribute, whatever their `shared_with` says.
/// Shared ids that no longer match a registered friend are skipped.
///
/// ```
/// use lifefold::{compute_network_effect, Friend, LifeEvent, Polarity};
///
/// let friend = Friend::new("Ana", 0.5).with_id("friend_ana");
/// let events = vec![
///     LifeEvent::new(Polarity::Positive, 10, "concert").with_shared_with([friend.id.clone()]),
///     LifeEvent::new(Polarity::Positive, 20, "road trip").with_shared_with([friend.id.clone()]),
/// ];
/// let effect = compute_network_effect(&events, &[friend]);
/// assert_eq!(effect.total, 15.0);
/// assert_eq!(effect.breakdown[0].event_ids.len(), 2);
/// ```
pub fn compute_network_effect(events: &[LifeEvent], friends: &[Friend]) -> NetworkEffect {
    let breakdown: Vec<FriendContribution> = friends
        .iter()
        .map(|friend| {
            let shared: Vec<&LifeEvent> = events
                .iter()
                .filter(|e| e.is_shared_with(&friend.id))
                .collect();
            let shared_magnitude: u64 = shared.iter().map(|e| u64::from(e.magnitude)).sum();

            FriendContribution {
                friend_id: friend.id.clone(),
                friend_name: friend.name.clone(),
                contribution: friend.coefficient * shared_magnitude as f64,
                event_ids: shared.iter().map(|e| e.id.clone()).collect(),
            }
        })
        .collect();

    let total = breakdown.iter().map(|b| b.contribution).sum();

    NetworkEffect { total, breakdown }
}

/// Theoretical maximum amplification: `1 + Σ coefficient`.
pub fn compute_network_multiplier(friends: &[Friend]) -> f64 {
    1.0 + friends.iter().map(|f| f.coefficient).sum::<f64>()
}
