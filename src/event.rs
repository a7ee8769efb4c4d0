use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Smallest magnitude an event may carry.
pub const MIN_MAGNITUDE: u32 = 1;

/// Largest magnitude an event may carry.
pub const MAX_MAGNITUDE: u32 = 20;

/// Whether a life event was a misfortune or a good fortune.
///
/// Serialized as `"M"` (misfortune) and `"G"` (good fortune).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    #[serde(rename = "M")]
    Negative,
    #[serde(rename = "G")]
    Positive,
}

impl Polarity {
    /// `-1` for negative events, `+1` for positive ones.
    pub fn sign(self) -> i64 {
        match self {
            Polarity::Negative => -1,
            Polarity::Positive => 1,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Negative => f.write_str("misfortune"),
            Polarity::Positive => f.write_str("good fortune"),
        }
    }
}

/// Opaque identifier of a [`LifeEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Generate a fresh identifier (`event_<uuid>`).
    pub fn generate() -> Self {
        EventId(format!("event_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        EventId(s.to_string())
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        EventId(s)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable record of something that happened.
///
/// Serialized with the field names used by the stored log (`type`, `value`,
/// `timestamp`, `sharedWith`), so a slot written by one session reads back
/// unchanged in the next.
///
/// `shared_with` only has meaning for positive events. The
/// [`Ledger`](crate::Ledger) empties it for negative ones, and every
/// derivation ignores it on negative events anyway.
///
/// # Examples
///
/// ```
/// use lifefold::{FriendId, LifeEvent, Polarity};
///
/// let friend = FriendId::from("friend_a");
/// let event = LifeEvent::new(Polarity::Positive, 12, "got the job")
///     .with_id("event_1")
///     .with_shared_with([friend.clone()]);
/// assert_eq!(event.id.as_str(), "event_1");
/// assert_eq!(event.signed_magnitude(), 12);
/// assert!(event.is_shared_with(&friend));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub id: EventId,

    #[serde(rename = "type")]
    pub polarity: Polarity,

    /// Impact on a 1–20 scale.
    #[serde(rename = "value")]
    pub magnitude: u32,

    pub description: String,

    /// Milliseconds since the Unix epoch. Display only.
    #[serde(rename = "timestamp")]
    pub created_at: u64,

    #[serde(rename = "sharedWith", default)]
    pub shared_with: Vec<crate::FriendId>,
}

impl LifeEvent {
    /// Create an event with a fresh id, the current time and no shared
    /// friends.
    ///
    /// No range checks happen here; [`Ledger::add_event`](crate::Ledger::add_event)
    /// is the validating entry point.
    pub fn new(polarity: Polarity, magnitude: u32, description: impl Into<String>) -> Self {
        LifeEvent {
            id: EventId::generate(),
            polarity,
            magnitude,
            description: description.into(),
            created_at: now_millis(),
            shared_with: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<EventId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_created_at(mut self, created_at: u64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_shared_with(mut self, friends: impl IntoIterator<Item = crate::FriendId>) -> Self {
        self.shared_with = friends.into_iter().collect();
        self
    }

    pub fn is_negative(&self) -> bool {
        self.polarity == Polarity::Negative
    }

    pub fn is_positive(&self) -> bool {
        self.polarity == Polarity::Positive
    }

    /// Magnitude with the polarity's sign applied.
    pub fn signed_magnitude(&self) -> i64 {
        self.polarity.sign() * i64::from(self.magnitude)
    }

    /// True when this is a positive event shared with `friend`.
    pub fn is_shared_with(&self, friend: &crate::FriendId) -> bool {
        self.is_positive() && self.shared_with.contains(friend)
    }

    /// Relative age label such as `"3 min ago"` or `"2 days ago"`.
    ///
    /// `now` is in milliseconds since the epoch. Events stamped in the future
    /// read as `"Just now"`.
    ///
    /// ```
    /// use lifefold::{LifeEvent, Polarity};
    ///
    /// let event = LifeEvent::new(Polarity::Negative, 3, "missed the bus")
    ///     .with_created_at(0);
    /// assert_eq!(event.age_label(30_000), "Just now");
    /// assert_eq!(event.age_label(2 * 3_600_000), "2 hours ago");
    /// ```
    pub fn age_label(&self, now: u64) -> String {
        age_label(self.created_at, now)
    }
}

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

fn age_label(created_at: u64, now: u64) -> String {
    let elapsed = now.saturating_sub(created_at);
    let minutes = elapsed / MINUTE_MS;
    let hours = elapsed / HOUR_MS;
    let days = elapsed / DAY_MS;

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} min ago")
    } else if hours < 24 {
        format!("{hours} hour{} ago", plural(hours))
    } else {
        format!("{days} day{} ago", plural(days))
    }
}

pub(crate) fn plural(n: u64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// A clock set before the epoch reads as `0`.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_label_boundaries() {
        assert_eq!(age_label(0, 59_999), "Just now");
        assert_eq!(age_label(0, MINUTE_MS), "1 min ago");
        assert_eq!(age_label(0, 59 * MINUTE_MS), "59 min ago");
        assert_eq!(age_label(0, HOUR_MS), "1 hour ago");
        assert_eq!(age_label(0, 23 * HOUR_MS), "23 hours ago");
        assert_eq!(age_label(0, DAY_MS), "1 day ago");
        assert_eq!(age_label(0, 9 * DAY_MS), "9 days ago");
        assert_eq!(age_label(5_000, 0), "Just now");
    }

    #[test]
    fn test_polarity_wire_names() {
        assert_eq!(serde_json::to_string(&Polarity::Negative).unwrap(), "\"M\"");
        assert_eq!(serde_json::to_string(&Polarity::Positive).unwrap(), "\"G\"");
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = EventId::generate();
        let b = EventId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("event_"));
    }

    #[test]
    fn test_event_serialized_field_names() {
        let event = LifeEvent::new(Polarity::Positive, 7, "lunch")
            .with_id("event_x")
            .with_created_at(42)
            .with_shared_with([crate::FriendId::from("friend_y")]);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "G");
        assert_eq!(value["value"], 7);
        assert_eq!(value["timestamp"], 42);
        assert_eq!(value["sharedWith"][0], "friend_y");
    }

    #[test]
    fn test_missing_shared_with_defaults_empty() {
        let json = r#"{"id":"e","type":"M","value":3,"description":"d","timestamp":1}"#;
        let event: LifeEvent = serde_json::from_str(json).unwrap();
        assert!(event.shared_with.is_empty());
        assert!(event.is_negative());
    }
}
