//! Direct balance and the cumulative balance timeline.

use crate::event::{LifeEvent, Polarity};
use crate::friend::Friend;
use crate::view::{self, balance_reducer};
use serde::Serialize;

/// Sum of positive magnitudes minus sum of negative magnitudes.
///
/// Friends play no part. Event order does not matter.
///
/// ```
/// use lifefold::{compute_direct_balance, LifeEvent, Polarity};
///
/// let events = vec![
///     LifeEvent::new(Polarity::Negative, 5, "rain"),
///     LifeEvent::new(Polarity::Positive, 12, "promotion"),
/// ];
/// assert_eq!(compute_direct_balance(&events), 7);
/// assert_eq!(compute_direct_balance(&[]), 0);
/// ```
pub fn compute_direct_balance(events: &[LifeEvent]) -> i64 {
    view::fold(events, balance_reducer)
}

/// One point on the running balance curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    /// 0 for the origin, then 1-based position in the log.
    pub index: usize,
    /// Running direct balance.
    pub direct: i64,
    /// Running direct balance plus accumulated network effect.
    pub network: f64,
    /// Polarity of the event at this point; `None` for the origin.
    pub polarity: Option<Polarity>,
}

/// Running balance after each event, in log order, preceded by an origin
/// point at zero.
///
/// The network curve adds `coefficient * magnitude` for every registered
/// friend a positive event is shared with, so the last point agrees with
/// [`compute_network_effect`](crate::compute_network_effect).
pub fn compute_timeline(events: &[LifeEvent], friends: &[Friend]) -> Vec<BalancePoint> {
    let mut points = Vec::with_capacity(events.len() + 1);
    points.push(BalancePoint {
        index: 0,
        direct: 0,
        network: 0.0,
        polarity: None,
    });

    let mut direct = 0i64;
    let mut boost = 0.0f64;
    for (i, event) in events.iter().enumerate() {
        direct += event.signed_magnitude();
        if event.is_positive() {
            boost += friends
                .iter()
                .filter(|f| event.shared_with.contains(&f.id))
                .map(|f| f.coefficient * f64::from(event.magnitude))
                .sum::<f64>();
        }
        points.push(BalancePoint {
            index: i + 1,
            direct,
            network: direct as f64 + boost,
            polarity: Some(event.polarity),
        });
    }

    points
}
