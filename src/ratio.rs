//! Health of the negative:positive ratio against the 2:1 target.

use crate::event::LifeEvent;
use crate::view::Tally;
use serde::Serialize;

/// Target number of misfortunes per good fortune.
pub const THEORETICAL_RATIO: f64 = 2.0;

const NO_GOOD_FORTUNE_YET: &str = "You have many misfortunes without any good fortune yet!";
const TOO_LUCKY: &str = "Blimey, you lucky devil! I can't have that!";
const TOO_UNLUCKY: &str = "Damn.. I am sorry to hear that.";
const HANG_IN_THERE: &str = "Something good might happen! Hang in there.";
const ENJOY_YOUR_LUCK: &str = "Have fun while your good fortune lasts.";

/// `ratio` is `f64::INFINITY` when there are misfortunes but no good
/// fortunes. Serialized through `serde_json`, that becomes `null`; use
/// [`RatioStatus::ratio_label`] for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioStatus {
    pub ratio: f64,
    pub theoretical_ratio: f64,
    pub is_healthy: bool,
    pub warning: Option<String>,
}

impl RatioStatus {
    fn new(ratio: f64, is_healthy: bool, warning: Option<&str>) -> Self {
        RatioStatus {
            ratio,
            theoretical_ratio: THEORETICAL_RATIO,
            is_healthy,
            warning: warning.map(str::to_string),
        }
    }

    /// `"∞"` for an infinite ratio, otherwise two decimals.
    pub fn ratio_label(&self) -> String {
        if self.ratio.is_infinite() {
            "∞".to_string()
        } else {
            format!("{:.2}", self.ratio)
        }
    }
}

/// Classify the negative:positive ratio of `events`.
///
/// ```
/// use lifefold::{compute_ratio_status, LifeEvent, Polarity};
///
/// let events = vec![
///     LifeEvent::new(Polarity::Negative, 3, "cold"),
///     LifeEvent::new(Polarity::Negative, 6, "fender bender"),
///     LifeEvent::new(Polarity::Positive, 9, "found a tenner"),
/// ];
/// let status = compute_ratio_status(&events);
/// assert_eq!(status.ratio, 2.0);
/// assert!(status.is_healthy);
/// assert!(status.warning.is_none());
/// ```
pub fn compute_ratio_status(events: &[LifeEvent]) -> RatioStatus {
    if events.is_empty() {
        return RatioStatus::new(0.0, true, None);
    }

    let tally = Tally::of(events);

    if tally.positive == 0 {
        let ratio = if tally.negative > 0 { f64::INFINITY } else { 0.0 };
        let warning = (tally.negative > 2).then_some(NO_GOOD_FORTUNE_YET);
        return RatioStatus::new(ratio, tally.negative <= 2, warning);
    }

    let ratio = tally.negative as f64 / tally.positive as f64;

    if ratio < 1.0 {
        RatioStatus::new(ratio, false, Some(TOO_LUCKY))
    } else if ratio > 3.0 {
        RatioStatus::new(ratio, false, Some(TOO_UNLUCKY))
    } else if ratio > 2.5 {
        RatioStatus::new(ratio, true, Some(HANG_IN_THERE))
    } else if ratio < 1.5 {
        RatioStatus::new(ratio, true, Some(ENJOY_YOUR_LUCK))
    } else {
        RatioStatus::new(ratio, true, None)
    }
}
