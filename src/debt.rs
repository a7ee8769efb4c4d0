//! Debt forecast from the two-for-one exchange rule.
//!
//! Every two misfortunes are owed one good fortune, and every two good
//! fortunes are owed one misfortune. Debt only moves on every second event
//! of a polarity.

use crate::event::{LifeEvent, Polarity, plural};
use crate::view::Tally;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtStatus {
    Balanced,
    /// More misfortune debt than good-fortune debt: a good fortune is due.
    NeedPositive,
    /// Too lucky: a misfortune is due.
    NeedNegative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebtState {
    pub negative_debt: i64,
    pub positive_debt: i64,
    pub net_debt: i64,
    pub status: DebtStatus,
    pub prediction: String,
}

impl DebtState {
    /// Whether logging an event of `polarity` goes against the forecast.
    pub fn is_contradicted_by(&self, polarity: Polarity) -> bool {
        matches!(
            (self.status, polarity),
            (DebtStatus::NeedPositive, Polarity::Negative)
                | (DebtStatus::NeedNegative, Polarity::Positive)
        )
    }
}

/// Compute the debt forecast for `events`.
///
/// # Examples
///
/// ```
/// use lifefold::{compute_debt, DebtStatus, LifeEvent, Polarity};
///
/// let events = vec![
///     LifeEvent::new(Polarity::Negative, 5, "lost wallet"),
///     LifeEvent::new(Polarity::Negative, 8, "sprained ankle"),
/// ];
/// let debt = compute_debt(&events);
/// assert_eq!(debt.net_debt, 1);
/// assert_eq!(debt.status, DebtStatus::NeedPositive);
/// assert_eq!(debt.prediction, "1 good fortune predicted");
/// ```
pub fn compute_debt(events: &[LifeEvent]) -> DebtState {
    let tally = Tally::of(events);
    let negative_debt = (tally.negative / 2) as i64;
    let positive_debt = (tally.positive / 2) as i64;
    let net_debt = negative_debt - positive_debt;

    let (status, prediction) = if net_debt > 0 {
        (
            DebtStatus::NeedPositive,
            format!(
                "{net_debt} good fortune{} predicted",
                plural(net_debt.unsigned_abs())
            ),
        )
    } else if net_debt < 0 {
        let owed = net_debt.unsigned_abs();
        (
            DebtStatus::NeedNegative,
            format!("{owed} misfortune{} predicted (too lucky)", plural(owed)),
        )
    } else {
        (DebtStatus::Balanced, "Life is balanced".to_string())
    };

    DebtState {
        negative_debt,
        positive_debt,
        net_debt,
        status,
        prediction,
    }
}
