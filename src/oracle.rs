//! Suggested magnitudes from an external rating service.
//!
//! The oracle reads a free-text description and proposes a 1–20 rating
//! with a one-line rationale. It is advisory only: it never touches the
//! ledger, and any failure simply means the user picks a magnitude by hand.
//!
//! # Retry and timeout policy
//!
//! [`Suggester`] makes at most [`DEFAULT_MAX_ATTEMPTS`] calls per request and
//! retries only [`OracleError::Unavailable`] and [`OracleError::Timeout`].
//! Per-call timeouts belong to the oracle implementation; the HTTP client
//! behind the `http` feature gives each request 10 seconds.

#[cfg(feature = "http")]
pub mod http;

use crate::event::{LifeEvent, MAX_MAGNITUDE, MIN_MAGNITUDE, Polarity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Calls per suggestion before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Errors an oracle can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    #[error("description is required")]
    EmptyDescription,

    /// Network or service failure
    #[error("rating service unavailable: {0}")]
    Unavailable(String),

    #[error("rating service timed out")]
    Timeout,

    /// The service refused the request itself (bad key, bad body)
    #[error("rating request rejected: {0}")]
    Rejected(String),

    /// The reply could not be read as a rating
    #[error("malformed rating response: {0}")]
    MalformedResponse(String),

    #[error("rating {0} is outside 1..=20")]
    InvalidRating(i64),
}

impl OracleError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::Unavailable(_) | OracleError::Timeout)
    }
}

/// What the oracle is asked to rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRequest {
    pub description: String,
    pub polarity: Polarity,
}

impl RatingRequest {
    pub fn new(description: impl Into<String>, polarity: Polarity) -> Self {
        RatingRequest {
            description: description.into(),
            polarity,
        }
    }

    /// Instructions for a chat model acting as the oracle.
    pub fn system_prompt() -> &'static str {
        "You rate how much a life event affects someone, on a scale of 1 to 20.\n\
         \n\
         1-5: minor (a small annoyance or a small win)\n\
         6-10: moderate (noticeably changes the day)\n\
         11-15: significant (colours the week or the mood)\n\
         16-20: life-changing\n\
         \n\
         Weigh emotional weight, practical consequences, how long the effect lasts and the context.\n\
         \n\
         Reply with a JSON object and nothing else:\n\
         {\"rating\": <integer 1-20>, \"reasoning\": \"<one sentence>\"}"
    }

    pub fn user_prompt(&self) -> String {
        let kind = match self.polarity {
            Polarity::Negative => "Misfortune (negative)",
            Polarity::Positive => "Good fortune (positive)",
        };
        format!(
            "Event type: {kind}\nDescription: \"{}\"\n\nRate this event's impact (1-20):",
            self.description
        )
    }
}

/// A proposed magnitude and the reason for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSuggestion {
    pub rating: u32,
    pub reasoning: String,
}

/// Something that can rate an event description.
///
/// Implementations may block; callers that need to stay responsive should
/// run [`Suggester::suggest`] on a worker thread and drop the result if the
/// user has moved on.
pub trait RatingOracle {
    fn rate(&self, request: &RatingRequest) -> Result<RatingSuggestion, OracleError>;
}

impl<O: RatingOracle + ?Sized> RatingOracle for &O {
    fn rate(&self, request: &RatingRequest) -> Result<RatingSuggestion, OracleError> {
        (**self).rate(request)
    }
}

impl<O: RatingOracle + ?Sized> RatingOracle for Box<O> {
    fn rate(&self, request: &RatingRequest) -> Result<RatingSuggestion, OracleError> {
        (**self).rate(request)
    }
}

impl<O: RatingOracle + ?Sized> RatingOracle for std::sync::Arc<O> {
    fn rate(&self, request: &RatingRequest) -> Result<RatingSuggestion, OracleError> {
        (**self).rate(request)
    }
}

/// Parse an oracle reply of the form `{"rating": 12, "reasoning": "..."}`.
///
/// Integral floats such as `12.0` are accepted; anything outside 1–20,
/// fractional, or missing a field is rejected.
///
/// ```
/// use lifefold::oracle::{parse_rating_response, OracleError};
///
/// let s = parse_rating_response(r#"{"rating": 14, "reasoning": "a big move"}"#).unwrap();
/// assert_eq!(s.rating, 14);
///
/// let err = parse_rating_response(r#"{"rating": 40, "reasoning": "huge"}"#).unwrap_err();
/// assert_eq!(err, OracleError::InvalidRating(40));
/// ```
pub fn parse_rating_response(content: &str) -> Result<RatingSuggestion, OracleError> {
    let value: Value = serde_json::from_str(content.trim())
        .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

    let rating = match value.get("rating") {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e9 => f as i64,
                    _ => {
                        return Err(OracleError::MalformedResponse(format!(
                            "rating {n} is not an integer"
                        )));
                    }
                }
            }
        }
        Some(other) => {
            return Err(OracleError::MalformedResponse(format!(
                "rating is not a number: {other}"
            )));
        }
        None => return Err(OracleError::MalformedResponse("missing rating".to_string())),
    };

    if !(i64::from(MIN_MAGNITUDE)..=i64::from(MAX_MAGNITUDE)).contains(&rating) {
        return Err(OracleError::InvalidRating(rating));
    }

    let reasoning = value
        .get("reasoning")
        .and_then(Value::as_str)
        .ok_or_else(|| OracleError::MalformedResponse("missing reasoning".to_string()))?;

    Ok(RatingSuggestion {
        rating: rating as u32,
        reasoning: reasoning.to_string(),
    })
}

/// Asks an oracle for a suggestion and turns every failure into `None`.
///
/// ```
/// use lifefold::oracle::{OracleError, RatingOracle, RatingRequest, RatingSuggestion, Suggester};
/// use lifefold::Polarity;
///
/// struct Offline;
///
/// impl RatingOracle for Offline {
///     fn rate(&self, _: &RatingRequest) -> Result<RatingSuggestion, OracleError> {
///         Err(OracleError::Unavailable("no network".into()))
///     }
/// }
///
/// let suggester = Suggester::new(Offline);
/// assert_eq!(suggester.suggest("flat tyre", Polarity::Negative), None);
/// ```
#[derive(Debug, Clone)]
pub struct Suggester<O> {
    oracle: O,
    max_attempts: u32,
}

impl<O: RatingOracle> Suggester<O> {
    pub fn new(oracle: O) -> Self {
        Suggester {
            oracle,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the number of calls per suggestion. Values below 1 are treated
    /// as 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Suggest a magnitude for a description, or `None` if no suggestion
    /// is available.
    pub fn suggest(&self, description: &str, polarity: Polarity) -> Option<RatingSuggestion> {
        self.try_suggest(description, polarity)
            .inspect_err(|e| log::warn!("lifefold: no rating suggestion: {e}"))
            .ok()
    }

    /// Suggest a magnitude for an already-logged event, e.g. to compare
    /// against what the user chose.
    pub fn suggest_for(&self, event: &LifeEvent) -> Option<RatingSuggestion> {
        self.suggest(&event.description, event.polarity)
    }

    /// Like [`suggest`](Self::suggest) but keeps the last error.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::EmptyDescription`] without calling the oracle
    /// for a blank description; otherwise the error from the final attempt.
    pub fn try_suggest(
        &self,
        description: &str,
        polarity: Polarity,
    ) -> Result<RatingSuggestion, OracleError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(OracleError::EmptyDescription);
        }
        let request = RatingRequest::new(description, polarity);

        let mut attempt = 1;
        loop {
            match self.oracle.rate(&request) {
                Ok(suggestion) => return Ok(suggestion),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    log::debug!("lifefold: rating attempt {attempt} failed, retrying: {e}");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
