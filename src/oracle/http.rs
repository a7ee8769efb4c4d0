//! Blocking client for an OpenAI-compatible chat-completions endpoint.
//!
//! Enabled with the `http` feature.
//!
//! ```no_run
//! use lifefold::oracle::http::HttpOracle;
//! use lifefold::oracle::Suggester;
//! use lifefold::Polarity;
//!
//! let oracle = HttpOracle::from_env().unwrap();
//! let suggestion = Suggester::new(oracle).suggest("won a raffle", Polarity::Positive);
//! ```

use super::{OracleError, RatingOracle, RatingRequest, RatingSuggestion, parse_rating_response};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1";

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 150;

/// Rating oracle backed by a chat model over HTTP.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl HttpOracle {
    /// Build an oracle for `endpoint` (the base URL, without
    /// `/chat/completions`).
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Unavailable`] if the HTTP client can't be built.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, OracleError> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Ok(HttpOracle {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout,
            client: build_client(timeout)?,
        })
    }

    /// Read `LIFEFOLD_ORACLE_URL` (default [`DEFAULT_ENDPOINT`]),
    /// `LIFEFOLD_ORACLE_KEY` (falling back to `GROQ_API_KEY`) and
    /// `LIFEFOLD_ORACLE_MODEL` (default [`DEFAULT_MODEL`]).
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Unavailable`] when no API key is configured.
    pub fn from_env() -> Result<Self, OracleError> {
        let endpoint =
            env::var("LIFEFOLD_ORACLE_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let api_key = env::var("LIFEFOLD_ORACLE_KEY")
            .or_else(|_| env::var("GROQ_API_KEY"))
            .map_err(|_| OracleError::Unavailable("no API key configured".to_string()))?;
        let mut oracle = Self::new(endpoint, api_key)?;
        if let Ok(model) = env::var("LIFEFOLD_ORACLE_MODEL") {
            oracle.model = model;
        }
        Ok(oracle)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// # Errors
    ///
    /// Returns [`OracleError::Unavailable`] if the HTTP client can't be rebuilt.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, OracleError> {
        self.client = build_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    fn headers(&self) -> Result<HeaderMap, OracleError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !self.api_key.is_empty() {
            let value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| OracleError::Unavailable(format!("invalid API key header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

impl RatingOracle for HttpOracle {
    fn rate(&self, request: &RatingRequest) -> Result<RatingSuggestion, OracleError> {
        if request.description.trim().is_empty() {
            return Err(OracleError::EmptyDescription);
        }

        let user_prompt = request.user_prompt();
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: RatingRequest::system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(self.completions_url())
            .headers(self.headers()?)
            .json(&body)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_else(|_| "unknown error".to_string());
            return Err(status_error(status, &text));
        }

        let completion: ChatResponse = response
            .json()
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OracleError::MalformedResponse("no content in reply".to_string()))?;

        log::debug!("lifefold: oracle replied with {} chars", content.len());
        parse_rating_response(&content)
    }
}

fn build_client(timeout: Duration) -> Result<Client, OracleError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| OracleError::Unavailable(format!("failed to build HTTP client: {e}")))
}

/// Client errors other than timeouts and rate limits won't improve on retry.
fn status_error(status: StatusCode, body: &str) -> OracleError {
    let message = format!("HTTP {status}: {body}");
    if status.is_client_error()
        && status != StatusCode::REQUEST_TIMEOUT
        && status != StatusCode::TOO_MANY_REQUESTS
    {
        OracleError::Rejected(message)
    } else {
        OracleError::Unavailable(message)
    }
}

fn transport_error(e: reqwest::Error) -> OracleError {
    if e.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Unavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Polarity;

    #[test]
    fn test_completions_url_trims_slash() {
        let oracle = HttpOracle::new("http://localhost:11434/v1/", "").unwrap();
        assert_eq!(
            oracle.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(oracle.model(), DEFAULT_MODEL);
        assert_eq!(oracle.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        for status in [StatusCode::BAD_REQUEST, StatusCode::UNAUTHORIZED, StatusCode::NOT_FOUND] {
            let err = status_error(status, "nope");
            assert!(matches!(err, OracleError::Rejected(_)), "{status}: {err:?}");
            assert!(!err.is_transient());
        }
        for status in [
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = status_error(status, "later");
            assert!(matches!(err, OracleError::Unavailable(_)), "{status}: {err:?}");
            assert!(err.is_transient());
        }
    }

    #[test]
    fn test_unreachable_endpoint_is_transient() {
        let oracle = HttpOracle::new("http://127.0.0.1:9", "key")
            .unwrap()
            .with_timeout(Duration::from_millis(500))
            .unwrap();
        let err = oracle
            .rate(&RatingRequest::new("stubbed toe", Polarity::Negative))
            .unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err:?}");
    }
}
