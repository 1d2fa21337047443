//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::CounterSnapshot;

/// API response structure for intent endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub counter: CounterSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, counter: CounterSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            counter,
        }
    }

    /// The intent changed the counter or countdown
    pub fn updated(message: String, counter: CounterSnapshot) -> Self {
        Self::new("updated", message, counter)
    }

    /// Decrement refused because the count is already zero
    pub fn ineligible(message: String, counter: CounterSnapshot) -> Self {
        Self::new("ineligible", message, counter)
    }

    /// A countdown duration was accepted
    pub fn armed(message: String, counter: CounterSnapshot) -> Self {
        Self::new("armed", message, counter)
    }

    /// Countdown input was not a positive whole number of seconds
    pub fn ignored(message: String, counter: CounterSnapshot) -> Self {
        Self::new("ignored", message, counter)
    }
}

/// Request body for POST /countdown
///
/// `seconds` may be a number or the raw text typed into the prompt.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountdownRequest {
    #[serde(default)]
    pub seconds: Option<serde_json::Value>,
}

impl CountdownRequest {
    /// The prompt input as text, `None` when absent or not a scalar
    pub fn input(&self) -> Option<String> {
        match self.seconds.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub counter: CounterSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
