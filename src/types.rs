//! Core types used throughout RateDesk

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for negotiation sessions (timestamp-based)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new unique session ID with timestamp
    pub fn generate() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis();

        Self(format!("sess_{}", timestamp))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Load identifier as posted on the load board
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadId(pub String);

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the call a rate came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Carrier,
    Agent,
}

/// A load as supplied by the search/ranking collaborator.
///
/// Only `loadboard_rate` and `miles` feed the negotiation engine; the rest is
/// carried for bookkeeping and the offer trail.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Load {
    pub load_id: LoadId,
    pub loadboard_rate: f64,
    pub equipment_type: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub miles: Option<f64>,
    pub weight: Option<f64>,
    pub commodity_type: Option<String>,
}

impl Load {
    /// Minimal load with just the fields the engine consumes
    pub fn with_rate(load_id: impl Into<String>, loadboard_rate: f64) -> Self {
        Self {
            load_id: LoadId(load_id.into()),
            loadboard_rate,
            equipment_type: None,
            origin: None,
            destination: None,
            miles: None,
            weight: None,
            commodity_type: None,
        }
    }
}
