//! Shared types for the activities service and its HTTP clients.

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =====================================================
// Domain Types
// =====================================================

/// A named extracurricular offering. The name is the key it is stored under.
///
/// Every field defaults when missing so that records written by older
/// versions of the service still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: String,
    /// Advisory capacity. Never checked against `participants`.
    #[serde(default)]
    pub max_participants: u32,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub draft: bool,
    /// Keys this version does not know about, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    pub fn is_published(&self) -> bool {
        !self.draft
    }

    pub fn has_participant(&self, email: &str) -> bool {
        self.participants.iter().any(|p| p == email)
    }
}

/// Activities keyed by name, in creation order.
pub type ActivityMap = IndexMap<String, Activity>;

// =====================================================
// Request Types
// =====================================================

/// Writable activity fields. `None` means the field was not supplied.
///
/// Only a JSON object is accepted; arrays are not read positionally.
#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ActivityFields {
    pub description: Option<String>,
    pub schedule: Option<String>,
    pub max_participants: Option<u32>,
    /// Only honoured on create.
    pub participants: Option<Vec<String>>,
    /// `Some(None)` clears the poster.
    pub poster: Option<Option<String>>,
    pub draft: Option<bool>,
}

#[derive(Deserialize)]
struct FieldsObject {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    schedule: Option<String>,
    #[serde(default, deserialize_with = "capacity")]
    max_participants: Option<u32>,
    #[serde(default)]
    participants: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    poster: Option<Option<String>>,
    #[serde(default, deserialize_with = "truthy")]
    draft: Option<bool>,
}

impl TryFrom<Map<String, Value>> for ActivityFields {
    type Error = serde_json::Error;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let f: FieldsObject = serde_json::from_value(Value::Object(object))?;
        Ok(Self {
            description: f.description,
            schedule: f.schedule,
            max_participants: f.max_participants,
            participants: f.participants,
            poster: f.poster,
            draft: f.draft,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateActivityRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: ActivityFields,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListActivitiesQuery {
    #[serde(default, deserialize_with = "query_flag")]
    pub published_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ParticipantQuery {
    #[serde(default)]
    pub email: Option<String>,
}

// =====================================================
// Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub message: String,
    pub activity: Activity,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

// =====================================================
// Field Coercion
// =====================================================

pub const INVALID_CAPACITY: &str = "Invalid 'max_participants' value";

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Accepts integers, floats (truncated), booleans and integer strings.
fn capacity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_capacity(&value)
        .map(Some)
        .ok_or_else(|| de::Error::custom(INVALID_CAPACITY))
}

pub fn coerce_capacity(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?.trunc();
                if !f.is_finite() || f < i64::MIN as f64 || f > i64::MAX as f64 {
                    return None;
                }
                f as i64
            }
        },
        Value::Bool(b) => i64::from(*b),
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok()
}

fn truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| Some(is_truthy(&v)))
}

/// Empty, zero and null values are false; everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn query_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("'{raw}' is not a valid boolean")))
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
