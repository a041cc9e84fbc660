//! Video list and detail models.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::annotation::GroupAnnotations;

/// Server-assigned video identifier.
///
/// The server may emit ids as JSON strings or integers; both are
/// normalized to their string form so they can be compared and
/// spliced into request paths uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for VideoId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for VideoId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// A video entry as returned by `GET /videos`.
///
/// Only `id` is interpreted; every other field is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Stable identity key
    pub id: VideoId,

    /// Remaining server fields (name, size, timestamps, ...)
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Video {
    /// Create a video with no metadata.
    pub fn new(id: impl Into<VideoId>) -> Self {
        Self {
            id: id.into(),
            metadata: Map::new(),
        }
    }

    /// Attach a metadata field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Human-readable label: `name`, then `filename`, then the id.
    pub fn display_name(&self) -> &str {
        ["name", "filename"]
            .iter()
            .find_map(|key| self.metadata.get(*key).and_then(Value::as_str))
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// Detail info for one video, as returned by `GET /videos/{id}/info`,
/// extended with the group annotations fetched separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Server-shaped detail fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// Frames of group boxes, attached client-side
    #[serde(rename = "groupAnnotations", default)]
    pub group_annotations: GroupAnnotations,
}

impl VideoInfo {
    /// Look up a detail field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Total number of boxes across all frames.
    pub fn box_count(&self) -> usize {
        self.group_annotations.iter().map(Vec::len).sum()
    }
}
