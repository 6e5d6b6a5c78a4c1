//! Media descriptor consumed by the storage layer.
//!
//! The host application owns media records. Storage only needs a stable identifier and
//! the logical filename to compute object keys.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Returned when a media id is empty or whitespace only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Media id must not be blank")]
pub struct InvalidMediaId;

/// Stable, non-blank media identifier (usually a UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaId(String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidMediaId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidMediaId);
        }
        Ok(MediaId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for MediaId {
    fn from(id: Uuid) -> Self {
        MediaId(id.to_string())
    }
}

impl FromStr for MediaId {
    type Err = InvalidMediaId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaId::new(s)
    }
}

impl TryFrom<String> for MediaId {
    type Error = InvalidMediaId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MediaId::new(value)
    }
}

impl From<MediaId> for String {
    fn from(id: MediaId) -> Self {
        id.0
    }
}

impl Display for MediaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// A media item as seen by storage: its id and the filename it was uploaded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: MediaId,
    pub filename: String,
}

impl Media {
    pub fn new(id: impl Into<MediaId>, filename: impl Into<String>) -> Self {
        Media {
            id: id.into(),
            filename: filename.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_media_id_is_rejected() {
        assert_eq!(MediaId::new(""), Err(InvalidMediaId));
        assert_eq!("   ".parse::<MediaId>(), Err(InvalidMediaId));
    }

    #[test]
    fn media_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = MediaId::from(uuid);
        assert_eq!(id.as_str(), uuid.to_string());
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn media_id_deserialization_rejects_blank() {
        let parsed: Result<MediaId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());

        let media: Media = serde_json::from_str(r#"{"id":"42","filename":"photo.jpg"}"#).unwrap();
        assert_eq!(media.id.as_str(), "42");
    }
}
