use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Per-request identifier (ULID), carried through logs and error envelopes.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse a caller-supplied id when it parses, otherwise mint a new one.
    pub fn from_str_or_new(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse::<RequestId>().ok())
            .unwrap_or_default()
    }

    /// Milliseconds since the Unix epoch at which the id was minted.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RequestId(ulid::Ulid::from_string(s.trim())?))
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<RequestId>()
            .map_err(|_| serde::de::Error::custom("invalid request id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_valid_id() {
        let id = RequestId::new();
        let text = id.to_string();
        assert_eq!(RequestId::from_str_or_new(Some(&text)), id);
        assert_ne!(RequestId::from_str_or_new(Some("not-a-ulid")).to_string(), "not-a-ulid");
    }

    #[test]
    fn test_serializes_as_string() {
        let id = RequestId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }
}
