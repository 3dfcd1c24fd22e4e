//! # Persistence Module
//!
//! The single save slot: what gets written and where.
//!
//! A save is one JSON document holding the full [`GameState`] plus the quest
//! snapshot. Ordered maps inside the state are written as arrays of
//! `[key, value]` pairs so that non-string keys such as positions survive.

pub mod store;

pub use store::*;

use crate::game::GameState;
use crate::systems::QuestData;
use crate::{RunehackError, RunehackResult};
use serde::{Deserialize, Serialize};

/// Everything persisted for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub state: GameState,
    pub quest_data: QuestData,
}

impl SaveRecord {
    pub fn new(state: GameState, quest_data: QuestData) -> Self {
        Self { state, quest_data }
    }

    /// Encodes the record as JSON.
    pub fn to_json(&self) -> RunehackResult<String> {
        serde_json::to_string(self).map_err(RunehackError::from)
    }

    /// Decodes a record; any shape mismatch is an error.
    pub fn from_json(json: &str) -> RunehackResult<Self> {
        serde_json::from_str(json).map_err(RunehackError::from)
    }
}

/// Serde adapter writing a `BTreeMap` as a list of `[key, value]` pairs.
///
/// Use with `#[serde(with = "pairs")]`.
pub mod pairs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let entries = Vec::<(K, V)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Indexed {
        #[serde(with = "pairs")]
        by_position: BTreeMap<Position, String>,
    }

    #[test]
    fn test_pairs_layout() {
        let mut by_position = BTreeMap::new();
        by_position.insert(Position::new(2, 1), "a".to_string());
        by_position.insert(Position::new(0, 3), "b".to_string());
        let value = Indexed { by_position };

        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "by_position": [
                    [{"x": 2, "y": 1}, "a"],
                    [{"x": 0, "y": 3}, "b"]
                ]
            })
        );

        let back: Indexed = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_record_rejects_wrong_shape() {
        assert!(SaveRecord::from_json("{\"state\": {}, \"quest_data\": []}").is_err());
        assert!(SaveRecord::from_json("not json").is_err());
    }
}
