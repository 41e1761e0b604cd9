// parking_core/src/messages.rs

//! The JSON message contract shared by the vehicle and the map provider.
//!
//! Every message is a single JSON object whose `type` field selects the
//! variant, e.g. `{"type":"ACK_SPOT_MAP","count":4}`.

use crate::error::ChannelError;
use crate::types::{Side, SpotStatus};
use serde::{Deserialize, Serialize};

/// One entry of a `SPOT_MAP` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotRecord {
    pub id: String,
    pub side: Side,
    pub x: f64,
    /// Lateral coordinate. Older providers name it `y`.
    #[serde(alias = "y")]
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// provider -> vehicle: the authoritative, ordered spot list.
    SpotMap {
        #[serde(default)]
        spots: Vec<SpotRecord>,
    },
    /// vehicle -> provider: the map was adopted.
    AckSpotMap { count: usize },
    /// vehicle -> provider: classification of one spot.
    ScanResult {
        spot_id: String,
        status: SpotStatus,
        score: f64,
        min_dist: Option<f64>,
    },
    /// vehicle -> provider: the first free spot, sent once.
    FreeSpotFound { spot_id: String },
    /// vehicle -> provider: every visited spot was occupied.
    NoFreeSpots,
    /// vehicle -> provider: the mission is over.
    ScanComplete,
}

impl Message {
    pub fn encode(&self) -> Result<String, ChannelError> {
        serde_json::to_string(self).map_err(ChannelError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, ChannelError> {
        serde_json::from_str(text).map_err(ChannelError::Decode)
    }

    /// The wire name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::SpotMap { .. } => "SPOT_MAP",
            Message::AckSpotMap { .. } => "ACK_SPOT_MAP",
            Message::ScanResult { .. } => "SCAN_RESULT",
            Message::FreeSpotFound { .. } => "FREE_SPOT_FOUND",
            Message::NoFreeSpots => "NO_FREE_SPOTS",
            Message::ScanComplete => "SCAN_COMPLETE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn spot_map_accepts_wire_aliases() {
        let text = r#"{"type":"SPOT_MAP","spots":[
            {"id":"P1","side":"R","x":12.0,"z":3.0},
            {"id":"P2","side":"LEFT","x":19.0,"y":-3.0}
        ]}"#;
        let Message::SpotMap { spots } = Message::decode(text).unwrap() else {
            panic!("expected a spot map");
        };
        assert_eq!(spots.len(), 2);
        assert_eq!(spots[0].side, Side::Right);
        assert_eq!(spots[1].side, Side::Left);
        assert_eq!(spots[1].z, -3.0);
    }

    #[test]
    fn spot_map_without_spots_is_empty() {
        let message = Message::decode(r#"{"type":"SPOT_MAP"}"#).unwrap();
        assert_eq!(message, Message::SpotMap { spots: Vec::new() });
    }

    #[test]
    fn scan_result_encodes_null_min_dist() {
        let message = Message::ScanResult {
            spot_id: "P2".to_string(),
            status: SpotStatus::Free,
            score: 0.0,
            min_dist: None,
        };
        let value: Value = serde_json::from_str(&message.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "SCAN_RESULT",
                "spot_id": "P2",
                "status": "FREE",
                "score": 0.0,
                "min_dist": null
            })
        );
    }

    #[test]
    fn unit_messages_carry_only_the_tag() {
        let value: Value = serde_json::from_str(&Message::NoFreeSpots.encode().unwrap()).unwrap();
        assert_eq!(value, json!({ "type": "NO_FREE_SPOTS" }));
        assert_eq!(
            Message::decode(r#"{"type":"SCAN_COMPLETE"}"#).unwrap(),
            Message::ScanComplete
        );
    }

    #[test]
    fn unknown_or_malformed_messages_are_errors() {
        assert!(matches!(
            Message::decode(r#"{"type":"HELLO"}"#),
            Err(ChannelError::Decode(_))
        ));
        assert!(Message::decode("not json").is_err());
        assert!(Message::decode(r#"{"type":"ACK_SPOT_MAP"}"#).is_err());
    }
}
