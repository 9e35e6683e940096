use serde::{Deserialize, Serialize};

/// Room availability is a single flag for the whole room, not a per-date
/// range. Flipping it is the caller's responsibility; see the lifecycle
/// engine for when that is safe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Booked,
}

impl RoomStatus {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "available" => Some(RoomStatus::Available),
            "booked" => Some(RoomStatus::Booked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Booked => "booked",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Single,
    Double,
    Family,
}

impl RoomType {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "single" => Some(RoomType::Single),
            "double" => Some(RoomType::Double),
            "family" => Some(RoomType::Family),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Double => "double",
            RoomType::Family => "family",
        }
    }
}

/// Canonical room record owned by the room registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: String,
    pub room_number: String,
    pub status: RoomStatus,
    pub bed_count: u32,
    pub room_type: RoomType,
    pub price: f64,
    pub description: String,
    pub image: String,
    pub guests: u32,
    pub area: String,
}

/// Untyped creation payload as handed over by the routing layer. Enum
/// fields arrive as tokens and are validated by the registry so that bad
/// values surface as rejected operations instead of deserialization
/// failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub room_id: String,
    pub room_number: String,
    #[serde(default)]
    pub status: Option<String>,
    pub bed_count: u32,
    pub room_type: String,
    pub price: f64,
    pub description: String,
    pub image: String,
    pub guests: u32,
    pub area: String,
}
