use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::room::Room;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Booked,
    Cancelled,
}

/// A guest's reservation of a room for a date range, embedded in the
/// guest record. Room number and price are copied from the room at
/// creation time and never re-read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_code: String,
    pub room_id: String,
    pub room_number: String,
    pub price: f64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub is_check_in: bool,
    pub is_check_out: bool,
    pub status: BookingStatus,
}

impl Booking {
    pub fn new(
        booking_code: String,
        room: &Room,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
    ) -> Self {
        Self {
            booking_code,
            room_id: room.room_id.clone(),
            room_number: room.room_number.clone(),
            price: room.price,
            check_in_date,
            check_out_date,
            is_check_in: false,
            is_check_out: false,
            status: BookingStatus::Booked,
        }
    }
}

/// Lifecycle transition requested against an existing booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    Cancel,
    CheckIn,
    CheckOut,
}

impl TransitionAction {
    /// Parses the wire token used by the routing layer. Unknown tokens
    /// return `None` and are rejected by the engine.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "cancel" => Some(TransitionAction::Cancel),
            "checkIn" => Some(TransitionAction::CheckIn),
            "checkOut" => Some(TransitionAction::CheckOut),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionAction::Cancel => "cancel",
            TransitionAction::CheckIn => "checkIn",
            TransitionAction::CheckOut => "checkOut",
        }
    }
}
