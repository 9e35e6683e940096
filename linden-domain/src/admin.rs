use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::Booking;
use crate::guest::{Guest, Profile};

/// Singleton administrative aggregate: admin credentials plus a
/// denormalized copy of every guest and their bookings. Snapshots are
/// weak back-references; the guest ledger stays authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAggregate {
    pub admin_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub guest_snapshots: Vec<GuestSnapshot>,
}

impl AdminAggregate {
    pub fn new(profile: Profile, password_hash: String) -> Self {
        Self {
            admin_id: Uuid::new_v4().to_string(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email.to_lowercase(),
            phone: profile.phone,
            password_hash,
            created_at: Utc::now(),
            guest_snapshots: Vec::new(),
        }
    }
}

/// Denormalized copy of a guest's identity and booking list held by the
/// admin aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSnapshot {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub bookings: Vec<Booking>,
}

impl GuestSnapshot {
    pub fn of(guest: &Guest) -> Self {
        Self {
            user_id: guest.user_id.clone(),
            first_name: guest.first_name.clone(),
            last_name: guest.last_name.clone(),
            email: guest.email.clone(),
            phone: guest.phone.clone(),
            bookings: guest.bookings.clone(),
        }
    }
}

/// Projection returned by administrative queries: identity fields plus
/// the booking list that survived filtering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestView {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub bookings: Vec<Booking>,
}

/// Filters for the administrative guest query. All are optional; an empty
/// filter set still excludes guests without bookings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestFilters {
    pub booker: Option<String>,
    pub room_id: Option<String>,
    pub check_in_date: Option<NaiveDate>,
}
