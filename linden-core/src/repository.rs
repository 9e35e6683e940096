use async_trait::async_trait;
use linden_domain::{AdminAggregate, Booking, Guest, GuestSnapshot, Room, RoomStatus, RoomType};

/// Repository trait for room records.
///
/// The backing store offers per-record reads and writes only; there are
/// no cross-record transactions. Mutating methods that target a single
/// record by id return `false` instead of failing when the record is
/// absent, so callers decide how absence is surfaced.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn insert(
        &self,
        room: Room,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        room_id: &str,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_by_number(
        &self,
        room_number: &str,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list(&self) -> Result<Vec<Room>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_by_type(
        &self,
        room_type: RoomType,
    ) -> Result<Vec<Room>, Box<dyn std::error::Error + Send + Sync>>;

    /// Field-scoped status write; the store applies it atomically for the
    /// one record.
    async fn update_status(
        &self,
        room_id: &str,
        status: RoomStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn delete(
        &self,
        room_id: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for guest records and their embedded bookings.
#[async_trait]
pub trait GuestStore: Send + Sync {
    async fn insert(
        &self,
        guest: Guest,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        user_id: &str,
    ) -> Result<Option<Guest>, Box<dyn std::error::Error + Send + Sync>>;

    /// Matches either the email or the phone field exactly.
    async fn find_by_contact(
        &self,
        email_or_phone: &str,
    ) -> Result<Option<Guest>, Box<dyn std::error::Error + Send + Sync>>;

    /// Finds the guest owning a booking with the given code.
    async fn find_by_booking_code(
        &self,
        booking_code: &str,
    ) -> Result<Option<Guest>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list(&self) -> Result<Vec<Guest>, Box<dyn std::error::Error + Send + Sync>>;

    /// Field-scoped push onto the guest's booking list.
    async fn append_booking(
        &self,
        user_id: &str,
        booking: Booking,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Field-scoped overwrite of the guest's whole booking list.
    async fn replace_bookings(
        &self,
        user_id: &str,
        bookings: Vec<Booking>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for the singleton admin aggregate.
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn insert(
        &self,
        admin: AdminAggregate,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn load(
        &self,
    ) -> Result<Option<AdminAggregate>, Box<dyn std::error::Error + Send + Sync>>;

    /// Field-scoped overwrite of the snapshot list. Returns `false` when
    /// no aggregate has been registered yet.
    async fn replace_snapshots(
        &self,
        snapshots: Vec<GuestSnapshot>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
