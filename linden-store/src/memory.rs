use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use linden_core::repository::{AdminStore, GuestStore, RoomStore};
use linden_domain::{AdminAggregate, Booking, Guest, GuestSnapshot, Room, RoomStatus, RoomType};

/// In-memory store backing tests and single-process embedding. Each
/// aggregate sits behind its own lock, so every operation is an atomic
/// single-record read-modify-write; nothing spans two maps.
pub struct MemoryStore {
    rooms: RwLock<HashMap<String, Room>>,
    guests: RwLock<HashMap<String, Guest>>,
    admin: RwLock<Option<AdminAggregate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            guests: RwLock::new(HashMap::new()),
            admin: RwLock::new(None),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn insert(
        &self,
        room: Room,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.rooms
            .write()
            .await
            .insert(room.room_id.clone(), room);
        Ok(())
    }

    async fn get(
        &self,
        room_id: &str,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.rooms.read().await.get(room_id).cloned())
    }

    async fn get_by_number(
        &self,
        room_number: &str,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .rooms
            .read()
            .await
            .values()
            .find(|r| r.room_number == room_number)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Room>, Box<dyn std::error::Error + Send + Sync>> {
        let mut rooms: Vec<Room> = self.rooms.read().await.values().cloned().collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        Ok(rooms)
    }

    async fn list_by_type(
        &self,
        room_type: RoomType,
    ) -> Result<Vec<Room>, Box<dyn std::error::Error + Send + Sync>> {
        let mut rooms: Vec<Room> = self
            .rooms
            .read()
            .await
            .values()
            .filter(|r| r.room_type == room_type)
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        Ok(rooms)
    }

    async fn update_status(
        &self,
        room_id: &str,
        status: RoomStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        match self.rooms.write().await.get_mut(room_id) {
            Some(room) => {
                room.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(
        &self,
        room_id: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.rooms.write().await.remove(room_id).is_some())
    }
}

#[async_trait]
impl GuestStore for MemoryStore {
    async fn insert(
        &self,
        guest: Guest,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.guests
            .write()
            .await
            .insert(guest.user_id.clone(), guest);
        Ok(())
    }

    async fn get(
        &self,
        user_id: &str,
    ) -> Result<Option<Guest>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.guests.read().await.get(user_id).cloned())
    }

    async fn find_by_contact(
        &self,
        email_or_phone: &str,
    ) -> Result<Option<Guest>, Box<dyn std::error::Error + Send + Sync>> {
        let needle = email_or_phone.to_lowercase();
        Ok(self
            .guests
            .read()
            .await
            .values()
            .find(|g| g.email == needle || g.phone == email_or_phone)
            .cloned())
    }

    async fn find_by_booking_code(
        &self,
        booking_code: &str,
    ) -> Result<Option<Guest>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .guests
            .read()
            .await
            .values()
            .find(|g| g.bookings.iter().any(|b| b.booking_code == booking_code))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Guest>, Box<dyn std::error::Error + Send + Sync>> {
        let mut guests: Vec<Guest> = self.guests.read().await.values().cloned().collect();
        guests.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(guests)
    }

    async fn append_booking(
        &self,
        user_id: &str,
        booking: Booking,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        match self.guests.write().await.get_mut(user_id) {
            Some(guest) => {
                guest.bookings.push(booking);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace_bookings(
        &self,
        user_id: &str,
        bookings: Vec<Booking>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        match self.guests.write().await.get_mut(user_id) {
            Some(guest) => {
                guest.bookings = bookings;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn insert(
        &self,
        admin: AdminAggregate,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        *self.admin.write().await = Some(admin);
        Ok(())
    }

    async fn load(
        &self,
    ) -> Result<Option<AdminAggregate>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.admin.read().await.clone())
    }

    async fn replace_snapshots(
        &self,
        snapshots: Vec<GuestSnapshot>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        match self.admin.write().await.as_mut() {
            Some(admin) => {
                admin.guest_snapshots = snapshots;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, number: &str) -> Room {
        Room {
            room_id: id.to_string(),
            room_number: number.to_string(),
            status: RoomStatus::Available,
            bed_count: 2,
            room_type: RoomType::Double,
            price: 120.0,
            description: "garden view".to_string(),
            image: "double.jpg".to_string(),
            guests: 2,
            area: "32m2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_room_status_update_is_scoped_to_one_record() {
        let store = MemoryStore::new();
        RoomStore::insert(&store, room("r-1", "101")).await.unwrap();
        RoomStore::insert(&store, room("r-2", "102")).await.unwrap();

        assert!(store.update_status("r-1", RoomStatus::Booked).await.unwrap());
        assert_eq!(
            RoomStore::get(&store, "r-1").await.unwrap().unwrap().status,
            RoomStatus::Booked
        );
        assert_eq!(
            RoomStore::get(&store, "r-2").await.unwrap().unwrap().status,
            RoomStatus::Available
        );
        assert!(!store.update_status("r-404", RoomStatus::Booked).await.unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_write_requires_registered_admin() {
        let store = MemoryStore::new();
        assert!(!store.replace_snapshots(Vec::new()).await.unwrap());
    }
}
