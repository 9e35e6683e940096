use std::sync::Arc;

use linden_core::repository::RoomStore;
use linden_core::{EngineError, EngineResult};
use linden_domain::{NewRoom, Room, RoomStatus, RoomType};

/// Owns canonical room records and their availability flag. Eligibility
/// rules for flipping the flag live in the lifecycle engine, not here.
pub struct RoomRegistry {
    store: Arc<dyn RoomStore>,
}

/// Result of a bulk creation: valid entries persist even when others in
/// the same batch are rejected.
#[derive(Debug)]
pub struct BulkCreateOutcome {
    pub created: Vec<Room>,
    pub errors: Vec<String>,
}

impl RoomRegistry {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new_room: NewRoom) -> EngineResult<Room> {
        let room = build_room(&new_room).map_err(EngineError::Validation)?;
        if self
            .store
            .get(&room.room_id)
            .await
            .map_err(EngineError::store)?
            .is_some()
            || self
                .store
                .get_by_number(&room.room_number)
                .await
                .map_err(EngineError::store)?
                .is_some()
        {
            return Err(EngineError::DuplicateKey(
                "roomId or roomNumber already exists".to_string(),
            ));
        }
        self.store
            .insert(room.clone())
            .await
            .map_err(EngineError::store)?;
        tracing::info!(room_id = %room.room_id, room_number = %room.room_number, "room created");
        Ok(room)
    }

    /// Processes each entry independently; rejected entries are reported
    /// by index while the rest persist.
    pub async fn bulk_create(&self, rooms: Vec<NewRoom>) -> EngineResult<BulkCreateOutcome> {
        if rooms.is_empty() {
            return Err(EngineError::Validation(
                "please provide an array of rooms".to_string(),
            ));
        }
        let mut created = Vec::new();
        let mut errors = Vec::new();
        for (index, entry) in rooms.into_iter().enumerate() {
            match self.create(entry).await {
                Ok(room) => created.push(room),
                Err(err) => errors.push(format!("room at index {index}: {err}")),
            }
        }
        Ok(BulkCreateOutcome { created, errors })
    }

    /// Applies a status token with no eligibility checks beyond enum
    /// membership; deciding when this is safe is the caller's problem.
    pub async fn set_status(&self, room_id: &str, status_token: &str) -> EngineResult<Room> {
        let status = RoomStatus::parse(status_token).ok_or_else(|| {
            EngineError::Validation("invalid status, must be one of: available, booked".to_string())
        })?;
        self.apply_status(room_id, status).await?;
        self.get_by_id(room_id).await
    }

    /// Typed status write used by the lifecycle engine's ordered
    /// sequences.
    pub(crate) async fn apply_status(
        &self,
        room_id: &str,
        status: RoomStatus,
    ) -> EngineResult<()> {
        let updated = self
            .store
            .update_status(room_id, status)
            .await
            .map_err(EngineError::store)?;
        if !updated {
            return Err(EngineError::NotFound(format!("room {room_id} not found")));
        }
        Ok(())
    }

    pub async fn get_by_id(&self, room_id: &str) -> EngineResult<Room> {
        self.store
            .get(room_id)
            .await
            .map_err(EngineError::store)?
            .ok_or_else(|| EngineError::NotFound(format!("room {room_id} not found")))
    }

    pub async fn list(&self) -> EngineResult<Vec<Room>> {
        self.store.list().await.map_err(EngineError::store)
    }

    pub async fn find_by_type(&self, type_token: &str) -> EngineResult<Vec<Room>> {
        let room_type = RoomType::parse(type_token).ok_or_else(|| {
            EngineError::Validation(
                "invalid roomType, must be one of: single, double, family".to_string(),
            )
        })?;
        let rooms = self
            .store
            .list_by_type(room_type)
            .await
            .map_err(EngineError::store)?;
        if rooms.is_empty() {
            return Err(EngineError::NotFound(format!(
                "no rooms found for type: {type_token}"
            )));
        }
        Ok(rooms)
    }

    pub async fn delete(&self, room_id: &str) -> EngineResult<()> {
        let deleted = self
            .store
            .delete(room_id)
            .await
            .map_err(EngineError::store)?;
        if !deleted {
            return Err(EngineError::NotFound(format!("room {room_id} not found")));
        }
        tracing::info!(%room_id, "room deleted");
        Ok(())
    }
}

fn build_room(new_room: &NewRoom) -> Result<Room, String> {
    let required_strings = [
        &new_room.room_id,
        &new_room.room_number,
        &new_room.description,
        &new_room.image,
        &new_room.area,
    ];
    if required_strings.iter().any(|s| s.trim().is_empty())
        || new_room.bed_count == 0
        || new_room.guests == 0
        || new_room.price <= 0.0
    {
        return Err(
            "please provide all required fields: roomId, roomNumber, bedCount, roomType, \
             price, description, image, guests, area"
                .to_string(),
        );
    }
    let room_type = RoomType::parse(&new_room.room_type)
        .ok_or_else(|| "invalid roomType, must be one of: single, double, family".to_string())?;
    let status = match new_room.status.as_deref() {
        Some(token) => RoomStatus::parse(token)
            .ok_or_else(|| "invalid status, must be one of: available, booked".to_string())?,
        None => RoomStatus::Available,
    };
    Ok(Room {
        room_id: new_room.room_id.clone(),
        room_number: new_room.room_number.clone(),
        status,
        bed_count: new_room.bed_count,
        room_type,
        price: new_room.price,
        description: new_room.description.clone(),
        image: new_room.image.clone(),
        guests: new_room.guests,
        area: new_room.area.clone(),
    })
}
