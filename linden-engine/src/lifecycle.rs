use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::sync::Mutex;

use linden_core::{EngineError, EngineResult};
use linden_domain::{
    Booking, Guest, GuestFilters, GuestSnapshot, GuestView, Room, RoomStatus, TransitionAction,
};
use linden_store::app_config::BusinessRules;

use crate::guests::GuestLedger;
use crate::mirror::AdminMirror;
use crate::rooms::RoomRegistry;

/// Outcome of a lifecycle transition, echoed back to the routing layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionReceipt {
    pub message: String,
    pub action: String,
    pub room_id: String,
}

/// The booking lifecycle state machine and its cross-aggregate write
/// protocol. Every successful transition runs the same ordered sequence:
/// guest ledger first, room registry second when the room flag changes,
/// admin mirror last. The sequence is not atomic; a failed mirror step
/// is logged, queued for reconciliation, and never rolls back the
/// authoritative writes.
pub struct LifecycleEngine {
    rooms: Arc<RoomRegistry>,
    guests: Arc<GuestLedger>,
    mirror: Arc<AdminMirror>,
    rules: BusinessRules,
    dirty_guests: Mutex<BTreeSet<String>>,
}

impl LifecycleEngine {
    pub fn new(
        rooms: Arc<RoomRegistry>,
        guests: Arc<GuestLedger>,
        mirror: Arc<AdminMirror>,
        rules: BusinessRules,
    ) -> Self {
        Self {
            rooms,
            guests,
            mirror,
            rules,
            dirty_guests: Mutex::new(BTreeSet::new()),
        }
    }

    /// Records a new booking against the guest, copying the room's
    /// current number and price. With `strict_availability` off (the
    /// default) the room flag is untouched; callers use `book_room`
    /// separately.
    pub async fn create_booking(
        &self,
        user_id: &str,
        room_id: &str,
        booking_code: &str,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
    ) -> EngineResult<Booking> {
        self.reconcile_mirror().await;

        if booking_code.trim().is_empty() {
            return Err(EngineError::Validation(
                "missing required fields".to_string(),
            ));
        }
        if check_out_date <= check_in_date {
            return Err(EngineError::Validation(
                "checkOutDate must be after checkInDate".to_string(),
            ));
        }
        let room = self.rooms.get_by_id(room_id).await?;
        self.guests.get(user_id).await?;
        if self.guests.find_by_booking_code(booking_code).await.is_ok() {
            return Err(EngineError::DuplicateKey(format!(
                "booking code {booking_code} already in use"
            )));
        }
        if self.rules.strict_availability && room.status == RoomStatus::Booked {
            return Err(EngineError::AlreadyBooked(room_id.to_string()));
        }

        let booking = Booking::new(
            booking_code.to_string(),
            &room,
            check_in_date,
            check_out_date,
        );
        let bookings = self.guests.append_booking(user_id, booking.clone()).await?;
        if self.rules.strict_availability {
            self.rooms.apply_status(room_id, RoomStatus::Booked).await?;
        }
        self.patch_mirror(user_id, &bookings).await;

        tracing::info!(%user_id, %booking_code, %room_id, "booking created");
        Ok(booking)
    }

    /// Applies a guarded transition to the booking owning `booking_code`,
    /// locating the guest through the booking code (the administrative
    /// path).
    pub async fn transition_booking(
        &self,
        booking_code: &str,
        room_id: &str,
        action_token: &str,
    ) -> EngineResult<TransitionReceipt> {
        self.reconcile_mirror().await;
        let guest = self.guests.find_by_booking_code(booking_code).await?;
        self.apply_transition(guest, booking_code, room_id, action_token)
            .await
    }

    /// Same transition, scoped to one guest's own booking list; a code
    /// held by another guest surfaces as NotFound.
    pub async fn transition_guest_booking(
        &self,
        user_id: &str,
        booking_code: &str,
        room_id: &str,
        action_token: &str,
    ) -> EngineResult<TransitionReceipt> {
        self.reconcile_mirror().await;
        let guest = self.guests.get(user_id).await?;
        if !guest.bookings.iter().any(|b| b.booking_code == booking_code) {
            return Err(EngineError::NotFound(format!(
                "booking {booking_code} not found"
            )));
        }
        self.apply_transition(guest, booking_code, room_id, action_token)
            .await
    }

    /// Date guards compare calendar dates in the server's local time
    /// zone; rejected transitions leave every aggregate untouched.
    async fn apply_transition(
        &self,
        guest: Guest,
        booking_code: &str,
        room_id: &str,
        action_token: &str,
    ) -> EngineResult<TransitionReceipt> {
        let action = TransitionAction::parse(action_token).ok_or_else(|| {
            EngineError::InvalidArgument(format!("unknown action `{action_token}`"))
        })?;
        let room = self.rooms.get_by_id(room_id).await?;
        let booking = guest
            .bookings
            .iter()
            .find(|b| b.booking_code == booking_code)
            .cloned()
            .ok_or_else(|| {
                EngineError::NotFound(format!("booking {booking_code} not found"))
            })?;

        if booking.is_check_out {
            return Err(EngineError::InvalidTransition(format!(
                "booking {booking_code} is already checked out"
            )));
        }

        let today = Local::now().date_naive();
        let message = match action {
            TransitionAction::Cancel => {
                if today >= booking.check_in_date {
                    return Err(EngineError::InvalidTransition(
                        "cannot cancel a booking on or after its check-in date".to_string(),
                    ));
                }
                // logically cancelled, then evicted from the active list
                let remaining: Vec<Booking> = guest
                    .bookings
                    .iter()
                    .filter(|b| b.booking_code != booking_code)
                    .cloned()
                    .collect();
                self.guests
                    .replace_bookings(&guest.user_id, remaining.clone())
                    .await?;
                self.rooms
                    .apply_status(&room.room_id, RoomStatus::Available)
                    .await?;
                self.patch_mirror(&guest.user_id, &remaining).await;
                format!("booking {booking_code} cancelled")
            }
            TransitionAction::CheckIn => {
                if today < booking.check_in_date {
                    return Err(EngineError::InvalidTransition(
                        "cannot check in before the check-in date".to_string(),
                    ));
                }
                let updated = set_flag(&guest.bookings, booking_code, |b| b.is_check_in = true);
                self.guests
                    .replace_bookings(&guest.user_id, updated.clone())
                    .await?;
                self.patch_mirror(&guest.user_id, &updated).await;
                format!("booking {booking_code} checked in")
            }
            TransitionAction::CheckOut => {
                if !booking.is_check_in {
                    return Err(EngineError::InvalidTransition(
                        "cannot check out before checking in".to_string(),
                    ));
                }
                if today > booking.check_out_date {
                    return Err(EngineError::InvalidTransition(
                        "cannot check out after the check-out date".to_string(),
                    ));
                }
                let updated = set_flag(&guest.bookings, booking_code, |b| b.is_check_out = true);
                self.guests
                    .replace_bookings(&guest.user_id, updated.clone())
                    .await?;
                self.rooms
                    .apply_status(&room.room_id, RoomStatus::Available)
                    .await?;
                self.patch_mirror(&guest.user_id, &updated).await;
                format!("booking {booking_code} checked out")
            }
        };

        tracing::info!(%booking_code, action = action.as_str(), "booking transition applied");
        Ok(TransitionReceipt {
            message,
            action: action.as_str().to_string(),
            room_id: room.room_id,
        })
    }

    /// Flips the room's availability flag without creating a booking
    /// record; pairing it with `create_booking` is the caller's job.
    pub async fn book_room(&self, room_id: &str, user_id: &str) -> EngineResult<Room> {
        self.reconcile_mirror().await;

        self.guests.get(user_id).await?;
        let room = self.rooms.get_by_id(room_id).await?;
        if room.status == RoomStatus::Booked {
            return Err(EngineError::AlreadyBooked(room_id.to_string()));
        }
        self.rooms.apply_status(room_id, RoomStatus::Booked).await?;
        tracing::info!(%room_id, %user_id, "room booked");
        self.rooms.get_by_id(room_id).await
    }

    /// Administrative guest listing; delegates to the mirror.
    pub async fn list_guests(&self, filters: &GuestFilters) -> EngineResult<Vec<GuestView>> {
        self.mirror.query_guests(filters).await
    }

    /// Step 3 of the write sequence. Failure never propagates: the
    /// authoritative writes already happened, so the operation is
    /// reported as successful and the guest is queued for a later
    /// re-patch.
    async fn patch_mirror(&self, user_id: &str, bookings: &[Booking]) {
        match self.mirror.patch_booking_list(user_id, bookings).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(%user_id, "mirror entry missing, guest queued for reconciliation");
                self.dirty_guests.lock().await.insert(user_id.to_string());
            }
            Err(err) => {
                tracing::warn!(%user_id, %err, "mirror patch failed, guest queued for reconciliation");
                self.dirty_guests.lock().await.insert(user_id.to_string());
            }
        }
    }

    /// Opportunistically re-mirrors guests whose last mirror write was
    /// dropped. Runs at the start of every lifecycle operation; the full
    /// snapshot is upserted so a guest missing from the mirror entirely
    /// is recovered too. Guests that still cannot be written stay
    /// queued.
    async fn reconcile_mirror(&self) {
        let pending: Vec<String> = {
            let queue = self.dirty_guests.lock().await;
            if queue.is_empty() {
                return;
            }
            queue.iter().cloned().collect()
        };
        for user_id in pending {
            let guest = match self.guests.get(&user_id).await {
                Ok(guest) => guest,
                Err(_) => {
                    // guest vanished; nothing left to reconcile
                    self.dirty_guests.lock().await.remove(&user_id);
                    continue;
                }
            };
            if let Ok(true) = self
                .mirror
                .upsert_guest_snapshot(GuestSnapshot::of(&guest))
                .await
            {
                self.dirty_guests.lock().await.remove(&user_id);
                tracing::info!(%user_id, "mirror reconciled");
            }
        }
    }
}

fn set_flag<F>(bookings: &[Booking], booking_code: &str, mutate: F) -> Vec<Booking>
where
    F: Fn(&mut Booking),
{
    bookings
        .iter()
        .cloned()
        .map(|mut b| {
            if b.booking_code == booking_code {
                mutate(&mut b);
            }
            b
        })
        .collect()
}
