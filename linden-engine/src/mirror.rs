use std::sync::Arc;

use linden_core::identity::CredentialHasher;
use linden_core::repository::{AdminStore, GuestStore};
use linden_core::{EngineError, EngineResult};
use linden_domain::{AdminAggregate, Booking, GuestFilters, GuestSnapshot, GuestView, Profile};

/// Read-optimized projection of all guests and their bookings, stored on
/// the singleton admin aggregate. The guest ledger stays authoritative;
/// this service only patches copies and never fails its callers over a
/// missing entry.
pub struct AdminMirror {
    store: Arc<dyn AdminStore>,
    guests: Arc<dyn GuestStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AdminMirror {
    pub fn new(
        store: Arc<dyn AdminStore>,
        guests: Arc<dyn GuestStore>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            store,
            guests,
            hasher,
        }
    }

    pub async fn register_admin(
        &self,
        profile: Profile,
        credential: &str,
    ) -> EngineResult<AdminAggregate> {
        profile.validate().map_err(EngineError::Validation)?;
        if credential.len() < 6 {
            return Err(EngineError::Validation(
                "password must be at least 6 characters".to_string(),
            ));
        }
        if self
            .store
            .load()
            .await
            .map_err(EngineError::store)?
            .is_some()
        {
            return Err(EngineError::DuplicateKey(
                "admin aggregate already registered".to_string(),
            ));
        }
        let hash = self
            .hasher
            .hash(credential)
            .await
            .map_err(EngineError::store)?;
        let admin = AdminAggregate::new(profile, hash);
        self.store
            .insert(admin.clone())
            .await
            .map_err(EngineError::store)?;
        tracing::info!(admin_id = %admin.admin_id, "admin registered");
        Ok(admin)
    }

    pub async fn authenticate_admin(
        &self,
        email_or_phone: &str,
        credential: &str,
    ) -> EngineResult<AdminAggregate> {
        let admin = self
            .store
            .load()
            .await
            .map_err(EngineError::store)?
            .filter(|a| a.email == email_or_phone.to_lowercase() || a.phone == email_or_phone)
            .ok_or_else(|| EngineError::NotFound("email or phone not found".to_string()))?;
        let matches = self
            .hasher
            .verify(credential, &admin.password_hash)
            .await
            .map_err(EngineError::store)?;
        if !matches {
            return Err(EngineError::Unauthorized("incorrect password".to_string()));
        }
        Ok(admin)
    }

    /// Repopulates the snapshot list wholesale from the guest ledger when
    /// it is empty. The non-empty case is left to incremental patching.
    pub async fn ensure_synced(&self) -> EngineResult<()> {
        let admin = self.load_required().await?;
        if !admin.guest_snapshots.is_empty() {
            return Ok(());
        }
        let guests = self.guests.list().await.map_err(EngineError::store)?;
        let snapshots: Vec<GuestSnapshot> = guests.iter().map(GuestSnapshot::of).collect();
        let count = snapshots.len();
        self.store
            .replace_snapshots(snapshots)
            .await
            .map_err(EngineError::store)?;
        tracing::info!(count, "mirror repopulated from guest ledger");
        Ok(())
    }

    /// Inserts or overwrites the entry for the snapshot's guest. A
    /// missing aggregate downgrades to a logged no-op; the returned flag
    /// says whether the snapshot actually landed.
    pub async fn upsert_guest_snapshot(&self, snapshot: GuestSnapshot) -> EngineResult<bool> {
        let Some(mut admin) = self.store.load().await.map_err(EngineError::store)? else {
            tracing::warn!(user_id = %snapshot.user_id, "mirror not registered, snapshot dropped");
            return Ok(false);
        };
        match admin
            .guest_snapshots
            .iter_mut()
            .find(|s| s.user_id == snapshot.user_id)
        {
            Some(slot) => *slot = snapshot,
            None => admin.guest_snapshots.push(snapshot),
        }
        self.store
            .replace_snapshots(admin.guest_snapshots)
            .await
            .map_err(EngineError::store)?;
        Ok(true)
    }

    /// Overwrites only the booking list of an existing entry. Returns
    /// whether a matching entry was found; absence is not an error for
    /// the caller.
    pub async fn patch_booking_list(
        &self,
        user_id: &str,
        bookings: &[Booking],
    ) -> EngineResult<bool> {
        let Some(mut admin) = self.store.load().await.map_err(EngineError::store)? else {
            tracing::warn!(%user_id, "mirror not registered, booking patch skipped");
            return Ok(false);
        };
        match admin
            .guest_snapshots
            .iter_mut()
            .find(|s| s.user_id == user_id)
        {
            Some(slot) => {
                slot.bookings = bookings.to_vec();
                self.store
                    .replace_snapshots(admin.guest_snapshots)
                    .await
                    .map_err(EngineError::store)?;
                Ok(true)
            }
            None => {
                tracing::warn!(%user_id, "guest missing from mirror, booking patch skipped");
                Ok(false)
            }
        }
    }

    /// Administrative search over the mirror. Guests whose filtered
    /// booking list comes out empty are always excluded, filters or not.
    pub async fn query_guests(&self, filters: &GuestFilters) -> EngineResult<Vec<GuestView>> {
        self.ensure_synced().await?;
        let admin = self.load_required().await?;

        let booker_needle = filters.booker.as_ref().map(|b| b.to_lowercase());
        let room_needle = filters.room_id.as_ref().map(|r| r.to_lowercase());

        let views = admin
            .guest_snapshots
            .into_iter()
            .filter_map(|snapshot| {
                if let Some(needle) = &booker_needle {
                    let full_name =
                        format!("{} {}", snapshot.first_name, snapshot.last_name).to_lowercase();
                    if !full_name.contains(needle) {
                        return None;
                    }
                }
                let mut bookings = snapshot.bookings;
                if let Some(needle) = &room_needle {
                    bookings.retain(|b| b.room_id.to_lowercase().contains(needle));
                }
                if let Some(date) = filters.check_in_date {
                    bookings.retain(|b| b.check_in_date == date);
                }
                if bookings.is_empty() {
                    return None;
                }
                Some(GuestView {
                    user_id: snapshot.user_id,
                    first_name: snapshot.first_name,
                    last_name: snapshot.last_name,
                    email: snapshot.email,
                    phone: snapshot.phone,
                    bookings,
                })
            })
            .collect();
        Ok(views)
    }

    async fn load_required(&self) -> EngineResult<AdminAggregate> {
        self.store
            .load()
            .await
            .map_err(EngineError::store)?
            .ok_or_else(|| EngineError::NotFound("admin aggregate not registered".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use linden_core::identity::MockCredentialHasher;
    use linden_domain::{Booking, BookingStatus, Guest};
    use linden_store::MemoryStore;

    fn profile(first: &str, last: &str, email: &str, phone: &str) -> Profile {
        Profile {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    fn booking(code: &str, room_id: &str, check_in: NaiveDate) -> Booking {
        Booking {
            booking_code: code.to_string(),
            room_id: room_id.to_string(),
            room_number: "101".to_string(),
            price: 120.0,
            check_in_date: check_in,
            check_out_date: check_in + chrono::Days::new(2),
            is_check_in: false,
            is_check_out: false,
            status: BookingStatus::Booked,
        }
    }

    async fn mirror_with_guests(guests: Vec<Guest>) -> (Arc<MemoryStore>, AdminMirror) {
        let store = Arc::new(MemoryStore::new());
        for guest in guests {
            let guest_store: &dyn GuestStore = store.as_ref();
            guest_store.insert(guest).await.unwrap();
        }
        let mirror = AdminMirror::new(
            store.clone(),
            store.clone(),
            Arc::new(MockCredentialHasher::default()),
        );
        mirror
            .register_admin(
                profile("Lan", "Pham", "admin@linden.test", "0900000000"),
                "admin-secret",
            )
            .await
            .unwrap();
        (store, mirror)
    }

    fn guest_with_bookings(first: &str, email: &str, phone: &str, bookings: Vec<Booking>) -> Guest {
        let mut guest = Guest::new(profile(first, "Nguyen", email, phone), "hash".to_string());
        guest.bookings = bookings;
        guest
    }

    #[tokio::test]
    async fn test_register_admin_is_singleton() {
        let (_, mirror) = mirror_with_guests(Vec::new()).await;
        let second = mirror
            .register_admin(
                profile("Hoa", "Le", "other@linden.test", "0911111111"),
                "admin-secret",
            )
            .await;
        assert!(matches!(second, Err(EngineError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn test_authenticate_admin() {
        let (_, mirror) = mirror_with_guests(Vec::new()).await;
        assert!(mirror
            .authenticate_admin("admin@linden.test", "admin-secret")
            .await
            .is_ok());
        assert!(matches!(
            mirror.authenticate_admin("admin@linden.test", "wrong").await,
            Err(EngineError::Unauthorized(_))
        ));
        assert!(matches!(
            mirror.authenticate_admin("nobody@linden.test", "admin-secret").await,
            Err(EngineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_synced_populates_empty_mirror() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let guest = guest_with_bookings(
            "Mai",
            "mai@linden.test",
            "0912345678",
            vec![booking("bk-1", "r-1", date)],
        );
        let (_, mirror) = mirror_with_guests(vec![guest]).await;

        let views = mirror.query_guests(&GuestFilters::default()).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].bookings[0].booking_code, "bk-1");
    }

    #[tokio::test]
    async fn test_patch_skips_unknown_guest() {
        let (_, mirror) = mirror_with_guests(Vec::new()).await;
        let patched = mirror.patch_booking_list("ghost", &[]).await.unwrap();
        assert!(!patched);
    }

    #[tokio::test]
    async fn test_query_filters() {
        let date_a = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let date_b = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let guest_a = guest_with_bookings(
            "Mai",
            "mai@linden.test",
            "0912345678",
            vec![booking("bk-1", "ROOM-alpha", date_a)],
        );
        let guest_b = guest_with_bookings(
            "Binh",
            "binh@linden.test",
            "0923456789",
            vec![booking("bk-2", "room-beta", date_b)],
        );
        let guest_idle =
            guest_with_bookings("Chi", "chi@linden.test", "0934567890", Vec::new());
        let (_, mirror) = mirror_with_guests(vec![guest_a, guest_b, guest_idle]).await;

        // guests without bookings never appear, even unfiltered
        let all = mirror.query_guests(&GuestFilters::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let by_date = mirror
            .query_guests(&GuestFilters {
                check_in_date: Some(date_a),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[0].first_name, "Mai");

        // case-insensitive substring on the booking's room id
        let by_room = mirror
            .query_guests(&GuestFilters {
                room_id: Some("BETA".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_room.len(), 1);
        assert_eq!(by_room[0].first_name, "Binh");

        // case-insensitive substring over "first last"
        let by_booker = mirror
            .query_guests(&GuestFilters {
                booker: Some("mai ng".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_booker.len(), 1);
        assert_eq!(by_booker[0].first_name, "Mai");
    }
}
