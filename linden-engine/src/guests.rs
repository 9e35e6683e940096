use std::sync::Arc;

use linden_core::identity::CredentialHasher;
use linden_core::repository::GuestStore;
use linden_core::{EngineError, EngineResult};
use linden_domain::{Booking, Guest, GuestSnapshot, Profile};

use crate::mirror::AdminMirror;

/// Owns the canonical guest records; each guest's booking list is the
/// source of truth for booking state. Registration and authentication
/// refresh the admin mirror best-effort so the admin view tracks
/// account events as well as booking ones.
pub struct GuestLedger {
    store: Arc<dyn GuestStore>,
    hasher: Arc<dyn CredentialHasher>,
    mirror: Arc<AdminMirror>,
}

impl GuestLedger {
    pub fn new(
        store: Arc<dyn GuestStore>,
        hasher: Arc<dyn CredentialHasher>,
        mirror: Arc<AdminMirror>,
    ) -> Self {
        Self {
            store,
            hasher,
            mirror,
        }
    }

    pub async fn register(&self, profile: Profile, credential: &str) -> EngineResult<Guest> {
        profile.validate().map_err(EngineError::Validation)?;
        if credential.len() < 6 {
            return Err(EngineError::Validation(
                "password must be at least 6 characters".to_string(),
            ));
        }
        let email = profile.email.to_lowercase();
        if self
            .store
            .find_by_contact(&email)
            .await
            .map_err(EngineError::store)?
            .is_some()
            || self
                .store
                .find_by_contact(&profile.phone)
                .await
                .map_err(EngineError::store)?
                .is_some()
        {
            return Err(EngineError::DuplicateKey(
                "email or phone number already in use".to_string(),
            ));
        }
        let hash = self
            .hasher
            .hash(credential)
            .await
            .map_err(EngineError::store)?;
        let guest = Guest::new(profile, hash);
        self.store
            .insert(guest.clone())
            .await
            .map_err(EngineError::store)?;
        tracing::info!(user_id = %guest.user_id, "guest registered");
        self.refresh_mirror(&guest).await;
        Ok(guest)
    }

    /// Verifies a credential against the stored hash. No session state is
    /// created; that is the routing layer's concern.
    pub async fn authenticate(
        &self,
        email_or_phone: &str,
        credential: &str,
    ) -> EngineResult<Guest> {
        let guest = self
            .store
            .find_by_contact(email_or_phone)
            .await
            .map_err(EngineError::store)?
            .ok_or_else(|| {
                EngineError::NotFound("email or phone number not found".to_string())
            })?;
        let matches = self
            .hasher
            .verify(credential, &guest.password_hash)
            .await
            .map_err(EngineError::store)?;
        if !matches {
            return Err(EngineError::Unauthorized("incorrect password".to_string()));
        }
        self.refresh_mirror(&guest).await;
        Ok(guest)
    }

    pub async fn get(&self, user_id: &str) -> EngineResult<Guest> {
        self.store
            .get(user_id)
            .await
            .map_err(EngineError::store)?
            .ok_or_else(|| EngineError::NotFound(format!("guest {user_id} not found")))
    }

    pub async fn get_bookings(&self, user_id: &str) -> EngineResult<Vec<Booking>> {
        Ok(self.get(user_id).await?.bookings)
    }

    pub async fn find_by_booking_code(&self, booking_code: &str) -> EngineResult<Guest> {
        self.store
            .find_by_booking_code(booking_code)
            .await
            .map_err(EngineError::store)?
            .ok_or_else(|| {
                EngineError::NotFound(format!("no guest holds booking {booking_code}"))
            })
    }

    /// Field-scoped push of a new booking; returns the updated list.
    pub async fn append_booking(
        &self,
        user_id: &str,
        booking: Booking,
    ) -> EngineResult<Vec<Booking>> {
        let appended = self
            .store
            .append_booking(user_id, booking)
            .await
            .map_err(EngineError::store)?;
        if !appended {
            return Err(EngineError::NotFound(format!("guest {user_id} not found")));
        }
        self.get_bookings(user_id).await
    }

    /// Field-scoped overwrite of the whole booking list, used by the
    /// lifecycle engine's ordered write sequences.
    pub(crate) async fn replace_bookings(
        &self,
        user_id: &str,
        bookings: Vec<Booking>,
    ) -> EngineResult<()> {
        let replaced = self
            .store
            .replace_bookings(user_id, bookings)
            .await
            .map_err(EngineError::store)?;
        if !replaced {
            return Err(EngineError::NotFound(format!("guest {user_id} not found")));
        }
        Ok(())
    }

    async fn refresh_mirror(&self, guest: &Guest) {
        if let Err(err) = self
            .mirror
            .upsert_guest_snapshot(GuestSnapshot::of(guest))
            .await
        {
            tracing::warn!(user_id = %guest.user_id, %err, "mirror snapshot refresh failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linden_core::identity::MockCredentialHasher;
    use linden_store::MemoryStore;

    fn ledger() -> GuestLedger {
        let store = Arc::new(MemoryStore::new());
        let hasher: Arc<dyn CredentialHasher> = Arc::new(MockCredentialHasher::default());
        let mirror = Arc::new(AdminMirror::new(store.clone(), store.clone(), hasher.clone()));
        GuestLedger::new(store, hasher, mirror)
    }

    fn profile(email: &str, phone: &str) -> Profile {
        Profile {
            first_name: "Mai".to_string(),
            last_name: "Tran".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let ledger = ledger();
        assert!(matches!(
            ledger.register(profile("bad-email", "0912345678"), "secret1").await,
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            ledger.register(profile("mai@linden.test", "0912345678"), "tiny").await,
            Err(EngineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_unique_email_and_phone() {
        let ledger = ledger();
        ledger
            .register(profile("mai@linden.test", "0912345678"), "secret1")
            .await
            .unwrap();

        let same_email = ledger
            .register(profile("MAI@linden.test", "0999999999"), "secret1")
            .await;
        assert!(matches!(same_email, Err(EngineError::DuplicateKey(_))));

        let same_phone = ledger
            .register(profile("other@linden.test", "0912345678"), "secret1")
            .await;
        assert!(matches!(same_phone, Err(EngineError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn test_authenticate_by_email_or_phone() {
        let ledger = ledger();
        let guest = ledger
            .register(profile("mai@linden.test", "0912345678"), "secret1")
            .await
            .unwrap();

        let by_email = ledger.authenticate("mai@linden.test", "secret1").await.unwrap();
        assert_eq!(by_email.user_id, guest.user_id);

        let by_phone = ledger.authenticate("0912345678", "secret1").await.unwrap();
        assert_eq!(by_phone.user_id, guest.user_id);

        assert!(matches!(
            ledger.authenticate("mai@linden.test", "wrong-pass").await,
            Err(EngineError::Unauthorized(_))
        ));
        assert!(matches!(
            ledger.authenticate("nobody@linden.test", "secret1").await,
            Err(EngineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_refreshes_stale_mirror() {
        use chrono::NaiveDate;
        use linden_core::repository::AdminStore;
        use linden_domain::BookingStatus;

        let store = Arc::new(MemoryStore::new());
        let hasher: Arc<dyn CredentialHasher> = Arc::new(MockCredentialHasher::default());
        let mirror = Arc::new(AdminMirror::new(store.clone(), store.clone(), hasher.clone()));
        mirror
            .register_admin(profile("admin@linden.test", "0900000000"), "admin-secret")
            .await
            .unwrap();
        let ledger = GuestLedger::new(store.clone(), hasher, mirror);

        let guest = ledger
            .register(profile("mai@linden.test", "0912345678"), "secret1")
            .await
            .unwrap();

        // a direct ledger append leaves the mirror snapshot stale
        let booking = Booking {
            booking_code: "bk-1".to_string(),
            room_id: "r-1".to_string(),
            room_number: "101".to_string(),
            price: 120.0,
            check_in_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            is_check_in: false,
            is_check_out: false,
            status: BookingStatus::Booked,
        };
        ledger.append_booking(&guest.user_id, booking).await.unwrap();

        let admin = AdminStore::load(store.as_ref()).await.unwrap().unwrap();
        let snapshot = admin
            .guest_snapshots
            .iter()
            .find(|s| s.user_id == guest.user_id)
            .unwrap();
        assert!(snapshot.bookings.is_empty());

        // logging in re-uploads the authoritative snapshot
        ledger.authenticate("mai@linden.test", "secret1").await.unwrap();
        let admin = AdminStore::load(store.as_ref()).await.unwrap().unwrap();
        let snapshot = admin
            .guest_snapshots
            .iter()
            .find(|s| s.user_id == guest.user_id)
            .unwrap();
        assert_eq!(snapshot.bookings.len(), 1);
        assert_eq!(snapshot.bookings[0].booking_code, "bk-1");
    }

    #[tokio::test]
    async fn test_bookings_require_known_guest() {
        let ledger = ledger();
        assert!(matches!(
            ledger.get_bookings("ghost").await,
            Err(EngineError::NotFound(_))
        ));
        assert!(matches!(
            ledger.find_by_booking_code("bk-404").await,
            Err(EngineError::NotFound(_))
        ));
    }
}
