use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::Booking;

/// Identity fields shared by guest and admin registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl Profile {
    /// Checks the required-field rules inherited from the persisted
    /// contract: non-empty names, a plausible email shape, a 10-11 digit
    /// phone number. Returns the rejection message on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("please fill in all fields".to_string());
        }
        if !valid_email(&self.email) {
            return Err("invalid email format".to_string());
        }
        if !valid_phone(&self.phone) {
            return Err("phone number must be 10-11 digits".to_string());
        }
        Ok(())
    }
}

fn valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let host = parts.next().unwrap_or("");
    if local.is_empty() || host.is_empty() {
        return false;
    }
    match host.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn valid_phone(phone: &str) -> bool {
    (10..=11).contains(&phone.len()) && phone.chars().all(|c| c.is_ascii_digit())
}

/// The authoritative guest record. `bookings` is the source of truth for
/// booking state; the admin mirror only holds copies of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub bookings: Vec<Booking>,
}

impl Guest {
    pub fn new(profile: Profile, password_hash: String) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email.to_lowercase(),
            phone: profile.phone,
            password_hash,
            created_at: Utc::now(),
            bookings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(email: &str, phone: &str) -> Profile {
        Profile {
            first_name: "Mai".to_string(),
            last_name: "Tran".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_profile_validation() {
        assert!(profile("mai@example.com", "0912345678").validate().is_ok());
        assert!(profile("mai@example.com", "09123456789").validate().is_ok());

        assert!(profile("not-an-email", "0912345678").validate().is_err());
        assert!(profile("mai@host", "0912345678").validate().is_err());
        assert!(profile("mai @example.com", "0912345678").validate().is_err());
        assert!(profile("mai@example.com", "123").validate().is_err());
        assert!(profile("mai@example.com", "09123456x8").validate().is_err());
    }

    #[test]
    fn test_new_guest_lowercases_email() {
        let guest = Guest::new(profile("Mai@Example.COM", "0912345678"), "hash".to_string());
        assert_eq!(guest.email, "mai@example.com");
        assert!(guest.bookings.is_empty());
    }
}
