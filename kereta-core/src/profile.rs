use serde::{Deserialize, Serialize};

/// Loyalty membership attached to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub level: String,
    pub points: i64,
    pub status: String,
    pub benefits: Vec<String>,
}

/// The single per-session user profile. Created from `UserProfile::default`
/// on first read if nothing is persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birthdate: String,
    pub address: String,
    pub membership: Option<Membership>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            first_name: "Andi".to_string(),
            last_name: "Wijaya".to_string(),
            email: "andi.wijaya@email.com".to_string(),
            phone: "+62 812-3456-7890".to_string(),
            birthdate: "1990-05-15".to_string(),
            address: "Jl. Sudirman No. 123, Jakarta Pusat".to_string(),
            membership: Some(Membership {
                level: "Gold".to_string(),
                points: 1250,
                status: "AKTIF".to_string(),
                benefits: vec!["15% Cashback".to_string(), "Priority Support".to_string()],
            }),
        }
    }
}

/// Shallow key-wise profile update: a field that is `Some` overwrites the
/// stored value, a `None` leaves it untouched. The membership sub-record is
/// replaced wholesale when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub membership: Option<Membership>,
}

impl UserProfile {
    pub fn merged(mut self, update: ProfileUpdate) -> UserProfile {
        if let Some(v) = update.first_name {
            self.first_name = v;
        }
        if let Some(v) = update.last_name {
            self.last_name = v;
        }
        if let Some(v) = update.email {
            self.email = v;
        }
        if let Some(v) = update.phone {
            self.phone = v;
        }
        if let Some(v) = update.birthdate {
            self.birthdate = v;
        }
        if let Some(v) = update.address {
            self.address = v;
        }
        if let Some(v) = update.membership {
            self.membership = Some(v);
        }
        self
    }
}
