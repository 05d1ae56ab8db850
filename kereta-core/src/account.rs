use serde::Serialize;

/// A registered user in the service-backed variant. `password_hash` is a
/// salted bcrypt hash; plaintext never reaches the store and the hash
/// never leaves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserAccount {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub membership_level: Option<String>,
}

/// Registration payload after the password has been hashed.
#[derive(Debug, Clone)]
pub struct NewUserAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
}
