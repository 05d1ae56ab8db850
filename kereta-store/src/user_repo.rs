use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use kereta_core::account::{NewUserAccount, UserAccount};
use kereta_core::repository::UserAccounts;
use kereta_core::{CoreError, CoreResult};

pub struct SqliteUserAccounts {
    pool: Pool<Sqlite>,
}

impl SqliteUserAccounts {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    birthdate: Option<String>,
    address: Option<String>,
    membership_level: Option<String>,
}

impl UserRow {
    fn into_account(self) -> UserAccount {
        UserAccount {
            user_id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            phone: self.phone,
            birthdate: self.birthdate,
            address: self.address,
            membership_level: self.membership_level,
        }
    }
}

fn db_err(e: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.message().contains("UNIQUE") {
            return CoreError::Duplicate("Email already exists".to_string());
        }
    }
    CoreError::Persistence(e.to_string())
}

const SELECT_USER: &str = "SELECT user_id, first_name, last_name, email, password_hash, \
     phone, birthdate, address, membership_level FROM users";

#[async_trait]
impl UserAccounts for SqliteUserAccounts {
    async fn get_user(&self, user_id: i64) -> CoreResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE user_id = ?", SELECT_USER))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(UserRow::into_account))
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE email = ?", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(UserRow::into_account))
    }

    async fn create_user(&self, user: NewUserAccount) -> CoreResult<UserAccount> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(CoreError::Duplicate("Email already exists".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (first_name, last_name, email, password_hash, phone, \
             birthdate, address, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.birthdate)
        .bind(&user.address)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(UserAccount {
            user_id: result.last_insert_rowid(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            birthdate: user.birthdate,
            address: user.address,
            membership_level: None,
        })
    }
}

/// In-memory account registry for the local backend and tests.
#[derive(Default)]
pub struct MemoryUserAccounts {
    users: Mutex<Vec<UserAccount>>,
}

#[async_trait]
impl UserAccounts for MemoryUserAccounts {
    async fn get_user(&self, user_id: i64) -> CoreResult<Option<UserAccount>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserAccount>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, user: NewUserAccount) -> CoreResult<UserAccount> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(CoreError::Duplicate("Email already exists".to_string()));
        }
        let account = UserAccount {
            user_id: users.iter().map(|u| u.user_id).max().unwrap_or(0) + 1,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            birthdate: user.birthdate,
            address: user.address,
            membership_level: None,
        };
        users.push(account.clone());
        Ok(account)
    }
}
