//! User Storage
//! Mission: Store and verify user accounts with SQLite

use crate::auth::models::{User, UserRole};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, info};
use uuid::Uuid;

/// User storage with SQLite backend
///
/// Opens a short-lived connection per operation, so every call is its own
/// transaction: open, read/write, close on all exit paths.
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize the schema
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create users table")?;

        Ok(())
    }

    /// Ensure the "admin" account exists (bootstrap)
    ///
    /// Idempotent: inserts one admin row keyed on the username "admin" if
    /// absent, no-ops otherwise. Call once at startup before serving traffic.
    pub fn ensure_admin(&self, default_password: &str) -> Result<()> {
        if self.get_user_by_username("admin")?.is_some() {
            debug!("Admin user already present, skipping bootstrap");
            return Ok(());
        }

        self.create_user("admin", "admin@example.com", default_password, UserRole::Admin)?;

        info!("🔐 Default admin user created (username: admin)");
        Ok(())
    }

    /// Get user by username (exact match)
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, role, created_at
             FROM users WHERE username = ?1",
        )?;

        let user_result = stmt.query_row(params![username], Self::row_to_user);

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify username and password, returning the user on success
    ///
    /// `None` covers both unknown usernames and bcrypt mismatches, so the
    /// caller cannot distinguish the two (and neither can a client probing
    /// for accounts).
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        match self.get_user_by_username(username)? {
            Some(user) => {
                let valid =
                    verify(password, &user.password_hash).context("Failed to verify password")?;
                Ok(valid.then_some(user))
            }
            None => Ok(None),
        }
    }

    /// Create a new user
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.to_string(),
                user.username,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;

        info!(
            "✅ Created user: {} ({})",
            user.username,
            user.role.as_str()
        );

        Ok(user)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let id_str: String = row.get(0)?;
        let role_str: String = row.get(4)?;

        // A corrupt id or role is a bad row, not a user to guess at
        let id = Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let role = UserRole::from_str(&role_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown role: {}", role_str).into(),
            )
        })?;

        Ok(User {
            id,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            role,
            created_at: row.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = UserStore::new(db_path).unwrap();
        store.ensure_admin("admin123").unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_admin_bootstrap() {
        let (store, _temp) = create_test_store();

        let admin = store.get_user_by_username("admin").unwrap();
        assert!(admin.is_some());

        let admin = admin.unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.role, UserRole::Admin);
    }

    #[test]
    fn test_admin_bootstrap_is_idempotent() {
        let (store, temp) = create_test_store();

        // Second call must not insert a second row
        store.ensure_admin("admin123").unwrap();

        let conn = Connection::open(temp.path()).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE username = 'admin'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_credential_verification() {
        let (store, _temp) = create_test_store();

        // Correct password
        let user = store.verify_credentials("admin", "admin123").unwrap();
        assert!(user.is_some());
        assert_eq!(user.unwrap().username, "admin");

        // Incorrect password
        assert!(store
            .verify_credentials("admin", "wrongpassword")
            .unwrap()
            .is_none());

        // Non-existent user
        assert!(store
            .verify_credentials("nonexistent", "password")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_create_and_retrieve_user() {
        let (store, _temp) = create_test_store();

        let user = store
            .create_user("alice", "alice@example.com", "password123", UserRole::Customer)
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, UserRole::Customer);

        let retrieved = store.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(retrieved.username, "alice");
        assert_eq!(retrieved.email, "alice@example.com");
        assert_eq!(retrieved.role, UserRole::Customer);

        // Created users can log in
        assert!(store
            .verify_credentials("alice", "password123")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_corrupt_rows_surface_as_errors() {
        let (store, temp) = create_test_store();

        let conn = Connection::open(temp.path()).unwrap();
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, role, created_at)
             VALUES ('not-a-uuid', 'badid', 'x@example.com', 'hash', 'customer', 'now')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, role, created_at)
             VALUES ('11111111-2222-3333-4444-555555555555', 'badrole', 'y@example.com', 'hash', 'superuser', 'now')",
            [],
        )
        .unwrap();

        assert!(store.get_user_by_username("badid").is_err());
        assert!(store.get_user_by_username("badrole").is_err());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (store, _temp) = create_test_store();

        store
            .create_user("bob", "bob@example.com", "pass", UserRole::Customer)
            .unwrap();

        let result = store.create_user("bob", "other@example.com", "pass", UserRole::Customer);
        assert!(result.is_err());
    }
}
