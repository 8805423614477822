// ABOUTME: User storage layer using SQLite
// ABOUTME: Schema setup, registration, authentication and listing of users

use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};
use userreg_config::{DEFAULT_BUSY_TIMEOUT_SECS, DEFAULT_DB_PATH, DEFAULT_MAX_CONNECTIONS};

use crate::error::{StorageError, StorageResult};
use crate::password::PasswordScheme;
use crate::types::{NewUser, User};

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        email TEXT NOT NULL,
        password TEXT NOT NULL
    )
"#;

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub password_scheme: PasswordScheme,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            password_scheme: PasswordScheme::Plaintext,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_seconds: DEFAULT_BUSY_TIMEOUT_SECS,
        }
    }
}

impl StoreConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// SQLite-backed store owning the `users` table
pub struct UserStore {
    pool: SqlitePool,
    password_scheme: PasswordScheme,
}

impl UserStore {
    /// Open (creating if missing) the database file named by `config`.
    ///
    /// The `users` table is not created here; call [`UserStore::initialize`].
    pub async fn open(config: StoreConfig) -> StorageResult<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(StorageError::Io)?;
            }
        }

        debug!("Opening user database at: {}", config.path.display());

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(config.busy_timeout_seconds));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.busy_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(Self {
            pool,
            password_scheme: config.password_scheme,
        })
    }

    /// Single-connection in-memory store. The database lives as long as the store.
    pub async fn in_memory(password_scheme: PasswordScheme) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(Self {
            pool,
            password_scheme,
        })
    }

    pub fn password_scheme(&self) -> PasswordScheme {
        self.password_scheme
    }

    /// Create the `users` table if it does not exist yet. Safe to call repeatedly.
    pub async fn initialize(&self) -> StorageResult<()> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        info!(
            "User storage initialized (new passwords stored as {})",
            self.password_scheme()
        );
        Ok(())
    }

    pub async fn table_exists(&self) -> StorageResult<bool> {
        let name: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'users'",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(name.is_some())
    }

    /// Insert a new user. A taken username yields [`StorageError::DuplicateUsername`].
    pub async fn create_user(&self, input: NewUser) -> StorageResult<User> {
        validate_new_user(&input)?;

        let stored_password = self.password_scheme.hash(&input.password)?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&stored_password)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                debug!("Created user '{}' with ID {}", input.username, id);
                Ok(User {
                    id,
                    username: input.username,
                    email: input.email,
                    password: stored_password,
                })
            }
            Err(sqlx::Error::Database(db_err)) => {
                if let Some(code) = db_err.code() {
                    // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
                    if (code == "2067" || code == "1555") && db_err.message().contains("username")
                    {
                        warn!("Rejected duplicate username '{}'", input.username);
                        return Err(StorageError::DuplicateUsername(input.username));
                    }
                }
                Err(StorageError::Sqlx(sqlx::Error::Database(db_err)))
            }
            Err(e) => Err(StorageError::Sqlx(e)),
        }
    }

    /// Register a user. `Ok(false)` means the username is already taken.
    pub async fn add_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> StorageResult<bool> {
        match self
            .create_user(NewUser::new(username, email, password))
            .await
        {
            Ok(_) => Ok(true),
            Err(StorageError::DuplicateUsername(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// `Ok(true)` only when the user exists and the password matches.
    pub async fn authenticate_user(&self, username: &str, password: &str) -> StorageResult<bool> {
        debug!("Authenticating user: {}", username);

        let stored: Option<String> =
            sqlx::query_scalar("SELECT password FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        let authenticated = match stored {
            Some(stored) => PasswordScheme::verify(password, &stored),
            None => false,
        };

        if !authenticated {
            debug!("Authentication failed for user: {}", username);
        }
        Ok(authenticated)
    }

    pub async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)
    }

    pub async fn list_users(&self) -> StorageResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT id, username, email, password FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }

    pub async fn count_users(&self) -> StorageResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }

    /// Write one line per user to `out` and return how many were written.
    /// Passwords are never included.
    pub async fn write_users<W: Write>(&self, out: &mut W) -> StorageResult<usize> {
        let users = self.list_users().await?;
        write_user_lines(&users, out)?;
        Ok(users.len())
    }

    /// Print every registered user to standard output.
    pub async fn display_users(&self) -> StorageResult<()> {
        let users = self.list_users().await?;
        write_user_lines(&users, &mut io::stdout().lock())?;
        debug!("Displayed {} users", users.len());
        Ok(())
    }

    /// Close the pool, releasing the database file.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn write_user_lines<W: Write>(users: &[User], out: &mut W) -> io::Result<()> {
    for user in users {
        writeln!(
            out,
            "ID: {}, Username: {}, Email: {}",
            user.id, user.username, user.email
        )?;
    }
    out.flush()
}

fn validate_new_user(input: &NewUser) -> StorageResult<()> {
    let fields = [
        ("username", &input.username),
        ("email", &input.email),
        ("password", &input.password),
    ];
    for (name, value) in fields {
        if value.is_empty() {
            return Err(StorageError::InvalidInput(format!("{} must not be empty", name)));
        }
    }
    Ok(())
}
