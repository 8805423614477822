// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across userreg

// Storage Configuration
pub const USERREG_DB_PATH: &str = "USERREG_DB_PATH";
pub const USERREG_MAX_CONNECTIONS: &str = "USERREG_MAX_CONNECTIONS";
pub const USERREG_BUSY_TIMEOUT_SECS: &str = "USERREG_BUSY_TIMEOUT_SECS";

// Credential Handling
pub const USERREG_PASSWORD_SCHEME: &str = "USERREG_PASSWORD_SCHEME";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";

// Defaults
pub const DEFAULT_DB_PATH: &str = "users.db";
pub const DEFAULT_PASSWORD_SCHEME: &str = "plaintext";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 30;
