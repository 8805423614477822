use crate::config::{Config, ConfigError};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use userreg_storage::PasswordScheme;

const VARS: [&str; 4] = [
    "USERREG_DB_PATH",
    "USERREG_PASSWORD_SCHEME",
    "USERREG_MAX_CONNECTIONS",
    "USERREG_BUSY_TIMEOUT_SECS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.db_path, PathBuf::from("users.db"));
    assert_eq!(config.password_scheme, PasswordScheme::Plaintext);
    assert_eq!(config.max_connections, 5);
    assert_eq!(config.busy_timeout_seconds, 30);
}

#[test]
#[serial]
fn test_config_from_env_with_all_custom() {
    clear_env();
    env::set_var("USERREG_DB_PATH", "/tmp/registry/users.db");
    env::set_var("USERREG_PASSWORD_SCHEME", "argon2");
    env::set_var("USERREG_MAX_CONNECTIONS", "2");
    env::set_var("USERREG_BUSY_TIMEOUT_SECS", "10");

    let config = Config::from_env().unwrap();

    assert_eq!(config.db_path, PathBuf::from("/tmp/registry/users.db"));
    assert_eq!(config.password_scheme, PasswordScheme::Argon2);
    assert_eq!(config.max_connections, 2);
    assert_eq!(config.busy_timeout_seconds, 10);

    clear_env();
}

#[test]
#[serial]
fn test_config_zero_connections() {
    clear_env();
    env::set_var("USERREG_MAX_CONNECTIONS", "0");

    let result = Config::from_env();

    assert!(matches!(
        result.unwrap_err(),
        ConfigError::OutOfRange("USERREG_MAX_CONNECTIONS")
    ));

    clear_env();
}

#[rstest]
#[case("-1")]
#[case("1.5")]
#[case("many")]
#[serial]
fn test_invalid_connection_counts(#[case] raw: &str) {
    clear_env();
    env::set_var("USERREG_MAX_CONNECTIONS", raw);

    let result = Config::from_env();

    assert!(matches!(result.unwrap_err(), ConfigError::InvalidNumber(_)));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_password_scheme() {
    clear_env();
    env::set_var("USERREG_PASSWORD_SCHEME", "md5");

    let result = Config::from_env();

    match result.unwrap_err() {
        ConfigError::InvalidPasswordScheme(raw) => assert_eq!(raw, "md5"),
        other => panic!("Expected InvalidPasswordScheme, got {:?}", other),
    }

    clear_env();
}

#[test]
#[serial]
fn test_overrides_take_precedence() {
    clear_env();
    env::set_var("USERREG_DB_PATH", "from-env.db");

    let config = Config::from_env()
        .unwrap()
        .with_overrides(Some(PathBuf::from("from-flag.db")), Some("ARGON2"))
        .unwrap();

    assert_eq!(config.db_path, PathBuf::from("from-flag.db"));
    assert_eq!(config.password_scheme, PasswordScheme::Argon2);

    let store_config = config.store_config();
    assert_eq!(store_config.path, PathBuf::from("from-flag.db"));
    assert_eq!(store_config.password_scheme, PasswordScheme::Argon2);

    clear_env();
}

#[test]
fn test_config_error_display() {
    let error = ConfigError::OutOfRange("USERREG_MAX_CONNECTIONS");
    assert_eq!(error.to_string(), "USERREG_MAX_CONNECTIONS must be at least 1");

    let parse_error = "abc".parse::<u32>().unwrap_err();
    let error = ConfigError::InvalidNumber(parse_error);
    assert!(error.to_string().contains("Invalid number"));
}
