// ABOUTME: Configuration for userreg
// ABOUTME: Environment variable names, defaults and lookup helpers

pub mod constants;

pub use constants::*;

use std::env;

/// Read `name`, returning `None` when unset or blank.
pub fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
