pub mod auth;
pub mod cookie;
pub mod database;
pub mod email;
pub mod rate_limit;
pub mod security;
pub mod session;

use std::env;

/// Read a boolean flag such as `1`, `yes` or `off`, falling back to `default`
/// when the variable is unset or unrecognised.
pub(crate) fn parse_bool_env(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .and_then(|value| parse_bool(&value))
        .unwrap_or(default)
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
