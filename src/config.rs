//! Runtime configuration
//!
//! Everything is read from the environment:
//! - `RINGFIT_DATABASE_PATH`: SQLite file, defaults to `<project>/data/ringfit.db`
//! - `RINGFIT_USER_ID`: user the server acts for, defaults to 1
//! - `RINGFIT_USER_NAME`: label used when opening the user's shop

use std::path::PathBuf;

pub const DEFAULT_USER_ID: i64 = 1;

/// Get the database path from environment or use default
pub fn database_path() -> PathBuf {
    std::env::var("RINGFIT_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("ringfit.db");
            path
        })
}

/// Parse a user id, falling back to the default for missing or bad values
pub fn parse_user_id(value: Option<&str>) -> i64 {
    match value.map(|v| v.trim().parse::<i64>()) {
        Some(Ok(id)) if id > 0 => id,
        Some(_) => {
            tracing::warn!(
                "Ignoring invalid RINGFIT_USER_ID, using {}",
                DEFAULT_USER_ID
            );
            DEFAULT_USER_ID
        }
        None => DEFAULT_USER_ID,
    }
}

pub fn user_id() -> i64 {
    parse_user_id(std::env::var("RINGFIT_USER_ID").ok().as_deref())
}

/// Shop owner label; vendors are named "<label> Shop"
pub fn user_label(user_id: i64) -> String {
    std::env::var("RINGFIT_USER_NAME")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("User {}", user_id))
}
