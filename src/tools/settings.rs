//! Settings MCP Tools

use super::error::{ToolError, ToolResult};
use crate::db::Database;
use crate::models::{Language, PreferredUnit, UserSettings};

pub fn get_settings(db: &Database, user_id: i64) -> ToolResult<UserSettings> {
    Ok(db.with_conn(|conn| UserSettings::get_or_create(conn, user_id))?)
}

/// Update the display unit and/or language
pub fn update_settings(
    db: &Database,
    user_id: i64,
    preferred_unit: Option<&str>,
    language: Option<&str>,
) -> ToolResult<UserSettings> {
    let preferred_unit = preferred_unit
        .map(|u| {
            PreferredUnit::from_str(u)
                .ok_or_else(|| {
                    ToolError::invalid(format!("Unknown unit '{}'. Expected MM or INCH", u))
                })
        })
        .transpose()?;
    let language = language
        .map(|l| {
            Language::from_str(l).ok_or_else(|| {
                ToolError::invalid(format!("Unknown language '{}'. Expected FR or EN", l))
            })
        })
        .transpose()?;

    let settings = db
        .with_conn(|conn| UserSettings::update(conn, user_id, preferred_unit, language))?;

    tracing::info!(
        "Settings for user {}: unit={} language={}",
        user_id,
        settings.preferred_unit.as_str(),
        settings.language.as_str()
    );
    Ok(settings)
}
