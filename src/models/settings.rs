//! User settings model
//!
//! Display preferences, one row per user.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Unit used when presenting lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PreferredUnit {
    #[default]
    Mm,
    Inch,
}

impl PreferredUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferredUnit::Mm => "MM",
            PreferredUnit::Inch => "INCH",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "MM" => Some(PreferredUnit::Mm),
            "INCH" | "IN" => Some(PreferredUnit::Inch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Fr => "FR",
            Language::En => "EN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "FR" => Some(Language::Fr),
            "EN" => Some(Language::En),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub id: i64,
    pub user_id: i64,
    pub preferred_unit: PreferredUnit,
    pub language: Language,
    pub created_at: String,
    pub updated_at: String,
}

impl UserSettings {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            preferred_unit: PreferredUnit::from_str(row.get::<_, String>("preferred_unit")?.as_str())
                .unwrap_or_default(),
            language: Language::from_str(row.get::<_, String>("language")?.as_str())
                .unwrap_or_default(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn get(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_settings WHERE user_id = ?1")?;

        match stmt.query_row([user_id], Self::from_row) {
            Ok(settings) => Ok(Some(settings)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Settings for a user, created with defaults on first access
    pub fn get_or_create(conn: &Connection, user_id: i64) -> DbResult<Self> {
        conn.execute(
            "INSERT OR IGNORE INTO user_settings (user_id) VALUES (?1)",
            [user_id],
        )?;

        Self::get(conn, user_id)?.ok_or(DbError::NotFound {
            entity: "UserSettings",
            id: user_id,
        })
    }

    /// Change any subset of the user's settings
    pub fn update(
        conn: &Connection,
        user_id: i64,
        preferred_unit: Option<PreferredUnit>,
        language: Option<Language>,
    ) -> DbResult<Self> {
        let current = Self::get_or_create(conn, user_id)?;

        conn.execute(
            r#"
            UPDATE user_settings
            SET preferred_unit = ?1, language = ?2, updated_at = datetime('now')
            WHERE user_id = ?3
            "#,
            params![
                preferred_unit.unwrap_or(current.preferred_unit).as_str(),
                language.unwrap_or(current.language).as_str(),
                user_id,
            ],
        )?;

        Self::get_or_create(conn, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_defaults_and_update() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let settings = UserSettings::get_or_create(&conn, 3).unwrap();
        assert_eq!(settings.preferred_unit, PreferredUnit::Mm);
        assert_eq!(settings.language, Language::Fr);

        let updated = UserSettings::update(&conn, 3, Some(PreferredUnit::Inch), None).unwrap();
        assert_eq!(updated.preferred_unit, PreferredUnit::Inch);
        assert_eq!(updated.language, Language::Fr);
        assert_eq!(updated.id, settings.id);

        let updated = UserSettings::update(&conn, 3, None, Some(Language::En)).unwrap();
        assert_eq!(updated.preferred_unit, PreferredUnit::Inch);
        assert_eq!(updated.language, Language::En);
    }

    #[test]
    fn test_parse() {
        assert_eq!(PreferredUnit::from_str("inch"), Some(PreferredUnit::Inch));
        assert_eq!(PreferredUnit::from_str("cm"), None);
        assert_eq!(Language::from_str("en"), Some(Language::En));
    }
}
