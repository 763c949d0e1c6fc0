//! Measurement model
//!
//! Saved sizing results, keyed by owning user and id.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::sizing::{Measurement, MeasurementType, SizeFields};

/// A saved measurement; any size field may be missing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub measurement_type: MeasurementType,
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
    pub last_synced_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for saving a new measurement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementCreate {
    /// Defaults to "<Type> - dd/mm/YYYY"
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub measurement_type: MeasurementType,
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
}

impl MeasurementCreate {
    /// Save every field of a converted measurement
    pub fn from_measurement(measurement: &Measurement, name: Option<String>) -> Self {
        Self {
            name,
            measurement_type: measurement.measurement_type,
            diameter_mm: Some(measurement.diameter_mm),
            circumference_mm: Some(measurement.circumference_mm),
            size_eu: Some(measurement.size_eu),
            size_us: Some(measurement.size_us),
        }
    }
}

/// Data for updating a measurement; `None` keeps the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub measurement_type: Option<MeasurementType>,
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
}

impl MeasurementUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.measurement_type.is_none()
            && self.diameter_mm.is_none()
            && self.circumference_mm.is_none()
            && self.size_eu.is_none()
            && self.size_us.is_none()
    }
}

/// Name given to a measurement saved without one
pub fn default_measurement_name(measurement_type: MeasurementType) -> String {
    format!(
        "{} - {}",
        measurement_type.label(),
        chrono::Local::now().format("%d/%m/%Y")
    )
}

impl MeasurementRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            measurement_type: MeasurementType::from_str(row.get::<_, String>("type")?.as_str())
                .unwrap_or_default(),
            diameter_mm: row.get("diameter_mm")?,
            circumference_mm: row.get("circumference_mm")?,
            size_eu: row.get("size_eu")?,
            size_us: row.get("size_us")?,
            last_synced_at: row.get("last_synced_at")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new measurement for a user
    pub fn create(conn: &Connection, user_id: i64, data: &MeasurementCreate) -> DbResult<Self> {
        let name = data
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_measurement_name(data.measurement_type));

        conn.execute(
            r#"
            INSERT INTO measurements (
                user_id, name, type, diameter_mm, circumference_mm, size_eu, size_us,
                last_synced_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime('now'))
            "#,
            params![
                user_id,
                name,
                data.measurement_type.as_str(),
                data.diameter_mm,
                data.circumference_mm,
                data.size_eu,
                data.size_us,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get(conn, user_id, id)?.ok_or(DbError::NotFound {
            entity: "Measurement",
            id,
        })
    }

    /// Get a user's measurement by id
    pub fn get(conn: &Connection, user_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM measurements WHERE id = ?1 AND user_id = ?2")?;

        match stmt.query_row(params![id, user_id], Self::from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All measurements of a user, newest first
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM measurements WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;

        let records = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Update a user's measurement; returns None if it does not exist
    pub fn update(
        conn: &Connection,
        user_id: i64,
        id: i64,
        data: &MeasurementUpdate,
    ) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident, $col:expr) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(name, "name");
        add_update!(diameter_mm, "diameter_mm");
        add_update!(circumference_mm, "circumference_mm");
        add_update!(size_eu, "size_eu");
        add_update!(size_us, "size_us");

        if let Some(measurement_type) = data.measurement_type {
            updates.push(format!("type = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(measurement_type.as_str()));
        }

        if updates.is_empty() {
            return Self::get(conn, user_id, id);
        }

        updates.push("last_synced_at = datetime('now')".to_string());
        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE measurements SET {} WHERE id = ?{} AND user_id = ?{}",
            updates.join(", "),
            params_vec.len() + 1,
            params_vec.len() + 2
        );
        params_vec.push(Box::new(id));
        params_vec.push(Box::new(user_id));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get(conn, user_id, id)
    }

    /// Delete a user's measurement; Ok(false) if it was not found
    pub fn delete(conn: &Connection, user_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM measurements WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// The full converted measurement, when every size field is present
    pub fn to_measurement(&self) -> Option<Measurement> {
        Some(Measurement {
            diameter_mm: self.diameter_mm?,
            circumference_mm: self.circumference_mm?,
            size_eu: self.size_eu?,
            size_us: self.size_us?,
            measurement_type: self.measurement_type,
        })
    }
}

macro_rules! impl_size_fields {
    ($($ty:ty),+) => {
        $(
            impl SizeFields for $ty {
                fn diameter_mm(&self) -> Option<f64> {
                    self.diameter_mm
                }

                fn circumference_mm(&self) -> Option<f64> {
                    self.circumference_mm
                }

                fn size_eu(&self) -> Option<f64> {
                    self.size_eu
                }

                fn size_us(&self) -> Option<f64> {
                    self.size_us
                }
            }
        )+
    };
}

impl_size_fields!(MeasurementRecord, MeasurementCreate, MeasurementUpdate);
