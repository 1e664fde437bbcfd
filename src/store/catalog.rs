use rusqlite::{OptionalExtension, Row, ToSql, params, params_from_iter};

use super::SqliteStore;
use crate::error::{Error, Result};
use crate::types::{BusRoute, CafeteriaInfo, CafeteriaMenuItem, Classroom, Lab};

/// A row in one of the simple catalog tables (classrooms, labs, bus routes,
/// cafeteria menu and info). Implementors drive the single generic CRUD
/// repository below instead of four hand-duplicated services.
///
/// `COLUMNS[0]` must be the id column.
pub trait CatalogRecord: Sized + Send + Sync {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Bind values in `COLUMNS` order.
    fn params(&self) -> Vec<&dyn ToSql>;
}

impl SqliteStore {
    pub fn catalog_insert<R: CatalogRecord>(&self, rec: &R) -> Result<()> {
        let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            R::COLUMNS.join(", "),
            placeholders.join(", ")
        );
        self.conn().execute(&sql, params_from_iter(rec.params()))?;
        Ok(())
    }

    pub fn catalog_get<R: CatalogRecord>(&self, id: &str) -> Result<Option<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            R::COLUMNS.join(", "),
            R::TABLE
        );
        let conn = self.conn();
        conn.query_row(&sql, params![id], |row| R::from_row(row))
            .optional()
            .map_err(Error::from)
    }

    pub fn catalog_list<R: CatalogRecord>(&self) -> Result<Vec<R>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            R::COLUMNS.join(", "),
            R::TABLE,
            R::ORDER_BY
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| R::from_row(row))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn catalog_update<R: CatalogRecord>(&self, rec: &R) -> Result<()> {
        let assignments: Vec<String> = R::COLUMNS
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, col)| format!("{col} = ?{}", i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?1",
            R::TABLE,
            assignments.join(", ")
        );
        let rows = self.conn().execute(&sql, params_from_iter(rec.params()))?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub fn catalog_delete<R: CatalogRecord>(&self, id: &str) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", R::TABLE);
        let rows = self.conn().execute(&sql, params![id])?;
        Ok(rows > 0)
    }

    pub fn catalog_count<R: CatalogRecord>(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let conn = self.conn();
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

impl CatalogRecord for Classroom {
    const TABLE: &'static str = "classrooms";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "building",
        "capacity",
        "facilities",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "building, name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Classroom {
            id: row.get(0)?,
            name: row.get(1)?,
            building: row.get(2)?,
            capacity: row.get(3)?,
            facilities: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id,
            &self.name,
            &self.building,
            &self.capacity,
            &self.facilities,
            &self.created_at,
            &self.updated_at,
        ]
    }
}

impl CatalogRecord for Lab {
    const TABLE: &'static str = "labs";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "building",
        "capacity",
        "equipment",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "building, name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Lab {
            id: row.get(0)?,
            name: row.get(1)?,
            building: row.get(2)?,
            capacity: row.get(3)?,
            equipment: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id,
            &self.name,
            &self.building,
            &self.capacity,
            &self.equipment,
            &self.created_at,
            &self.updated_at,
        ]
    }
}

impl CatalogRecord for BusRoute {
    const TABLE: &'static str = "bus_routes";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "description", "created_at", "updated_at"];
    const ORDER_BY: &'static str = "name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(BusRoute {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id,
            &self.name,
            &self.description,
            &self.created_at,
            &self.updated_at,
        ]
    }
}

impl CatalogRecord for CafeteriaMenuItem {
    const TABLE: &'static str = "cafeteria_menu";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "day_of_week",
        "meal",
        "dish",
        "price_cents",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "day_of_week, meal, dish";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CafeteriaMenuItem {
            id: row.get(0)?,
            day_of_week: row.get(1)?,
            meal: row.get(2)?,
            dish: row.get(3)?,
            price_cents: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id,
            &self.day_of_week,
            &self.meal,
            &self.dish,
            &self.price_cents,
            &self.created_at,
            &self.updated_at,
        ]
    }
}

impl CatalogRecord for CafeteriaInfo {
    const TABLE: &'static str = "cafeteria_info";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "location",
        "opening_hours",
        "contact",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CafeteriaInfo {
            id: row.get(0)?,
            name: row.get(1)?,
            location: row.get(2)?,
            opening_hours: row.get(3)?,
            contact: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id,
            &self.name,
            &self.location,
            &self.opening_hours,
            &self.contact,
            &self.created_at,
            &self.updated_at,
        ]
    }
}
