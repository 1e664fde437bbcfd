use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};

use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Optional filters for listing booking requests. `owner` scopes the result
/// to one user's rows; the other fields narrow by column equality.
#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub resource_type: Option<ResourceKind>,
    pub resource_id: Option<String>,
    pub owner: Option<String>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Creates all tables and indexes. Idempotent.
    pub fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    pub fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (id, student_id, name, password_hash, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id,
                user.student_id,
                user.name,
                user.password_hash,
                user.role,
                user.created_at,
                user.updated_at,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, student_id, name, password_hash, role, created_at, updated_at
             FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn get_user_by_student_id(&self, student_id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, student_id, name, password_hash, role, created_at, updated_at
             FROM users WHERE student_id = ?1",
            params![student_id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, student_id, name, password_hash, role, created_at, updated_at
             FROM users ORDER BY student_id",
        )?;

        let rows = stmt.query_map([], user_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn has_admin_user(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'admin'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Token operations

    pub fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.user_id,
                token.created_at,
                token.expires_at,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::TokenLookupCollision)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    pub fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at
             FROM tokens WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(Token {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    user_id: row.get(3)?,
                    created_at: row.get(4)?,
                    expires_at: row.get(5)?,
                    last_used_at: row.get(6)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn delete_token(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![Utc::now(), id],
        )?;
        Ok(())
    }

    // Resource reference checks

    /// Whether a classroom/lab row with this id exists. Schedules and booking
    /// requests reference resources without a database-level foreign key, so
    /// creation paths call this before inserting.
    pub fn resource_exists(&self, kind: ResourceKind, id: &str) -> Result<bool> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?1", kind.table());
        let conn = self.conn();
        let count: i64 = conn.query_row(&sql, params![id], |row| row.get(0))?;
        Ok(count > 0)
    }

    // Bus stop operations

    /// Replaces the ordered stop list for a route. Runs as a delete followed
    /// by per-stop inserts with no enclosing transaction; a crash mid-sequence
    /// leaves a partial list.
    pub fn set_bus_stops(&self, bus_id: &str, stops: &[BusStop]) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM bus_stops WHERE bus_id = ?1", params![bus_id])?;

        for stop in stops {
            conn.execute(
                "INSERT INTO bus_stops (bus_id, position, name, arrival_time)
                 VALUES (?1, ?2, ?3, ?4)",
                params![bus_id, stop.position, stop.name, stop.arrival_time],
            )?;
        }
        Ok(())
    }

    pub fn list_bus_stops(&self, bus_id: &str) -> Result<Vec<BusStop>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT bus_id, position, name, arrival_time
             FROM bus_stops WHERE bus_id = ?1 ORDER BY position",
        )?;

        let rows = stmt.query_map(params![bus_id], |row| {
            Ok(BusStop {
                bus_id: row.get(0)?,
                position: row.get(1)?,
                name: row.get(2)?,
                arrival_time: row.get(3)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Schedule operations

    pub fn create_schedule(&self, entry: &ScheduleEntry) -> Result<()> {
        self.conn().execute(
            "INSERT INTO schedules (id, resource_type, resource_id, day_of_week, start_time,
                                    end_time, subject, instructor, course_code, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                entry.id,
                entry.resource_type,
                entry.resource_id,
                entry.day_of_week,
                entry.start_time,
                entry.end_time,
                entry.subject,
                entry.instructor,
                entry.course_code,
                entry.created_at,
                entry.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_schedule(&self, id: &str) -> Result<Option<ScheduleEntry>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, resource_type, resource_id, day_of_week, start_time, end_time,
                    subject, instructor, course_code, created_at, updated_at
             FROM schedules WHERE id = ?1",
            params![id],
            schedule_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Entries for one resource, ordered by day of week then start time so
    /// repeated reads with no intervening writes return identical results.
    pub fn list_schedules(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        day: Option<Weekday>,
    ) -> Result<Vec<ScheduleEntry>> {
        let conn = self.conn();

        let base = "SELECT id, resource_type, resource_id, day_of_week, start_time, end_time,
                           subject, instructor, course_code, created_at, updated_at
                    FROM schedules WHERE resource_type = ?1 AND resource_id = ?2";

        let rows = if let Some(day) = day {
            let sql = format!("{base} AND day_of_week = ?3 ORDER BY day_of_week, start_time");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![kind, resource_id, day], schedule_from_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()
        } else {
            let sql = format!("{base} ORDER BY day_of_week, start_time");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![kind, resource_id], schedule_from_row)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()
        };

        rows.map_err(Error::from)
    }

    pub fn update_schedule(&self, entry: &ScheduleEntry) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE schedules SET resource_type = ?1, resource_id = ?2, day_of_week = ?3,
                    start_time = ?4, end_time = ?5, subject = ?6, instructor = ?7,
                    course_code = ?8, updated_at = ?9
             WHERE id = ?10",
            params![
                entry.resource_type,
                entry.resource_id,
                entry.day_of_week,
                entry.start_time,
                entry.end_time,
                entry.subject,
                entry.instructor,
                entry.course_code,
                entry.updated_at,
                entry.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub fn delete_schedule(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM schedules WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Booking request operations

    pub fn create_booking(&self, booking: &BookingRequest) -> Result<()> {
        self.conn().execute(
            "INSERT INTO booking_requests (id, user_id, resource_type, resource_id, date,
                    start_time, end_time, program_name, description, participant_count,
                    status, admin_notes, reviewed_by, reviewed_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                booking.id,
                booking.user_id,
                booking.resource_type,
                booking.resource_id,
                booking.date,
                booking.start_time,
                booking.end_time,
                booking.program_name,
                booking.description,
                booking.participant_count,
                booking.status,
                booking.admin_notes,
                booking.reviewed_by,
                booking.reviewed_at,
                booking.created_at,
                booking.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_booking(&self, id: &str) -> Result<Option<BookingRequest>> {
        let conn = self.conn();
        conn.query_row(
            &format!("{BOOKING_SELECT} WHERE id = ?1"),
            params![id],
            booking_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<BookingRequest>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(ref status) = filter.status {
            values.push(status);
            clauses.push(format!("status = ?{}", values.len()));
        }
        if let Some(ref kind) = filter.resource_type {
            values.push(kind);
            clauses.push(format!("resource_type = ?{}", values.len()));
        }
        if let Some(ref resource_id) = filter.resource_id {
            values.push(resource_id);
            clauses.push(format!("resource_id = ?{}", values.len()));
        }
        if let Some(ref owner) = filter.owner {
            values.push(owner);
            clauses.push(format!("user_id = ?{}", values.len()));
        }

        let mut sql = BOOKING_SELECT.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id");

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), booking_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Stamps an admin decision onto a request. The transition is
    /// unconditional: a request that has already been reviewed can be
    /// reviewed again and the stamps are overwritten.
    pub fn review_booking(
        &self,
        id: &str,
        status: BookingStatus,
        admin_notes: Option<&str>,
        reviewed_by: &str,
    ) -> Result<()> {
        let now = Utc::now();
        let rows = self.conn().execute(
            "UPDATE booking_requests
             SET status = ?1, admin_notes = ?2, reviewed_by = ?3, reviewed_at = ?4, updated_at = ?4
             WHERE id = ?5",
            params![status, admin_notes, reviewed_by, now, id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    pub fn delete_booking(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM booking_requests WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

const BOOKING_SELECT: &str =
    "SELECT id, user_id, resource_type, resource_id, date, start_time, end_time,
            program_name, description, participant_count, status, admin_notes,
            reviewed_by, reviewed_at, created_at, updated_at
     FROM booking_requests";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        student_id: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn schedule_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduleEntry> {
    Ok(ScheduleEntry {
        id: row.get(0)?,
        resource_type: row.get(1)?,
        resource_id: row.get(2)?,
        day_of_week: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        subject: row.get(6)?,
        instructor: row.get(7)?,
        course_code: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn booking_from_row(row: &Row<'_>) -> rusqlite::Result<BookingRequest> {
    Ok(BookingRequest {
        id: row.get(0)?,
        user_id: row.get(1)?,
        resource_type: row.get(2)?,
        resource_id: row.get(3)?,
        date: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        program_name: row.get(7)?,
        description: row.get(8)?,
        participant_count: row.get(9)?,
        status: row.get(10)?,
        admin_notes: row.get(11)?,
        reviewed_by: row.get(12)?,
        reviewed_at: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}
