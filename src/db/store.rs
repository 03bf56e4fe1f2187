//! Statements that run against a borrowed connection.
//!
//! These are shared between the locking [`Database`](super::Database) methods
//! and the mutation layer, which calls them inside a single transaction so the
//! workload read and the application write cannot interleave with another
//! request.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{functions::FunctionFlags, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;

/// Register the SQL functions the queries rely on.
///
/// `unicode_lower` lowercases text with full Unicode case mapping. The builtin
/// `lower` and `LIKE` only fold ASCII letters.
pub(crate) fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
    )?;
    Ok(())
}

pub(crate) fn master_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM customers WHERE id = ?",
            [id.to_string()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn get_master(conn: &Connection, id: Uuid) -> Result<Option<Master>> {
    let master = conn
        .query_row(
            "SELECT id, name, email, image_url, workload FROM customers WHERE id = ?",
            [id.to_string()],
            |row| {
                Ok(Master {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    email: row.get(2)?,
                    image_url: row.get(3)?,
                    workload: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(master)
}

pub(crate) fn insert_master(
    conn: &Connection,
    input: MasterInput,
    image_url: String,
) -> Result<Master> {
    let id = Uuid::new_v4();

    conn.execute(
        "INSERT INTO customers (id, name, email, image_url) VALUES (?, ?, ?, ?)",
        (id.to_string(), &input.name, &input.email, &image_url),
    )?;

    let workload: i64 = conn.query_row(
        "SELECT workload FROM customers WHERE id = ?",
        [id.to_string()],
        |row| row.get(0),
    )?;

    Ok(Master {
        id,
        name: input.name,
        email: input.email,
        image_url,
        workload,
    })
}

/// Returns `false` when no master has `id`.
pub(crate) fn update_master(conn: &Connection, id: Uuid, input: &MasterInput) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE customers SET name = ?, email = ? WHERE id = ?",
        (&input.name, &input.email, id.to_string()),
    )?;
    Ok(rows > 0)
}

pub(crate) fn delete_master(conn: &Connection, id: Uuid) -> Result<bool> {
    let rows = conn.execute("DELETE FROM customers WHERE id = ?", [id.to_string()])?;
    Ok(rows > 0)
}

pub(crate) fn count_master_applications(conn: &Connection, master_id: Uuid) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM invoices WHERE customer_id = ?",
        [master_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Sum of complexity over the master's pending applications.
pub(crate) fn actual_workload(conn: &Connection, master_id: Uuid) -> Result<i64> {
    let workload = conn.query_row(
        "SELECT COALESCE(SUM(complexity), 0) FROM invoices
         WHERE customer_id = ? AND status = 'pending'",
        [master_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(workload)
}

pub(crate) fn application_state(conn: &Connection, id: Uuid) -> Result<Option<ApplicationState>> {
    let state = conn
        .query_row(
            "SELECT customer_id, status, complexity FROM invoices WHERE id = ?",
            [id.to_string()],
            |row| {
                Ok(ApplicationState {
                    master_id: parse_uuid(row.get::<_, String>(0)?),
                    status: parse_status(row.get::<_, String>(1)?),
                    complexity: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(state)
}

pub(crate) fn get_application(conn: &Connection, id: Uuid) -> Result<Option<Application>> {
    let application = conn
        .query_row(
            "SELECT id, customer_id, amount, status, complexity, date FROM invoices WHERE id = ?",
            [id.to_string()],
            application_from_row,
        )
        .optional()?;
    Ok(application)
}

pub(crate) fn insert_application(
    conn: &Connection,
    input: &ApplicationInput,
    date: NaiveDate,
) -> Result<Application> {
    let id = Uuid::new_v4();

    conn.execute(
        "INSERT INTO invoices (id, customer_id, amount, status, complexity, date)
         VALUES (?, ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            input.master_id.to_string(),
            input.amount,
            input.status.as_str(),
            input.complexity,
            date.to_string(),
        ),
    )?;

    Ok(Application {
        id,
        master_id: input.master_id,
        amount: input.amount,
        status: input.status,
        complexity: input.complexity,
        date,
    })
}

/// Rewrites everything but the creation date. Returns `None` when no
/// application has `id`.
pub(crate) fn update_application(
    conn: &Connection,
    id: Uuid,
    input: &ApplicationInput,
) -> Result<Option<Application>> {
    let rows = conn.execute(
        "UPDATE invoices SET customer_id = ?, amount = ?, status = ?, complexity = ? WHERE id = ?",
        (
            input.master_id.to_string(),
            input.amount,
            input.status.as_str(),
            input.complexity,
            id.to_string(),
        ),
    )?;

    if rows == 0 {
        return Ok(None);
    }
    get_application(conn, id)
}

pub(crate) fn delete_application(conn: &Connection, id: Uuid) -> Result<bool> {
    let rows = conn.execute("DELETE FROM invoices WHERE id = ?", [id.to_string()])?;
    Ok(rows > 0)
}

pub(crate) fn application_from_row(row: &Row<'_>) -> rusqlite::Result<Application> {
    Ok(Application {
        id: parse_uuid(row.get::<_, String>(0)?),
        master_id: parse_uuid(row.get::<_, String>(1)?),
        amount: row.get(2)?,
        status: parse_status(row.get::<_, String>(3)?),
        complexity: row.get(4)?,
        date: parse_date(row.get::<_, String>(5)?),
    })
}

pub(crate) fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

pub(crate) fn parse_status(s: String) -> ApplicationStatus {
    ApplicationStatus::from_str(&s).unwrap_or(ApplicationStatus::Pending)
}

pub(crate) fn parse_date(s: String) -> NaiveDate {
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").unwrap_or_default()
}
