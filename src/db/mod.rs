mod schema;
pub(crate) mod store;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::models::*;
use store::{parse_date, parse_status, parse_uuid};

/// Shared handle to the SQLite store.
///
/// Cloning is cheap; every clone shares one connection, so statements from
/// all surfaces are serialized.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        store::register_functions(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        store::register_functions(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    /// Run `f` inside one `BEGIN IMMEDIATE` transaction.
    ///
    /// The outer `Result` carries store failures. The inner one carries
    /// business outcomes: the transaction commits only when `f` returns
    /// `Ok(Ok(_))` and rolls back otherwise.
    pub fn transaction<T, R>(
        &self,
        f: impl FnOnce(&Connection) -> Result<Result<T, R>>,
    ) -> Result<Result<T, R>> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = f(&tx)?;
        if outcome.is_ok() {
            tx.commit()?;
        }

        Ok(outcome)
    }

    // ============================================================
    // Dashboard queries
    // ============================================================

    pub fn fetch_card_data(&self) -> Result<CardData> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let (masters, applications, paid, pending): (i64, i64, i64, i64) = conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM customers),
                (SELECT COUNT(*) FROM invoices),
                (SELECT COALESCE(SUM(amount), 0) FROM invoices WHERE status = 'paid'),
                (SELECT COALESCE(SUM(amount), 0) FROM invoices WHERE status = 'pending')",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        Ok(CardData {
            number_of_masters: masters,
            number_of_applications: applications,
            total_paid_applications: format_currency(paid),
            total_pending_applications: format_currency(pending),
        })
    }

    pub fn fetch_latest_applications(&self) -> Result<Vec<LatestApplication>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT invoices.id, customers.name, customers.email, customers.image_url, invoices.amount
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             ORDER BY invoices.date DESC, invoices.rowid DESC
             LIMIT 5",
        )?;

        let latest = stmt
            .query_map([], |row| {
                Ok(LatestApplication {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    email: row.get(2)?,
                    image_url: row.get(3)?,
                    amount: format_currency(row.get(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(latest)
    }

    // ============================================================
    // Application queries
    // ============================================================

    /// Applications whose master name, email, amount, date or status contains
    /// `query`, newest first.
    pub fn fetch_filtered_applications(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<ApplicationsTableRow>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT
                invoices.id,
                invoices.customer_id,
                customers.name,
                customers.email,
                customers.image_url,
                invoices.date,
                invoices.amount,
                invoices.status,
                invoices.complexity
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             WHERE
                unicode_lower(customers.name) LIKE unicode_lower(?1) OR
                unicode_lower(customers.email) LIKE unicode_lower(?1) OR
                unicode_lower(CAST(invoices.amount AS TEXT)) LIKE unicode_lower(?1) OR
                unicode_lower(invoices.date) LIKE unicode_lower(?1) OR
                unicode_lower(invoices.status) LIKE unicode_lower(?1)
             ORDER BY invoices.date DESC, invoices.rowid DESC
             LIMIT ?2 OFFSET ?3",
        )?;

        let rows = stmt
            .query_map(
                (like_pattern(query), ITEMS_PER_PAGE, page_offset(page)),
                |row| {
                    Ok(ApplicationsTableRow {
                        id: parse_uuid(row.get::<_, String>(0)?),
                        master_id: parse_uuid(row.get::<_, String>(1)?),
                        name: row.get(2)?,
                        email: row.get(3)?,
                        image_url: row.get(4)?,
                        date: parse_date(row.get::<_, String>(5)?),
                        amount: row.get(6)?,
                        status: parse_status(row.get::<_, String>(7)?),
                        complexity: row.get(8)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn fetch_applications_pages(&self, query: &str) -> Result<i64> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: i64 = conn.query_row(
            "SELECT COUNT(*)
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             WHERE
                unicode_lower(customers.name) LIKE unicode_lower(?1) OR
                unicode_lower(customers.email) LIKE unicode_lower(?1) OR
                unicode_lower(CAST(invoices.amount AS TEXT)) LIKE unicode_lower(?1) OR
                unicode_lower(invoices.date) LIKE unicode_lower(?1) OR
                unicode_lower(invoices.status) LIKE unicode_lower(?1)",
            [like_pattern(query)],
            |row| row.get(0),
        )?;

        Ok(total_pages(count))
    }

    /// Edit-form view of an application, with the amount in dollars.
    pub fn fetch_application_by_id(&self, id: Uuid) -> Result<Option<ApplicationForm>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let application = store::get_application(&conn, id)?;

        Ok(application.map(|a| ApplicationForm {
            id: a.id,
            master_id: a.master_id,
            amount: a.amount as f64 / 100.0,
            status: a.status,
            complexity: a.complexity,
        }))
    }

    pub fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        store::get_application(&conn, id)
    }

    pub fn fetch_application_state_before(&self, id: Uuid) -> Result<Option<ApplicationState>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        store::application_state(&conn, id)
    }

    // ============================================================
    // Master queries
    // ============================================================

    /// Masters whose name or email contains `query`, with application totals,
    /// ordered by name.
    pub fn fetch_filtered_masters(&self, query: &str, page: u32) -> Result<Vec<MasterTableRow>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT
                customers.id,
                customers.name,
                customers.email,
                customers.image_url,
                customers.workload,
                COUNT(invoices.id),
                COALESCE(SUM(CASE WHEN invoices.status = 'pending' THEN invoices.amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN invoices.status = 'paid' THEN invoices.amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN invoices.status = 'pending' THEN invoices.complexity ELSE 0 END), 0)
             FROM customers
             LEFT JOIN invoices ON customers.id = invoices.customer_id
             WHERE
                unicode_lower(customers.name) LIKE unicode_lower(?1) OR
                unicode_lower(customers.email) LIKE unicode_lower(?1)
             GROUP BY customers.id, customers.name, customers.email, customers.image_url, customers.workload
             ORDER BY customers.name ASC
             LIMIT ?2 OFFSET ?3",
        )?;

        let rows = stmt
            .query_map(
                (like_pattern(query), ITEMS_PER_PAGE, page_offset(page)),
                |row| {
                    Ok(MasterTableRow {
                        id: parse_uuid(row.get::<_, String>(0)?),
                        name: row.get(1)?,
                        email: row.get(2)?,
                        image_url: row.get(3)?,
                        workload: row.get(4)?,
                        total_applications: row.get(5)?,
                        total_pending: format_currency(row.get(6)?),
                        total_paid: format_currency(row.get(7)?),
                        total_workload: row.get(8)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn fetch_masters_pages(&self, query: &str) -> Result<i64> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: i64 = conn.query_row(
            "SELECT COUNT(*)
             FROM customers
             WHERE
                unicode_lower(name) LIKE unicode_lower(?1) OR
                unicode_lower(email) LIKE unicode_lower(?1)",
            [like_pattern(query)],
            |row| row.get(0),
        )?;

        Ok(total_pages(count))
    }

    /// Every master's id and name, ordered by name.
    pub fn fetch_masters(&self) -> Result<Vec<MasterField>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT id, name FROM customers ORDER BY name")?;

        let masters = stmt
            .query_map([], |row| {
                Ok(MasterField {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(masters)
    }

    pub fn fetch_master_by_id(&self, id: Uuid) -> Result<Option<MasterForm>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let master = store::get_master(&conn, id)?;

        Ok(master.map(|m| MasterForm {
            id: m.id,
            name: m.name,
            email: m.email,
        }))
    }

    pub fn get_master(&self, id: Uuid) -> Result<Option<Master>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        store::get_master(&conn, id)
    }

    /// Sum of complexity over the master's pending applications. Zero when the
    /// master has none.
    pub fn fetch_actual_workload(&self, master_id: Uuid) -> Result<i64> {
        let conn = self.conn.lock().expect("database lock poisoned");
        store::actual_workload(&conn, master_id)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "masterdesk")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("masterdesk.db"))
}

/// Substring pattern for `LIKE`. Queries compare both sides through
/// `unicode_lower`, which makes the match case-insensitive beyond ASCII.
fn like_pattern(query: &str) -> String {
    format!("%{}%", query)
}
