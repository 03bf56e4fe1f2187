use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A service provider that applications are assigned to.
///
/// Stored in the `customers` table. `workload` is the capacity shown next to
/// the master's current pending workload in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Master {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Avatar path, assigned at random when the master is created.
    pub image_url: String,
    pub workload: i64,
}

/// Minimal master projection used to populate select inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterField {
    pub id: Uuid,
    pub name: String,
}

/// Editable fields of a master, as shown on the edit form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterForm {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// One row of the masters listing, with per-master application totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterTableRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_applications: i64,
    /// Sum of pending amounts, formatted as currency.
    pub total_pending: String,
    /// Sum of paid amounts, formatted as currency.
    pub total_paid: String,
    /// Sum of complexity over pending applications.
    pub total_workload: i64,
    /// Capacity of the master.
    pub workload: i64,
}

/// Raw master form submission. Every field is optional so that missing
/// fields surface as validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterFormInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A master submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterInput {
    pub name: String,
    pub email: String,
}

/// Snapshot of a master's pending workload against the capacity threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterWorkload {
    pub master_id: Uuid,
    pub workload: i64,
    pub threshold: i64,
    /// Largest complexity a new pending application could still carry.
    pub remaining: i64,
}
