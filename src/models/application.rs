use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of work assigned to a master.
///
/// Stored in the `invoices` table, with `master_id` in the `customer_id`
/// column. Pending applications count toward the master's workload; paid ones
/// do not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub master_id: Uuid,
    /// Amount in cents.
    pub amount: i64,
    pub status: ApplicationStatus,
    /// Work difficulty, 1 through 10.
    pub complexity: i64,
    pub date: NaiveDate,
}

/// The payment status of an application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Paid,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

/// Editable fields of an application, as shown on the edit form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationForm {
    pub id: Uuid,
    pub master_id: Uuid,
    /// Amount in dollars.
    pub amount: f64,
    pub status: ApplicationStatus,
    pub complexity: i64,
}

/// One row of the applications listing, joined with its master.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationsTableRow {
    pub id: Uuid,
    pub master_id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub date: NaiveDate,
    /// Amount in cents.
    pub amount: i64,
    pub status: ApplicationStatus,
    pub complexity: i64,
}

/// Recent application summary for the dashboard overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestApplication {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    /// Amount formatted as currency.
    pub amount: String,
}

/// The fields of an application that matter to the workload check, as they
/// were before an update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationState {
    pub master_id: Uuid,
    pub status: ApplicationStatus,
    pub complexity: i64,
}

/// Raw application form submission.
///
/// Field names follow the form surface (`masterId`). Values arrive as strings
/// and are coerced during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationFormInput {
    pub master_id: Option<String>,
    pub amount: Option<String>,
    pub status: Option<String>,
    pub complexity: Option<String>,
}

/// An application submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInput {
    pub master_id: Uuid,
    /// Amount in cents.
    pub amount: i64,
    pub status: ApplicationStatus,
    pub complexity: i64,
}
