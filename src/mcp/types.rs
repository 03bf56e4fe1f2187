//! Request types for MCP tools.

use rmcp::schemars::JsonSchema;
use serde::Deserialize;

use crate::models::{ApplicationFormInput, MasterFormInput};

// ============================================================
// Query Requests
// ============================================================

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListRequest {
    #[schemars(description = "Case-insensitive search text. Omit to list everything.")]
    #[serde(default)]
    pub query: Option<String>,
    #[schemars(description = "1-based page number. Pages hold 6 rows. Defaults to 1.")]
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MasterIdRequest {
    #[schemars(description = "The UUID of the master")]
    pub master_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ApplicationIdRequest {
    #[schemars(description = "The UUID of the application")]
    pub application_id: String,
}

// ============================================================
// Master Mutations
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateMasterRequest {
    #[schemars(description = "Display name of the master")]
    pub name: String,
    #[schemars(description = "Contact email of the master")]
    pub email: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateMasterRequest {
    #[schemars(description = "The UUID of the master to update")]
    pub master_id: String,
    #[schemars(description = "New display name")]
    pub name: String,
    #[schemars(description = "New contact email")]
    pub email: String,
}

impl From<&CreateMasterRequest> for MasterFormInput {
    fn from(req: &CreateMasterRequest) -> Self {
        Self {
            name: Some(req.name.clone()),
            email: Some(req.email.clone()),
        }
    }
}

impl From<&UpdateMasterRequest> for MasterFormInput {
    fn from(req: &UpdateMasterRequest) -> Self {
        Self {
            name: Some(req.name.clone()),
            email: Some(req.email.clone()),
        }
    }
}

// ============================================================
// Application Mutations
// ============================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ApplicationFields {
    #[schemars(description = "The UUID of the master the application is assigned to")]
    pub master_id: String,
    #[schemars(description = "Amount in dollars, greater than 0")]
    pub amount: f64,
    #[schemars(
        description = "Either 'pending' or 'paid'. Only pending applications count toward workload."
    )]
    pub status: String,
    #[schemars(
        description = "Work difficulty from 1 to 10. A master's pending complexity must stay below 21."
    )]
    pub complexity: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateApplicationRequest {
    #[schemars(description = "The UUID of the application to update")]
    pub application_id: String,
    #[serde(flatten)]
    pub fields: ApplicationFields,
}

impl From<&ApplicationFields> for ApplicationFormInput {
    fn from(fields: &ApplicationFields) -> Self {
        Self {
            master_id: Some(fields.master_id.clone()),
            amount: Some(fields.amount.to_string()),
            status: Some(fields.status.clone()),
            complexity: Some(fields.complexity.to_string()),
        }
    }
}
