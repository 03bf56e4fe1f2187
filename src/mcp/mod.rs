//! MCP server exposing the admin operations as tools.
//!
//! Every tool is a thin wrapper over the query layer or [`crate::actions`];
//! the plain methods in the first `impl` block hold the logic and return typed
//! results, and the `#[tool]` methods serialize them for the client.

mod types;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use uuid::Uuid;

use crate::actions::{self, ActionMessage};
use crate::db::Database;
use crate::error::ActionError;
use crate::models::*;

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    fn parse_uuid(s: &str) -> Result<Uuid, McpError> {
        Uuid::parse_str(s)
            .map_err(|e| McpError::invalid_params(format!("Invalid UUID: {}", e), None))
    }

    fn store_error(e: anyhow::Error) -> McpError {
        tracing::error!("Store error in MCP tool: {:#}", e);
        McpError::internal_error("Database Error", None)
    }

    fn action_error(e: ActionError) -> McpError {
        match e {
            ActionError::Validation { errors, message } => McpError::invalid_params(
                message,
                Some(serde_json::json!({ "errors": errors })),
            ),
            ActionError::Database { operation, cause } => {
                tracing::error!("Database error while trying to {}: {:#}", operation, cause);
                McpError::internal_error(format!("Database Error: Failed to {}.", operation), None)
            }
            other => McpError::invalid_params(other.to_string(), None),
        }
    }

    fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn summary(&self) -> Result<CardData, McpError> {
        self.db.fetch_card_data().map_err(Self::store_error)
    }

    pub fn masters_page(&self, req: &ListRequest) -> Result<Page<MasterTableRow>, McpError> {
        let search = req.query.as_deref().unwrap_or("");
        let page = req.page.filter(|p| *p > 0).unwrap_or(1);

        Ok(Page {
            items: self
                .db
                .fetch_filtered_masters(search, page)
                .map_err(Self::store_error)?,
            page,
            total_pages: self
                .db
                .fetch_masters_pages(search)
                .map_err(Self::store_error)?,
        })
    }

    pub fn applications_page(
        &self,
        req: &ListRequest,
    ) -> Result<Page<ApplicationsTableRow>, McpError> {
        let search = req.query.as_deref().unwrap_or("");
        let page = req.page.filter(|p| *p > 0).unwrap_or(1);

        Ok(Page {
            items: self
                .db
                .fetch_filtered_applications(search, page)
                .map_err(Self::store_error)?,
            page,
            total_pages: self
                .db
                .fetch_applications_pages(search)
                .map_err(Self::store_error)?,
        })
    }

    pub fn workload(&self, req: &MasterIdRequest) -> Result<MasterWorkload, McpError> {
        let master_id = Self::parse_uuid(&req.master_id)?;
        actions::master_workload(&self.db, master_id)
            .map_err(Self::store_error)?
            .ok_or_else(|| McpError::invalid_params("Master not found", None))
    }

    // ============================================================
    // Mutations
    // ============================================================

    pub fn add_master(&self, req: &CreateMasterRequest) -> Result<Master, McpError> {
        actions::create_master(&self.db, &MasterFormInput::from(req))
            .map_err(Self::action_error)
    }

    pub fn edit_master(&self, req: &UpdateMasterRequest) -> Result<MasterForm, McpError> {
        let master_id = Self::parse_uuid(&req.master_id)?;
        actions::update_master(&self.db, master_id, &MasterFormInput::from(req))
            .map_err(Self::action_error)
    }

    pub fn remove_master(&self, req: &MasterIdRequest) -> Result<ActionMessage, McpError> {
        let master_id = Self::parse_uuid(&req.master_id)?;
        actions::delete_master(&self.db, master_id).map_err(Self::action_error)
    }

    pub fn add_application(&self, req: &ApplicationFields) -> Result<Application, McpError> {
        actions::create_application(&self.db, &ApplicationFormInput::from(req))
            .map_err(Self::action_error)
    }

    pub fn edit_application(
        &self,
        req: &UpdateApplicationRequest,
    ) -> Result<Application, McpError> {
        let application_id = Self::parse_uuid(&req.application_id)?;
        let form = ApplicationFormInput::from(&req.fields);
        actions::update_application(&self.db, application_id, &form).map_err(Self::action_error)
    }

    pub fn remove_application(
        &self,
        req: &ApplicationIdRequest,
    ) -> Result<ActionMessage, McpError> {
        let application_id = Self::parse_uuid(&req.application_id)?;
        actions::delete_application(&self.db, application_id).map_err(Self::action_error)
    }
}

#[tool_router]
impl McpServer {
    // ============================================================
    // Query Tools
    // ============================================================

    #[tool(
        description = "Dashboard overview: number of masters and applications, plus total paid and total pending amounts."
    )]
    async fn dashboard_summary(&self) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.summary()?)
    }

    #[tool(
        description = "List masters with their application totals and current workload (pending complexity) against capacity. Searches name and email. Returns 6 rows per page plus total_pages."
    )]
    async fn list_masters(
        &self,
        params: Parameters<ListRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.masters_page(&params.0)?)
    }

    #[tool(
        description = "List applications joined with their master, newest first. Searches master name, email, amount, date and status. Returns 6 rows per page plus total_pages."
    )]
    async fn list_applications(
        &self,
        params: Parameters<ListRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.applications_page(&params.0)?)
    }

    #[tool(
        description = "Current pending workload of a master, the threshold it must stay below (21), and the largest complexity a new pending application could still carry. Call this before assigning work."
    )]
    async fn get_master_workload(
        &self,
        params: Parameters<MasterIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.workload(&params.0)?)
    }

    // ============================================================
    // Mutation Tools
    // ============================================================

    #[tool(description = "Create a master. Name must be non-empty and email well-formed.")]
    async fn create_master(
        &self,
        params: Parameters<CreateMasterRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.add_master(&params.0)?)
    }

    #[tool(description = "Change a master's name and email.")]
    async fn update_master(
        &self,
        params: Parameters<UpdateMasterRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.edit_master(&params.0)?)
    }

    #[tool(
        description = "Delete a master. Fails while any application is still assigned to it; delete or reassign those first."
    )]
    async fn delete_master(
        &self,
        params: Parameters<MasterIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.remove_master(&params.0)?)
    }

    #[tool(
        description = "Create an application for a master, dated today. Rejected when it is pending and would bring the master's pending complexity to 21 or more."
    )]
    async fn create_application(
        &self,
        params: Parameters<ApplicationFields>,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.add_application(&params.0)?)
    }

    #[tool(
        description = "Update an application's master, amount, status and complexity. The workload check applies to the target master; marking an application paid is never rejected."
    )]
    async fn update_application(
        &self,
        params: Parameters<UpdateApplicationRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.edit_application(&params.0)?)
    }

    #[tool(description = "Delete an application. Frees its complexity from the master's workload.")]
    async fn delete_application(
        &self,
        params: Parameters<ApplicationIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.remove_application(&params.0)?)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "masterdesk".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"masterdesk manages masters (service providers) and the applications (work orders) assigned to them.

WORKLOAD RULE:
- Each application has a complexity from 1 to 10 and a status of 'pending' or 'paid'.
- A master's workload is the sum of complexity over its pending applications.
- A pending application is rejected when it would bring that sum to 21 or more.
- Paid applications never count, so marking work paid always succeeds.

TYPICAL FLOW:
1. list_masters or get_master_workload to find a master with room
2. create_application with that master_id
3. update_application to change status to 'paid' once the work is settled

Amounts are given in dollars and stored in cents. Listings return 6 rows per page."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
