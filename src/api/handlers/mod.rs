use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::actions::{self, ActionMessage};
use crate::db::Database;
use crate::error::ActionError;
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Log a store error and return a sanitized response to the client.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Listing parameters
// ============================================================

/// Search and page parameters shared by the listings.
///
/// `page` is kept as text so that a missing, malformed or non-positive value
/// falls back to the first page instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub query: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    pub fn search(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }

    pub fn current_page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1)
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Dashboard
// ============================================================

pub async fn get_card_data(
    State(db): State<Database>,
) -> Result<Json<CardData>, (StatusCode, String)> {
    db.fetch_card_data().map(Json).map_err(internal_error)
}

pub async fn list_latest_applications(
    State(db): State<Database>,
) -> Result<Json<Vec<LatestApplication>>, (StatusCode, String)> {
    db.fetch_latest_applications()
        .map(Json)
        .map_err(internal_error)
}

// ============================================================
// Applications
// ============================================================

pub async fn list_applications(
    State(db): State<Database>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<ApplicationsTableRow>>, (StatusCode, String)> {
    let page = query.current_page();
    let items = db
        .fetch_filtered_applications(query.search(), page)
        .map_err(internal_error)?;
    let total_pages = db
        .fetch_applications_pages(query.search())
        .map_err(internal_error)?;

    Ok(Json(Page {
        items,
        page,
        total_pages,
    }))
}

pub async fn get_application(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationForm>, (StatusCode, String)> {
    db.fetch_application_by_id(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Application not found".to_string()))
}

pub async fn create_application(
    State(db): State<Database>,
    Form(form): Form<ApplicationFormInput>,
) -> Result<(StatusCode, Json<Application>), ActionError> {
    actions::create_application(&db, &form).map(|a| (StatusCode::CREATED, Json(a)))
}

pub async fn update_application(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Form(form): Form<ApplicationFormInput>,
) -> Result<Json<Application>, ActionError> {
    actions::update_application(&db, id, &form).map(Json)
}

pub async fn delete_application(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionMessage>, ActionError> {
    actions::delete_application(&db, id).map(Json)
}

// ============================================================
// Masters
// ============================================================

pub async fn list_masters(
    State(db): State<Database>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<MasterTableRow>>, (StatusCode, String)> {
    let page = query.current_page();
    let items = db
        .fetch_filtered_masters(query.search(), page)
        .map_err(internal_error)?;
    let total_pages = db
        .fetch_masters_pages(query.search())
        .map_err(internal_error)?;

    Ok(Json(Page {
        items,
        page,
        total_pages,
    }))
}

pub async fn list_master_options(
    State(db): State<Database>,
) -> Result<Json<Vec<MasterField>>, (StatusCode, String)> {
    db.fetch_masters().map(Json).map_err(internal_error)
}

pub async fn get_master(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<MasterForm>, (StatusCode, String)> {
    db.fetch_master_by_id(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Master not found".to_string()))
}

pub async fn get_master_workload(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<MasterWorkload>, (StatusCode, String)> {
    actions::master_workload(&db, id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Master not found".to_string()))
}

pub async fn create_master(
    State(db): State<Database>,
    Form(form): Form<MasterFormInput>,
) -> Result<(StatusCode, Json<Master>), ActionError> {
    actions::create_master(&db, &form).map(|m| (StatusCode::CREATED, Json(m)))
}

pub async fn update_master(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Form(form): Form<MasterFormInput>,
) -> Result<Json<MasterForm>, ActionError> {
    actions::update_master(&db, id, &form).map(Json)
}

pub async fn delete_master(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionMessage>, ActionError> {
    actions::delete_master(&db, id).map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_query(page: Option<&str>) -> ListQuery {
        ListQuery {
            query: None,
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn current_page_defaults_to_first() {
        assert_eq!(list_query(None).current_page(), 1);
        assert_eq!(list_query(Some("")).current_page(), 1);
        assert_eq!(list_query(Some("0")).current_page(), 1);
        assert_eq!(list_query(Some("-3")).current_page(), 1);
        assert_eq!(list_query(Some("two")).current_page(), 1);
    }

    #[test]
    fn current_page_parses_positive_numbers() {
        assert_eq!(list_query(Some("4")).current_page(), 4);
    }

    #[test]
    fn search_defaults_to_empty() {
        assert_eq!(ListQuery::default().search(), "");
    }
}
