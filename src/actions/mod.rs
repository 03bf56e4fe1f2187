//! Mutation layer: validate a submission, apply business checks, write.
//!
//! Each action returns the written record or an [`ActionError`]. Application
//! writes read the master's workload and write the row inside one store
//! transaction, so two concurrent submissions for the same master cannot both
//! pass the capacity check.

mod avatars;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{store, Database};
use crate::error::{ActionError, ActionResult};
use crate::models::*;
use crate::validation::{self, FieldErrors, SELECT_MASTER};
use crate::workload::{self, CapacityDecision, Proposal};

/// Confirmation returned by delete actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionMessage {
    pub message: String,
}

// ============================================================
// Masters
// ============================================================

pub fn create_master(db: &Database, form: &MasterFormInput) -> ActionResult<Master> {
    const OP: &str = "Create Master";

    let input =
        validation::validate_master(form).map_err(|errors| ActionError::validation(errors, OP))?;
    let image_url = avatars::pick().to_string();

    let master = db
        .transaction(|conn| store::insert_master(conn, input, image_url).map(Ok::<_, ActionError>))
        .map_err(|e| ActionError::database(OP, e))??;

    tracing::info!(master_id = %master.id, "Created master {}", master.name);
    Ok(master)
}

pub fn update_master(db: &Database, id: Uuid, form: &MasterFormInput) -> ActionResult<MasterForm> {
    const OP: &str = "Update Master";

    let input =
        validation::validate_master(form).map_err(|errors| ActionError::validation(errors, OP))?;

    db.transaction(|conn| {
        if !store::update_master(conn, id, &input)? {
            return Ok(Err(ActionError::NotFound("Master not found".to_string())));
        }
        Ok(Ok(()))
    })
    .map_err(|e| ActionError::database(OP, e))??;

    tracing::info!(master_id = %id, "Updated master");
    Ok(MasterForm {
        id,
        name: input.name,
        email: input.email,
    })
}

/// Delete a master. Refused while any application still references it.
pub fn delete_master(db: &Database, id: Uuid) -> ActionResult<ActionMessage> {
    const OP: &str = "Delete Master";

    db.transaction(|conn| {
        if !store::master_exists(conn, id)? {
            return Ok(Err(ActionError::NotFound("Master not found".to_string())));
        }

        let assigned = store::count_master_applications(conn, id)?;
        if assigned > 0 {
            return Ok(Err(ActionError::Conflict(format!(
                "Cannot delete master with {} assigned application(s).",
                assigned
            ))));
        }

        store::delete_master(conn, id)?;
        Ok(Ok(()))
    })
    .map_err(|e| ActionError::database(OP, e))??;

    tracing::info!(master_id = %id, "Deleted master");
    Ok(ActionMessage {
        message: "Deleted Master.".to_string(),
    })
}

// ============================================================
// Applications
// ============================================================

pub fn create_application(
    db: &Database,
    form: &ApplicationFormInput,
) -> ActionResult<Application> {
    const OP: &str = "Create Application";

    let input = validation::validate_application(form)
        .map_err(|errors| ActionError::validation(errors, OP))?;
    let date = Utc::now().date_naive();

    let application = db
        .transaction(|conn| {
            if !store::master_exists(conn, input.master_id)? {
                return Ok(Err(unknown_master(OP)));
            }

            let current = store::actual_workload(conn, input.master_id)?;
            if let Err(rejection) = check_capacity(current, &input, None) {
                return Ok(Err(rejection));
            }

            store::insert_application(conn, &input, date).map(Ok)
        })
        .map_err(|e| ActionError::database(OP, e))??;

    tracing::info!(
        application_id = %application.id,
        master_id = %application.master_id,
        complexity = application.complexity,
        "Created application"
    );
    Ok(application)
}

pub fn update_application(
    db: &Database,
    id: Uuid,
    form: &ApplicationFormInput,
) -> ActionResult<Application> {
    const OP: &str = "Update Application";

    let input = validation::validate_application(form)
        .map_err(|errors| ActionError::validation(errors, OP))?;

    let application = db
        .transaction(|conn| {
            let Some(prior) = store::application_state(conn, id)? else {
                return Ok(Err(ActionError::NotFound(
                    "Application not found".to_string(),
                )));
            };
            if !store::master_exists(conn, input.master_id)? {
                return Ok(Err(unknown_master(OP)));
            }

            let current = store::actual_workload(conn, input.master_id)?;
            if let Err(rejection) = check_capacity(current, &input, Some(&prior)) {
                return Ok(Err(rejection));
            }

            match store::update_application(conn, id, &input)? {
                Some(application) => Ok(Ok(application)),
                None => Ok(Err(ActionError::NotFound(
                    "Application not found".to_string(),
                ))),
            }
        })
        .map_err(|e| ActionError::database(OP, e))??;

    tracing::info!(
        application_id = %application.id,
        master_id = %application.master_id,
        complexity = application.complexity,
        "Updated application"
    );
    Ok(application)
}

pub fn delete_application(db: &Database, id: Uuid) -> ActionResult<ActionMessage> {
    const OP: &str = "Delete Application";

    db.transaction(|conn| {
        if !store::delete_application(conn, id)? {
            return Ok(Err(ActionError::NotFound(
                "Application not found".to_string(),
            )));
        }
        Ok(Ok(()))
    })
    .map_err(|e| ActionError::database(OP, e))??;

    tracing::info!(application_id = %id, "Deleted application");
    Ok(ActionMessage {
        message: "Deleted Application.".to_string(),
    })
}

/// Current workload snapshot for a master, or `None` when it does not exist.
pub fn master_workload(db: &Database, master_id: Uuid) -> anyhow::Result<Option<MasterWorkload>> {
    if db.get_master(master_id)?.is_none() {
        return Ok(None);
    }

    let current = db.fetch_actual_workload(master_id)?;
    Ok(Some(MasterWorkload {
        master_id,
        workload: current,
        threshold: workload::WORKLOAD_THRESHOLD,
        remaining: workload::remaining_capacity(current),
    }))
}

fn check_capacity(
    current: i64,
    input: &ApplicationInput,
    prior: Option<&ApplicationState>,
) -> ActionResult<()> {
    let proposal = Proposal {
        master_id: input.master_id,
        complexity: input.complexity,
        status: input.status,
    };

    match workload::evaluate_capacity(current, &proposal, prior) {
        CapacityDecision::Accept => Ok(()),
        CapacityDecision::Reject { projected, message } => {
            tracing::debug!(
                master_id = %input.master_id,
                current,
                projected,
                "Capacity check rejected application"
            );
            Err(ActionError::Capacity(message))
        }
    }
}

fn unknown_master(operation: &str) -> ActionError {
    let mut errors = FieldErrors::new();
    errors.insert("masterId".to_string(), vec![SELECT_MASTER.to_string()]);
    ActionError::validation(errors, operation)
}
