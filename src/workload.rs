//! Capacity check for application assignments.
//!
//! A master's workload is the sum of complexity over its pending applications.
//! A pending application may only be written when it keeps that sum strictly
//! below [`WORKLOAD_THRESHOLD`].

use uuid::Uuid;

use crate::models::{ApplicationState, ApplicationStatus};

/// Pending complexity a master must stay strictly below.
pub const WORKLOAD_THRESHOLD: i64 = 21;

/// Message returned when an application would overload its master.
pub const CAPACITY_EXCEEDED: &str = "Reduce complexity, master is not omnipotent";

/// The application fields being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal {
    pub master_id: Uuid,
    pub complexity: i64,
    pub status: ApplicationStatus,
}

/// Outcome of a capacity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityDecision {
    Accept,
    Reject {
        /// Workload the proposal would have produced.
        projected: i64,
        message: String,
    },
}

impl CapacityDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Decide whether `proposal` fits under its master's capacity.
///
/// `current_workload` is the master's stored pending complexity sum. For
/// updates, `prior` is the application as it was before this write. When the
/// application stays with the same master and keeps its status, its prior
/// complexity is already part of `current_workload` and is taken out before
/// the new complexity is added.
///
/// When the master changes, only the new master's stored sum is inspected.
/// The application is not yet counted there, and the old master's sum drops
/// on its own because workloads are recomputed from rows.
pub fn evaluate_capacity(
    current_workload: i64,
    proposal: &Proposal,
    prior: Option<&ApplicationState>,
) -> CapacityDecision {
    let mut workload = current_workload;

    if let Some(prior) = prior {
        if prior.master_id == proposal.master_id && prior.status == proposal.status {
            workload -= prior.complexity;
        }
    }

    let projected = workload + proposal.complexity;
    if proposal.status == ApplicationStatus::Pending && projected >= WORKLOAD_THRESHOLD {
        return CapacityDecision::Reject {
            projected,
            message: CAPACITY_EXCEEDED.to_string(),
        };
    }

    CapacityDecision::Accept
}

/// Largest complexity a new pending application could carry for a master at
/// `workload`.
pub fn remaining_capacity(workload: i64) -> i64 {
    (WORKLOAD_THRESHOLD - 1 - workload).max(0)
}
