//! The fourteen-step customer workflow.
//!
//! A customer sits on exactly one step. Records that belong to a step may only
//! be filed once the previous step is reached, and manual advances move one
//! step at a time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BadgeTone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Registration,
    SiteSurvey,
    FeasibilityApproval,
    VendorSelection,
    LoanApplication,
    LoanApproval,
    LoanDisbursement,
    GoodsDelivery,
    SiteExecution,
    InstallationCommissioning,
    MeterInstallation,
    DiscomInspection,
    PortalSubmission,
    SubsidyDisbursement,
}

pub const FIRST_STEP: WorkflowStep = WorkflowStep::Registration;
pub const LAST_STEP: WorkflowStep = WorkflowStep::SubsidyDisbursement;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Step {0} does not exist; steps run from 1 to 14")]
    UnknownStep(i32),
    #[error("Cannot move from step {from} to step {to}; advance one step at a time")]
    NotNextStep { from: i32, to: i32 },
    #[error("Customer is already at the final step")]
    AlreadyComplete,
    #[error("{step} requires step {required} to be reached first (customer is at step {current})")]
    Prerequisite {
        step: &'static str,
        required: i32,
        current: i32,
    },
}

impl WorkflowStep {
    pub fn all() -> &'static [WorkflowStep] {
        &[
            WorkflowStep::Registration,
            WorkflowStep::SiteSurvey,
            WorkflowStep::FeasibilityApproval,
            WorkflowStep::VendorSelection,
            WorkflowStep::LoanApplication,
            WorkflowStep::LoanApproval,
            WorkflowStep::LoanDisbursement,
            WorkflowStep::GoodsDelivery,
            WorkflowStep::SiteExecution,
            WorkflowStep::InstallationCommissioning,
            WorkflowStep::MeterInstallation,
            WorkflowStep::DiscomInspection,
            WorkflowStep::PortalSubmission,
            WorkflowStep::SubsidyDisbursement,
        ]
    }

    /// One-based step number as shown to operators ("Step 1" .. "Step 14").
    pub fn number(&self) -> i32 {
        *self as i32 + 1
    }

    pub fn from_number(n: i32) -> Result<Self, WorkflowError> {
        if n < 1 {
            return Err(WorkflowError::UnknownStep(n));
        }
        Self::all()
            .get((n - 1) as usize)
            .copied()
            .ok_or(WorkflowError::UnknownStep(n))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::Registration => "Registration",
            WorkflowStep::SiteSurvey => "Site Survey",
            WorkflowStep::FeasibilityApproval => "Feasibility Approval",
            WorkflowStep::VendorSelection => "Vendor Selection",
            WorkflowStep::LoanApplication => "Loan Application",
            WorkflowStep::LoanApproval => "Loan Approval",
            WorkflowStep::LoanDisbursement => "Loan Disbursement",
            WorkflowStep::GoodsDelivery => "Goods Delivery",
            WorkflowStep::SiteExecution => "Site Execution",
            WorkflowStep::InstallationCommissioning => "Installation & Commissioning",
            WorkflowStep::MeterInstallation => "Meter Installation",
            WorkflowStep::DiscomInspection => "DISCOM Inspection",
            WorkflowStep::PortalSubmission => "Portal Submission",
            WorkflowStep::SubsidyDisbursement => "Subsidy Disbursement",
        }
    }

    pub fn next(&self) -> Option<WorkflowStep> {
        Self::from_number(self.number() + 1).ok()
    }

    pub fn tone(&self) -> BadgeTone {
        match self {
            WorkflowStep::Registration => BadgeTone::Neutral,
            WorkflowStep::SubsidyDisbursement => BadgeTone::Success,
            _ => BadgeTone::Info,
        }
    }

    /// Share of the workflow completed once this step is reached.
    pub fn progress(&self) -> f64 {
        self.number() as f64 / LAST_STEP.number() as f64
    }
}

/// Validate a manual advance from `current` to `target`.
pub fn check_advance(current: WorkflowStep, target: i32) -> Result<WorkflowStep, WorkflowError> {
    let target_step = WorkflowStep::from_number(target)?;
    let Some(next) = current.next() else {
        return Err(WorkflowError::AlreadyComplete);
    };
    if target_step != next {
        return Err(WorkflowError::NotNextStep {
            from: current.number(),
            to: target,
        });
    }
    Ok(target_step)
}

/// Validate filing a record that belongs to `step` and return the customer's
/// step afterwards. Earlier steps can always be filed again and never move the
/// customer backwards.
pub fn check_record(current: WorkflowStep, step: WorkflowStep) -> Result<WorkflowStep, WorkflowError> {
    let required = step.number() - 1;
    if current.number() < required {
        return Err(WorkflowError::Prerequisite {
            step: step.as_str(),
            required,
            current: current.number(),
        });
    }
    Ok(current.max(step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_run_one_to_fourteen() {
        assert_eq!(FIRST_STEP.number(), 1);
        assert_eq!(LAST_STEP.number(), 14);
        for (i, step) in WorkflowStep::all().iter().enumerate() {
            assert_eq!(step.number(), i as i32 + 1);
            assert_eq!(WorkflowStep::from_number(step.number()), Ok(*step));
        }
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        assert_eq!(
            WorkflowStep::from_number(0),
            Err(WorkflowError::UnknownStep(0))
        );
        assert_eq!(
            WorkflowStep::from_number(15),
            Err(WorkflowError::UnknownStep(15))
        );
    }

    #[test]
    fn advance_moves_exactly_one_step() {
        assert_eq!(
            check_advance(WorkflowStep::SiteSurvey, 3),
            Ok(WorkflowStep::FeasibilityApproval)
        );
        assert_eq!(
            check_advance(WorkflowStep::SiteSurvey, 4),
            Err(WorkflowError::NotNextStep { from: 2, to: 4 })
        );
        assert_eq!(
            check_advance(WorkflowStep::SiteSurvey, 1),
            Err(WorkflowError::NotNextStep { from: 2, to: 1 })
        );
        assert_eq!(
            check_advance(WorkflowStep::SiteSurvey, 2),
            Err(WorkflowError::NotNextStep { from: 2, to: 2 })
        );
    }

    #[test]
    fn cannot_advance_past_the_end() {
        assert_eq!(
            check_advance(LAST_STEP, 15),
            Err(WorkflowError::UnknownStep(15))
        );
        assert_eq!(
            check_advance(LAST_STEP, 14),
            Err(WorkflowError::AlreadyComplete)
        );
    }

    #[test]
    fn record_requires_previous_step() {
        assert_eq!(
            check_record(WorkflowStep::Registration, WorkflowStep::SiteSurvey),
            Ok(WorkflowStep::SiteSurvey)
        );
        let err = check_record(WorkflowStep::LoanApplication, WorkflowStep::LoanDisbursement);
        assert_eq!(
            err,
            Err(WorkflowError::Prerequisite {
                step: "Loan Disbursement",
                required: 6,
                current: 5,
            })
        );
    }

    #[test]
    fn earlier_record_never_moves_backwards() {
        assert_eq!(
            check_record(WorkflowStep::GoodsDelivery, WorkflowStep::SiteSurvey),
            Ok(WorkflowStep::GoodsDelivery)
        );
    }

    #[test]
    fn progress_reaches_one_at_the_end() {
        assert_eq!(LAST_STEP.progress(), 1.0);
        assert!(FIRST_STEP.progress() > 0.0);
        assert_eq!(LAST_STEP.next(), None);
        assert_eq!(LAST_STEP.tone(), BadgeTone::Success);
    }

    #[test]
    fn prerequisite_message_names_the_step() {
        let err = check_record(WorkflowStep::Registration, WorkflowStep::GoodsDelivery).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Goods Delivery requires step 7 to be reached first (customer is at step 1)"
        );
    }
}
