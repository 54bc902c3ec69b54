use serde::{Deserialize, Serialize};

use crate::{
    BadgeTone, DeliveryStatus, DisbursementStatus, ExecutionStatus, LoanApprovalStatus,
    MeterStatus, PortalStatus, SubsidyStatus, SurveyStatus, WorkflowStep,
};

/// Collections served under `/api/admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Customers,
    Vendors,
    SiteSurveys,
    BankLoanApprovals,
    LoanDisbursements,
    GoodsDeliveries,
    SiteExecutionOrders,
    MeterInstallationReports,
    PortalSubmissionReports,
    SubsidyDisbursementReports,
}

impl Resource {
    pub fn all() -> &'static [Resource] {
        &[
            Resource::Customers,
            Resource::Vendors,
            Resource::SiteSurveys,
            Resource::BankLoanApprovals,
            Resource::LoanDisbursements,
            Resource::GoodsDeliveries,
            Resource::SiteExecutionOrders,
            Resource::MeterInstallationReports,
            Resource::PortalSubmissionReports,
            Resource::SubsidyDisbursementReports,
        ]
    }

    /// Path segment after `/api/admin/`.
    pub fn slug(&self) -> &'static str {
        match self {
            Resource::Customers => "customers",
            Resource::Vendors => "vendors",
            Resource::SiteSurveys => "site-surveys",
            Resource::BankLoanApprovals => "bank-loan-approvals",
            Resource::LoanDisbursements => "loan-disbursements",
            Resource::GoodsDeliveries => "goods-deliveries",
            Resource::SiteExecutionOrders => "site-execution-orders",
            Resource::MeterInstallationReports => "meter-installation-reports",
            Resource::PortalSubmissionReports => "portal-submission-reports",
            Resource::SubsidyDisbursementReports => "subsidy-disbursement-reports",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Resource> {
        Self::all().iter().copied().find(|r| r.slug() == slug)
    }

    pub fn collection_path(&self) -> String {
        format!("/api/admin/{}", self.slug())
    }

    pub fn item_path(&self, id: i32) -> String {
        format!("/api/admin/{}/{}", self.slug(), id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Resource::Customers => "Customers",
            Resource::Vendors => "Vendors",
            Resource::SiteSurveys => "Site Surveys",
            Resource::BankLoanApprovals => "Bank Loan Approvals",
            Resource::LoanDisbursements => "Loan Disbursements",
            Resource::GoodsDeliveries => "Goods Deliveries",
            Resource::SiteExecutionOrders => "Site Execution Orders",
            Resource::MeterInstallationReports => "Meter Installation Reports",
            Resource::PortalSubmissionReports => "Portal Submission Reports",
            Resource::SubsidyDisbursementReports => "Subsidy Disbursement Reports",
        }
    }

    /// Workflow step a new record of this kind completes, if any.
    pub fn step(&self) -> Option<WorkflowStep> {
        match self {
            Resource::Customers | Resource::Vendors => None,
            Resource::SiteSurveys => Some(WorkflowStep::SiteSurvey),
            Resource::BankLoanApprovals => Some(WorkflowStep::LoanApproval),
            Resource::LoanDisbursements => Some(WorkflowStep::LoanDisbursement),
            Resource::GoodsDeliveries => Some(WorkflowStep::GoodsDelivery),
            Resource::SiteExecutionOrders => Some(WorkflowStep::SiteExecution),
            Resource::MeterInstallationReports => Some(WorkflowStep::MeterInstallation),
            Resource::PortalSubmissionReports => Some(WorkflowStep::PortalSubmission),
            Resource::SubsidyDisbursementReports => Some(WorkflowStep::SubsidyDisbursement),
        }
    }

    /// Label and tone for a stored status key of this resource.
    pub fn badge(&self, key: &str) -> Option<(&'static str, BadgeTone)> {
        fn pick<S: Copy>(
            s: Option<S>,
            label: fn(&S) -> &'static str,
            tone: fn(&S) -> BadgeTone,
        ) -> Option<(&'static str, BadgeTone)> {
            s.map(|s| (label(&s), tone(&s)))
        }

        match self {
            Resource::Customers | Resource::Vendors => None,
            Resource::SiteSurveys => pick(
                SurveyStatus::from_key(key),
                SurveyStatus::as_str,
                SurveyStatus::tone,
            ),
            Resource::BankLoanApprovals => pick(
                LoanApprovalStatus::from_key(key),
                LoanApprovalStatus::as_str,
                LoanApprovalStatus::tone,
            ),
            Resource::LoanDisbursements => pick(
                DisbursementStatus::from_key(key),
                DisbursementStatus::as_str,
                DisbursementStatus::tone,
            ),
            Resource::GoodsDeliveries => pick(
                DeliveryStatus::from_key(key),
                DeliveryStatus::as_str,
                DeliveryStatus::tone,
            ),
            Resource::SiteExecutionOrders => pick(
                ExecutionStatus::from_key(key),
                ExecutionStatus::as_str,
                ExecutionStatus::tone,
            ),
            Resource::MeterInstallationReports => pick(
                MeterStatus::from_key(key),
                MeterStatus::as_str,
                MeterStatus::tone,
            ),
            Resource::PortalSubmissionReports => pick(
                PortalStatus::from_key(key),
                PortalStatus::as_str,
                PortalStatus::tone,
            ),
            Resource::SubsidyDisbursementReports => pick(
                SubsidyStatus::from_key(key),
                SubsidyStatus::as_str,
                SubsidyStatus::tone,
            ),
        }
    }

    /// Status keys accepted for this resource, in display order.
    pub fn status_keys(&self) -> Vec<&'static str> {
        fn keys<S>(all: &[S], key: fn(&S) -> &'static str) -> Vec<&'static str> {
            all.iter().map(key).collect()
        }

        match self {
            Resource::Customers | Resource::Vendors => Vec::new(),
            Resource::SiteSurveys => keys(SurveyStatus::all(), SurveyStatus::key),
            Resource::BankLoanApprovals => keys(LoanApprovalStatus::all(), LoanApprovalStatus::key),
            Resource::LoanDisbursements => keys(DisbursementStatus::all(), DisbursementStatus::key),
            Resource::GoodsDeliveries => keys(DeliveryStatus::all(), DeliveryStatus::key),
            Resource::SiteExecutionOrders => keys(ExecutionStatus::all(), ExecutionStatus::key),
            Resource::MeterInstallationReports => keys(MeterStatus::all(), MeterStatus::key),
            Resource::PortalSubmissionReports => keys(PortalStatus::all(), PortalStatus::key),
            Resource::SubsidyDisbursementReports => keys(SubsidyStatus::all(), SubsidyStatus::key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for r in Resource::all() {
            assert_eq!(Resource::from_slug(r.slug()), Some(*r));
        }
        assert_eq!(Resource::from_slug("users"), None);
    }

    #[test]
    fn paths() {
        assert_eq!(
            Resource::GoodsDeliveries.collection_path(),
            "/api/admin/goods-deliveries"
        );
        assert_eq!(Resource::Vendors.item_path(7), "/api/admin/vendors/7");
    }

    #[test]
    fn every_status_key_has_a_badge() {
        for r in Resource::all() {
            for key in r.status_keys() {
                assert!(r.badge(key).is_some(), "{:?} {}", r, key);
            }
        }
        assert_eq!(
            Resource::SubsidyDisbursementReports.badge("credited"),
            Some(("Credited", BadgeTone::Success))
        );
        assert_eq!(Resource::SiteSurveys.badge("credited"), None);
    }

    #[test]
    fn record_resources_map_to_distinct_steps() {
        let mut steps: Vec<i32> = Resource::all()
            .iter()
            .filter_map(|r| r.step())
            .map(|s| s.number())
            .collect();
        let before = steps.len();
        steps.sort();
        steps.dedup();
        assert_eq!(steps.len(), before);
        assert_eq!(steps, vec![2, 6, 7, 8, 9, 11, 13, 14]);
    }
}
