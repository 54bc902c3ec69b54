use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::search::Searchable;
use crate::subsidy::{PanelType, SubsidyEstimate};
use crate::validate::{self as v, Validate, ValidationError};
use crate::workflow::WorkflowStep;
use crate::{
    DeliveryStatus, DisbursementStatus, ExecutionStatus, LoanApprovalStatus, MeterStatus,
    MeterType, PartnerRole, PortalStatus, Role, SubsidyStatus, SurveyStatus,
};

// ============================================================================
// Domain Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub district: String,
    pub state: String,
    pub consumer_number: Option<String>,
    pub discom: Option<String>,
    pub proposed_capacity_kw: Option<f64>,
    pub panel_type: Option<PanelType>,
    pub partner_code: Option<String>,
    pub current_step: WorkflowStep,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Subsidy estimate for the proposed system, when enough is known.
    pub fn estimate(&self) -> Option<SubsidyEstimate> {
        crate::subsidy::estimate(self.proposed_capacity_kw?, self.panel_type?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i32,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub address: Option<String>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub role: PartnerRole,
    pub phone: String,
    pub district: Option<String>,
    pub parent_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSurvey {
    pub id: i32,
    pub customer_id: i32,
    pub surveyor_name: String,
    pub survey_date: NaiveDate,
    pub roof_type: String,
    pub roof_area_sqft: Option<f64>,
    pub shadow_free: bool,
    pub recommended_capacity_kw: Option<f64>,
    pub remarks: Option<String>,
    pub status: SurveyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankLoanApproval {
    pub id: i32,
    pub customer_id: i32,
    pub bank_name: String,
    pub branch: Option<String>,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub tenure_months: i32,
    pub reference_number: Option<String>,
    pub approval_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub status: LoanApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDisbursement {
    pub id: i32,
    pub customer_id: i32,
    pub loan_approval_id: i32,
    pub amount: f64,
    pub disbursement_date: NaiveDate,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
    pub status: DisbursementStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodsDelivery {
    pub id: i32,
    pub customer_id: i32,
    pub vendor_id: i32,
    pub purchase_order_id: String,
    pub items: String,
    pub delivery_date: Option<NaiveDate>,
    pub received_by: Option<String>,
    pub remarks: Option<String>,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteExecutionOrder {
    pub id: i32,
    pub customer_id: i32,
    pub vendor_id: i32,
    pub order_number: String,
    pub crew_lead: String,
    pub scheduled_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub status: ExecutionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterInstallationReport {
    pub id: i32,
    pub customer_id: i32,
    pub meter_number: String,
    pub meter_type: MeterType,
    pub installation_date: NaiveDate,
    pub discom: Option<String>,
    pub remarks: Option<String>,
    pub status: MeterStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalSubmissionReport {
    pub id: i32,
    pub customer_id: i32,
    pub application_number: String,
    pub submission_date: NaiveDate,
    pub remarks: Option<String>,
    pub status: PortalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyDisbursementReport {
    pub id: i32,
    pub customer_id: i32,
    pub amount: f64,
    pub disbursement_date: Option<NaiveDate>,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
    pub status: SubsidyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub id: i32,
    pub customer_id: i32,
    pub step: WorkflowStep,
    pub changed_by_id: i32,
    pub changed_at: DateTime<Utc>,
    pub comment: Option<String>,
}

// ============================================================================
// Search
// ============================================================================

impl Searchable for Customer {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.phone.as_str(),
            self.district.as_str(),
            self.address.as_str(),
        ];
        fields.extend(self.email.as_deref());
        fields.extend(self.consumer_number.as_deref());
        fields.extend(self.partner_code.as_deref());
        fields
    }
}

impl Searchable for Vendor {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.phone.as_str()];
        fields.extend(self.contact_person.as_deref());
        fields.extend(self.gstin.as_deref());
        fields
    }
}

impl Searchable for Partner {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.code.as_str(), self.name.as_str()];
        fields.extend(self.district.as_deref());
        fields
    }
}

impl Searchable for SiteSurvey {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.surveyor_name.as_str(), self.roof_type.as_str()];
        fields.extend(self.remarks.as_deref());
        fields
    }
}

impl Searchable for BankLoanApproval {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.bank_name.as_str()];
        fields.extend(self.branch.as_deref());
        fields.extend(self.reference_number.as_deref());
        fields
    }
}

impl Searchable for LoanDisbursement {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        fields.extend(self.transaction_reference.as_deref());
        fields.extend(self.remarks.as_deref());
        fields
    }
}

impl Searchable for GoodsDelivery {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.purchase_order_id.as_str(), self.items.as_str()];
        fields.extend(self.received_by.as_deref());
        fields
    }
}

impl Searchable for SiteExecutionOrder {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.order_number.as_str(), self.crew_lead.as_str()];
        fields.extend(self.remarks.as_deref());
        fields
    }
}

impl Searchable for MeterInstallationReport {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.meter_number.as_str()];
        fields.extend(self.discom.as_deref());
        fields.extend(self.remarks.as_deref());
        fields
    }
}

impl Searchable for PortalSubmissionReport {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.application_number.as_str()];
        fields.extend(self.remarks.as_deref());
        fields
    }
}

impl Searchable for SubsidyDisbursementReport {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        fields.extend(self.transaction_reference.as_deref());
        fields.extend(self.remarks.as_deref());
        fields
    }
}

// ============================================================================
// API Request Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub district: String,
    pub state: String,
    pub consumer_number: Option<String>,
    pub discom: Option<String>,
    pub proposed_capacity_kw: Option<f64>,
    pub panel_type: Option<PanelType>,
    pub partner_code: Option<String>,
}

impl Validate for CreateCustomer {
    fn validate(&self) -> Result<(), ValidationError> {
        v::required("name", &self.name)?;
        v::phone("phone", &self.phone)?;
        v::optional_text(self.email.as_deref(), |e| v::email("email", e))?;
        v::required("address", &self.address)?;
        v::required("district", &self.district)?;
        v::required("state", &self.state)?;
        v::optional(self.proposed_capacity_kw.as_ref(), |kw| {
            v::capacity_kw("proposed_capacity_kw", *kw)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub email: Option<Option<String>>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub consumer_number: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub discom: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub proposed_capacity_kw: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub panel_type: Option<Option<PanelType>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub partner_code: Option<Option<String>>,
}

impl Validate for UpdateCustomer {
    fn validate(&self) -> Result<(), ValidationError> {
        v::optional(self.name.as_deref(), |n| v::required("name", n))?;
        v::optional(self.phone.as_deref(), |p| v::phone("phone", p))?;
        v::optional_text(self.email.as_ref().and_then(|e| e.as_deref()), |e| {
            v::email("email", e)
        })?;
        v::optional(self.address.as_deref(), |a| v::required("address", a))?;
        v::optional(self.district.as_deref(), |d| v::required("district", d))?;
        v::optional(self.state.as_deref(), |s| v::required("state", s))?;
        v::optional(self.proposed_capacity_kw.flatten().as_ref(), |kw| {
            v::capacity_kw("proposed_capacity_kw", *kw)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceStep {
    pub step: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVendor {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub address: Option<String>,
}

impl Validate for CreateVendor {
    fn validate(&self) -> Result<(), ValidationError> {
        v::required("name", &self.name)?;
        v::phone("phone", &self.phone)?;
        v::optional_text(self.email.as_deref(), |e| v::email("email", e))?;
        v::optional_text(self.gstin.as_deref(), |g| v::gstin("gstin", g))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateVendor {
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub contact_person: Option<Option<String>>,
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub gstin: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub address: Option<Option<String>>,
    pub archived: Option<bool>,
}

impl Validate for UpdateVendor {
    fn validate(&self) -> Result<(), ValidationError> {
        v::optional(self.name.as_deref(), |n| v::required("name", n))?;
        v::optional(self.phone.as_deref(), |p| v::phone("phone", p))?;
        v::optional_text(self.email.as_ref().and_then(|e| e.as_deref()), |e| {
            v::email("email", e)
        })?;
        v::optional_text(self.gstin.as_ref().and_then(|g| g.as_deref()), |g| {
            v::gstin("gstin", g)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSiteSurvey {
    pub customer_id: i32,
    pub surveyor_name: String,
    pub survey_date: NaiveDate,
    pub roof_type: String,
    pub roof_area_sqft: Option<f64>,
    #[serde(default)]
    pub shadow_free: bool,
    pub recommended_capacity_kw: Option<f64>,
    pub remarks: Option<String>,
    pub status: SurveyStatus,
}

impl Validate for CreateSiteSurvey {
    fn validate(&self) -> Result<(), ValidationError> {
        v::required("surveyor_name", &self.surveyor_name)?;
        v::required("roof_type", &self.roof_type)?;
        v::optional(self.roof_area_sqft.as_ref(), |a| {
            v::positive("roof_area_sqft", *a)
        })?;
        v::optional(self.recommended_capacity_kw.as_ref(), |kw| {
            v::capacity_kw("recommended_capacity_kw", *kw)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSiteSurvey {
    pub surveyor_name: Option<String>,
    pub survey_date: Option<NaiveDate>,
    pub roof_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub roof_area_sqft: Option<Option<f64>>,
    pub shadow_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub recommended_capacity_kw: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub remarks: Option<Option<String>>,
    pub status: Option<SurveyStatus>,
}

impl Validate for UpdateSiteSurvey {
    fn validate(&self) -> Result<(), ValidationError> {
        v::optional(self.surveyor_name.as_deref(), |s| {
            v::required("surveyor_name", s)
        })?;
        v::optional(self.roof_type.as_deref(), |r| v::required("roof_type", r))?;
        v::optional(self.roof_area_sqft.flatten().as_ref(), |a| {
            v::positive("roof_area_sqft", *a)
        })?;
        v::optional(self.recommended_capacity_kw.flatten().as_ref(), |kw| {
            v::capacity_kw("recommended_capacity_kw", *kw)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBankLoanApproval {
    pub customer_id: i32,
    pub bank_name: String,
    pub branch: Option<String>,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub tenure_months: i32,
    pub reference_number: Option<String>,
    pub approval_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub status: LoanApprovalStatus,
}

impl Validate for CreateBankLoanApproval {
    fn validate(&self) -> Result<(), ValidationError> {
        v::required("bank_name", &self.bank_name)?;
        v::positive("loan_amount", self.loan_amount)?;
        v::percentage("interest_rate", self.interest_rate)?;
        v::in_range("tenure_months", self.tenure_months, 1, 360)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBankLoanApproval {
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub branch: Option<Option<String>>,
    pub loan_amount: Option<f64>,
    pub interest_rate: Option<f64>,
    pub tenure_months: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub reference_number: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub approval_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub remarks: Option<Option<String>>,
    pub status: Option<LoanApprovalStatus>,
}

impl Validate for UpdateBankLoanApproval {
    fn validate(&self) -> Result<(), ValidationError> {
        v::optional(self.bank_name.as_deref(), |b| v::required("bank_name", b))?;
        v::optional(self.loan_amount.as_ref(), |a| v::positive("loan_amount", *a))?;
        v::optional(self.interest_rate.as_ref(), |r| {
            v::percentage("interest_rate", *r)
        })?;
        v::optional(self.tenure_months.as_ref(), |t| {
            v::in_range("tenure_months", *t, 1, 360)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLoanDisbursement {
    pub customer_id: i32,
    pub loan_approval_id: i32,
    pub amount: f64,
    pub disbursement_date: NaiveDate,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
    pub status: DisbursementStatus,
}

impl Validate for CreateLoanDisbursement {
    fn validate(&self) -> Result<(), ValidationError> {
        v::positive("amount", self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateLoanDisbursement {
    pub amount: Option<f64>,
    pub disbursement_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub transaction_reference: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub remarks: Option<Option<String>>,
    pub status: Option<DisbursementStatus>,
}

impl Validate for UpdateLoanDisbursement {
    fn validate(&self) -> Result<(), ValidationError> {
        v::optional(self.amount.as_ref(), |a| v::positive("amount", *a))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGoodsDelivery {
    pub customer_id: i32,
    pub vendor_id: i32,
    pub purchase_order_id: String,
    pub items: String,
    pub delivery_date: Option<NaiveDate>,
    pub received_by: Option<String>,
    pub remarks: Option<String>,
    pub status: DeliveryStatus,
}

impl Validate for CreateGoodsDelivery {
    fn validate(&self) -> Result<(), ValidationError> {
        v::required("purchase_order_id", &self.purchase_order_id)?;
        if self.items.trim().is_empty() {
            return Err(ValidationError::new("items", "is required"));
        }
        if self.status == DeliveryStatus::Delivered && self.delivery_date.is_none() {
            return Err(ValidationError::new(
                "delivery_date",
                "is required once goods are delivered",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateGoodsDelivery {
    pub vendor_id: Option<i32>,
    pub purchase_order_id: Option<String>,
    pub items: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub delivery_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub received_by: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub remarks: Option<Option<String>>,
    pub status: Option<DeliveryStatus>,
}

impl Validate for UpdateGoodsDelivery {
    fn validate(&self) -> Result<(), ValidationError> {
        v::optional(self.purchase_order_id.as_deref(), |p| {
            v::required("purchase_order_id", p)
        })?;
        if matches!(self.items.as_deref(), Some(i) if i.trim().is_empty()) {
            return Err(ValidationError::new("items", "is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSiteExecutionOrder {
    pub customer_id: i32,
    pub vendor_id: i32,
    pub order_number: String,
    pub crew_lead: String,
    pub scheduled_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub status: ExecutionStatus,
}

impl Validate for CreateSiteExecutionOrder {
    fn validate(&self) -> Result<(), ValidationError> {
        v::required("order_number", &self.order_number)?;
        v::required("crew_lead", &self.crew_lead)?;
        if let Some(done) = self.completion_date {
            if done < self.scheduled_date {
                return Err(ValidationError::new(
                    "completion_date",
                    "cannot be before the scheduled date",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSiteExecutionOrder {
    pub vendor_id: Option<i32>,
    pub order_number: Option<String>,
    pub crew_lead: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub completion_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub remarks: Option<Option<String>>,
    pub status: Option<ExecutionStatus>,
}

impl Validate for UpdateSiteExecutionOrder {
    fn validate(&self) -> Result<(), ValidationError> {
        v::optional(self.order_number.as_deref(), |o| {
            v::required("order_number", o)
        })?;
        v::optional(self.crew_lead.as_deref(), |c| v::required("crew_lead", c))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMeterInstallationReport {
    pub customer_id: i32,
    pub meter_number: String,
    pub meter_type: MeterType,
    pub installation_date: NaiveDate,
    pub discom: Option<String>,
    pub remarks: Option<String>,
    pub status: MeterStatus,
}

impl Validate for CreateMeterInstallationReport {
    fn validate(&self) -> Result<(), ValidationError> {
        v::required("meter_number", &self.meter_number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMeterInstallationReport {
    pub meter_number: Option<String>,
    pub meter_type: Option<MeterType>,
    pub installation_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub discom: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub remarks: Option<Option<String>>,
    pub status: Option<MeterStatus>,
}

impl Validate for UpdateMeterInstallationReport {
    fn validate(&self) -> Result<(), ValidationError> {
        v::optional(self.meter_number.as_deref(), |m| {
            v::required("meter_number", m)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePortalSubmissionReport {
    pub customer_id: i32,
    pub application_number: String,
    pub submission_date: NaiveDate,
    pub remarks: Option<String>,
    pub status: PortalStatus,
}

impl Validate for CreatePortalSubmissionReport {
    fn validate(&self) -> Result<(), ValidationError> {
        v::required("application_number", &self.application_number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePortalSubmissionReport {
    pub application_number: Option<String>,
    pub submission_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub remarks: Option<Option<String>>,
    pub status: Option<PortalStatus>,
}

impl Validate for UpdatePortalSubmissionReport {
    fn validate(&self) -> Result<(), ValidationError> {
        v::optional(self.application_number.as_deref(), |a| {
            v::required("application_number", a)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSubsidyDisbursementReport {
    pub customer_id: i32,
    pub amount: f64,
    pub disbursement_date: Option<NaiveDate>,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
    pub status: SubsidyStatus,
}

impl Validate for CreateSubsidyDisbursementReport {
    fn validate(&self) -> Result<(), ValidationError> {
        v::positive("amount", self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSubsidyDisbursementReport {
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub disbursement_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub transaction_reference: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_with::rust::double_option")]
    pub remarks: Option<Option<String>>,
    pub status: Option<SubsidyStatus>,
}

impl Validate for UpdateSubsidyDisbursementReport {
    fn validate(&self) -> Result<(), ValidationError> {
        v::optional(self.amount.as_ref(), |a| v::positive("amount", *a))
    }
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn workflow_error(message: impl Into<String>) -> Self {
        Self::new("WORKFLOW_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub user_id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub estimate: Option<SubsidyEstimate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEventResponse {
    pub id: i32,
    pub customer_id: i32,
    pub customer_name: String,
    pub step: i32,
    pub step_label: String,
    pub changed_by_id: i32,
    pub changed_at: DateTime<Utc>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProgress {
    pub customer_id: i32,
    pub customer_name: String,
    pub current_step: i32,
    pub current_label: String,
    pub progress: f64,
    pub next_step: Option<i32>,
    pub next_label: Option<String>,
}

impl CustomerProgress {
    pub fn of(customer: &Customer) -> Self {
        let step = customer.current_step;
        let next = step.next();
        Self {
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            current_step: step.number(),
            current_label: step.as_str().to_string(),
            progress: step.progress(),
            next_step: next.map(|s| s.number()),
            next_label: next.map(|s| s.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCount {
    pub step: i32,
    pub label: String,
    pub customers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_customers: i64,
    pub steps: Vec<StepCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            id: 1,
            name: "Asha Patil".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            address: "12 MG Road".to_string(),
            district: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            consumer_number: Some("170012345678".to_string()),
            discom: Some("MSEDCL".to_string()),
            proposed_capacity_kw: Some(3.0),
            panel_type: Some(PanelType::Dcr),
            partner_code: None,
            current_step: WorkflowStep::SiteSurvey,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn customer_search_covers_optional_fields() {
        let c = customer();
        assert!(c.matches("asha"));
        assert!(c.matches("1700123"));
        assert!(!c.matches("nagpur"));
    }

    #[test]
    fn customer_estimate_needs_capacity_and_panel() {
        let mut c = customer();
        assert_eq!(c.estimate().map(|e| e.subsidy), Some(78_000.0));
        c.panel_type = None;
        assert_eq!(c.estimate(), None);
    }

    #[test]
    fn progress_reports_next_step() {
        let p = CustomerProgress::of(&customer());
        assert_eq!(p.current_step, 2);
        assert_eq!(p.next_step, Some(3));
        assert_eq!(p.next_label.as_deref(), Some("Feasibility Approval"));
    }

    #[test]
    fn create_customer_validation() {
        let mut req = CreateCustomer {
            name: "Asha".to_string(),
            phone: "98765 43210".to_string(),
            email: Some(String::new()),
            address: "12 MG Road".to_string(),
            district: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            consumer_number: None,
            discom: None,
            proposed_capacity_kw: Some(3.0),
            panel_type: Some(PanelType::Dcr),
            partner_code: None,
        };
        assert!(req.validate().is_ok());

        req.proposed_capacity_kw = Some(0.0);
        assert_eq!(req.validate().unwrap_err().field, "proposed_capacity_kw");

        req.proposed_capacity_kw = Some(1e305);
        let err = req.validate().unwrap_err();
        assert_eq!(err.field, "proposed_capacity_kw");
        assert!(err.message.contains("at most"));

        req.proposed_capacity_kw = Some(500.0);
        assert!(req.validate().is_ok());

        req.proposed_capacity_kw = None;
        req.phone = "123".to_string();
        assert_eq!(req.validate().unwrap_err().field, "phone");
    }

    #[test]
    fn delivered_goods_need_a_date() {
        let req = CreateGoodsDelivery {
            customer_id: 1,
            vendor_id: 1,
            purchase_order_id: "PO-1".to_string(),
            items: "6 x 540W panels".to_string(),
            delivery_date: None,
            received_by: None,
            remarks: None,
            status: DeliveryStatus::Delivered,
        };
        assert_eq!(req.validate().unwrap_err().field, "delivery_date");
    }

    #[test]
    fn completion_cannot_precede_schedule() {
        let req = CreateSiteExecutionOrder {
            customer_id: 1,
            vendor_id: 1,
            order_number: "SEO-1".to_string(),
            crew_lead: "Ravi".to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            completion_date: NaiveDate::from_ymd_opt(2026, 3, 9),
            remarks: None,
            status: ExecutionStatus::Completed,
        };
        assert_eq!(req.validate().unwrap_err().field, "completion_date");
    }

    #[test]
    fn loan_tenure_bounds() {
        let mut req = CreateBankLoanApproval {
            customer_id: 1,
            bank_name: "State Bank of India".to_string(),
            branch: None,
            loan_amount: 150_000.0,
            interest_rate: 7.0,
            tenure_months: 120,
            reference_number: None,
            approval_date: None,
            remarks: None,
            status: LoanApprovalStatus::Pending,
        };
        assert!(req.validate().is_ok());
        req.tenure_months = 0;
        assert_eq!(req.validate().unwrap_err().field, "tenure_months");
    }

    #[test]
    fn update_with_cleared_email_is_valid() {
        let req: UpdateCustomer = serde_json::from_str(r#"{"email": null}"#).unwrap();
        assert_eq!(req.email, Some(None));
        assert_eq!(req.name, None);
        assert!(req.validate().is_ok());
        let bad: UpdateCustomer = serde_json::from_str(r#"{"phone": "42"}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn untouched_fields_are_not_serialized() {
        let req: UpdateVendor = serde_json::from_str(r#"{"archived": true}"#).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("gstin").is_none());
        assert_eq!(json["archived"], true);
    }

    #[test]
    fn api_error_shape() {
        let json = serde_json::to_value(ApiError::workflow_error("nope")).unwrap();
        assert_eq!(json["error"]["code"], "WORKFLOW_ERROR");
        assert_eq!(json["error"]["message"], "nope");
    }
}
