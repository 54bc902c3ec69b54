use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::db::schema::*;

// ============================================================================
// Customer
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = customers)]
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
    pub panel_type: Option<String>,
    pub partner_code: Option<String>,
    pub current_step: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub district: String,
    pub state: String,
    pub consumer_number: Option<String>,
    pub discom: Option<String>,
    pub proposed_capacity_kw: Option<f64>,
    pub panel_type: Option<String>,
    pub partner_code: Option<String>,
    pub current_step: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = customers)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub consumer_number: Option<Option<String>>,
    pub discom: Option<Option<String>>,
    pub proposed_capacity_kw: Option<Option<f64>>,
    pub panel_type: Option<Option<String>>,
    pub partner_code: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Vendor
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = vendors)]
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

#[derive(Debug, Insertable)]
#[diesel(table_name = vendors)]
pub struct NewVendor {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = vendors)]
pub struct UpdateVendor {
    pub name: Option<String>,
    pub contact_person: Option<Option<String>>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub gstin: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub archived: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Partner
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = partners)]
pub struct Partner {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub role: String,
    pub phone: String,
    pub district: Option<String>,
    pub parent_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// SiteSurvey
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = site_surveys)]
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
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = site_surveys)]
pub struct NewSiteSurvey {
    pub customer_id: i32,
    pub surveyor_name: String,
    pub survey_date: NaiveDate,
    pub roof_type: String,
    pub roof_area_sqft: Option<f64>,
    pub shadow_free: bool,
    pub recommended_capacity_kw: Option<f64>,
    pub remarks: Option<String>,
    pub status: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = site_surveys)]
pub struct UpdateSiteSurvey {
    pub surveyor_name: Option<String>,
    pub survey_date: Option<NaiveDate>,
    pub roof_type: Option<String>,
    pub roof_area_sqft: Option<Option<f64>>,
    pub shadow_free: Option<bool>,
    pub recommended_capacity_kw: Option<Option<f64>>,
    pub remarks: Option<Option<String>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// BankLoanApproval
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bank_loan_approvals)]
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
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = bank_loan_approvals)]
pub struct NewBankLoanApproval {
    pub customer_id: i32,
    pub bank_name: String,
    pub branch: Option<String>,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub tenure_months: i32,
    pub reference_number: Option<String>,
    pub approval_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub status: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = bank_loan_approvals)]
pub struct UpdateBankLoanApproval {
    pub bank_name: Option<String>,
    pub branch: Option<Option<String>>,
    pub loan_amount: Option<f64>,
    pub interest_rate: Option<f64>,
    pub tenure_months: Option<i32>,
    pub reference_number: Option<Option<String>>,
    pub approval_date: Option<Option<NaiveDate>>,
    pub remarks: Option<Option<String>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// LoanDisbursement
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = loan_disbursements)]
pub struct LoanDisbursement {
    pub id: i32,
    pub customer_id: i32,
    pub loan_approval_id: i32,
    pub amount: f64,
    pub disbursement_date: NaiveDate,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = loan_disbursements)]
pub struct NewLoanDisbursement {
    pub customer_id: i32,
    pub loan_approval_id: i32,
    pub amount: f64,
    pub disbursement_date: NaiveDate,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = loan_disbursements)]
pub struct UpdateLoanDisbursement {
    pub amount: Option<f64>,
    pub disbursement_date: Option<NaiveDate>,
    pub transaction_reference: Option<Option<String>>,
    pub remarks: Option<Option<String>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// GoodsDelivery
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = goods_deliveries)]
pub struct GoodsDelivery {
    pub id: i32,
    pub customer_id: i32,
    pub vendor_id: i32,
    pub purchase_order_id: String,
    pub items: String,
    pub delivery_date: Option<NaiveDate>,
    pub received_by: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = goods_deliveries)]
pub struct NewGoodsDelivery {
    pub customer_id: i32,
    pub vendor_id: i32,
    pub purchase_order_id: String,
    pub items: String,
    pub delivery_date: Option<NaiveDate>,
    pub received_by: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = goods_deliveries)]
pub struct UpdateGoodsDelivery {
    pub vendor_id: Option<i32>,
    pub purchase_order_id: Option<String>,
    pub items: Option<String>,
    pub delivery_date: Option<Option<NaiveDate>>,
    pub received_by: Option<Option<String>>,
    pub remarks: Option<Option<String>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// SiteExecutionOrder
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = site_execution_orders)]
pub struct SiteExecutionOrder {
    pub id: i32,
    pub customer_id: i32,
    pub vendor_id: i32,
    pub order_number: String,
    pub crew_lead: String,
    pub scheduled_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = site_execution_orders)]
pub struct NewSiteExecutionOrder {
    pub customer_id: i32,
    pub vendor_id: i32,
    pub order_number: String,
    pub crew_lead: String,
    pub scheduled_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub status: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = site_execution_orders)]
pub struct UpdateSiteExecutionOrder {
    pub vendor_id: Option<i32>,
    pub order_number: Option<String>,
    pub crew_lead: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub completion_date: Option<Option<NaiveDate>>,
    pub remarks: Option<Option<String>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// MeterInstallationReport
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = meter_installation_reports)]
pub struct MeterInstallationReport {
    pub id: i32,
    pub customer_id: i32,
    pub meter_number: String,
    pub meter_type: String,
    pub installation_date: NaiveDate,
    pub discom: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = meter_installation_reports)]
pub struct NewMeterInstallationReport {
    pub customer_id: i32,
    pub meter_number: String,
    pub meter_type: String,
    pub installation_date: NaiveDate,
    pub discom: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = meter_installation_reports)]
pub struct UpdateMeterInstallationReport {
    pub meter_number: Option<String>,
    pub meter_type: Option<String>,
    pub installation_date: Option<NaiveDate>,
    pub discom: Option<Option<String>>,
    pub remarks: Option<Option<String>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// PortalSubmissionReport
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = portal_submission_reports)]
pub struct PortalSubmissionReport {
    pub id: i32,
    pub customer_id: i32,
    pub application_number: String,
    pub submission_date: NaiveDate,
    pub remarks: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = portal_submission_reports)]
pub struct NewPortalSubmissionReport {
    pub customer_id: i32,
    pub application_number: String,
    pub submission_date: NaiveDate,
    pub remarks: Option<String>,
    pub status: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = portal_submission_reports)]
pub struct UpdatePortalSubmissionReport {
    pub application_number: Option<String>,
    pub submission_date: Option<NaiveDate>,
    pub remarks: Option<Option<String>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// SubsidyDisbursementReport
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = subsidy_disbursement_reports)]
pub struct SubsidyDisbursementReport {
    pub id: i32,
    pub customer_id: i32,
    pub amount: f64,
    pub disbursement_date: Option<NaiveDate>,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = subsidy_disbursement_reports)]
pub struct NewSubsidyDisbursementReport {
    pub customer_id: i32,
    pub amount: f64,
    pub disbursement_date: Option<NaiveDate>,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = subsidy_disbursement_reports)]
pub struct UpdateSubsidyDisbursementReport {
    pub amount: Option<f64>,
    pub disbursement_date: Option<Option<NaiveDate>>,
    pub transaction_reference: Option<Option<String>>,
    pub remarks: Option<Option<String>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// WorkflowEvent
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = workflow_events)]
pub struct WorkflowEvent {
    pub id: i32,
    pub customer_id: i32,
    pub step: i32,
    pub changed_by_id: i32,
    pub changed_at: DateTime<Utc>,
    pub comment: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = workflow_events)]
pub struct NewWorkflowEvent {
    pub customer_id: i32,
    pub step: i32,
    pub changed_by_id: i32,
    pub comment: Option<String>,
}
