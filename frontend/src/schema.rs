//! Declarative form and table layout for every admin collection.
//!
//! The generic resource page renders its table columns and dialog inputs from
//! these field lists, and turns the dialog's raw strings back into the JSON
//! payload the API expects.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use shared::{
    CreateBankLoanApproval, CreateCustomer, CreateGoodsDelivery, CreateLoanDisbursement,
    CreateMeterInstallationReport, CreatePortalSubmissionReport, CreateSiteExecutionOrder,
    CreateSiteSurvey, CreateSubsidyDisbursementReport, CreateVendor, MeterType, PanelType,
    Resource, UpdateBankLoanApproval, UpdateCustomer, UpdateGoodsDelivery,
    UpdateLoanDisbursement, UpdateMeterInstallationReport, UpdatePortalSubmissionReport,
    UpdateSiteExecutionOrder, UpdateSiteSurvey, UpdateSubsidyDisbursementReport, UpdateVendor,
    Validate,
};

/// Raw dialog input keyed by field name.
pub type FormState = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choices {
    /// The resource's own status keys.
    Status,
    PanelType,
    MeterType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    LongText,
    Phone,
    Email,
    Number,
    Integer,
    Date,
    Checkbox,
    Select(Choices),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Shown as a table column.
    pub listed: bool,
    /// Sent on create only; the API does not accept it on update.
    pub create_only: bool,
    /// Sent on update only.
    pub edit_only: bool,
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> Field {
    Field {
        key,
        label,
        kind,
        required: true,
        listed: false,
        create_only: false,
        edit_only: false,
    }
}

impl Field {
    const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    const fn listed(mut self) -> Self {
        self.listed = true;
        self
    }

    const fn create_only(mut self) -> Self {
        self.create_only = true;
        self
    }

    const fn edit_only(mut self) -> Self {
        self.edit_only = true;
        self
    }
}

use FieldKind::*;

const CUSTOMER_ID: Field = field("customer_id", "Customer ID", Integer).listed().create_only();
const REMARKS: Field = field("remarks", "Remarks", LongText).optional();
const STATUS: Field = field("status", "Status", Select(Choices::Status)).listed();

pub fn fields(resource: Resource) -> Vec<Field> {
    match resource {
        Resource::Customers => vec![
            field("name", "Name", Text).listed(),
            field("phone", "Phone", Phone).listed(),
            field("email", "Email", Email).optional(),
            field("address", "Address", LongText),
            field("district", "District", Text).listed(),
            field("state", "State", Text),
            field("consumer_number", "Consumer Number", Text).optional(),
            field("discom", "DISCOM", Text).optional(),
            field("proposed_capacity_kw", "Capacity (kW)", Number).optional().listed(),
            field("panel_type", "Panel Type", Select(Choices::PanelType)).optional(),
            field("partner_code", "Partner Code", Text).optional(),
        ],
        Resource::Vendors => vec![
            field("name", "Name", Text).listed(),
            field("contact_person", "Contact Person", Text).optional().listed(),
            field("phone", "Phone", Phone).listed(),
            field("email", "Email", Email).optional(),
            field("gstin", "GSTIN", Text).optional().listed(),
            field("address", "Address", LongText).optional(),
            field("archived", "Archived", Checkbox).edit_only(),
        ],
        Resource::SiteSurveys => vec![
            CUSTOMER_ID,
            field("surveyor_name", "Surveyor", Text).listed(),
            field("survey_date", "Survey Date", Date).listed(),
            field("roof_type", "Roof Type", Text),
            field("roof_area_sqft", "Roof Area (sq ft)", Number).optional(),
            field("shadow_free", "Shadow Free", Checkbox),
            field("recommended_capacity_kw", "Recommended kW", Number).optional().listed(),
            REMARKS,
            STATUS,
        ],
        Resource::BankLoanApprovals => vec![
            CUSTOMER_ID,
            field("bank_name", "Bank", Text).listed(),
            field("branch", "Branch", Text).optional(),
            field("loan_amount", "Loan Amount", Number).listed(),
            field("interest_rate", "Interest Rate (%)", Number),
            field("tenure_months", "Tenure (months)", Integer),
            field("reference_number", "Reference", Text).optional(),
            field("approval_date", "Approval Date", Date).optional().listed(),
            REMARKS,
            STATUS,
        ],
        Resource::LoanDisbursements => vec![
            CUSTOMER_ID,
            field("loan_approval_id", "Loan Approval ID", Integer).listed(),
            field("amount", "Amount", Number).listed(),
            field("disbursement_date", "Disbursement Date", Date).listed(),
            field("transaction_reference", "Transaction Ref", Text).optional(),
            REMARKS,
            STATUS,
        ],
        Resource::GoodsDeliveries => vec![
            CUSTOMER_ID,
            field("vendor_id", "Vendor ID", Integer).listed(),
            field("purchase_order_id", "Purchase Order", Text).listed(),
            field("items", "Items", LongText),
            field("delivery_date", "Delivery Date", Date).optional().listed(),
            field("received_by", "Received By", Text).optional(),
            REMARKS,
            STATUS,
        ],
        Resource::SiteExecutionOrders => vec![
            CUSTOMER_ID,
            field("vendor_id", "Vendor ID", Integer),
            field("order_number", "Order Number", Text).listed(),
            field("crew_lead", "Crew Lead", Text).listed(),
            field("scheduled_date", "Scheduled", Date).listed(),
            field("completion_date", "Completed", Date).optional(),
            REMARKS,
            STATUS,
        ],
        Resource::MeterInstallationReports => vec![
            CUSTOMER_ID,
            field("meter_number", "Meter Number", Text).listed(),
            field("meter_type", "Meter Type", Select(Choices::MeterType)).listed(),
            field("installation_date", "Installed On", Date).listed(),
            field("discom", "DISCOM", Text).optional(),
            REMARKS,
            STATUS,
        ],
        Resource::PortalSubmissionReports => vec![
            CUSTOMER_ID,
            field("application_number", "Application Number", Text).listed(),
            field("submission_date", "Submitted On", Date).listed(),
            REMARKS,
            STATUS,
        ],
        Resource::SubsidyDisbursementReports => vec![
            CUSTOMER_ID,
            field("amount", "Amount", Number).listed(),
            field("disbursement_date", "Disbursed On", Date).optional().listed(),
            field("transaction_reference", "Transaction Ref", Text).optional(),
            REMARKS,
            STATUS,
        ],
    }
}

/// `(key, label)` pairs for a select input.
pub fn choices(resource: Resource, choices: Choices) -> Vec<(&'static str, &'static str)> {
    match choices {
        Choices::Status => resource
            .status_keys()
            .into_iter()
            .map(|key| (key, resource.badge(key).map(|(label, _)| label).unwrap_or(key)))
            .collect(),
        Choices::PanelType => PanelType::all().iter().map(|p| (p.key(), p.as_str())).collect(),
        Choices::MeterType => MeterType::all().iter().map(|m| (m.key(), m.as_str())).collect(),
    }
}

/// Display text for a JSON cell.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => if *b { "Yes" } else { "No" }.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Prefill the dialog from a fetched record, or with defaults for a new one.
pub fn form_state(resource: Resource, record: Option<&Value>) -> FormState {
    fields(resource)
        .into_iter()
        .map(|f| {
            let raw = match record.and_then(|r| r.get(f.key)) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => match f.kind {
                    Checkbox => "false".to_string(),
                    Select(c) if f.required => choices(resource, c)
                        .first()
                        .map(|(k, _)| k.to_string())
                        .unwrap_or_default(),
                    _ => String::new(),
                },
                Some(other) => other.to_string(),
            };
            (f.key, raw)
        })
        .collect()
}

fn field_value(f: &Field, raw: &str) -> Result<Value, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return match f.kind {
            Checkbox => Ok(Value::Bool(false)),
            Text | LongText | Phone | Email if f.required => Ok(Value::String(String::new())),
            _ if f.required => Err(format!("{}: is required", f.key)),
            _ => Ok(Value::Null),
        };
    }
    match f.kind {
        Number => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("{}: must be a number", f.key)),
        Integer => raw
            .parse::<i32>()
            .map(Value::from)
            .map_err(|_| format!("{}: must be a whole number", f.key)),
        Checkbox => Ok(Value::Bool(raw == "true")),
        _ => Ok(Value::String(raw.to_string())),
    }
}

/// Build the request body for create (`editing == false`) or update.
pub fn payload(resource: Resource, form: &FormState, editing: bool) -> Result<Value, String> {
    let mut body = Map::new();
    for f in fields(resource) {
        if (editing && f.create_only) || (!editing && f.edit_only) {
            continue;
        }
        let raw = form.get(f.key).map(String::as_str).unwrap_or("");
        body.insert(f.key.to_string(), field_value(&f, raw)?);
    }
    let body = Value::Object(body);
    check(resource, &body, editing)?;
    Ok(body)
}

fn validate_as<T>(body: &Value) -> Result<(), String>
where
    T: Validate + serde::de::DeserializeOwned,
{
    let parsed: T = serde_json::from_value(body.clone()).map_err(|e| e.to_string())?;
    parsed.validate().map_err(|e| e.to_string())
}

/// Run the same checks the API applies before it writes.
fn check(resource: Resource, body: &Value, editing: bool) -> Result<(), String> {
    match (resource, editing) {
        (Resource::Customers, false) => validate_as::<CreateCustomer>(body),
        (Resource::Customers, true) => validate_as::<UpdateCustomer>(body),
        (Resource::Vendors, false) => validate_as::<CreateVendor>(body),
        (Resource::Vendors, true) => validate_as::<UpdateVendor>(body),
        (Resource::SiteSurveys, false) => validate_as::<CreateSiteSurvey>(body),
        (Resource::SiteSurveys, true) => validate_as::<UpdateSiteSurvey>(body),
        (Resource::BankLoanApprovals, false) => validate_as::<CreateBankLoanApproval>(body),
        (Resource::BankLoanApprovals, true) => validate_as::<UpdateBankLoanApproval>(body),
        (Resource::LoanDisbursements, false) => validate_as::<CreateLoanDisbursement>(body),
        (Resource::LoanDisbursements, true) => validate_as::<UpdateLoanDisbursement>(body),
        (Resource::GoodsDeliveries, false) => validate_as::<CreateGoodsDelivery>(body),
        (Resource::GoodsDeliveries, true) => validate_as::<UpdateGoodsDelivery>(body),
        (Resource::SiteExecutionOrders, false) => validate_as::<CreateSiteExecutionOrder>(body),
        (Resource::SiteExecutionOrders, true) => validate_as::<UpdateSiteExecutionOrder>(body),
        (Resource::MeterInstallationReports, false) => {
            validate_as::<CreateMeterInstallationReport>(body)
        }
        (Resource::MeterInstallationReports, true) => {
            validate_as::<UpdateMeterInstallationReport>(body)
        }
        (Resource::PortalSubmissionReports, false) => {
            validate_as::<CreatePortalSubmissionReport>(body)
        }
        (Resource::PortalSubmissionReports, true) => {
            validate_as::<UpdatePortalSubmissionReport>(body)
        }
        (Resource::SubsidyDisbursementReports, false) => {
            validate_as::<CreateSubsidyDisbursementReport>(body)
        }
        (Resource::SubsidyDisbursementReports, true) => {
            validate_as::<UpdateSubsidyDisbursementReport>(body)
        }
    }
}

/// Text the search box matches against.
pub fn search_text(resource: Resource, record: &Value) -> Vec<String> {
    fields(resource)
        .iter()
        .filter(|f| matches!(f.kind, Text | Phone | Email | LongText))
        .map(|f| cell_text(record.get(f.key)))
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled(resource: Resource, pairs: &[(&'static str, &str)]) -> FormState {
        let mut form = form_state(resource, None);
        for (k, v) in pairs {
            form.insert(k, v.to_string());
        }
        form
    }

    #[test]
    fn every_resource_has_a_listed_column() {
        for r in Resource::all() {
            assert!(fields(*r).iter().any(|f| f.listed), "{:?}", r);
        }
    }

    #[test]
    fn status_fields_follow_the_resource() {
        for r in Resource::all() {
            let has_status = fields(*r).iter().any(|f| f.key == "status");
            assert_eq!(has_status, !r.status_keys().is_empty(), "{:?}", r);
        }
    }

    #[test]
    fn new_forms_default_required_selects() {
        let form = form_state(Resource::PortalSubmissionReports, None);
        assert_eq!(form["status"], "submitted");
        let form = form_state(Resource::Customers, None);
        assert_eq!(form["panel_type"], "");
    }

    #[test]
    fn builds_a_valid_survey_payload() {
        let form = filled(
            Resource::SiteSurveys,
            &[
                ("customer_id", "12"),
                ("surveyor_name", "Ravi"),
                ("survey_date", "2026-02-14"),
                ("roof_type", "RCC"),
                ("roof_area_sqft", "450"),
                ("shadow_free", "true"),
            ],
        );
        let body = payload(Resource::SiteSurveys, &form, false).unwrap();
        assert_eq!(body["customer_id"], json!(12));
        assert_eq!(body["roof_area_sqft"], json!(450.0));
        assert_eq!(body["shadow_free"], json!(true));
        assert_eq!(body["recommended_capacity_kw"], Value::Null);
        assert_eq!(body["status"], json!("scheduled"));
    }

    #[test]
    fn reports_field_errors() {
        let form = filled(
            Resource::Customers,
            &[
                ("name", "Asha"),
                ("phone", "12345"),
                ("address", "Plot 4"),
                ("district", "Pune"),
                ("state", "Maharashtra"),
            ],
        );
        let err = payload(Resource::Customers, &form, false).unwrap_err();
        assert!(err.starts_with("phone"), "{}", err);

        let form = filled(Resource::LoanDisbursements, &[("customer_id", "x")]);
        let err = payload(Resource::LoanDisbursements, &form, false).unwrap_err();
        assert_eq!(err, "customer_id: must be a whole number");
    }

    #[test]
    fn edits_skip_create_only_fields_and_clear_blanks() {
        let record = json!({
            "id": 3,
            "customer_id": 9,
            "name": "Suryodaya Traders",
            "phone": "9876543210",
            "email": "sales@suryodaya.in",
            "archived": false,
        });
        let mut form = form_state(Resource::Vendors, Some(&record));
        assert_eq!(form["archived"], "false");
        form.insert("email", String::new());
        let body = payload(Resource::Vendors, &form, true).unwrap();
        assert_eq!(body["email"], Value::Null);
        assert_eq!(body["archived"], json!(false));

        let create = payload(Resource::Vendors, &form, false).unwrap();
        assert!(create.get("archived").is_none());
    }

    #[test]
    fn search_text_skips_numbers() {
        let record = json!({"name": "Asha", "phone": "9876543210", "proposed_capacity_kw": 3.0});
        let text = search_text(Resource::Customers, &record);
        assert_eq!(text, vec!["Asha".to_string(), "9876543210".to_string()]);
    }
}
