use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use shared::{
    CreateLoanDisbursement, DisbursementStatus, LoanApprovalStatus, Resource,
    UpdateLoanDisbursement as UpdateLoanDisbursementReq, Validate, WorkflowStep,
};
use std::sync::Arc;

use crate::db::{self, schema::bank_loan_approvals, schema::loan_disbursements};
use crate::error::AppError;
use crate::models::{BankLoanApproval, LoanDisbursement, NewLoanDisbursement, UpdateLoanDisbursement};
use crate::AppState;

use super::{non_blank, non_blank_patch, stored, workflow, AdminUser, RecordsQuery};

const STEP: WorkflowStep = WorkflowStep::LoanDisbursement;

fn to_shared_disbursement(d: LoanDisbursement) -> Result<shared::LoanDisbursement, AppError> {
    Ok(shared::LoanDisbursement {
        status: stored(
            &d.status,
            DisbursementStatus::from_key,
            "loan_disbursements.status",
        )?,
        id: d.id,
        customer_id: d.customer_id,
        loan_approval_id: d.loan_approval_id,
        amount: d.amount,
        disbursement_date: d.disbursement_date,
        transaction_reference: d.transaction_reference,
        remarks: d.remarks,
        created_at: d.created_at,
        updated_at: d.updated_at,
    })
}

/// A disbursement must draw on an approved loan of the same customer.
fn check_approval(approval: &BankLoanApproval, customer_id: i32) -> Result<(), AppError> {
    if approval.customer_id != customer_id {
        return Err(AppError::BadRequest(format!(
            "loan_approval_id: approval {} belongs to another customer",
            approval.id
        )));
    }
    if approval.status != LoanApprovalStatus::Approved.key() {
        return Err(AppError::BadRequest(format!(
            "loan_approval_id: approval {} is not approved",
            approval.id
        )));
    }
    Ok(())
}

async fn approval_for(
    conn: &mut AsyncPgConnection,
    approval_id: i32,
    customer_id: i32,
) -> Result<(), AppError> {
    let approval: BankLoanApproval = bank_loan_approvals::table
        .find(approval_id)
        .select(BankLoanApproval::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "loan_approval_id: approval {} does not exist",
                approval_id
            ))
        })?;
    check_approval(&approval, customer_id)
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status_for(Resource::LoanDisbursements)?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = loan_disbursements::table
        .order(loan_disbursements::disbursement_date.desc())
        .select(LoanDisbursement::as_select())
        .into_boxed();
    if let Some(customer_id) = query.customer_id {
        q = q.filter(loan_disbursements::customer_id.eq(customer_id));
    }
    if let Some(status) = status {
        q = q.filter(loan_disbursements::status.eq(status));
    }
    let rows: Vec<LoanDisbursement> = q.load(&mut conn).await?;

    let all = rows
        .into_iter()
        .map(to_shared_disbursement)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(query.search(all)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let disbursement: LoanDisbursement = loan_disbursements::table
        .find(id)
        .select(LoanDisbursement::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Loan disbursement", id))?;

    Ok(Json(to_shared_disbursement(disbursement)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateLoanDisbursement>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_disbursement = NewLoanDisbursement {
        customer_id: payload.customer_id,
        loan_approval_id: payload.loan_approval_id,
        amount: payload.amount,
        disbursement_date: payload.disbursement_date,
        transaction_reference: non_blank(payload.transaction_reference),
        remarks: non_blank(payload.remarks),
        status: payload.status.key().to_string(),
    };

    let mut conn = db::conn(&state.pool).await?;
    let actor_id = admin.user_id;

    let disbursement = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                let customer_id = new_disbursement.customer_id;
                workflow::enter_step(conn, customer_id, STEP, actor_id).await?;
                approval_for(conn, new_disbursement.loan_approval_id, customer_id).await?;
                let disbursement: LoanDisbursement = diesel::insert_into(loan_disbursements::table)
                    .values(&new_disbursement)
                    .returning(LoanDisbursement::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(disbursement)
            }
            .scope_boxed()
        })
        .await?;

    Ok((StatusCode::CREATED, Json(to_shared_disbursement(disbursement)?)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(payload): Json<UpdateLoanDisbursementReq>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changeset = UpdateLoanDisbursement {
        amount: payload.amount,
        disbursement_date: payload.disbursement_date,
        transaction_reference: non_blank_patch(payload.transaction_reference),
        remarks: non_blank_patch(payload.remarks),
        status: payload.status.map(|s| s.key().to_string()),
        updated_at: Some(Utc::now()),
    };

    let mut conn = db::conn(&state.pool).await?;

    let disbursement: LoanDisbursement = diesel::update(loan_disbursements::table.find(id))
        .set(&changeset)
        .returning(LoanDisbursement::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Loan disbursement", id))?;

    Ok(Json(to_shared_disbursement(disbursement)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let deleted = diesel::delete(loan_disbursements::table.find(id))
        .execute(&mut conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::not_found("Loan disbursement", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approval(customer_id: i32, status: LoanApprovalStatus) -> BankLoanApproval {
        BankLoanApproval {
            id: 3,
            customer_id,
            bank_name: "Bank of Maharashtra".to_string(),
            branch: None,
            loan_amount: 120_000.0,
            interest_rate: 7.0,
            tenure_months: 84,
            reference_number: None,
            approval_date: None,
            remarks: None,
            status: status.key().to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn disbursements_file_the_loan_disbursement_step() {
        assert_eq!(Resource::LoanDisbursements.step(), Some(STEP));
    }

    #[test]
    fn approval_must_be_approved_and_match_customer() {
        assert!(check_approval(&approval(1, LoanApprovalStatus::Approved), 1).is_ok());
        assert!(check_approval(&approval(2, LoanApprovalStatus::Approved), 1).is_err());
        assert!(check_approval(&approval(1, LoanApprovalStatus::Pending), 1).is_err());
    }
}
