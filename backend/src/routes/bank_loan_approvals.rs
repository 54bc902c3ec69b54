use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use shared::{
    CreateBankLoanApproval, LoanApprovalStatus, Resource,
    UpdateBankLoanApproval as UpdateBankLoanApprovalReq, Validate, WorkflowStep,
};
use std::sync::Arc;

use crate::db::{self, schema::bank_loan_approvals};
use crate::error::AppError;
use crate::models::{BankLoanApproval, NewBankLoanApproval, UpdateBankLoanApproval};
use crate::AppState;

use super::{non_blank, non_blank_patch, stored, workflow, AdminUser, RecordsQuery};

const STEP: WorkflowStep = WorkflowStep::LoanApproval;

pub(crate) fn to_shared_approval(a: BankLoanApproval) -> Result<shared::BankLoanApproval, AppError> {
    Ok(shared::BankLoanApproval {
        status: stored(
            &a.status,
            LoanApprovalStatus::from_key,
            "bank_loan_approvals.status",
        )?,
        id: a.id,
        customer_id: a.customer_id,
        bank_name: a.bank_name,
        branch: a.branch,
        loan_amount: a.loan_amount,
        interest_rate: a.interest_rate,
        tenure_months: a.tenure_months,
        reference_number: a.reference_number,
        approval_date: a.approval_date,
        remarks: a.remarks,
        created_at: a.created_at,
        updated_at: a.updated_at,
    })
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status_for(Resource::BankLoanApprovals)?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = bank_loan_approvals::table
        .order(bank_loan_approvals::created_at.desc())
        .select(BankLoanApproval::as_select())
        .into_boxed();
    if let Some(customer_id) = query.customer_id {
        q = q.filter(bank_loan_approvals::customer_id.eq(customer_id));
    }
    if let Some(status) = status {
        q = q.filter(bank_loan_approvals::status.eq(status));
    }
    let rows: Vec<BankLoanApproval> = q.load(&mut conn).await?;

    let all = rows
        .into_iter()
        .map(to_shared_approval)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(query.search(all)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let approval: BankLoanApproval = bank_loan_approvals::table
        .find(id)
        .select(BankLoanApproval::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Bank loan approval", id))?;

    Ok(Json(to_shared_approval(approval)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateBankLoanApproval>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_approval = NewBankLoanApproval {
        customer_id: payload.customer_id,
        bank_name: payload.bank_name.trim().to_string(),
        branch: non_blank(payload.branch),
        loan_amount: payload.loan_amount,
        interest_rate: payload.interest_rate,
        tenure_months: payload.tenure_months,
        reference_number: non_blank(payload.reference_number),
        approval_date: payload.approval_date,
        remarks: non_blank(payload.remarks),
        status: payload.status.key().to_string(),
    };

    let mut conn = db::conn(&state.pool).await?;
    let actor_id = admin.user_id;

    let approval = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                workflow::enter_step(conn, new_approval.customer_id, STEP, actor_id).await?;
                let approval: BankLoanApproval = diesel::insert_into(bank_loan_approvals::table)
                    .values(&new_approval)
                    .returning(BankLoanApproval::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(approval)
            }
            .scope_boxed()
        })
        .await?;

    Ok((StatusCode::CREATED, Json(to_shared_approval(approval)?)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(payload): Json<UpdateBankLoanApprovalReq>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changeset = UpdateBankLoanApproval {
        bank_name: payload.bank_name.map(|b| b.trim().to_string()),
        branch: non_blank_patch(payload.branch),
        loan_amount: payload.loan_amount,
        interest_rate: payload.interest_rate,
        tenure_months: payload.tenure_months,
        reference_number: non_blank_patch(payload.reference_number),
        approval_date: payload.approval_date,
        remarks: non_blank_patch(payload.remarks),
        status: payload.status.map(|s| s.key().to_string()),
        updated_at: Some(Utc::now()),
    };

    let mut conn = db::conn(&state.pool).await?;

    let approval: BankLoanApproval = diesel::update(bank_loan_approvals::table.find(id))
        .set(&changeset)
        .returning(BankLoanApproval::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Bank loan approval", id))?;

    Ok(Json(to_shared_approval(approval)?))
}

/// Deleting an approval also removes its disbursements.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let deleted = diesel::delete(bank_loan_approvals::table.find(id))
        .execute(&mut conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::not_found("Bank loan approval", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approvals_file_the_loan_approval_step() {
        assert_eq!(Resource::BankLoanApprovals.step(), Some(STEP));
    }
}
