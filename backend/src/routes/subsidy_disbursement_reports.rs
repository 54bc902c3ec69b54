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
    CreateSubsidyDisbursementReport, Resource, SubsidyRates, SubsidyStatus,
    UpdateSubsidyDisbursementReport as UpdateSubsidyDisbursementReportReq, Validate,
    ValidationError, WorkflowStep,
};
use std::sync::Arc;

use crate::db::{self, schema::subsidy_disbursement_reports};
use crate::error::AppError;
use crate::models::{
    NewSubsidyDisbursementReport, SubsidyDisbursementReport, UpdateSubsidyDisbursementReport,
};
use crate::AppState;

use super::{non_blank, non_blank_patch, stored, workflow, AdminUser, RecordsQuery};

const STEP: WorkflowStep = WorkflowStep::SubsidyDisbursement;

fn to_shared_report(
    r: SubsidyDisbursementReport,
) -> Result<shared::SubsidyDisbursementReport, AppError> {
    Ok(shared::SubsidyDisbursementReport {
        status: stored(
            &r.status,
            SubsidyStatus::from_key,
            "subsidy_disbursement_reports.status",
        )?,
        id: r.id,
        customer_id: r.customer_id,
        amount: r.amount,
        disbursement_date: r.disbursement_date,
        transaction_reference: r.transaction_reference,
        remarks: r.remarks,
        created_at: r.created_at,
        updated_at: r.updated_at,
    })
}

/// The central subsidy is capped per household.
fn within_cap(amount: f64) -> Result<(), ValidationError> {
    let cap = SubsidyRates::default().max_subsidy;
    if amount > cap {
        return Err(ValidationError::new(
            "amount",
            format!("cannot exceed the subsidy cap of {}", cap),
        ));
    }
    Ok(())
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status_for(Resource::SubsidyDisbursementReports)?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = subsidy_disbursement_reports::table
        .order(subsidy_disbursement_reports::created_at.desc())
        .select(SubsidyDisbursementReport::as_select())
        .into_boxed();
    if let Some(customer_id) = query.customer_id {
        q = q.filter(subsidy_disbursement_reports::customer_id.eq(customer_id));
    }
    if let Some(status) = status {
        q = q.filter(subsidy_disbursement_reports::status.eq(status));
    }
    let rows: Vec<SubsidyDisbursementReport> = q.load(&mut conn).await?;

    let all = rows
        .into_iter()
        .map(to_shared_report)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(query.search(all)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let report: SubsidyDisbursementReport = subsidy_disbursement_reports::table
        .find(id)
        .select(SubsidyDisbursementReport::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Subsidy disbursement report", id))?;

    Ok(Json(to_shared_report(report)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateSubsidyDisbursementReport>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    within_cap(payload.amount)?;

    let new_report = NewSubsidyDisbursementReport {
        customer_id: payload.customer_id,
        amount: payload.amount,
        disbursement_date: payload.disbursement_date,
        transaction_reference: non_blank(payload.transaction_reference),
        remarks: non_blank(payload.remarks),
        status: payload.status.key().to_string(),
    };

    let mut conn = db::conn(&state.pool).await?;
    let actor_id = admin.user_id;

    let report = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                workflow::enter_step(conn, new_report.customer_id, STEP, actor_id).await?;
                let report: SubsidyDisbursementReport =
                    diesel::insert_into(subsidy_disbursement_reports::table)
                        .values(&new_report)
                        .returning(SubsidyDisbursementReport::as_returning())
                        .get_result(conn)
                        .await?;
                Ok(report)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(
        customer_id = report.customer_id,
        amount = report.amount,
        "subsidy disbursement recorded"
    );
    Ok((StatusCode::CREATED, Json(to_shared_report(report)?)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(payload): Json<UpdateSubsidyDisbursementReportReq>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if let Some(amount) = payload.amount {
        within_cap(amount)?;
    }

    let changeset = UpdateSubsidyDisbursementReport {
        amount: payload.amount,
        disbursement_date: payload.disbursement_date,
        transaction_reference: non_blank_patch(payload.transaction_reference),
        remarks: non_blank_patch(payload.remarks),
        status: payload.status.map(|s| s.key().to_string()),
        updated_at: Some(Utc::now()),
    };

    let mut conn = db::conn(&state.pool).await?;

    let report: SubsidyDisbursementReport =
        diesel::update(subsidy_disbursement_reports::table.find(id))
            .set(&changeset)
            .returning(SubsidyDisbursementReport::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| AppError::not_found("Subsidy disbursement report", id))?;

    Ok(Json(to_shared_report(report)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let deleted = diesel::delete(subsidy_disbursement_reports::table.find(id))
        .execute(&mut conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::not_found("Subsidy disbursement report", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_file_the_subsidy_step() {
        assert_eq!(Resource::SubsidyDisbursementReports.step(), Some(STEP));
    }

    #[test]
    fn amount_is_capped() {
        assert!(within_cap(78_000.0).is_ok());
        assert_eq!(within_cap(78_000.5).unwrap_err().field, "amount");
    }
}
