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
    CreatePortalSubmissionReport, PortalStatus, Resource,
    UpdatePortalSubmissionReport as UpdatePortalSubmissionReportReq, Validate, WorkflowStep,
};
use std::sync::Arc;

use crate::db::{self, schema::portal_submission_reports};
use crate::error::AppError;
use crate::models::{
    NewPortalSubmissionReport, PortalSubmissionReport, UpdatePortalSubmissionReport,
};
use crate::AppState;

use super::{non_blank, non_blank_patch, stored, workflow, AdminUser, RecordsQuery};

const STEP: WorkflowStep = WorkflowStep::PortalSubmission;

fn to_shared_report(r: PortalSubmissionReport) -> Result<shared::PortalSubmissionReport, AppError> {
    Ok(shared::PortalSubmissionReport {
        status: stored(
            &r.status,
            PortalStatus::from_key,
            "portal_submission_reports.status",
        )?,
        id: r.id,
        customer_id: r.customer_id,
        application_number: r.application_number,
        submission_date: r.submission_date,
        remarks: r.remarks,
        created_at: r.created_at,
        updated_at: r.updated_at,
    })
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status_for(Resource::PortalSubmissionReports)?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = portal_submission_reports::table
        .order(portal_submission_reports::submission_date.desc())
        .select(PortalSubmissionReport::as_select())
        .into_boxed();
    if let Some(customer_id) = query.customer_id {
        q = q.filter(portal_submission_reports::customer_id.eq(customer_id));
    }
    if let Some(status) = status {
        q = q.filter(portal_submission_reports::status.eq(status));
    }
    let rows: Vec<PortalSubmissionReport> = q.load(&mut conn).await?;

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

    let report: PortalSubmissionReport = portal_submission_reports::table
        .find(id)
        .select(PortalSubmissionReport::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Portal submission report", id))?;

    Ok(Json(to_shared_report(report)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreatePortalSubmissionReport>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_report = NewPortalSubmissionReport {
        customer_id: payload.customer_id,
        application_number: payload.application_number.trim().to_string(),
        submission_date: payload.submission_date,
        remarks: non_blank(payload.remarks),
        status: payload.status.key().to_string(),
    };

    let mut conn = db::conn(&state.pool).await?;
    let actor_id = admin.user_id;

    let report = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                workflow::enter_step(conn, new_report.customer_id, STEP, actor_id).await?;
                let report: PortalSubmissionReport =
                    diesel::insert_into(portal_submission_reports::table)
                        .values(&new_report)
                        .returning(PortalSubmissionReport::as_returning())
                        .get_result(conn)
                        .await?;
                Ok(report)
            }
            .scope_boxed()
        })
        .await?;

    Ok((StatusCode::CREATED, Json(to_shared_report(report)?)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(payload): Json<UpdatePortalSubmissionReportReq>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changeset = UpdatePortalSubmissionReport {
        application_number: payload.application_number.map(|a| a.trim().to_string()),
        submission_date: payload.submission_date,
        remarks: non_blank_patch(payload.remarks),
        status: payload.status.map(|s| s.key().to_string()),
        updated_at: Some(Utc::now()),
    };

    let mut conn = db::conn(&state.pool).await?;

    let report: PortalSubmissionReport =
        diesel::update(portal_submission_reports::table.find(id))
            .set(&changeset)
            .returning(PortalSubmissionReport::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| AppError::not_found("Portal submission report", id))?;

    Ok(Json(to_shared_report(report)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let deleted = diesel::delete(portal_submission_reports::table.find(id))
        .execute(&mut conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::not_found("Portal submission report", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_file_the_portal_submission_step() {
        assert_eq!(Resource::PortalSubmissionReports.step(), Some(STEP));
    }
}
