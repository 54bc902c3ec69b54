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
    CreateMeterInstallationReport, MeterStatus, MeterType, Resource,
    UpdateMeterInstallationReport as UpdateMeterInstallationReportReq, Validate, WorkflowStep,
};
use std::sync::Arc;

use crate::db::{self, schema::meter_installation_reports};
use crate::error::AppError;
use crate::models::{
    MeterInstallationReport, NewMeterInstallationReport, UpdateMeterInstallationReport,
};
use crate::AppState;

use super::{non_blank, non_blank_patch, stored, workflow, AdminUser, RecordsQuery};

const STEP: WorkflowStep = WorkflowStep::MeterInstallation;

fn to_shared_report(r: MeterInstallationReport) -> Result<shared::MeterInstallationReport, AppError> {
    Ok(shared::MeterInstallationReport {
        meter_type: stored(
            &r.meter_type,
            MeterType::from_key,
            "meter_installation_reports.meter_type",
        )?,
        status: stored(
            &r.status,
            MeterStatus::from_key,
            "meter_installation_reports.status",
        )?,
        id: r.id,
        customer_id: r.customer_id,
        meter_number: r.meter_number,
        installation_date: r.installation_date,
        discom: r.discom,
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
    let status = query.status_for(Resource::MeterInstallationReports)?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = meter_installation_reports::table
        .order(meter_installation_reports::installation_date.desc())
        .select(MeterInstallationReport::as_select())
        .into_boxed();
    if let Some(customer_id) = query.customer_id {
        q = q.filter(meter_installation_reports::customer_id.eq(customer_id));
    }
    if let Some(status) = status {
        q = q.filter(meter_installation_reports::status.eq(status));
    }
    let rows: Vec<MeterInstallationReport> = q.load(&mut conn).await?;

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

    let report: MeterInstallationReport = meter_installation_reports::table
        .find(id)
        .select(MeterInstallationReport::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Meter installation report", id))?;

    Ok(Json(to_shared_report(report)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateMeterInstallationReport>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_report = NewMeterInstallationReport {
        customer_id: payload.customer_id,
        meter_number: payload.meter_number.trim().to_string(),
        meter_type: payload.meter_type.key().to_string(),
        installation_date: payload.installation_date,
        discom: non_blank(payload.discom),
        remarks: non_blank(payload.remarks),
        status: payload.status.key().to_string(),
    };

    let mut conn = db::conn(&state.pool).await?;
    let actor_id = admin.user_id;

    let report = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                workflow::enter_step(conn, new_report.customer_id, STEP, actor_id).await?;
                let report: MeterInstallationReport =
                    diesel::insert_into(meter_installation_reports::table)
                        .values(&new_report)
                        .returning(MeterInstallationReport::as_returning())
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
    Json(payload): Json<UpdateMeterInstallationReportReq>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changeset = UpdateMeterInstallationReport {
        meter_number: payload.meter_number.map(|m| m.trim().to_string()),
        meter_type: payload.meter_type.map(|t| t.key().to_string()),
        installation_date: payload.installation_date,
        discom: non_blank_patch(payload.discom),
        remarks: non_blank_patch(payload.remarks),
        status: payload.status.map(|s| s.key().to_string()),
        updated_at: Some(Utc::now()),
    };

    let mut conn = db::conn(&state.pool).await?;

    let report: MeterInstallationReport =
        diesel::update(meter_installation_reports::table.find(id))
            .set(&changeset)
            .returning(MeterInstallationReport::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| AppError::not_found("Meter installation report", id))?;

    Ok(Json(to_shared_report(report)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let deleted = diesel::delete(meter_installation_reports::table.find(id))
        .execute(&mut conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::not_found("Meter installation report", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn reports_file_the_meter_installation_step() {
        assert_eq!(Resource::MeterInstallationReports.step(), Some(STEP));
    }

    #[test]
    fn decodes_meter_type() {
        let row = MeterInstallationReport {
            id: 1,
            customer_id: 1,
            meter_number: "MH-NM-55021".to_string(),
            meter_type: "bidirectional".to_string(),
            installation_date: NaiveDate::from_ymd_opt(2026, 5, 3).unwrap(),
            discom: Some("MSEDCL".to_string()),
            remarks: None,
            status: "installed".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let report = to_shared_report(row).unwrap();
        assert_eq!(report.meter_type, MeterType::Bidirectional);
        assert_eq!(report.status, MeterStatus::Installed);
    }
}
