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
    CreateSiteSurvey, Resource, SurveyStatus, UpdateSiteSurvey as UpdateSiteSurveyReq, Validate,
    WorkflowStep,
};
use std::sync::Arc;

use crate::db::{self, schema::site_surveys};
use crate::error::AppError;
use crate::models::{NewSiteSurvey, SiteSurvey, UpdateSiteSurvey};
use crate::AppState;

use super::{non_blank, non_blank_patch, stored, workflow, AdminUser, RecordsQuery};

const STEP: WorkflowStep = WorkflowStep::SiteSurvey;

fn to_shared_survey(s: SiteSurvey) -> Result<shared::SiteSurvey, AppError> {
    Ok(shared::SiteSurvey {
        status: stored(&s.status, SurveyStatus::from_key, "site_surveys.status")?,
        id: s.id,
        customer_id: s.customer_id,
        surveyor_name: s.surveyor_name,
        survey_date: s.survey_date,
        roof_type: s.roof_type,
        roof_area_sqft: s.roof_area_sqft,
        shadow_free: s.shadow_free,
        recommended_capacity_kw: s.recommended_capacity_kw,
        remarks: s.remarks,
        created_at: s.created_at,
        updated_at: s.updated_at,
    })
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status_for(Resource::SiteSurveys)?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = site_surveys::table
        .order(site_surveys::survey_date.desc())
        .select(SiteSurvey::as_select())
        .into_boxed();
    if let Some(customer_id) = query.customer_id {
        q = q.filter(site_surveys::customer_id.eq(customer_id));
    }
    if let Some(status) = status {
        q = q.filter(site_surveys::status.eq(status));
    }
    let rows: Vec<SiteSurvey> = q.load(&mut conn).await?;

    let all = rows
        .into_iter()
        .map(to_shared_survey)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(query.search(all)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let survey: SiteSurvey = site_surveys::table
        .find(id)
        .select(SiteSurvey::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Site survey", id))?;

    Ok(Json(to_shared_survey(survey)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateSiteSurvey>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_survey = NewSiteSurvey {
        customer_id: payload.customer_id,
        surveyor_name: payload.surveyor_name.trim().to_string(),
        survey_date: payload.survey_date,
        roof_type: payload.roof_type.trim().to_string(),
        roof_area_sqft: payload.roof_area_sqft,
        shadow_free: payload.shadow_free,
        recommended_capacity_kw: payload.recommended_capacity_kw,
        remarks: non_blank(payload.remarks),
        status: payload.status.key().to_string(),
    };

    let mut conn = db::conn(&state.pool).await?;
    let actor_id = admin.user_id;

    let survey = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                workflow::enter_step(conn, new_survey.customer_id, STEP, actor_id).await?;
                let survey: SiteSurvey = diesel::insert_into(site_surveys::table)
                    .values(&new_survey)
                    .returning(SiteSurvey::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(survey)
            }
            .scope_boxed()
        })
        .await?;

    Ok((StatusCode::CREATED, Json(to_shared_survey(survey)?)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(payload): Json<UpdateSiteSurveyReq>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changeset = UpdateSiteSurvey {
        surveyor_name: payload.surveyor_name.map(|s| s.trim().to_string()),
        survey_date: payload.survey_date,
        roof_type: payload.roof_type.map(|r| r.trim().to_string()),
        roof_area_sqft: payload.roof_area_sqft,
        shadow_free: payload.shadow_free,
        recommended_capacity_kw: payload.recommended_capacity_kw,
        remarks: non_blank_patch(payload.remarks),
        status: payload.status.map(|s| s.key().to_string()),
        updated_at: Some(Utc::now()),
    };

    let mut conn = db::conn(&state.pool).await?;

    let survey: SiteSurvey = diesel::update(site_surveys::table.find(id))
        .set(&changeset)
        .returning(SiteSurvey::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Site survey", id))?;

    Ok(Json(to_shared_survey(survey)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let deleted = diesel::delete(site_surveys::table.find(id))
        .execute(&mut conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::not_found("Site survey", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn surveys_file_the_site_survey_step() {
        assert_eq!(Resource::SiteSurveys.step(), Some(STEP));
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let row = SiteSurvey {
            id: 1,
            customer_id: 1,
            surveyor_name: "Meena".to_string(),
            survey_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            roof_type: "RCC".to_string(),
            roof_area_sqft: Some(400.0),
            shadow_free: true,
            recommended_capacity_kw: Some(3.0),
            remarks: None,
            status: "lost".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(to_shared_survey(row), Err(AppError::Corrupt(_))));
    }
}
