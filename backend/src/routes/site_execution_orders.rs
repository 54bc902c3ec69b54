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
    CreateSiteExecutionOrder, ExecutionStatus, Resource,
    UpdateSiteExecutionOrder as UpdateSiteExecutionOrderReq, Validate, ValidationError,
    WorkflowStep,
};
use std::sync::Arc;

use crate::db::{self, schema::site_execution_orders};
use crate::error::AppError;
use crate::models::{NewSiteExecutionOrder, SiteExecutionOrder, UpdateSiteExecutionOrder};
use crate::AppState;

use super::{non_blank, non_blank_patch, stored, vendors, workflow, AdminUser, RecordsQuery};

const STEP: WorkflowStep = WorkflowStep::SiteExecution;

fn to_shared_order(o: SiteExecutionOrder) -> Result<shared::SiteExecutionOrder, AppError> {
    Ok(shared::SiteExecutionOrder {
        status: stored(
            &o.status,
            ExecutionStatus::from_key,
            "site_execution_orders.status",
        )?,
        id: o.id,
        customer_id: o.customer_id,
        vendor_id: o.vendor_id,
        order_number: o.order_number,
        crew_lead: o.crew_lead,
        scheduled_date: o.scheduled_date,
        completion_date: o.completion_date,
        remarks: o.remarks,
        created_at: o.created_at,
        updated_at: o.updated_at,
    })
}

/// Completion cannot precede the schedule once the patch is applied.
fn check_merged(
    existing: &SiteExecutionOrder,
    patch: &UpdateSiteExecutionOrderReq,
) -> Result<(), ValidationError> {
    let scheduled = patch.scheduled_date.unwrap_or(existing.scheduled_date);
    let completed = match patch.completion_date {
        Some(date) => date,
        None => existing.completion_date,
    };
    match completed {
        Some(done) if done < scheduled => Err(ValidationError::new(
            "completion_date",
            "cannot be before the scheduled date",
        )),
        _ => Ok(()),
    }
}

fn conflict_on_order_number(number: &str) -> impl Fn(diesel::result::Error) -> AppError + '_ {
    move |e| match e {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ) => AppError::Conflict(format!("Order number '{}' is already in use", number)),
        other => other.into(),
    }
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status_for(Resource::SiteExecutionOrders)?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = site_execution_orders::table
        .order(site_execution_orders::scheduled_date.desc())
        .select(SiteExecutionOrder::as_select())
        .into_boxed();
    if let Some(customer_id) = query.customer_id {
        q = q.filter(site_execution_orders::customer_id.eq(customer_id));
    }
    if let Some(status) = status {
        q = q.filter(site_execution_orders::status.eq(status));
    }
    let rows: Vec<SiteExecutionOrder> = q.load(&mut conn).await?;

    let all = rows
        .into_iter()
        .map(to_shared_order)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(query.search(all)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let order: SiteExecutionOrder = site_execution_orders::table
        .find(id)
        .select(SiteExecutionOrder::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Site execution order", id))?;

    Ok(Json(to_shared_order(order)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateSiteExecutionOrder>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order_number = payload.order_number.trim().to_string();
    let new_order = NewSiteExecutionOrder {
        customer_id: payload.customer_id,
        vendor_id: payload.vendor_id,
        order_number: order_number.clone(),
        crew_lead: payload.crew_lead.trim().to_string(),
        scheduled_date: payload.scheduled_date,
        completion_date: payload.completion_date,
        remarks: non_blank(payload.remarks),
        status: payload.status.key().to_string(),
    };

    let mut conn = db::conn(&state.pool).await?;
    let actor_id = admin.user_id;

    let order = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                workflow::enter_step(conn, new_order.customer_id, STEP, actor_id).await?;
                vendors::ensure_active(conn, new_order.vendor_id).await?;
                let order: SiteExecutionOrder = diesel::insert_into(site_execution_orders::table)
                    .values(&new_order)
                    .returning(SiteExecutionOrder::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(conflict_on_order_number(&new_order.order_number))?;
                Ok(order)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(order_number = %order_number, customer_id = order.customer_id, "site execution order issued");
    Ok((StatusCode::CREATED, Json(to_shared_order(order)?)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(payload): Json<UpdateSiteExecutionOrderReq>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = db::conn(&state.pool).await?;

    let existing: SiteExecutionOrder = site_execution_orders::table
        .find(id)
        .select(SiteExecutionOrder::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Site execution order", id))?;
    check_merged(&existing, &payload)?;
    if let Some(vendor_id) = payload.vendor_id.filter(|v| *v != existing.vendor_id) {
        vendors::ensure_active(&mut conn, vendor_id).await?;
    }

    let order_number = payload.order_number.map(|o| o.trim().to_string());
    let changeset = UpdateSiteExecutionOrder {
        vendor_id: payload.vendor_id,
        order_number: order_number.clone(),
        crew_lead: payload.crew_lead.map(|c| c.trim().to_string()),
        scheduled_date: payload.scheduled_date,
        completion_date: payload.completion_date,
        remarks: non_blank_patch(payload.remarks),
        status: payload.status.map(|s| s.key().to_string()),
        updated_at: Some(Utc::now()),
    };

    let number = order_number.as_deref().unwrap_or(&existing.order_number);
    let order: SiteExecutionOrder = diesel::update(site_execution_orders::table.find(id))
        .set(&changeset)
        .returning(SiteExecutionOrder::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(conflict_on_order_number(number))?;

    Ok(Json(to_shared_order(order)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let deleted = diesel::delete(site_execution_orders::table.find(id))
        .execute(&mut conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::not_found("Site execution order", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn existing() -> SiteExecutionOrder {
        SiteExecutionOrder {
            id: 1,
            customer_id: 1,
            vendor_id: 2,
            order_number: "SEO-118".to_string(),
            crew_lead: "Imran".to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
            completion_date: None,
            remarks: None,
            status: ExecutionStatus::Assigned.key().to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn patch(json: &str) -> UpdateSiteExecutionOrderReq {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn orders_file_the_site_execution_step() {
        assert_eq!(Resource::SiteExecutionOrders.step(), Some(STEP));
    }

    #[test]
    fn completion_is_checked_against_merged_schedule() {
        let row = existing();
        assert!(check_merged(&row, &patch(r#"{"completion_date": "2026-04-09"}"#)).is_err());
        assert!(check_merged(&row, &patch(r#"{"completion_date": "2026-04-12"}"#)).is_ok());
        assert!(check_merged(
            &row,
            &patch(r#"{"completion_date": "2026-04-09", "scheduled_date": "2026-04-08"}"#)
        )
        .is_ok());
    }

    #[test]
    fn only_unique_violations_become_conflicts() {
        let err = conflict_on_order_number("SEO-118")(diesel::result::Error::NotFound);
        assert!(matches!(err, AppError::Database(diesel::result::Error::NotFound)));
    }
}
