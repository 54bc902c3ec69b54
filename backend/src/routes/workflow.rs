//! Customer workflow: manual advances, automatic advances when step records
//! are filed, history, recent activity and the per-step dashboard.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde::Deserialize;
use shared::workflow::{check_advance, check_record};
use shared::{
    AdvanceStep, CustomerProgress, DashboardResponse, Role, StepCount, WorkflowEventResponse,
    WorkflowStep,
};
use std::sync::Arc;

use crate::db::{self, schema::customers, schema::workflow_events};
use crate::error::AppError;
use crate::models::{Customer, NewWorkflowEvent, WorkflowEvent};
use crate::AppState;

use super::{customers::to_shared_customer, AdminUser, AuthUser};

const DEFAULT_ACTIVITY_LIMIT: i64 = 50;
const MAX_ACTIVITY_LIMIT: i64 = 200;

fn stored_step(value: i32) -> Result<WorkflowStep, AppError> {
    WorkflowStep::from_number(value)
        .map_err(|_| AppError::Corrupt(format!("workflow step {} out of range", value)))
}

/// Lock the customer row for the rest of the transaction.
async fn lock_customer(
    conn: &mut AsyncPgConnection,
    customer_id: i32,
) -> Result<Option<Customer>, AppError> {
    Ok(customers::table
        .find(customer_id)
        .select(Customer::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?)
}

/// A step record naming a customer that does not exist is a bad reference in
/// the body, not a missing resource.
fn unknown_customer(customer_id: i32) -> AppError {
    AppError::BadRequest(format!(
        "customer_id: customer {} does not exist",
        customer_id
    ))
}

async fn move_to(
    conn: &mut AsyncPgConnection,
    customer_id: i32,
    step: WorkflowStep,
    actor_id: i32,
    comment: Option<String>,
) -> Result<WorkflowEvent, AppError> {
    diesel::update(customers::table.find(customer_id))
        .set((
            customers::current_step.eq(step.number()),
            customers::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .await?;

    let event = diesel::insert_into(workflow_events::table)
        .values(&NewWorkflowEvent {
            customer_id,
            step: step.number(),
            changed_by_id: actor_id,
            comment,
        })
        .returning(WorkflowEvent::as_returning())
        .get_result(conn)
        .await?;

    tracing::info!(customer_id, step = step.number(), actor_id, "workflow step changed");
    Ok(event)
}

/// Called inside the transaction that files a record belonging to `step`.
///
/// Rejects the record when the customer has not reached the step before it,
/// and moves the customer forward (never back) when it is accepted.
pub(crate) async fn enter_step(
    conn: &mut AsyncPgConnection,
    customer_id: i32,
    step: WorkflowStep,
    actor_id: i32,
) -> Result<(), AppError> {
    let customer = lock_customer(conn, customer_id)
        .await?
        .ok_or_else(|| unknown_customer(customer_id))?;
    let current = stored_step(customer.current_step)?;
    let next = check_record(current, step)?;
    if next != current {
        let comment = Some(format!("{} recorded", step.as_str()));
        move_to(conn, customer_id, next, actor_id, comment).await?;
    }
    Ok(())
}

/// Record the initial registration event for a freshly created customer.
pub(crate) async fn record_registration(
    conn: &mut AsyncPgConnection,
    customer_id: i32,
    actor_id: i32,
) -> Result<(), AppError> {
    diesel::insert_into(workflow_events::table)
        .values(&NewWorkflowEvent {
            customer_id,
            step: WorkflowStep::Registration.number(),
            changed_by_id: actor_id,
            comment: Some("Customer registered".to_string()),
        })
        .execute(conn)
        .await?;
    Ok(())
}

fn to_event_response(event: WorkflowEvent, customer_name: String) -> Result<WorkflowEventResponse, AppError> {
    let step = stored_step(event.step)?;
    Ok(WorkflowEventResponse {
        id: event.id,
        customer_id: event.customer_id,
        customer_name,
        step: step.number(),
        step_label: step.as_str().to_string(),
        changed_by_id: event.changed_by_id,
        changed_at: event.changed_at,
        comment: event.comment,
    })
}

pub async fn advance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<AdvanceStep>,
) -> Result<impl IntoResponse, AppError> {
    WorkflowStep::from_number(payload.step)?;

    let mut conn = db::conn(&state.pool).await?;
    let actor_id = admin.user_id;

    let (customer, event) = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                let customer = lock_customer(conn, id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Customer", id))?;
                let target = check_advance(stored_step(customer.current_step)?, payload.step)?;
                let event = move_to(conn, id, target, actor_id, payload.comment).await?;
                let customer: Customer = customers::table
                    .find(id)
                    .select(Customer::as_select())
                    .first(conn)
                    .await?;
                Ok((customer, event))
            }
            .scope_boxed()
        })
        .await?;

    let response = to_event_response(event, customer.name)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let customer: Customer = customers::table
        .find(id)
        .select(Customer::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Customer", id))?;

    let events: Vec<WorkflowEvent> = workflow_events::table
        .filter(workflow_events::customer_id.eq(id))
        .order((workflow_events::changed_at.desc(), workflow_events::id.desc()))
        .select(WorkflowEvent::as_select())
        .load(&mut conn)
        .await?;

    let result = events
        .into_iter()
        .map(|e| to_event_response(e, customer.name.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub since: Option<String>,
    pub limit: Option<i64>,
}

impl ActivityQuery {
    fn since(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        match self.since.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|_| AppError::BadRequest(format!("since: '{}' is not an RFC 3339 timestamp", s))),
        }
    }

    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
            .clamp(1, MAX_ACTIVITY_LIMIT)
    }
}

pub async fn activity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivityQuery>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let since = query.since()?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = workflow_events::table
        .inner_join(customers::table)
        .order((workflow_events::changed_at.desc(), workflow_events::id.desc()))
        .limit(query.limit())
        .select((WorkflowEvent::as_select(), customers::name))
        .into_boxed();
    if let Some(since) = since {
        q = q.filter(workflow_events::changed_at.gt(since));
    }

    let rows: Vec<(WorkflowEvent, String)> = q.load(&mut conn).await?;

    let entries = rows
        .into_iter()
        .map(|(event, name)| to_event_response(event, name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(entries))
}

fn step_counts(rows: &[(i32, i64)]) -> DashboardResponse {
    let steps: Vec<StepCount> = WorkflowStep::all()
        .iter()
        .map(|step| StepCount {
            step: step.number(),
            label: step.as_str().to_string(),
            customers: rows
                .iter()
                .filter(|(n, _)| *n == step.number())
                .map(|(_, c)| *c)
                .sum(),
        })
        .collect();
    DashboardResponse {
        total_customers: rows.iter().map(|(_, c)| c).sum(),
        steps,
    }
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let rows: Vec<(i32, i64)> = customers::table
        .group_by(customers::current_step)
        .select((customers::current_step, count_star()))
        .load(&mut conn)
        .await?;

    Ok(Json(step_counts(&rows)))
}

/// Progress view for district partners.
pub async fn progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require(&[Role::Ddp, Role::Admin])?;
    let mut conn = db::conn(&state.pool).await?;

    let customer: Customer = customers::table
        .find(id)
        .select(Customer::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Customer", id))?;

    Ok(Json(CustomerProgress::of(&to_shared_customer(customer)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_lists_every_step() {
        let dash = step_counts(&[(1, 4), (3, 2), (14, 1)]);
        assert_eq!(dash.total_customers, 7);
        assert_eq!(dash.steps.len(), 14);
        assert_eq!(dash.steps[0].customers, 4);
        assert_eq!(dash.steps[1].customers, 0);
        assert_eq!(dash.steps[2].label, "Feasibility Approval");
        assert_eq!(dash.steps[13].customers, 1);
    }

    #[tokio::test]
    async fn record_for_unknown_customer_is_a_validation_error() {
        let response = unknown_customer(999).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["message"],
            "customer_id: customer 999 does not exist"
        );

        let missing_path = AppError::not_found("Customer", 999).into_response();
        assert_eq!(missing_path.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn activity_limit_is_clamped() {
        let q = |limit| ActivityQuery { since: None, limit };
        assert_eq!(q(None).limit(), 50);
        assert_eq!(q(Some(500)).limit(), 200);
        assert_eq!(q(Some(0)).limit(), 1);
        assert_eq!(q(Some(20)).limit(), 20);
    }

    #[test]
    fn activity_since_must_be_rfc3339() {
        let q = |since: &str| ActivityQuery {
            since: Some(since.to_string()),
            limit: None,
        };
        assert!(q("2026-03-01T10:00:00+05:30").since().unwrap().is_some());
        assert!(q("yesterday").since().is_err());
    }

    #[test]
    fn event_response_carries_step_label() {
        let event = WorkflowEvent {
            id: 1,
            customer_id: 9,
            step: 13,
            changed_by_id: 2,
            changed_at: Utc::now(),
            comment: None,
        };
        let resp = to_event_response(event, "Asha".to_string()).unwrap();
        assert_eq!(resp.step_label, WorkflowStep::PortalSubmission.as_str());

        let bad = WorkflowEvent {
            id: 2,
            customer_id: 9,
            step: 99,
            changed_by_id: 2,
            changed_at: Utc::now(),
            comment: None,
        };
        assert!(to_event_response(bad, "Asha".to_string()).is_err());
    }
}
