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
use shared::{CreateCustomer, PanelType, Resource, UpdateCustomer as UpdateCustomerReq, Validate, WorkflowStep};
use std::sync::Arc;

use crate::db::{self, schema::customers};
use crate::error::AppError;
use crate::models::{Customer, NewCustomer, UpdateCustomer};
use crate::AppState;

use super::{non_blank, non_blank_patch, phone_digits, stored, workflow, AdminUser, RecordsQuery};

pub(crate) fn to_shared_customer(c: Customer) -> Result<shared::Customer, AppError> {
    let current_step = WorkflowStep::from_number(c.current_step)
        .map_err(|_| AppError::Corrupt(format!("customers.current_step {}", c.current_step)))?;
    let panel_type = c
        .panel_type
        .as_deref()
        .map(|p| stored(p, PanelType::from_key, "customers.panel_type"))
        .transpose()?;

    Ok(shared::Customer {
        id: c.id,
        name: c.name,
        phone: c.phone,
        email: c.email,
        address: c.address,
        district: c.district,
        state: c.state,
        consumer_number: c.consumer_number,
        discom: c.discom,
        proposed_capacity_kw: c.proposed_capacity_kw,
        panel_type,
        partner_code: c.partner_code,
        current_step,
        created_at: c.created_at,
        updated_at: c.updated_at,
    })
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    query.status_for(Resource::Customers)?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = customers::table
        .order(customers::created_at.desc())
        .select(Customer::as_select())
        .into_boxed();
    if let Some(id) = query.customer_id {
        q = q.filter(customers::id.eq(id));
    }
    let rows: Vec<Customer> = q.load(&mut conn).await?;

    let all = rows
        .into_iter()
        .map(to_shared_customer)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(query.search(all)))
}

pub async fn get(
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

    Ok(Json(to_shared_customer(customer)?))
}

/// Register a customer at the first workflow step.
pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateCustomer>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_customer = NewCustomer {
        name: payload.name.trim().to_string(),
        phone: phone_digits(&payload.phone),
        email: non_blank(payload.email),
        address: payload.address.trim().to_string(),
        district: payload.district.trim().to_string(),
        state: payload.state.trim().to_string(),
        consumer_number: non_blank(payload.consumer_number),
        discom: non_blank(payload.discom),
        proposed_capacity_kw: payload.proposed_capacity_kw,
        panel_type: payload.panel_type.map(|p| p.key().to_string()),
        partner_code: non_blank(payload.partner_code),
        current_step: WorkflowStep::Registration.number(),
    };

    let mut conn = db::conn(&state.pool).await?;
    let actor_id = admin.user_id;

    let customer = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                let customer: Customer = diesel::insert_into(customers::table)
                    .values(&new_customer)
                    .returning(Customer::as_returning())
                    .get_result(conn)
                    .await?;
                workflow::record_registration(conn, customer.id, actor_id).await?;
                Ok(customer)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(customer_id = customer.id, "customer registered");
    Ok((StatusCode::CREATED, Json(to_shared_customer(customer)?)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(payload): Json<UpdateCustomerReq>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changeset = UpdateCustomer {
        name: payload.name.map(|n| n.trim().to_string()),
        phone: payload.phone.as_deref().map(phone_digits),
        email: non_blank_patch(payload.email),
        address: payload.address.map(|a| a.trim().to_string()),
        district: payload.district.map(|d| d.trim().to_string()),
        state: payload.state.map(|s| s.trim().to_string()),
        consumer_number: non_blank_patch(payload.consumer_number),
        discom: non_blank_patch(payload.discom),
        proposed_capacity_kw: payload.proposed_capacity_kw,
        panel_type: payload
            .panel_type
            .map(|p| p.map(|p| p.key().to_string())),
        partner_code: non_blank_patch(payload.partner_code),
        updated_at: Some(Utc::now()),
    };

    let mut conn = db::conn(&state.pool).await?;

    let customer: Customer = diesel::update(customers::table.find(id))
        .set(&changeset)
        .returning(Customer::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Customer", id))?;

    Ok(Json(to_shared_customer(customer)?))
}

/// Delete a customer together with every record filed for them.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let deleted = diesel::delete(customers::table.find(id))
        .execute(&mut conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::not_found("Customer", id));
    }

    tracing::info!(customer_id = id, "customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Customer {
        Customer {
            id: 5,
            name: "Ravi Kumar".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            address: "Plot 4, Shivaji Nagar".to_string(),
            district: "Nagpur".to_string(),
            state: "Maharashtra".to_string(),
            consumer_number: None,
            discom: None,
            proposed_capacity_kw: Some(2.0),
            panel_type: Some("non_dcr".to_string()),
            partner_code: Some("CP-0042".to_string()),
            current_step: 4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn converts_stored_keys() {
        let c = to_shared_customer(row()).unwrap();
        assert_eq!(c.panel_type, Some(PanelType::NonDcr));
        assert_eq!(c.current_step, WorkflowStep::VendorSelection);
    }

    #[test]
    fn rejects_corrupt_rows() {
        let mut bad_step = row();
        bad_step.current_step = 0;
        assert!(matches!(
            to_shared_customer(bad_step),
            Err(AppError::Corrupt(_))
        ));

        let mut bad_panel = row();
        bad_panel.panel_type = Some("thin_film".to_string());
        assert!(matches!(
            to_shared_customer(bad_panel),
            Err(AppError::Corrupt(_))
        ));
    }
}
