use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use shared::{
    CreateGoodsDelivery, DeliveryStatus, Resource, UpdateGoodsDelivery as UpdateGoodsDeliveryReq,
    Validate, ValidationError, WorkflowStep,
};
use std::sync::Arc;

use crate::db::{self, schema::goods_deliveries};
use crate::error::AppError;
use crate::models::{GoodsDelivery, NewGoodsDelivery, UpdateGoodsDelivery};
use crate::AppState;

use super::{non_blank, non_blank_patch, stored, vendors, workflow, AdminUser, RecordsQuery};

const STEP: WorkflowStep = WorkflowStep::GoodsDelivery;

fn to_shared_delivery(d: GoodsDelivery) -> Result<shared::GoodsDelivery, AppError> {
    Ok(shared::GoodsDelivery {
        status: stored(&d.status, DeliveryStatus::from_key, "goods_deliveries.status")?,
        id: d.id,
        customer_id: d.customer_id,
        vendor_id: d.vendor_id,
        purchase_order_id: d.purchase_order_id,
        items: d.items,
        delivery_date: d.delivery_date,
        received_by: d.received_by,
        remarks: d.remarks,
        created_at: d.created_at,
        updated_at: d.updated_at,
    })
}

/// Delivered goods need a delivery date once the patch is applied.
fn check_merged(
    existing: &GoodsDelivery,
    patch: &UpdateGoodsDeliveryReq,
) -> Result<(), ValidationError> {
    let delivered = match patch.status {
        Some(status) => status == DeliveryStatus::Delivered,
        None => existing.status == DeliveryStatus::Delivered.key(),
    };
    let date: Option<NaiveDate> = match patch.delivery_date {
        Some(date) => date,
        None => existing.delivery_date,
    };
    if delivered && date.is_none() {
        return Err(ValidationError::new(
            "delivery_date",
            "is required once goods are delivered",
        ));
    }
    Ok(())
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordsQuery>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status_for(Resource::GoodsDeliveries)?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = goods_deliveries::table
        .order(goods_deliveries::created_at.desc())
        .select(GoodsDelivery::as_select())
        .into_boxed();
    if let Some(customer_id) = query.customer_id {
        q = q.filter(goods_deliveries::customer_id.eq(customer_id));
    }
    if let Some(status) = status {
        q = q.filter(goods_deliveries::status.eq(status));
    }
    let rows: Vec<GoodsDelivery> = q.load(&mut conn).await?;

    let all = rows
        .into_iter()
        .map(to_shared_delivery)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(query.search(all)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let delivery: GoodsDelivery = goods_deliveries::table
        .find(id)
        .select(GoodsDelivery::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Goods delivery", id))?;

    Ok(Json(to_shared_delivery(delivery)?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateGoodsDelivery>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_delivery = NewGoodsDelivery {
        customer_id: payload.customer_id,
        vendor_id: payload.vendor_id,
        purchase_order_id: payload.purchase_order_id.trim().to_string(),
        items: payload.items.trim().to_string(),
        delivery_date: payload.delivery_date,
        received_by: non_blank(payload.received_by),
        remarks: non_blank(payload.remarks),
        status: payload.status.key().to_string(),
    };

    let mut conn = db::conn(&state.pool).await?;
    let actor_id = admin.user_id;

    let delivery = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                workflow::enter_step(conn, new_delivery.customer_id, STEP, actor_id).await?;
                vendors::ensure_active(conn, new_delivery.vendor_id).await?;
                let delivery: GoodsDelivery = diesel::insert_into(goods_deliveries::table)
                    .values(&new_delivery)
                    .returning(GoodsDelivery::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(delivery)
            }
            .scope_boxed()
        })
        .await?;

    Ok((StatusCode::CREATED, Json(to_shared_delivery(delivery)?)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(payload): Json<UpdateGoodsDeliveryReq>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = db::conn(&state.pool).await?;

    let existing: GoodsDelivery = goods_deliveries::table
        .find(id)
        .select(GoodsDelivery::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Goods delivery", id))?;
    check_merged(&existing, &payload)?;
    if let Some(vendor_id) = payload.vendor_id.filter(|v| *v != existing.vendor_id) {
        vendors::ensure_active(&mut conn, vendor_id).await?;
    }

    let changeset = UpdateGoodsDelivery {
        vendor_id: payload.vendor_id,
        purchase_order_id: payload.purchase_order_id.map(|p| p.trim().to_string()),
        items: payload.items.map(|i| i.trim().to_string()),
        delivery_date: payload.delivery_date,
        received_by: non_blank_patch(payload.received_by),
        remarks: non_blank_patch(payload.remarks),
        status: payload.status.map(|s| s.key().to_string()),
        updated_at: Some(Utc::now()),
    };

    let delivery: GoodsDelivery = diesel::update(goods_deliveries::table.find(id))
        .set(&changeset)
        .returning(GoodsDelivery::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Goods delivery", id))?;

    Ok(Json(to_shared_delivery(delivery)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let deleted = diesel::delete(goods_deliveries::table.find(id))
        .execute(&mut conn)
        .await?;
    if deleted == 0 {
        return Err(AppError::not_found("Goods delivery", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(status: DeliveryStatus, date: Option<NaiveDate>) -> GoodsDelivery {
        GoodsDelivery {
            id: 1,
            customer_id: 1,
            vendor_id: 2,
            purchase_order_id: "PO-2026-014".to_string(),
            items: "Inverter, 6 panels, structure".to_string(),
            delivery_date: date,
            received_by: None,
            remarks: None,
            status: status.key().to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn patch(json: &str) -> UpdateGoodsDeliveryReq {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn deliveries_file_the_goods_delivery_step() {
        assert_eq!(Resource::GoodsDeliveries.step(), Some(STEP));
    }

    #[test]
    fn marking_delivered_needs_a_date() {
        let row = existing(DeliveryStatus::Dispatched, None);
        assert!(check_merged(&row, &patch(r#"{"status": "delivered"}"#)).is_err());
        assert!(check_merged(
            &row,
            &patch(r#"{"status": "delivered", "delivery_date": "2026-03-02"}"#)
        )
        .is_ok());
    }

    #[test]
    fn clearing_the_date_of_a_delivered_record_fails() {
        let row = existing(
            DeliveryStatus::Delivered,
            NaiveDate::from_ymd_opt(2026, 3, 2),
        );
        assert!(check_merged(&row, &patch(r#"{"delivery_date": null}"#)).is_err());
        assert!(check_merged(&row, &patch(r#"{"remarks": "signed"}"#)).is_ok());
    }
}
