use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Deserialize;
use shared::{CreateVendor, Searchable, UpdateVendor as UpdateVendorReq, Validate};
use std::sync::Arc;

use crate::db::{self, schema::vendors};
use crate::error::AppError;
use crate::models::{NewVendor, UpdateVendor, Vendor};
use crate::AppState;

use super::{non_blank, non_blank_patch, phone_digits, AdminUser};

fn to_shared_vendor(v: Vendor) -> shared::Vendor {
    shared::Vendor {
        id: v.id,
        name: v.name,
        contact_person: v.contact_person,
        phone: v.phone,
        email: v.email,
        gstin: v.gstin,
        address: v.address,
        archived: v.archived,
        created_at: v.created_at,
        updated_at: v.updated_at,
    }
}

fn gstin_key(value: Option<String>) -> Option<String> {
    non_blank(value).map(|g| g.to_uppercase())
}

/// Fail unless `vendor_id` names a vendor that can take new work.
pub(crate) async fn ensure_active(conn: &mut AsyncPgConnection, vendor_id: i32) -> Result<(), AppError> {
    let archived: bool = vendors::table
        .find(vendor_id)
        .select(vendors::archived)
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::BadRequest(format!("vendor_id: vendor {} does not exist", vendor_id)))?;
    if archived {
        return Err(AppError::BadRequest(format!(
            "vendor_id: vendor {} is archived",
            vendor_id
        )));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct ListVendorsParams {
    #[serde(default)]
    pub include_archived: bool,
    pub q: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListVendorsParams>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let mut query = vendors::table
        .order(vendors::name.asc())
        .select(Vendor::as_select())
        .into_boxed();
    if !params.include_archived {
        query = query.filter(vendors::archived.eq(false));
    }
    let rows: Vec<Vendor> = query.load(&mut conn).await?;

    let result: Vec<shared::Vendor> = rows
        .into_iter()
        .map(to_shared_vendor)
        .filter(|v| params.q.as_deref().map_or(true, |q| v.matches(q)))
        .collect();

    Ok(Json(result))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let vendor: Vendor = vendors::table
        .find(id)
        .select(Vendor::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Vendor", id))?;

    Ok(Json(to_shared_vendor(vendor)))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<CreateVendor>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_vendor = NewVendor {
        name: payload.name.trim().to_string(),
        contact_person: non_blank(payload.contact_person),
        phone: phone_digits(&payload.phone),
        email: non_blank(payload.email),
        gstin: gstin_key(payload.gstin),
        address: non_blank(payload.address),
    };

    let mut conn = db::conn(&state.pool).await?;

    let vendor = diesel::insert_into(vendors::table)
        .values(&new_vendor)
        .returning(Vendor::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => AppError::Conflict(format!(
                "Vendor with GSTIN '{}' already exists",
                new_vendor.gstin.as_deref().unwrap_or_default()
            )),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(to_shared_vendor(vendor))))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    Json(payload): Json<UpdateVendorReq>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changeset = UpdateVendor {
        name: payload.name.map(|n| n.trim().to_string()),
        contact_person: non_blank_patch(payload.contact_person),
        phone: payload.phone.as_deref().map(phone_digits),
        email: non_blank_patch(payload.email),
        gstin: payload.gstin.map(gstin_key),
        address: non_blank_patch(payload.address),
        archived: payload.archived,
        updated_at: Some(Utc::now()),
    };

    let mut conn = db::conn(&state.pool).await?;

    let vendor: Vendor = diesel::update(vendors::table.find(id))
        .set(&changeset)
        .returning(Vendor::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Vendor", id))?;

    Ok(Json(to_shared_vendor(vendor)))
}

/// Delete a vendor. Vendors still referenced by deliveries or execution
/// orders are refused; archive those instead.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = db::conn(&state.pool).await?;

    let deleted = diesel::delete(vendors::table.find(id))
        .execute(&mut conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                _,
            ) => AppError::Conflict(format!(
                "Vendor {} has deliveries or execution orders; archive it instead",
                id
            )),
            other => other.into(),
        })?;
    if deleted == 0 {
        return Err(AppError::not_found("Vendor", id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gstin_is_stored_uppercase() {
        assert_eq!(
            gstin_key(Some(" 27aapfu0939f1zv ".to_string())),
            Some("27AAPFU0939F1ZV".to_string())
        );
        assert_eq!(gstin_key(Some(String::new())), None);
    }
}
