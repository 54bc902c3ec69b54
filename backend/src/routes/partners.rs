use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use shared::{PartnerRole, Role, Searchable};
use std::sync::Arc;

use crate::db::{self, schema::partners};
use crate::error::AppError;
use crate::models::Partner;
use crate::AppState;

use super::{stored, AuthUser};

fn to_shared_partner(p: Partner) -> Result<shared::Partner, AppError> {
    Ok(shared::Partner {
        role: stored(&p.role, PartnerRole::from_key, "partners.role")?,
        id: p.id,
        code: p.code,
        name: p.name,
        phone: p.phone,
        district: p.district,
        parent_id: p.parent_id,
        created_at: p.created_at,
    })
}

#[derive(Debug, Deserialize)]
pub struct BdpQuery {
    pub district: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub code: String,
}

/// Business development partners, optionally narrowed to one district.
pub async fn list_bdp(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BdpQuery>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    user.require(&[Role::Bdp, Role::Ddp, Role::Admin])?;
    let mut conn = db::conn(&state.pool).await?;

    let mut q = partners::table
        .filter(partners::role.eq(PartnerRole::Bdp.key()))
        .order(partners::name.asc())
        .select(Partner::as_select())
        .into_boxed();
    if let Some(district) = query.district.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        q = q.filter(partners::district.ilike(district.to_string()));
    }
    let rows: Vec<Partner> = q.load(&mut conn).await?;

    let mut all = rows
        .into_iter()
        .map(to_shared_partner)
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(needle) = query.q.as_deref() {
        all.retain(|p| p.matches(needle));
    }
    Ok(Json(all))
}

pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let code = query.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(AppError::BadRequest("code: is required".to_string()));
    }
    let mut conn = db::conn(&state.pool).await?;

    let partner: Partner = partners::table
        .filter(partners::code.eq(&code))
        .select(Partner::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("No partner with code '{}'", code)))?;

    Ok(Json(to_shared_partner(partner)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::{send, test_state, token};
    use axum::{body::Body, http::Request, http::StatusCode};
    use chrono::Utc;

    #[test]
    fn decodes_partner_role() {
        let row = Partner {
            id: 3,
            code: "CP-0042".to_string(),
            name: "Sunrise Enterprises".to_string(),
            role: "customer_partner".to_string(),
            phone: "9822012345".to_string(),
            district: Some("Nashik".to_string()),
            parent_id: Some(1),
            created_at: Utc::now(),
        };
        assert_eq!(
            to_shared_partner(row).unwrap().role,
            PartnerRole::CustomerPartner
        );
    }

    #[tokio::test]
    async fn blank_lookup_code_is_rejected() {
        let req = Request::get("/api/customer-partner/lookup?code=%20")
            .header("authorization", format!("Bearer {}", token(Role::CustomerPartner)))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(test_state(false), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("code"));
    }

    #[tokio::test]
    async fn customer_partners_cannot_list_bdps() {
        let req = Request::get("/api/bdp/partners")
            .header("authorization", format!("Bearer {}", token(Role::CustomerPartner)))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(test_state(false), req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
