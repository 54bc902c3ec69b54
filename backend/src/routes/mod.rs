pub mod auth;
pub mod bank_loan_approvals;
pub mod customers;
pub mod estimate;
pub mod goods_deliveries;
pub mod health;
pub mod loan_disbursements;
pub mod meter_installation_reports;
pub mod partners;
pub mod portal_submission_reports;
pub mod site_execution_orders;
pub mod site_surveys;
pub mod subsidy_disbursement_reports;
pub mod vendors;
pub mod workflow;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::{ApiError, Resource, Role, Searchable};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::static_files;
use crate::AppState;

const CLEAR_TOKEN_COOKIE: &str = "token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // email
    pub name: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role '{}' may not access this resource",
                self.role.key()
            )))
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiError::unauthorized(message)),
    )
        .into_response()
}

fn bearer_or_cookie(parts: &Parts) -> Option<&str> {
    let cookie_header = parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    cookie_header
        .split(';')
        .find_map(|cookie| cookie.trim().strip_prefix("token="))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            parts
                .headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        })
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if state.config.dev_mode {
            return Ok(AuthUser {
                user_id: state.config.dev_user_id.unwrap_or(1),
                email: "dev@localhost".to_string(),
                name: "Dev User".to_string(),
                role: state.config.dev_user_role,
            });
        }

        let Some(token) = bearer_or_cookie(parts) else {
            return Err(unauthorized("Missing authentication token"));
        };

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!("Rejected token: {e}");
            (
                StatusCode::UNAUTHORIZED,
                [(header::SET_COOKIE, CLEAR_TOKEN_COOKIE)],
                Json(ApiError::unauthorized("Invalid or expired token")),
            )
                .into_response()
        })?;

        Ok(AuthUser {
            user_id: token_data.claims.user_id,
            email: token_data.claims.sub,
            name: token_data.claims.name,
            role: token_data.claims.role,
        })
    }
}

/// An authenticated caller holding the admin role.
pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.require(&[Role::Admin])
            .map_err(IntoResponse::into_response)?;
        Ok(AdminUser(user))
    }
}

/// Filters shared by every admin list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    pub customer_id: Option<i32>,
    pub status: Option<String>,
    pub q: Option<String>,
}

impl RecordsQuery {
    /// The status filter, checked against the keys `resource` accepts.
    pub fn status_for(&self, resource: Resource) -> Result<Option<&str>, AppError> {
        match self.status.as_deref() {
            None | Some("") => Ok(None),
            Some(key) if resource.status_keys().contains(&key) => Ok(Some(key)),
            Some(key) => Err(AppError::BadRequest(format!(
                "status: '{}' is not a valid {} status",
                key,
                resource.title()
            ))),
        }
    }

    pub fn search<T: Searchable>(&self, records: Vec<T>) -> Vec<T> {
        match self.q.as_deref() {
            Some(q) if !q.trim().is_empty() => {
                records.into_iter().filter(|r| r.matches(q)).collect()
            }
            _ => records,
        }
    }
}

/// Decode a stored key column into its typed enum.
pub(crate) fn stored<T>(value: &str, parse: fn(&str) -> Option<T>, column: &str) -> Result<T, AppError> {
    parse(value).ok_or_else(|| AppError::Corrupt(format!("{} has unknown value '{}'", column, value)))
}

/// Trim optional text and treat blank input as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Same as [`non_blank`] for the "clear or set" fields of a PATCH body.
pub(crate) fn non_blank_patch(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(non_blank)
}

/// Store phone numbers as their ten normalized digits.
pub(crate) fn phone_digits(value: &str) -> String {
    shared::validate::normalize_phone(value).unwrap_or_else(|| value.trim().to_string())
}

fn cors(state: &AppState) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match &state.config.cors_allowed_origin {
        Some(origin) => layer.allow_origin(origin.clone()),
        None => layer.allow_origin(Any),
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/customers", get(customers::list).post(customers::create))
        .route(
            "/customers/:id",
            get(customers::get)
                .patch(customers::update)
                .delete(customers::delete),
        )
        .route("/customers/:id/advance", post(workflow::advance))
        .route("/customers/:id/history", get(workflow::history))
        .route("/vendors", get(vendors::list).post(vendors::create))
        .route(
            "/vendors/:id",
            get(vendors::get)
                .patch(vendors::update)
                .delete(vendors::delete),
        )
        .route(
            "/site-surveys",
            get(site_surveys::list).post(site_surveys::create),
        )
        .route(
            "/site-surveys/:id",
            get(site_surveys::get)
                .patch(site_surveys::update)
                .delete(site_surveys::delete),
        )
        .route(
            "/bank-loan-approvals",
            get(bank_loan_approvals::list).post(bank_loan_approvals::create),
        )
        .route(
            "/bank-loan-approvals/:id",
            get(bank_loan_approvals::get)
                .patch(bank_loan_approvals::update)
                .delete(bank_loan_approvals::delete),
        )
        .route(
            "/loan-disbursements",
            get(loan_disbursements::list).post(loan_disbursements::create),
        )
        .route(
            "/loan-disbursements/:id",
            get(loan_disbursements::get)
                .patch(loan_disbursements::update)
                .delete(loan_disbursements::delete),
        )
        .route(
            "/goods-deliveries",
            get(goods_deliveries::list).post(goods_deliveries::create),
        )
        .route(
            "/goods-deliveries/:id",
            get(goods_deliveries::get)
                .patch(goods_deliveries::update)
                .delete(goods_deliveries::delete),
        )
        .route(
            "/site-execution-orders",
            get(site_execution_orders::list).post(site_execution_orders::create),
        )
        .route(
            "/site-execution-orders/:id",
            get(site_execution_orders::get)
                .patch(site_execution_orders::update)
                .delete(site_execution_orders::delete),
        )
        .route(
            "/meter-installation-reports",
            get(meter_installation_reports::list).post(meter_installation_reports::create),
        )
        .route(
            "/meter-installation-reports/:id",
            get(meter_installation_reports::get)
                .patch(meter_installation_reports::update)
                .delete(meter_installation_reports::delete),
        )
        .route(
            "/portal-submission-reports",
            get(portal_submission_reports::list).post(portal_submission_reports::create),
        )
        .route(
            "/portal-submission-reports/:id",
            get(portal_submission_reports::get)
                .patch(portal_submission_reports::update)
                .delete(portal_submission_reports::delete),
        )
        .route(
            "/subsidy-disbursement-reports",
            get(subsidy_disbursement_reports::list).post(subsidy_disbursement_reports::create),
        )
        .route(
            "/subsidy-disbursement-reports/:id",
            get(subsidy_disbursement_reports::get)
                .patch(subsidy_disbursement_reports::update)
                .delete(subsidy_disbursement_reports::delete),
        )
        .route("/activity", get(workflow::activity))
        .route("/dashboard", get(workflow::dashboard));

    let cors = cors(&state);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        // Public calculator
        .route("/api/estimate", get(estimate::estimate))
        .nest("/api/admin", admin)
        // Partner portals
        .route("/api/bdp/partners", get(partners::list_bdp))
        .route("/api/customer-partner/lookup", get(partners::lookup))
        .route("/api/ddp/customers/:id/progress", get(workflow::progress))
        // Static files (frontend) - fallback for everything else
        .fallback(static_files::static_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tower::ServiceExt;

    pub(crate) const SECRET: &str = "test-secret";

    /// State whose pool never connects; fine for routes that reject early or
    /// do not touch the database.
    pub(crate) fn test_state(dev_mode: bool) -> Arc<AppState> {
        let config = AppConfig {
            database_url: "postgres://localhost/unused".to_string(),
            port: 0,
            jwt_secret: SECRET.to_string(),
            dev_mode,
            dev_user_id: Some(7),
            dev_user_role: Role::Admin,
            pool_size: 1,
            cors_allowed_origin: None,
        };
        let pool = db::build_pool(&config.database_url, config.pool_size).unwrap();
        Arc::new(AppState { pool, config })
    }

    pub(crate) fn token(role: Role) -> String {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "ops@example.in".to_string(),
            name: "Ops".to_string(),
            user_id: 42,
            role,
            iat: now,
            exp: now + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub(crate) async fn send(
        state: Arc<AppState>,
        req: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = router(state).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn admin_routes_require_a_token() {
        let (status, body) = send(test_state(false), get("/api/admin/customers")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let req = Request::builder()
            .uri("/api/admin/vendors")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(test_state(false), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn partner_roles_cannot_reach_admin_routes() {
        let req = Request::builder()
            .uri("/api/admin/dashboard")
            .header(header::AUTHORIZATION, format!("Bearer {}", token(Role::Bdp)))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(test_state(false), req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn bdp_cannot_view_ddp_progress() {
        let req = Request::builder()
            .uri("/api/ddp/customers/1/progress")
            .header(header::COOKIE, format!("theme=dark; token={}", token(Role::Bdp)))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(test_state(false), req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn me_reads_claims_from_cookie() {
        let req = Request::builder()
            .uri("/auth/me")
            .header(header::COOKIE, format!("token={}", token(Role::Ddp)))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(test_state(false), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 42);
        assert_eq!(body["role"], "ddp");
    }

    #[tokio::test]
    async fn dev_mode_uses_configured_user() {
        let (status, body) = send(test_state(true), get("/auth/me")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 7);
        assert_eq!(body["role"], "admin");
    }

    #[tokio::test]
    async fn unknown_status_filter_is_rejected_before_querying() {
        let (status, body) = send(
            test_state(true),
            get("/api/admin/site-surveys?status=shipped"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_before_querying() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/admin/vendors")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "Suryoday Solar", "phone": "12345"}"#))
            .unwrap();
        let (status, body) = send(test_state(true), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("phone"));
    }

    #[tokio::test]
    async fn advancing_to_unknown_step_is_a_workflow_error() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/admin/customers/1/advance")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"step": 15}"#))
            .unwrap();
        let (status, body) = send(test_state(true), req).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "WORKFLOW_ERROR");
    }

    #[test]
    fn search_filters_records() {
        #[derive(Debug)]
        struct Row(&'static str);
        impl Searchable for Row {
            fn search_fields(&self) -> Vec<&str> {
                vec![self.0]
            }
        }

        let query = RecordsQuery {
            q: Some("SOLAR".to_string()),
            ..Default::default()
        };
        let rows = query.search(vec![Row("Suryoday Solar"), Row("Bharat Batteries")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "Suryoday Solar");

        let blank = RecordsQuery {
            q: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.search(vec![Row("a"), Row("b")]).len(), 2);
    }

    #[test]
    fn blank_text_becomes_absent() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" MSEDCL ".to_string())), Some("MSEDCL".to_string()));
        assert_eq!(non_blank_patch(Some(Some(String::new()))), Some(None));
        assert_eq!(non_blank_patch(None), None);
        assert_eq!(phone_digits("+91 98765-43210"), "9876543210");
    }

    #[test]
    fn status_filter_accepts_resource_keys() {
        let query = RecordsQuery {
            status: Some("in_progress".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.status_for(Resource::SiteExecutionOrders).unwrap(),
            Some("in_progress")
        );
        assert!(query.status_for(Resource::SiteSurveys).is_err());
    }
}
