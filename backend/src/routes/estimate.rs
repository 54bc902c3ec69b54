use axum::{extract::Query, Json};
use serde::Deserialize;
use shared::{estimate_from_input, EstimateResponse, PanelType};

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    #[serde(default)]
    pub capacity_kw: String,
    pub panel_type: Option<String>,
}

/// Public calculator. Unparseable or non-positive capacity yields a null
/// estimate rather than an error, matching the form's live preview.
pub async fn estimate(Query(query): Query<EstimateQuery>) -> Result<Json<EstimateResponse>, AppError> {
    let panel_type = match query.panel_type.as_deref() {
        None | Some("") => PanelType::Dcr,
        Some(key) => PanelType::from_key(key).ok_or_else(|| {
            AppError::BadRequest(format!("panel_type: '{}' is not dcr or non_dcr", key))
        })?,
    };

    Ok(Json(EstimateResponse {
        estimate: estimate_from_input(&query.capacity_kw, panel_type),
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::tests::{send, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(test_state(false), req).await
    }

    #[tokio::test]
    async fn three_kw_dcr() {
        let (status, body) = get("/api/estimate?capacity_kw=3&panel_type=dcr").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["estimate"]["subsidy"], 78_000.0);
        assert_eq!(body["estimate"]["total_cost"], 195_000.0);
        assert_eq!(body["estimate"]["net_cost"], 117_000.0);
    }

    #[tokio::test]
    async fn panel_type_defaults_to_dcr() {
        let (_, body) = get("/api/estimate?capacity_kw=2").await;
        assert_eq!(body["estimate"]["panel_type"], "dcr");
        assert_eq!(body["estimate"]["subsidy"], 60_000.0);
    }

    #[tokio::test]
    async fn bad_capacity_yields_null() {
        for uri in [
            "/api/estimate?capacity_kw=abc",
            "/api/estimate?capacity_kw=0",
            "/api/estimate?capacity_kw=-2",
            "/api/estimate",
        ] {
            let (status, body) = get(uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(body["estimate"].is_null(), "{uri}");
        }
    }

    #[tokio::test]
    async fn unknown_panel_type_is_rejected() {
        let (status, body) = get("/api/estimate?capacity_kw=3&panel_type=mono").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
