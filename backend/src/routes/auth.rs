use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::{AuthUser, CLEAR_TOKEN_COOKIE};

pub async fn logout() -> Response {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, CLEAR_TOKEN_COOKIE)],
        Json(shared::LogoutResponse {
            status: "logged out".to_string(),
        }),
    )
        .into_response()
}

pub async fn me(auth_user: AuthUser) -> Json<shared::CurrentUserResponse> {
    Json(shared::CurrentUserResponse {
        user_id: auth_user.user_id,
        email: auth_user.email,
        name: auth_user.name,
        role: auth_user.role,
    })
}

#[cfg(test)]
mod tests {
    use crate::routes::tests::{send, test_state};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};

    #[tokio::test]
    async fn logout_clears_cookie() {
        let req = Request::builder()
            .method("POST")
            .uri("/auth/logout")
            .body(Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(crate::routes::router(test_state(false)), req)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn logout_needs_no_session() {
        let req = Request::builder()
            .method("POST")
            .uri("/auth/logout")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(test_state(false), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "logged out");
    }
}
