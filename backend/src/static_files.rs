use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

// Missing assets are tolerated so the API can be built and tested without
// running `trunk build` first.
#[derive(RustEmbed)]
#[folder = "../frontend/dist/"]
#[allow_missing = true]
struct Assets;

fn asset(path: &str, mime: &str) -> Option<Response> {
    let content = Assets::get(path)?;
    Some(
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.to_string())],
            content.data.into_owned(),
        )
            .into_response(),
    )
}

pub async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if let Some(response) = asset(path, mime.as_ref()) {
        return response;
    }

    // Client-side routes fall back to the SPA shell
    if let Some(response) = asset("index.html", "text/html") {
        return response;
    }

    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_paths_without_a_bundle_are_not_found() {
        if Assets::get("index.html").is_some() {
            return;
        }
        let response = static_handler(Uri::from_static("/admin/vendors")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
