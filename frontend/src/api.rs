use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::ApiError;

/// Pull the server's message out of a failed response.
async fn failure(resp: Response) -> String {
    let status = resp.status();
    match resp.json::<ApiError>().await {
        Ok(err) => err.error.message,
        Err(_) => format!("Request failed with status {}", status),
    }
}

pub async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| format!("Request error: {}", e))?;
    if !resp.ok() {
        return Err(failure(resp).await);
    }
    resp.json::<T>()
        .await
        .map_err(|e| format!("Unexpected response: {}", e))
}

async fn send_body(builder: RequestBuilder, body: &Value) -> Result<(), String> {
    let resp = builder
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .map_err(|e| format!("Request error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request error: {}", e))?;
    if resp.ok() {
        Ok(())
    } else {
        Err(failure(resp).await)
    }
}

pub async fn post_json(url: &str, body: &Value) -> Result<(), String> {
    send_body(Request::post(url), body).await
}

pub async fn patch_json(url: &str, body: &Value) -> Result<(), String> {
    send_body(Request::patch(url), body).await
}

pub async fn delete(url: &str) -> Result<(), String> {
    let resp = Request::delete(url)
        .send()
        .await
        .map_err(|e| format!("Request error: {}", e))?;
    if resp.ok() {
        Ok(())
    } else {
        Err(failure(resp).await)
    }
}
