//! HTTP plumbing shared by the data-portal client.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Result, bail};
use reqwest::Method;
use tracing::debug;

/// Sends a `GET` and returns the response body.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    send(client, Method::GET, url).await
}

/// Sends an empty-bodied `POST` and returns the response body.
pub async fn post_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    send(client, Method::POST, url).await
}

pub async fn fetch_json<C: HttpClient>(client: &C, url: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_slice(&fetch_bytes(client, url).await?)?)
}

pub async fn post_json<C: HttpClient>(client: &C, url: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_slice(&post_bytes(client, url).await?)?)
}

async fn send<C: HttpClient>(client: &C, method: Method, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(method.clone(), url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(%method, url, %status, "Portal response");

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("{method} {url} failed with status {status}: {body}");
    }

    Ok(resp.bytes().await?.to_vec())
}
