use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::GatewayError::{self, MalformedUpstreamResponse, UpstreamUnavailable};

pub(crate) fn join(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Sends the request and reads the whole body, whatever the status.
pub(crate) async fn send(request: RequestBuilder) -> Result<(StatusCode, String), GatewayError> {
    let response = request.send().await.map_err(|e| {
        warn!("Request failed: {e}");
        UpstreamUnavailable(e.to_string())
    })?;

    let status = response.status();
    debug!("{} -> {status}", response.url());

    let body = response.text().await?;

    Ok((status, body))
}

/// Sends the request, treating any non-success status as the remote being down.
pub(crate) async fn fetch<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, GatewayError> {
    let (status, body) = send(request).await?;

    if !status.is_success() {
        warn!("Remote answered {status}");
        return Err(UpstreamUnavailable(format!("status {status}")));
    }

    decode(&body)
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|e| {
        warn!("Unexpected response shape: {e}");
        MalformedUpstreamResponse(e.to_string())
    })
}
