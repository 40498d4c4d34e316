use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{
    error::GatewayError::{self, InvalidParameter, MissingParameter, UpstreamUnavailable},
    gateway::{Gateway, UserLookup, parse_fid, require},
    models::{Envelope, User, UserSummary, UsersResult},
    remote::{decode, join, send},
};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to the `/api/*` routes of a running proxy server.
pub struct ProxyGateway {
    client: Client,
    base_url: String,
}

impl ProxyGateway {
    pub fn connect(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        Ok(Self::new(Client::builder().build()?, base_url))
    }

    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        route: &str,
        param: &'static str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let request = self
            .client
            .get(join(&self.base_url, &format!("api/{route}")))
            .query(query);

        let (status, body) = send(request).await?;

        if status.is_success() {
            return decode(&body);
        }

        let reason = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("status {status}"));

        warn!("Proxy rejected /api/{route}: {reason}");

        match status {
            StatusCode::BAD_REQUEST if reason.ends_with("is required") => {
                Err(MissingParameter(param))
            }
            StatusCode::BAD_REQUEST => Err(InvalidParameter(param)),
            _ => Err(UpstreamUnavailable(reason)),
        }
    }
}

#[async_trait]
impl Gateway for ProxyGateway {
    async fn search(&self, term: &str) -> Result<Vec<UserSummary>, GatewayError> {
        let term = require("q", term)?;

        let envelope: Envelope<UsersResult> =
            self.get("search", "q", &[("q", term.to_string())]).await?;

        Ok(envelope.result.users)
    }

    async fn followers(&self, fid: &str) -> Result<Vec<UserSummary>, GatewayError> {
        let fid = parse_fid(fid)?;

        let envelope: Envelope<UsersResult> =
            self.get("followers", "fid", &[("fid", fid.to_string())]).await?;

        Ok(envelope.result.users)
    }

    async fn following(&self, fid: &str) -> Result<Vec<UserSummary>, GatewayError> {
        let fid = parse_fid(fid)?;

        let envelope: Envelope<UsersResult> =
            self.get("following", "fid", &[("fid", fid.to_string())]).await?;

        Ok(envelope.result.users)
    }

    async fn user(&self, lookup: &UserLookup) -> Result<User, GatewayError> {
        let envelope: Envelope<User> = match lookup {
            UserLookup::Fid(fid) => self.get("user", "fid", &[("fid", fid.to_string())]).await?,
            UserLookup::Username(username) => {
                self.get("user", "username", &[("username", username.clone())])
                    .await?
            }
        };

        Ok(envelope.result)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::Query,
        http::StatusCode,
        response::IntoResponse,
        routing::get,
    };
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    async fn followers(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        match params.get("fid").map(String::as_str) {
            Some("3") => Json(json!({ "result": { "users": [{ "fid": 5, "username": "v" }] } }))
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch followers" })),
            )
                .into_response(),
        }
    }

    async fn user(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        match (params.get("fid").map(String::as_str), params.get("username")) {
            (_, Some(name)) => {
                Json(json!({ "result": { "fid": 8, "username": name } })).into_response()
            }
            (Some("0"), None) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "fid is invalid" })),
            )
                .into_response(),
            _ => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "fid or username is required" })),
            )
                .into_response(),
        }
    }

    async fn spawn_proxy() -> ProxyGateway {
        let app = Router::new()
            .route("/api/followers", get(followers))
            .route("/api/user", get(user));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        ProxyGateway::new(Client::new(), format!("http://{address}"))
    }

    #[tokio::test]
    async fn test_followers_envelope() {
        let proxy = spawn_proxy().await;

        let users = proxy.followers("3").await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].fid(), 5);
    }

    #[tokio::test]
    async fn test_server_error_keeps_reason() {
        let proxy = spawn_proxy().await;

        assert_eq!(
            proxy.followers("4").await,
            Err(UpstreamUnavailable("Failed to fetch followers".to_string()))
        );
    }

    #[tokio::test]
    async fn test_user_by_username() {
        let proxy = spawn_proxy().await;

        let user = proxy
            .user(&UserLookup::Username("dwr".to_string()))
            .await
            .unwrap();

        assert_eq!(user.fid, 8);
        assert_eq!(user.username, "dwr");
    }

    #[tokio::test]
    async fn test_bad_request_maps_to_parameter() {
        let proxy = spawn_proxy().await;

        assert_eq!(
            proxy.user(&UserLookup::Fid(1)).await,
            Err(MissingParameter("fid"))
        );
        assert_eq!(
            proxy.user(&UserLookup::Fid(0)).await,
            Err(InvalidParameter("fid"))
        );
    }
}
