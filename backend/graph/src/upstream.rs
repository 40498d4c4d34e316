//! # Farcaster Client API
//!
//! Forwards lookups to the public client API.
//!
//! | Call | Endpoint |
//! |---|---|
//! | search | `search-summary?q=&maxChannels=0&maxUsers=5&addFollowersYouKnowContext=false` |
//! | followers | `followers?fid=&limit=100` |
//! | following | `following?fid=&limit=100` |
//! | user | `user?fid=` or `user-by-username?username=` |
//!
//! Parameters are validated before anything goes over the wire, and query
//! values are URL-encoded by reqwest.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::{
    error::GatewayError,
    gateway::{Gateway, UserLookup, parse_fid, require},
    models::{Envelope, User, UserResult, UserSummary, UsersResult},
    remote::{fetch, join},
};

pub const UPSTREAM_URL: &str = "https://client.farcaster.xyz/v2";

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_users: u32,
    pub page_limit: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: UPSTREAM_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_users: 5,
            page_limit: 100,
        }
    }
}

pub struct UpstreamGateway {
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamGateway {
    pub fn new(config: UpstreamConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        info!("Upstream gateway pointed at {}", config.base_url);

        Ok(Self { client, config })
    }

    async fn users(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<UserSummary>, GatewayError> {
        let request = self.client.get(join(&self.config.base_url, path)).query(query);
        let envelope: Envelope<UsersResult> = fetch(request).await?;

        Ok(envelope.result.users)
    }
}

#[async_trait]
impl Gateway for UpstreamGateway {
    async fn search(&self, term: &str) -> Result<Vec<UserSummary>, GatewayError> {
        let term = require("q", term)?;

        self.users(
            "search-summary",
            &[
                ("q", term.to_string()),
                ("maxChannels", "0".to_string()),
                ("maxUsers", self.config.max_users.to_string()),
                ("addFollowersYouKnowContext", "false".to_string()),
            ],
        )
        .await
    }

    async fn followers(&self, fid: &str) -> Result<Vec<UserSummary>, GatewayError> {
        let fid = parse_fid(fid)?;

        self.users(
            "followers",
            &[
                ("fid", fid.to_string()),
                ("limit", self.config.page_limit.to_string()),
            ],
        )
        .await
    }

    async fn following(&self, fid: &str) -> Result<Vec<UserSummary>, GatewayError> {
        let fid = parse_fid(fid)?;

        self.users(
            "following",
            &[
                ("fid", fid.to_string()),
                ("limit", self.config.page_limit.to_string()),
            ],
        )
        .await
    }

    async fn user(&self, lookup: &UserLookup) -> Result<User, GatewayError> {
        let request = match lookup {
            UserLookup::Fid(fid) => self
                .client
                .get(join(&self.config.base_url, "user"))
                .query(&[("fid", fid.to_string())]),
            UserLookup::Username(username) => self
                .client
                .get(join(&self.config.base_url, "user-by-username"))
                .query(&[("username", username)]),
        };

        let envelope: Envelope<UserResult> = fetch(request).await?;

        Ok(envelope.result.user)
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
    use crate::error::GatewayError::{
        MalformedUpstreamResponse, MissingParameter, UpstreamUnavailable,
    };

    async fn search_summary(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        let q = params.get("q").cloned().unwrap_or_default();

        match q.as_str() {
            "alice" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
            "zzznomatch" => {
                Json(json!({ "result": { "users": [], "channels": [] } })).into_response()
            }
            "garbage" => Json(json!({ "result": { "channels": [] } })).into_response(),
            _ => Json(json!({
                "result": {
                    "users": [{
                        "fid": 7,
                        "displayName": q.clone(),
                        "username": params.get("maxUsers").cloned().unwrap_or_default(),
                    }]
                }
            }))
            .into_response(),
        }
    }

    async fn user(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        let fid: u64 = params.get("fid").and_then(|f| f.parse().ok()).unwrap_or_default();

        Json(json!({ "result": { "user": { "fid": fid, "username": "by-fid" } } }))
    }

    async fn user_by_username(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        let username = params.get("username").cloned().unwrap_or_default();

        Json(json!({ "result": { "user": { "fid": 99, "username": username } } }))
    }

    async fn spawn_upstream() -> UpstreamGateway {
        let app = Router::new()
            .route("/v2/search-summary", get(search_summary))
            .route("/v2/user", get(user))
            .route("/v2/user-by-username", get(user_by_username));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        UpstreamGateway::new(UpstreamConfig {
            base_url: format!("http://{address}/v2"),
            ..UpstreamConfig::default()
        })
        .unwrap()
    }

    fn unreachable_gateway() -> UpstreamGateway {
        UpstreamGateway::new(UpstreamConfig {
            base_url: "http://127.0.0.1:1/v2".to_string(),
            timeout: Duration::from_millis(200),
            ..UpstreamConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_forwards_encoded_term() {
        let gateway = spawn_upstream().await;

        let users = gateway.search("bob & co").await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].display_name(), "bob & co");
        assert_eq!(users[0].username(), "5");
    }

    #[tokio::test]
    async fn test_search_upstream_error() {
        let gateway = spawn_upstream().await;

        assert!(matches!(gateway.search("alice").await, Err(UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_search_empty_result() {
        let gateway = spawn_upstream().await;

        assert_eq!(gateway.search("zzznomatch").await, Ok(vec![]));
    }

    #[tokio::test]
    async fn test_search_malformed_envelope() {
        let gateway = spawn_upstream().await;

        assert!(matches!(
            gateway.search("garbage").await,
            Err(MalformedUpstreamResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_parameters_never_leave_process() {
        let gateway = unreachable_gateway();

        assert_eq!(gateway.search("  ").await, Err(MissingParameter("q")));
        assert_eq!(gateway.followers("").await, Err(MissingParameter("fid")));
        assert_eq!(gateway.following("").await, Err(MissingParameter("fid")));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let gateway = unreachable_gateway();

        assert!(matches!(gateway.followers("3").await, Err(UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_user_lookups() {
        let gateway = spawn_upstream().await;

        let by_fid = gateway.user(&UserLookup::Fid(3)).await.unwrap();
        assert_eq!((by_fid.fid, by_fid.username.as_str()), (3, "by-fid"));

        let by_name = gateway
            .user(&UserLookup::Username("dwr".to_string()))
            .await
            .unwrap();
        assert_eq!((by_name.fid, by_name.username.as_str()), (99, "dwr"));
    }
}
