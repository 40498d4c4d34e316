use std::{sync::Arc, time::Duration};

use graph::{
    Fid, Gateway,
    GatewayError::{self, MissingParameter},
    User, UserLookup, UserSummary,
};

use crate::{
    debounce::DEFAULT_DELAY,
    dispatch::bounded,
    session::{self, SearchHandle},
};

#[derive(Debug, Clone)]
pub struct ExploreConfig {
    pub debounce: Duration,
    pub request_timeout: Duration,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DELAY,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphTab {
    Followers,
    Following,
}

/// Everything a screen needs, built once at startup and passed down.
#[derive(Clone)]
pub struct FrameContext {
    viewer: Option<Fid>,
    gateway: Arc<dyn Gateway>,
    config: ExploreConfig,
}

impl FrameContext {
    pub fn new(viewer: Option<Fid>, gateway: Arc<dyn Gateway>, config: ExploreConfig) -> Self {
        Self {
            viewer,
            gateway,
            config,
        }
    }

    pub fn viewer_fid(&self) -> Option<Fid> {
        self.viewer
    }

    pub fn config(&self) -> &ExploreConfig {
        &self.config
    }

    fn require_viewer(&self) -> Result<Fid, GatewayError> {
        self.viewer.ok_or(MissingParameter("fid"))
    }

    pub async fn viewer(&self) -> Result<User, GatewayError> {
        let fid = self.require_viewer()?;

        self.user(&UserLookup::Fid(fid)).await
    }

    pub async fn user(&self, lookup: &UserLookup) -> Result<User, GatewayError> {
        bounded(self.config.request_timeout, self.gateway.user(lookup)).await
    }

    pub async fn graph(&self, tab: GraphTab) -> Result<Vec<UserSummary>, GatewayError> {
        let fid = self.require_viewer()?.to_string();

        let request = match tab {
            GraphTab::Followers => self.gateway.followers(&fid),
            GraphTab::Following => self.gateway.following(&fid),
        };

        bounded(self.config.request_timeout, request).await
    }

    pub fn spawn_search(&self) -> SearchHandle {
        session::spawn(
            self.gateway.clone(),
            self.config.debounce,
            self.config.request_timeout,
        )
    }
}
