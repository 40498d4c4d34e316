use async_trait::async_trait;

use crate::{
    error::GatewayError::{self, InvalidParameter, MissingParameter},
    models::{Fid, User, UserSummary},
};

/// One round trip to the social graph per call. No retries, no caching.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<UserSummary>, GatewayError>;

    async fn followers(&self, fid: &str) -> Result<Vec<UserSummary>, GatewayError>;

    async fn following(&self, fid: &str) -> Result<Vec<UserSummary>, GatewayError>;

    async fn user(&self, lookup: &UserLookup) -> Result<User, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Fid(Fid),
    Username(String),
}

impl UserLookup {
    /// `fid` wins when both are given.
    pub fn parse(fid: Option<&str>, username: Option<&str>) -> Result<Self, GatewayError> {
        let fid = fid.map(str::trim).filter(|s| !s.is_empty());
        let username = username.map(str::trim).filter(|s| !s.is_empty());

        match (fid, username) {
            (Some(fid), _) => Ok(UserLookup::Fid(parse_fid(fid)?)),
            (None, Some(username)) => Ok(UserLookup::Username(username.to_string())),
            (None, None) => Err(MissingParameter("fid or username")),
        }
    }
}

pub fn require<'a>(name: &'static str, value: &'a str) -> Result<&'a str, GatewayError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(MissingParameter(name));
    }

    Ok(value)
}

pub fn parse_fid(fid: &str) -> Result<Fid, GatewayError> {
    require("fid", fid)?
        .parse()
        .map_err(|_| InvalidParameter("fid"))
}
