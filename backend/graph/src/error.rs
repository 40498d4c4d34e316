use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0} is required")]
    MissingParameter(&'static str),

    #[error("{0} is invalid")]
    InvalidParameter(&'static str),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),
}

impl GatewayError {
    /// Whether the caller, rather than the upstream, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingParameter(_) | GatewayError::InvalidParameter(_)
        )
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::UpstreamUnavailable(e.to_string())
    }
}
