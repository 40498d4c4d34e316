use graph::GatewayError;
use thiserror::Error;

use crate::dispatch::Generation;

#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("Stale result for {generation}, live is {live}")]
    StaleResult {
        generation: Generation,
        live: Generation,
    },

    #[error("Search session closed")]
    SessionClosed,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Credential provider failed: {0}")]
    Provider(String),
}
