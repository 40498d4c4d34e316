//! # Social Graph
//!
//! Shared records and the gateways that fetch them.
//!
//! - [`upstream::UpstreamGateway`] talks to the Farcaster client API and is what
//!   the proxy server forwards to.
//! - [`proxy::ProxyGateway`] talks to the proxy server itself and is what the
//!   explore client uses.
//!
//! Both implement [`Gateway`], so either side can be swapped for a fake in tests.
pub mod error;
pub mod gateway;
pub mod models;
pub mod proxy;
pub mod upstream;

mod remote;

pub use error::GatewayError;
pub use gateway::{Gateway, UserLookup};
pub use models::{Envelope, Fid, User, UserSummary, UsersResult};
