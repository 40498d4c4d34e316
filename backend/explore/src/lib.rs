//! # Explore
//!
//! Client side of the profile viewer: who follows me, who do I follow, and
//! search-as-you-type over users.
//!
//! ## Search Flow
//!
//! keystroke → [`debounce`] → [`dispatch`] (tags the request with a generation) →
//! gateway → [`reducer`] (applies it only if its generation is still live) → observers
//!
//! - Typing pauses for 300ms before a search goes out
//! - A blank box goes straight back to idle, no request
//! - A slow response for an old query never overwrites a newer one
//! - Upstream errors show as errors, not as "no results"
//!
//! ## Context
//! No globals. [`context::FrameContext`] carries the viewer fid, the gateway and the
//! timings, and is built once in `main`.
pub mod context;
pub mod debounce;
pub mod dispatch;
pub mod error;
pub mod proof;
pub mod reducer;
pub mod session;

pub use context::{ExploreConfig, FrameContext, GraphTab};
pub use error::ExploreError;
pub use reducer::ResultState;
pub use session::SearchHandle;
