use graph::UserSummary;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    dispatch::{Completion, Generation},
    error::ExploreError,
};

/// What the search box shows. `Success` with no users is "no results" and keeps
/// its query, which is what sets it apart from `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultState {
    #[default]
    Idle,
    Loading {
        query: String,
    },
    Success {
        query: String,
        users: Vec<UserSummary>,
    },
    Error {
        query: String,
        reason: String,
    },
}

impl ResultState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ResultState::Loading { .. })
    }
}

/// Sole writer of [`ResultState`]; observers follow along through [`Reducer::subscribe`].
pub struct Reducer {
    state: watch::Sender<ResultState>,
}

impl Reducer {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ResultState::Idle);

        Self { state }
    }

    pub fn state(&self) -> ResultState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultState> {
        self.state.subscribe()
    }

    pub fn clear(&mut self) {
        self.state.send_replace(ResultState::Idle);
    }

    pub fn begin(&mut self, query: &str) {
        self.state.send_replace(ResultState::Loading {
            query: query.to_string(),
        });
    }

    /// Applies a finished search unless a newer one has been dispatched since.
    pub fn accept(&mut self, live: Generation, completion: Completion) -> Result<(), ExploreError> {
        let Completion {
            generation,
            query,
            outcome,
        } = completion;

        if generation < live {
            debug!("{generation}: superseded by {live}, dropping result for {query:?}");
            return Err(ExploreError::StaleResult { generation, live });
        }

        let next = match outcome {
            Ok(users) => {
                debug!("{generation}: {} users for {query:?}", users.len());
                ResultState::Success { query, users }
            }
            Err(e) => {
                warn!("{generation}: search for {query:?} failed: {e}");
                ResultState::Error {
                    query,
                    reason: e.to_string(),
                }
            }
        };

        self.state.send_replace(next);

        Ok(())
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new()
    }
}
