//! # Search Session
//!
//! Search-as-you-type for one search box.
//!
//! One task owns the [`Debouncer`], the [`Dispatcher`] and the [`Reducer`] and
//! reacts to three things, one at a time:
//! - input from the [`SearchHandle`]
//! - the debounce timer firing
//! - a fetch finishing
//!
//! Since every state change happens inside that task there are no locks. Fetches
//! that have been superseded are not aborted, their results are dropped by the
//! reducer when they arrive.
use std::{sync::Arc, time::Duration};

use graph::Gateway;
use tokio::sync::{
    mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    oneshot, watch,
};
use tracing::debug;

use crate::{
    debounce::Debouncer,
    dispatch::{Completion, Dispatcher},
    error::ExploreError,
    reducer::{Reducer, ResultState},
};

#[derive(Debug)]
enum SearchInput {
    Typed(String),
    Submit(String),
    Cancel,
    Flush(oneshot::Sender<()>),
}

/// Cheap to clone. The session stops once every handle is dropped.
#[derive(Clone)]
pub struct SearchHandle {
    inputs: UnboundedSender<SearchInput>,
    state: watch::Receiver<ResultState>,
}

impl SearchHandle {
    /// New content of the search box. Debounced, except that clearing the box
    /// takes effect immediately.
    pub fn input(&self, text: impl Into<String>) -> Result<(), ExploreError> {
        self.send(SearchInput::Typed(text.into()))
    }

    /// Search right away, skipping the debounce.
    pub fn submit(&self, text: impl Into<String>) -> Result<(), ExploreError> {
        self.send(SearchInput::Submit(text.into()))
    }

    /// Drops input still waiting on the debounce timer.
    pub fn cancel(&self) -> Result<(), ExploreError> {
        self.send(SearchInput::Cancel)
    }

    /// Sends any input still waiting on the debounce timer right away, then
    /// waits until the search it started has landed.
    pub async fn settle(&self) -> Result<ResultState, ExploreError> {
        let (done, flushed) = oneshot::channel();
        self.send(SearchInput::Flush(done))?;
        flushed.await.map_err(|_| ExploreError::SessionClosed)?;

        let mut state = self.state.clone();
        let settled = state
            .wait_for(|s| !s.is_loading())
            .await
            .map_err(|_| ExploreError::SessionClosed)?;

        Ok(settled.clone())
    }

    pub fn state(&self) -> ResultState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultState> {
        self.state.clone()
    }

    fn send(&self, input: SearchInput) -> Result<(), ExploreError> {
        self.inputs
            .send(input)
            .map_err(|_| ExploreError::SessionClosed)
    }
}

pub fn spawn(
    gateway: Arc<dyn Gateway>,
    debounce: Duration,
    request_timeout: Duration,
) -> SearchHandle {
    let (inputs_tx, inputs) = unbounded_channel();
    let (completions_tx, completions) = unbounded_channel();

    let reducer = Reducer::new();
    let state = reducer.subscribe();

    let session = SearchSession {
        debouncer: Debouncer::new(debounce),
        dispatcher: Dispatcher::new(gateway, request_timeout, completions_tx),
        reducer,
        inputs,
        completions,
    };

    tokio::spawn(session.run());

    SearchHandle {
        inputs: inputs_tx,
        state,
    }
}

struct SearchSession {
    debouncer: Debouncer<String>,
    dispatcher: Dispatcher,
    reducer: Reducer,
    inputs: UnboundedReceiver<SearchInput>,
    completions: UnboundedReceiver<Completion>,
}

impl SearchSession {
    async fn run(mut self) {
        loop {
            tokio::select! {
                input = self.inputs.recv() => match input {
                    Some(input) => self.on_input(input),
                    None => break,
                },
                query = self.debouncer.ready() => {
                    self.dispatcher.dispatch(&query, &mut self.reducer);
                }
                Some(completion) = self.completions.recv() => {
                    if let Err(e) = self.reducer.accept(self.dispatcher.live(), completion) {
                        debug!("{e}");
                    }
                }
            }
        }

        debug!("Search session closed");
    }

    fn on_input(&mut self, input: SearchInput) {
        match input {
            SearchInput::Typed(text) if text.trim().is_empty() => {
                self.debouncer.cancel();
                self.dispatcher.dispatch(&text, &mut self.reducer);
            }
            SearchInput::Typed(text) => self.debouncer.schedule(text),
            SearchInput::Submit(text) => {
                self.debouncer.cancel();
                self.dispatcher.dispatch(&text, &mut self.reducer);
            }
            SearchInput::Cancel => {
                self.debouncer.cancel();
            }
            SearchInput::Flush(done) => {
                if let Some(query) = self.debouncer.cancel() {
                    self.dispatcher.dispatch(&query, &mut self.reducer);
                }
                if done.send(()).is_err() {
                    debug!("Flush requester went away");
                }
            }
        }
    }
}
